//! CLI command implementations
//!
//! Every command except `init` boots the catalog first:
//! 1. Configuration load
//! 2. Catalog load (snapshot, else dataset, else empty)
//! 3. Collaborators attached (snapshot store, audit log)
//!
//! One-shot commands then run a single request and exit. `serve` answers
//! requests from stdin until it closes.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::observability::{Event, FileAuditLog, Logger};
use crate::query::{load_catalog, CatalogSource, QueryEngine};
use crate::snapshot::FileSnapshotStore;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_error_to, write_response, write_response_to};
use super::request::Request;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    if cli.quiet {
        Logger::quiet();
    }
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Stats { config } => one_shot(&config, Request::Stats),
        Command::Verify { config } => one_shot(&config, Request::Verify),
        Command::Get { config, id } => one_shot(&config, Request::Get { id }),
        Command::Title { config, title } => one_shot(&config, Request::Title { title }),
        Command::Prefix { config, prefix } => one_shot(&config, Request::Prefix { prefix }),
        Command::Year { config, year } => one_shot(&config, Request::Year { year }),
        Command::Years { config, from, to } => one_shot(&config, Request::Years { from, to }),
        Command::Genre { config, genre } => one_shot(&config, Request::Genre { genre }),
        Command::Range { config, field, min, max } => one_shot(&config, Request::Range { field, min, max }),
        Command::Insert { config } => {
            let record = serde_json::from_value(read_request()?)?;
            one_shot(&config, Request::Insert { record })
        }
        Command::Modify { config, id } => {
            let changes = serde_json::from_value(read_request()?)?;
            one_shot(&config, Request::Modify { id, changes })
        }
        Command::Delete { config, id } => one_shot(&config, Request::Delete { id }),
        Command::Path { config, attribute, from, to } => {
            one_shot(&config, Request::Path { attribute, from, to })
        }
        Command::Serve { config } => serve(&config),
    }
}

/// Initialize a new data directory
///
/// Creates `snapshot/` and `audit/` under `data_dir`. Loads nothing.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;

    if is_initialized(&config) {
        return Err(CliError::already_initialized());
    }

    let dirs = [config.snapshot_dir(), config.data_path().join("audit")];
    for dir in &dirs {
        fs::create_dir_all(dir).map_err(|e| {
            CliError::config_error(format!("Failed to create directory {:?}: {}", dir, e))
        })?;
    }

    write_response(json!({"initialized": true}))?;

    Ok(())
}

/// Boot the catalog described by `config`
///
/// A catalog freshly built from the dataset is snapshotted right away, so
/// later boots load the snapshot instead of re-reading the dataset.
pub fn boot(config: &Config) -> CliResult<QueryEngine> {
    Logger::event(Event::BootStart, &[("data_dir", &config.data_dir)]);

    if !is_initialized(config) {
        return Err(CliError::not_initialized());
    }

    let snapshots = Arc::new(FileSnapshotStore::new(config.snapshot_dir()));
    let (catalog, source) = load_catalog(snapshots.as_ref(), config.dataset())
        .map_err(|e| CliError::boot_failed(format!("Catalog load failed: {}", e)))?;

    let mut engine = QueryEngine::new(catalog).with_snapshots(snapshots, config.snapshot_on_commit);
    if config.audit_enabled {
        let audit = FileAuditLog::open(config.audit_path())
            .map_err(|e| CliError::boot_failed(format!("Audit log unavailable: {}", e)))?;
        engine = engine.with_audit(Arc::new(audit));
    }

    if source == CatalogSource::Dataset {
        if let Err(e) = engine.persist() {
            Logger::error(Event::SnapshotFailed.as_str(), &[("error", &e.to_string())]);
        }
    }

    let records = engine
        .stats()
        .map_err(|e| CliError::boot_failed(e.to_string()))?
        .records;
    Logger::event(
        Event::BootComplete,
        &[("records", &records.to_string()), ("source", source_name(source))],
    );
    Ok(engine)
}

/// Boot, run one request, print its response
fn one_shot(config_path: &Path, request: Request) -> CliResult<()> {
    let config = Config::load(config_path)?;
    Logger::event(Event::ConfigLoaded, &[("path", &config_path.display().to_string())]);
    let engine = boot(&config)?;

    match request.execute(&engine) {
        Ok(data) => write_response(data),
        Err(e) => write_error(e.code(), &e.to_string()),
    }
}

/// Boot and enter the request loop on stdin/stdout
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    Logger::event(Event::ConfigLoaded, &[("path", &config_path.display().to_string())]);
    let engine = boot(&config)?;

    Logger::event(Event::Serving, &[]);
    let served = serve_requests(&engine, io::stdin().lock(), &mut io::stdout())?;
    Logger::info("REELDB_SHUTDOWN", &[("requests", &served.to_string())]);
    Ok(())
}

/// Answer one request per input line until end of input.
///
/// Blank lines are skipped. Unparseable or failing requests get an error
/// response and the loop continues. Returns the number of requests answered.
pub fn serve_requests<R: BufRead, W: Write>(engine: &QueryEngine, input: R, output: &mut W) -> CliResult<usize> {
    let mut served = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        served += 1;

        match Request::parse(&line) {
            Ok(request) => match request.execute(engine) {
                Ok(data) => write_response_to(output, data)?,
                Err(e) => write_error_to(output, e.code(), &e.to_string())?,
            },
            Err(e) => write_error_to(output, e.code_str(), e.message())?,
        }
    }
    Ok(served)
}

fn is_initialized(config: &Config) -> bool {
    config.snapshot_dir().exists() && config.data_path().join("audit").exists()
}

fn source_name(source: CatalogSource) -> &'static str {
    match source {
        CatalogSource::Snapshot => "snapshot",
        CatalogSource::Dataset => "dataset",
        CatalogSource::Empty => "empty",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::AuditAction;
    use serde_json::Value;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup(dataset: Option<&str>) -> (TempDir, PathBuf, Config) {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let mut content = json!({"data_dir": data_dir.to_str().unwrap()});
        if let Some(dataset) = dataset {
            let path = dir.path().join("movies.json");
            fs::write(&path, dataset).unwrap();
            content["dataset_path"] = json!(path.to_str().unwrap());
        }
        let config_path = dir.path().join("reeldb.json");
        fs::write(&config_path, content.to_string()).unwrap();
        let config = Config::load(&config_path).unwrap();
        (dir, config_path, config)
    }

    fn responses(output: Vec<u8>) -> Vec<Value> {
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_boot_requires_init() {
        let (_dir, config_path, config) = setup(None);
        let err = boot(&config).err().unwrap();
        assert_eq!(err.code_str(), "REEL_CLI_NOT_INITIALIZED");

        init(&config_path).unwrap();
        assert!(boot(&config).is_ok());
        assert_eq!(init(&config_path).unwrap_err().code_str(), "REEL_CLI_ALREADY_INITIALIZED");
    }

    #[test]
    fn test_dataset_boot_snapshots_immediately() {
        let (_dir, config_path, config) = setup(Some(
            r#"[{"title": "Heat", "release_date": "1995-12-15", "genres": ["Crime"]}]"#,
        ));
        init(&config_path).unwrap();

        boot(&config).unwrap();
        assert!(config.snapshot_dir().join("manifest.json").exists());
    }

    #[test]
    fn test_serve_loop_persists_across_boots() {
        let (_dir, config_path, config) = setup(None);
        init(&config_path).unwrap();

        let engine = boot(&config).unwrap();
        let input = concat!(
            r#"{"op": "insert", "record": {"title": "Heat", "release_date": "1995-12-15", "genres": ["Crime"]}}"#,
            "\n\n",
            "not json\n",
            r#"{"op": "insert", "record": {"title": "Nope"}}"#,
            "\n",
            r#"{"op": "modify", "id": 0, "changes": {"genres": ["Drama"]}}"#,
            "\n",
        );
        let mut output = Vec::new();
        let served = serve_requests(&engine, input.as_bytes(), &mut output).unwrap();
        assert_eq!(served, 4);

        let out = responses(output);
        assert_eq!(out[0], json!({"status": "ok", "data": {"id": 0}}));
        assert_eq!(out[1]["code"], "REEL_CLI_BAD_REQUEST");
        assert_eq!(out[2]["code"], "REEL_VALIDATION_ERROR");
        assert_eq!(out[3]["data"], json!({"modified": true}));
        drop(engine);

        let engine = boot(&config).unwrap();
        let drama = engine.search_by_genre("Drama").unwrap();
        assert_eq!(drama.len(), 1);
        assert_eq!(engine.stats().unwrap().next_id, 1);

        let audit = FileAuditLog::read_all(config.audit_path()).unwrap();
        let actions: Vec<AuditAction> = audit.iter().map(|r| r.action).collect();
        assert_eq!(actions, vec![AuditAction::Inserted, AuditAction::Modified]);
    }
}
