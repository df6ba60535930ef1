//! Catalog Invariant Tests
//!
//! Random mixes of insert, delete and modify must leave the store and the
//! three indexes consistent after every single operation.

use proptest::prelude::*;
use reeldb::query::{Catalog, QueryEngine};
use reeldb::storage::{RecordDraft, RecordPatch};

const TITLES: &[&str] = &["Alien", "Aliens", "Amelie", "Heat", "Her", "Ran", "Rashomon", "Up"];
const GENRES: &[&str] = &["Drama", "Comedy", "Horror", "War", "Crime"];

#[derive(Debug, Clone)]
enum Op {
    Insert { title: usize, year: i32, genres: Vec<usize> },
    Delete(u64),
    Retitle(u64, usize),
    Redate(u64, i32),
    Regenre(u64, Vec<usize>),
}

fn genres_strategy() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0..GENRES.len(), 0..4)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..TITLES.len(), 1990i32..2000, genres_strategy())
            .prop_map(|(title, year, genres)| Op::Insert { title, year, genres }),
        2 => (0u64..40).prop_map(Op::Delete),
        1 => (0u64..40, 0..TITLES.len()).prop_map(|(id, t)| Op::Retitle(id, t)),
        1 => (0u64..40, 1990i32..2000).prop_map(|(id, y)| Op::Redate(id, y)),
        2 => (0u64..40, genres_strategy()).prop_map(|(id, g)| Op::Regenre(id, g)),
    ]
}

fn names(indices: &[usize]) -> Vec<&'static str> {
    indices.iter().map(|&i| GENRES[i]).collect()
}

fn apply(engine: &QueryEngine, op: &Op) {
    match op {
        Op::Insert { title, year, genres } => {
            let draft = RecordDraft::new(TITLES[*title], format!("{}-06-01", year), &names(genres));
            engine.insert(draft).unwrap();
        }
        Op::Delete(id) => {
            engine.delete(*id).unwrap();
        }
        Op::Retitle(id, title) => {
            engine.modify(*id, RecordPatch::new().title(TITLES[*title])).unwrap();
        }
        Op::Redate(id, year) => {
            engine
                .modify(*id, RecordPatch::new().release_date(format!("{}-01-01", year)))
                .unwrap();
        }
        Op::Regenre(id, genres) => {
            engine.modify(*id, RecordPatch::new().genres(&names(genres))).unwrap();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn invariants_hold_after_every_operation(ops in proptest::collection::vec(op_strategy(), 1..120)) {
        let engine = QueryEngine::new(Catalog::new());
        for op in &ops {
            apply(&engine, op);
            prop_assert!(engine.verify().is_ok(), "broken after {:?}", op);
        }
    }

    #[test]
    fn genre_lookup_matches_scan(ops in proptest::collection::vec(op_strategy(), 1..80)) {
        let engine = QueryEngine::new(Catalog::new());
        for op in &ops {
            apply(&engine, op);
        }

        let records = engine.records().unwrap();
        for genre in GENRES {
            let mut indexed: Vec<u64> = engine.search_by_genre(genre).unwrap().iter().map(|r| r.id).collect();
            indexed.sort_unstable();
            let scanned: Vec<u64> = records
                .iter()
                .filter(|r| r.genres.iter().any(|g| g == genre))
                .map(|r| r.id)
                .collect();
            prop_assert_eq!(indexed, scanned);
        }

        let ranged = engine.search_by_year_range(1990, 1999).unwrap().len();
        prop_assert_eq!(ranged, records.len());
    }
}

#[test]
fn test_delete_absent_leaves_everything_unchanged() {
    let engine = QueryEngine::new(Catalog::new());
    engine.insert(RecordDraft::new("Heat", "1995-12-15", &["Crime", "Drama"])).unwrap();
    let before = engine.stats().unwrap();

    assert!(!engine.delete(42).unwrap());

    assert_eq!(engine.stats().unwrap(), before);
    engine.verify().unwrap();
}
