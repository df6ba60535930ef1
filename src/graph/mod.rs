//! Co-occurrence graph
//!
//! Directed, weighted adjacency map over string vertices. Two values that
//! appear together in one record (two cast members, two production
//! companies) are linked in both directions; every further co-appearance
//! adds one to the edge weight.
//!
//! The graph is built from records on demand and is independent of the
//! query engine. Neighbors are kept sorted, so traversal order and
//! shortest paths are deterministic.

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde_json::Value;

use crate::storage::MovieRecord;

/// Directed edge with a co-occurrence count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub weight: u32,
}

/// Adjacency-map graph
#[derive(Debug, Clone, Default)]
pub struct CoOccurrenceGraph {
    adjacency: BTreeMap<String, BTreeMap<String, u32>>,
}

impl CoOccurrenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link every pair of values found in the string-list `attribute` of
    /// each record. Non-string entries and non-list attributes are ignored.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a MovieRecord>, attribute: &str) -> Self {
        let mut graph = Self::new();
        for record in records {
            if let Some(Value::Array(items)) = record.field(attribute) {
                let names: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                graph.add_group(&names);
            }
        }
        graph
    }

    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    pub fn num_edges(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum()
    }

    pub fn contains_vertex(&self, vertex: &str) -> bool {
        self.adjacency.contains_key(vertex)
    }

    /// Vertices in ascending order
    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    /// Every edge, grouped by source vertex
    pub fn edges(&self) -> impl Iterator<Item = Edge<'_>> {
        self.adjacency.iter().flat_map(|(from, targets)| {
            targets.iter().map(move |(to, &weight)| Edge { from, to, weight })
        })
    }

    /// Weight of the edge `from -> to`
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<u32> {
        self.adjacency.get(from)?.get(to).copied()
    }

    pub fn out_degree(&self, vertex: &str) -> usize {
        self.adjacency.get(vertex).map_or(0, BTreeMap::len)
    }

    pub fn in_degree(&self, vertex: &str) -> usize {
        self.adjacency.values().filter(|targets| targets.contains_key(vertex)).count()
    }

    pub fn outgoing_edges<'a>(&'a self, vertex: &'a str) -> impl Iterator<Item = Edge<'a>> {
        self.adjacency
            .get(vertex)
            .into_iter()
            .flat_map(move |targets| targets.iter().map(move |(to, &weight)| Edge { from: vertex, to, weight }))
    }

    pub fn incoming_edges<'a>(&'a self, vertex: &'a str) -> impl Iterator<Item = Edge<'a>> {
        self.adjacency.iter().filter_map(move |(from, targets)| {
            targets.get(vertex).map(|&weight| Edge { from, to: vertex, weight })
        })
    }

    /// Add a vertex with no edges. No effect if it exists.
    pub fn insert_vertex(&mut self, vertex: &str) {
        if !self.adjacency.contains_key(vertex) {
            self.adjacency.insert(vertex.to_string(), BTreeMap::new());
        }
    }

    /// Add `weight` to the edge `from -> to`, creating vertices and edge as
    /// needed. Returns the resulting weight.
    pub fn insert_edge(&mut self, from: &str, to: &str, weight: u32) -> u32 {
        self.insert_vertex(to);
        self.insert_vertex(from);
        let targets = self.adjacency.entry(from.to_string()).or_default();
        let entry = targets.entry(to.to_string()).or_insert(0);
        *entry += weight;
        *entry
    }

    /// Remove the edge `from -> to`. Returns its weight if it existed.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> Option<u32> {
        self.adjacency.get_mut(from)?.remove(to)
    }

    /// Remove a vertex and every edge touching it
    pub fn remove_vertex(&mut self, vertex: &str) -> bool {
        if self.adjacency.remove(vertex).is_none() {
            return false;
        }
        for targets in self.adjacency.values_mut() {
            targets.remove(vertex);
        }
        true
    }

    /// Link every pair of `members` in both directions with weight 1
    pub fn add_group(&mut self, members: &[&str]) {
        for member in members {
            self.insert_vertex(member);
        }
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if a != b {
                    self.insert_edge(a, b, 1);
                    self.insert_edge(b, a, 1);
                }
            }
        }
    }

    /// Fewest-hops path from `src` to `dst`, both ends included.
    ///
    /// Breadth-first; among equally short paths the one through the
    /// lexicographically smaller neighbors wins. `None` if either vertex is
    /// missing or `dst` is unreachable.
    pub fn shortest_path(&self, src: &str, dst: &str) -> Option<Vec<String>> {
        if !self.contains_vertex(src) || !self.contains_vertex(dst) {
            return None;
        }
        if src == dst {
            return Some(vec![src.to_string()]);
        }

        let mut parent: HashMap<&str, &str> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::from([src]);
        parent.insert(src, src);

        while let Some(current) = queue.pop_front() {
            let Some(targets) = self.adjacency.get(current) else {
                continue;
            };
            for next in targets.keys().map(String::as_str) {
                if parent.contains_key(next) {
                    continue;
                }
                parent.insert(next, current);
                if next == dst {
                    return Some(trace_back(&parent, src, dst));
                }
                queue.push_back(next);
            }
        }
        None
    }
}

fn trace_back(parent: &HashMap<&str, &str>, src: &str, dst: &str) -> Vec<String> {
    let mut path = vec![dst.to_string()];
    let mut current = dst;
    while current != src {
        current = parent[current];
        path.push(current.to_string());
    }
    path.reverse();
    path
}
