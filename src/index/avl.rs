//! AVL-balanced ordered map
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by position.
//! A missing child is an external position: height 0, no entry. Parent links
//! are only used to walk upward during rebalancing and rotation.
//!
//! # Invariants
//!
//! - Balance: `|height(left) - height(right)| <= 1` at every node
//! - Height: `height = 1 + max(height(left), height(right))`
//! - Order: in-order traversal yields strictly ascending keys
//!
//! Removal swap-removes the arena slot and patches the links of the node
//! that moved into it, so the arena never holds holes.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Bound, RangeBounds};

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use super::errors::{IndexError, IndexResult};
use super::ordered::OrderedIndex;

/// Arena position of a node
type NodeId = usize;

#[derive(Debug, Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    entry: Entry<K, V>,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: usize,
}

/// How far a rebalancing pass climbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    /// Stop at the first ancestor whose height did not change (insertion)
    UntilStable,
    /// Visit every ancestor up to the root (deletion)
    ToRoot,
}

/// Sorted map backed by a height-balanced binary search tree.
#[derive(Clone)]
pub struct AvlTreeMap<K, V> {
    nodes: Vec<Node<K, V>>,
    root: Option<NodeId>,
}

impl<K, V> Default for AvlTreeMap<K, V> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Creates an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if there are no entries
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the whole tree (0 when empty)
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    /// Point lookup
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| &self.nodes[id].entry.value)
    }

    /// Point lookup for in-place mutation of the value
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(move |id| &mut self.nodes[id].entry.value)
    }

    /// Returns true if `key` is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Insert or replace.
    ///
    /// An existing key keeps its node and only the value is swapped, so no
    /// rebalancing happens. A new key becomes a leaf and the path above it
    /// is rebalanced.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let Some(mut cursor) = self.root else {
            self.root = Some(self.alloc(key, value, None));
            return None;
        };

        loop {
            let ordering = key.cmp(&self.nodes[cursor].entry.key);
            let next = match ordering {
                Ordering::Equal => {
                    return Some(mem::replace(&mut self.nodes[cursor].entry.value, value));
                }
                Ordering::Less => self.nodes[cursor].left,
                Ordering::Greater => self.nodes[cursor].right,
            };

            match next {
                Some(child) => cursor = child,
                None => {
                    let leaf = self.alloc(key, value, Some(cursor));
                    if ordering == Ordering::Less {
                        self.nodes[cursor].left = Some(leaf);
                    } else {
                        self.nodes[cursor].right = Some(leaf);
                    }
                    break;
                }
            }
        }

        self.rebalance(Some(cursor), Walk::UntilStable);
        None
    }

    /// Remove a key and return its value.
    ///
    /// A node with two children trades entries with its in-order
    /// predecessor (the maximum of its left subtree) and the predecessor's
    /// node, which has at most one child, is spliced out instead.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut target = self.find(key)?;

        if let (Some(left), Some(_)) = (self.nodes[target].left, self.nodes[target].right) {
            let predecessor = self.subtree_max(left);
            self.swap_entries(target, predecessor);
            target = predecessor;
        }

        let child = self.nodes[target].left.or(self.nodes[target].right);
        let parent = self.nodes[target].parent;
        self.replace_child(parent, target, child);

        let (removed, moved_from) = self.release(target);
        let parent = parent.map(|p| if p == moved_from { target } else { p });

        self.rebalance(parent, Walk::ToRoot);
        Some(removed.entry.value)
    }

    /// Smallest existing key greater than or equal to `probe`
    pub fn ceiling<Q>(&self, probe: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        let mut best = None;

        while let Some(id) = cursor {
            let node = &self.nodes[id];
            match probe.cmp(node.entry.key.borrow()) {
                Ordering::Equal => return Some(&node.entry.key),
                Ordering::Less => {
                    best = Some(id);
                    cursor = node.left;
                }
                Ordering::Greater => cursor = node.right,
            }
        }

        best.map(|id| &self.nodes[id].entry.key)
    }

    /// Entries whose keys fall within `bounds`, ascending.
    ///
    /// The iterator is lazy: it seeds a stack with the path to the lower
    /// bound and stops at the first key past the upper bound.
    pub fn range<Q, R>(&self, bounds: R) -> Range<'_, K, V, Q, R>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        R: RangeBounds<Q>,
    {
        let mut stack = Vec::new();
        let mut cursor = self.root;

        while let Some(id) = cursor {
            let node = &self.nodes[id];
            let key = node.entry.key.borrow();
            let at_or_above_start = match bounds.start_bound() {
                Bound::Included(start) => key >= start,
                Bound::Excluded(start) => key > start,
                Bound::Unbounded => true,
            };
            if at_or_above_start {
                stack.push(id);
                cursor = node.left;
            } else {
                cursor = node.right;
            }
        }

        Range {
            tree: self,
            stack,
            bounds,
            _probe: PhantomData,
        }
    }

    /// All entries, ascending
    pub fn iter(&self) -> Range<'_, K, V, K, std::ops::RangeFull> {
        self.range::<K, _>(..)
    }

    /// All keys, ascending
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// All values, in key order
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Verify parent links, cached heights, balance and key order.
    pub fn check_invariants(&self) -> IndexResult<()> {
        let mut visited = 0usize;

        if let Some(root) = self.root {
            if self.nodes[root].parent.is_some() {
                return Err(IndexError::invariant_violation("root has a parent link"));
            }
            let mut stack = vec![(root, false)];
            while let Some((id, children_done)) = stack.pop() {
                let node = &self.nodes[id];
                if !children_done {
                    visited += 1;
                    stack.push((id, true));
                    for child in [node.left, node.right].into_iter().flatten() {
                        if self.nodes[child].parent != Some(id) {
                            return Err(IndexError::invariant_violation(format!(
                                "node {} does not point back at parent {}",
                                child, id
                            )));
                        }
                        stack.push((child, false));
                    }
                    continue;
                }

                let (left, right) = (self.height_of(node.left), self.height_of(node.right));
                if node.height != 1 + left.max(right) {
                    return Err(IndexError::invariant_violation(format!(
                        "node {} caches height {} but children give {}",
                        id,
                        node.height,
                        1 + left.max(right)
                    )));
                }
                if left.abs_diff(right) > 1 {
                    return Err(IndexError::invariant_violation(format!(
                        "node {} has balance factor {}",
                        id,
                        left as isize - right as isize
                    )));
                }
            }
        }

        if visited != self.nodes.len() {
            return Err(IndexError::invariant_violation(format!(
                "{} nodes reachable from root but {} allocated",
                visited,
                self.nodes.len()
            )));
        }

        let mut previous: Option<&K> = None;
        for (key, _) in self.iter() {
            if previous.is_some_and(|prev| prev >= key) {
                return Err(IndexError::invariant_violation(
                    "in-order traversal is not strictly ascending",
                ));
            }
            previous = Some(key);
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            cursor = match key.cmp(node.entry.key.borrow()) {
                Ordering::Equal => return Some(id),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    fn subtree_max(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    fn height_of(&self, id: Option<NodeId>) -> usize {
        id.map_or(0, |id| self.nodes[id].height)
    }

    // ------------------------------------------------------------------
    // Arena management
    // ------------------------------------------------------------------

    fn alloc(&mut self, key: K, value: V, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node {
            entry: Entry { key, value },
            parent,
            left: None,
            right: None,
            height: 1,
        });
        self.nodes.len() - 1
    }

    /// Drop an already unlinked node from the arena.
    ///
    /// Returns the node and the old position of the node that was moved
    /// into its slot (equal to the slot itself when nothing moved).
    fn release(&mut self, id: NodeId) -> (Node<K, V>, NodeId) {
        let removed = self.nodes.swap_remove(id);
        let moved_from = self.nodes.len();

        if id != moved_from {
            let (parent, left, right) = {
                let moved = &self.nodes[id];
                (moved.parent, moved.left, moved.right)
            };
            match parent {
                None => self.root = Some(id),
                Some(p) => {
                    if self.nodes[p].left == Some(moved_from) {
                        self.nodes[p].left = Some(id);
                    } else {
                        self.nodes[p].right = Some(id);
                    }
                }
            }
            for child in [left, right].into_iter().flatten() {
                self.nodes[child].parent = Some(id);
            }
        }

        (removed, moved_from)
    }

    fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.nodes.split_at_mut(hi);
        mem::swap(&mut head[lo].entry, &mut tail[0].entry);
    }

    /// Point `parent`'s link that currently holds `old` at `new` instead.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                if self.nodes[p].left == Some(old) {
                    self.nodes[p].left = new;
                } else {
                    self.nodes[p].right = new;
                }
            }
        }
        if let Some(child) = new {
            self.nodes[child].parent = parent;
        }
    }

    fn relink(&mut self, parent: NodeId, child: Option<NodeId>, as_left: bool) {
        if as_left {
            self.nodes[parent].left = child;
        } else {
            self.nodes[parent].right = child;
        }
        if let Some(child) = child {
            self.nodes[child].parent = Some(parent);
        }
    }

    // ------------------------------------------------------------------
    // Balancing
    // ------------------------------------------------------------------

    fn recompute_height(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes[id].height = height;
    }

    fn is_balanced(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        self.height_of(node.left).abs_diff(self.height_of(node.right)) <= 1
    }

    /// The child with the greater height.
    ///
    /// On a tie, the child on the same side as `id` hangs off its own
    /// parent; the left child when `id` is the root.
    fn taller_child(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        let take_left = match self.height_of(node.left).cmp(&self.height_of(node.right)) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match node.parent {
                None => true,
                Some(parent) => self.nodes[parent].left == Some(id),
            },
        };
        if take_left {
            node.left
        } else {
            node.right
        }
    }

    /// Rotate `x` above its parent.
    fn rotate(&mut self, x: NodeId) {
        let y = self.nodes[x].parent.expect("rotated node has a parent");
        let z = self.nodes[y].parent;

        match z {
            None => {
                self.root = Some(x);
                self.nodes[x].parent = None;
            }
            Some(z) => {
                let y_was_left = self.nodes[z].left == Some(y);
                self.relink(z, Some(x), y_was_left);
            }
        }

        if self.nodes[y].left == Some(x) {
            let inner = self.nodes[x].right;
            self.relink(y, inner, true);
            self.relink(x, Some(y), false);
        } else {
            let inner = self.nodes[x].left;
            self.relink(y, inner, false);
            self.relink(x, Some(y), true);
        }
    }

    /// Trinode restructuring around grandchild `x`.
    ///
    /// Returns the node that now roots the restructured subtree.
    fn restructure(&mut self, x: NodeId) -> NodeId {
        let y = self.nodes[x].parent.expect("restructure pivot has a parent");
        let z = self.nodes[y].parent.expect("restructure pivot has a grandparent");

        let x_is_left = self.nodes[y].left == Some(x);
        let y_is_left = self.nodes[z].left == Some(y);

        if x_is_left == y_is_left {
            self.rotate(y);
            y
        } else {
            self.rotate(x);
            self.rotate(x);
            x
        }
    }

    fn rebalance(&mut self, start: Option<NodeId>, walk: Walk) {
        let mut cursor = start;

        while let Some(mut id) = cursor {
            let old_height = self.nodes[id].height;

            if !self.is_balanced(id) {
                let pivot = self
                    .taller_child(id)
                    .and_then(|child| self.taller_child(child))
                    .expect("unbalanced node has a taller grandchild");
                id = self.restructure(pivot);
                if let Some(left) = self.nodes[id].left {
                    self.recompute_height(left);
                }
                if let Some(right) = self.nodes[id].right {
                    self.recompute_height(right);
                }
            }

            self.recompute_height(id);

            if walk == Walk::UntilStable && self.nodes[id].height == old_height {
                break;
            }
            cursor = self.nodes[id].parent;
        }
    }
}

/// Lazy in-order iterator over a key range of an [`AvlTreeMap`]
pub struct Range<'a, K, V, Q: ?Sized, R> {
    tree: &'a AvlTreeMap<K, V>,
    stack: Vec<NodeId>,
    bounds: R,
    _probe: PhantomData<fn(&Q)>,
}

impl<'a, K, V, Q, R> Iterator for Range<'a, K, V, Q, R>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
    R: RangeBounds<Q>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let id = self.stack.pop()?;
        let node = &tree.nodes[id];

        let key = node.entry.key.borrow();
        let within_end = match self.bounds.end_bound() {
            Bound::Included(end) => key <= end,
            Bound::Excluded(end) => key < end,
            Bound::Unbounded => true,
        };
        if !within_end {
            self.stack.clear();
            return None;
        }

        let mut cursor = node.right;
        while let Some(child) = cursor {
            self.stack.push(child);
            cursor = tree.nodes[child].left;
        }

        Some((&node.entry.key, &node.entry.value))
    }
}

impl<K: Ord, V> OrderedIndex<K, V> for AvlTreeMap<K, V> {
    fn len(&self) -> usize {
        AvlTreeMap::len(self)
    }

    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        AvlTreeMap::get(self, key)
    }

    fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        AvlTreeMap::get_mut(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        AvlTreeMap::put(self, key, value)
    }

    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        AvlTreeMap::remove(self, key)
    }

    fn ceiling<Q>(&self, probe: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        AvlTreeMap::ceiling(self, probe)
    }

    fn range<'a, Q, R>(&'a self, bounds: R) -> impl Iterator<Item = (&'a K, &'a V)> + 'a
    where
        K: Borrow<Q> + 'a,
        V: 'a,
        Q: Ord + ?Sized + 'a,
        R: RangeBounds<Q> + 'a,
    {
        AvlTreeMap::range(self, bounds)
    }

    fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)> + 'a
    where
        K: 'a,
        V: 'a,
    {
        AvlTreeMap::iter(self)
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AvlTreeMap::new();
        for (key, value) in iter {
            map.put(key, value);
        }
        map
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Serialized as an ascending sequence of `[key, value]` pairs.
impl<K: Ord + Serialize, V: Serialize> Serialize for AvlTreeMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, K, V> Deserialize<'de> for AvlTreeMap<K, V>
where
    K: Ord + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = Vec::<(K, V)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of<V>(map: &AvlTreeMap<i32, V>) -> Vec<i32> {
        map.keys().copied().collect()
    }

    #[test]
    fn test_put_and_get() {
        let mut map = AvlTreeMap::new();
        assert_eq!(map.put(5, "five"), None);
        assert_eq!(map.put(3, "three"), None);
        assert_eq!(map.put(8, "eight"), None);

        assert_eq!(map.get(&5), Some(&"five"));
        assert_eq!(map.get(&3), Some(&"three"));
        assert_eq!(map.get(&4), None);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_put_existing_key_replaces_value() {
        let mut map = AvlTreeMap::new();
        map.put("Joker".to_string(), 1);
        let height = map.height();

        assert_eq!(map.put("Joker".to_string(), 7), Some(1));
        assert_eq!(map.get("Joker"), Some(&7));
        assert_eq!(map.len(), 1);
        assert_eq!(map.height(), height);
    }

    #[test]
    fn test_ascending_inserts_stay_balanced() {
        let mut map = AvlTreeMap::new();
        for key in 0..1024 {
            map.put(key, ());
            map.check_invariants().unwrap();
        }
        // A perfectly packed tree of 1024 nodes has height 11.
        assert_eq!(map.height(), 11);
        assert_eq!(keys_of(&map), (0..1024).collect::<Vec<_>>());
    }

    #[test]
    fn test_left_right_double_rotation() {
        let mut map = AvlTreeMap::new();
        map.put(30, ());
        map.put(10, ());
        map.put(20, ());

        map.check_invariants().unwrap();
        assert_eq!(map.height(), 2);
        assert_eq!(keys_of(&map), vec![10, 20, 30]);
    }

    #[test]
    fn test_right_left_double_rotation() {
        let mut map = AvlTreeMap::new();
        map.put(10, ());
        map.put(30, ());
        map.put(20, ());

        map.check_invariants().unwrap();
        assert_eq!(map.height(), 2);
    }

    #[test]
    fn test_remove_leaf_inner_and_root() {
        let mut map: AvlTreeMap<i32, i32> = (1..=15).map(|k| (k, k * 10)).collect();

        assert_eq!(map.remove(&1), Some(10));
        map.check_invariants().unwrap();

        // 8 is the root of a packed 1..=15 tree and has two children.
        assert_eq!(map.remove(&8), Some(80));
        map.check_invariants().unwrap();

        assert_eq!(map.remove(&12), Some(120));
        map.check_invariants().unwrap();

        assert_eq!(map.remove(&100), None);
        assert_eq!(keys_of(&map), vec![2, 3, 4, 5, 6, 7, 9, 10, 11, 13, 14, 15]);
    }

    #[test]
    fn test_remove_everything() {
        let mut map: AvlTreeMap<i32, ()> = (0..200).map(|k| (k, ())).collect();
        for key in (0..200).rev().step_by(3) {
            map.remove(&key);
            map.check_invariants().unwrap();
        }
        for key in 0..200 {
            map.remove(&key);
            map.check_invariants().unwrap();
        }
        assert!(map.is_empty());
        assert_eq!(map.height(), 0);
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn test_remove_on_empty_map() {
        let mut map: AvlTreeMap<i32, ()> = AvlTreeMap::new();
        assert_eq!(map.remove(&3), None);
        map.check_invariants().unwrap();
    }

    #[test]
    fn test_ceiling() {
        let map: AvlTreeMap<i32, ()> = [1990, 1995, 2000, 2005].into_iter().map(|k| (k, ())).collect();

        assert_eq!(map.ceiling(&1995), Some(&1995));
        assert_eq!(map.ceiling(&1996), Some(&2000));
        assert_eq!(map.ceiling(&1900), Some(&1990));
        assert_eq!(map.ceiling(&2006), None);
    }

    #[test]
    fn test_range_half_open() {
        let map: AvlTreeMap<i32, ()> = [1990, 1995, 2000, 2005].into_iter().map(|k| (k, ())).collect();

        let keys: Vec<i32> = map.range(1995..2005).map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1995, 2000]);

        let keys: Vec<i32> = map.range(1991..2001).map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1995, 2000]);

        let keys: Vec<i32> = map.range(1990..=2005).map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1990, 1995, 2000, 2005]);

        assert_eq!(map.range(2001..2005).count(), 0);
        assert_eq!(map.range(2005..1990).count(), 0);
    }

    #[test]
    fn test_range_with_borrowed_bounds() {
        let map: AvlTreeMap<String, u64> = ["Alien", "Brazil", "Casablanca", "Dune"]
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i as u64))
            .collect();

        let titles: Vec<&str> = map
            .range::<str, _>((Bound::Included("B"), Bound::Excluded("D")))
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(titles, vec!["Brazil", "Casablanca"]);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut map = AvlTreeMap::new();
        map.put("Drama".to_string(), vec![1u64]);
        map.get_mut("Drama").unwrap().push(2);
        assert_eq!(map.get("Drama"), Some(&vec![1, 2]));
    }

    #[test]
    fn test_serde_round_trip_preserves_order() {
        let map: AvlTreeMap<i32, Vec<u64>> = vec![(2001, vec![3]), (1999, vec![1, 2])].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, "[[1999,[1,2]],[2001,[3]]]");

        let back: AvlTreeMap<i32, Vec<u64>> = serde_json::from_str(&json).unwrap();
        back.check_invariants().unwrap();
        assert_eq!(back.get(&1999), Some(&vec![1, 2]));
    }
}
