//! The ordered-map interface shared by every index
//!
//! `AvlTreeMap` is the production implementation. `BTreeMap` implements the
//! same interface so that anything written against `OrderedIndex` (prefix
//! scans, range queries) can be checked against the standard library.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::ops::RangeBounds;

/// A sorted key/value map with point, ceiling and range access.
///
/// Keys compare by their total order. Iteration is always ascending.
pub trait OrderedIndex<K: Ord, V> {
    /// Number of entries
    fn len(&self) -> usize;

    /// Returns true if the map holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point lookup
    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized;

    /// Point lookup for in-place mutation of the value
    fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized;

    /// Insert or replace. Returns the previous value if the key existed.
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Remove a key. Returns its value if it existed.
    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized;

    /// Smallest existing key greater than or equal to `probe`
    fn ceiling<Q>(&self, probe: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized;

    /// Entries whose keys fall within `bounds`, ascending
    fn range<'a, Q, R>(&'a self, bounds: R) -> impl Iterator<Item = (&'a K, &'a V)> + 'a
    where
        K: Borrow<Q> + 'a,
        V: 'a,
        Q: Ord + ?Sized + 'a,
        R: RangeBounds<Q> + 'a;

    /// All entries, ascending
    fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)> + 'a
    where
        K: 'a,
        V: 'a;
}

impl<K: Ord, V> OrderedIndex<K, V> for BTreeMap<K, V> {
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        BTreeMap::get(self, key)
    }

    fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        BTreeMap::get_mut(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        BTreeMap::insert(self, key, value)
    }

    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        BTreeMap::remove(self, key)
    }

    fn ceiling<Q>(&self, probe: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        BTreeMap::range::<Q, _>(self, (std::ops::Bound::Included(probe), std::ops::Bound::Unbounded))
            .next()
            .map(|(k, _)| k)
    }

    fn range<'a, Q, R>(&'a self, bounds: R) -> impl Iterator<Item = (&'a K, &'a V)> + 'a
    where
        K: Borrow<Q> + 'a,
        V: 'a,
        Q: Ord + ?Sized + 'a,
        R: RangeBounds<Q> + 'a,
    {
        BTreeMap::range(self, bounds)
    }

    fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)> + 'a
    where
        K: 'a,
        V: 'a,
    {
        BTreeMap::iter(self)
    }
}
