//! Prefix search over string-keyed indexes
//!
//! Finds the ceiling of the prefix, then walks forward in key order from
//! there. Keys sharing a prefix are contiguous in lexicographic order, so
//! the walk stops at the first key that does not start with the prefix.
//! Cost is O(log n + m) for m matches.

use std::ops::Bound;

use super::ordered::OrderedIndex;

/// Values whose keys start with `prefix`, in ascending key order.
pub fn prefix_scan<'a, I, V>(index: &'a I, prefix: &str) -> Vec<&'a V>
where
    I: OrderedIndex<String, V>,
    V: 'a,
{
    prefix_entries(index, prefix).into_iter().map(|(_, v)| v).collect()
}

/// Like [`prefix_scan`] but keeps the matching keys.
pub fn prefix_entries<'a, I, V>(index: &'a I, prefix: &str) -> Vec<(&'a String, &'a V)>
where
    I: OrderedIndex<String, V>,
    V: 'a,
{
    let Some(start) = index.ceiling(prefix) else {
        return Vec::new();
    };
    if !start.starts_with(prefix) {
        return Vec::new();
    }

    index
        .range::<str, _>((Bound::Included(start.as_str()), Bound::Unbounded))
        .take_while(|(key, _)| key.starts_with(prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::AvlTreeMap;
    use std::collections::BTreeMap;

    fn titles() -> AvlTreeMap<String, u64> {
        ["Joker", "John Wick", "Jumanji", "Zootopia"]
            .into_iter()
            .enumerate()
            .map(|(id, title)| (title.to_string(), id as u64))
            .collect()
    }

    #[test]
    fn test_prefix_returns_matches_in_key_order() {
        let index = titles();
        let matches: Vec<&String> = prefix_entries(&index, "Jo").into_iter().map(|(k, _)| k).collect();
        assert_eq!(matches, vec!["John Wick", "Joker"]);
        assert_eq!(prefix_scan(&index, "Jo"), vec![&1, &0]);
    }

    #[test]
    fn test_prefix_without_matches() {
        let index = titles();
        assert!(prefix_scan(&index, "Ka").is_empty());
        assert!(prefix_scan(&index, "Zz").is_empty());
        assert!(prefix_scan(&index, "~").is_empty());
    }

    #[test]
    fn test_empty_prefix_matches_everything() {
        let index = titles();
        assert_eq!(prefix_scan(&index, "").len(), 4);
    }

    #[test]
    fn test_exact_key_is_its_own_prefix() {
        let index = titles();
        assert_eq!(prefix_scan(&index, "Jumanji"), vec![&2]);
    }

    #[test]
    fn test_matches_spanning_subtrees() {
        // Enough keys that matches sit under different ancestors.
        let mut index = AvlTreeMap::new();
        let mut oracle = BTreeMap::new();
        for i in 0..300u64 {
            let key = format!("{}{:03}", if i % 3 == 0 { "Star" } else { "Moon" }, i);
            index.put(key.clone(), i);
            oracle.insert(key, i);
        }

        assert_eq!(prefix_scan(&index, "Star"), prefix_scan(&oracle, "Star"));
        assert_eq!(prefix_scan(&index, "Star").len(), 100);
        assert_eq!(prefix_scan(&index, "Moon1"), prefix_scan(&oracle, "Moon1"));
    }
}
