//! Deterministic presentation order of sites.

use std::collections::{BTreeMap, HashSet};

/// Order the sites of one mode for presentation.
///
/// The first `popular_n` entries of `popular` come first, in list order,
/// then the first `unpopular_n` entries of `unpopular`, then every remaining
/// site alphabetically. Listed sites absent from `present` are skipped and no
/// site appears twice.
#[must_use]
pub fn order_sites<T>(
    present: &BTreeMap<String, T>,
    popular: &[String],
    unpopular: &[String],
    popular_n: usize,
    unpopular_n: usize,
) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::with_capacity(present.len());
    let mut placed: HashSet<&str> = HashSet::with_capacity(present.len());

    let listed = popular
        .iter()
        .take(popular_n)
        .chain(unpopular.iter().take(unpopular_n));
    // BTreeMap keys are already sorted, which gives the alphabetical tail.
    for site in listed.chain(present.keys()) {
        if present.contains_key(site) && placed.insert(site.as_str()) {
            ordered.push(site.clone());
        }
    }

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(sites: &[&str]) -> BTreeMap<String, ()> {
        sites.iter().map(|s| ((*s).to_string(), ())).collect()
    }

    fn list(sites: &[&str]) -> Vec<String> {
        sites.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_order_truncates_and_skips_absent() {
        let ordered = order_sites(
            &present(&["b", "d", "z"]),
            &list(&["a", "b", "c"]),
            &list(&["d", "e"]),
            2,
            1,
        );
        assert_eq!(ordered, list(&["b", "d", "z"]));
    }

    #[test]
    fn test_truncated_entries_fall_to_alphabetical_tail() {
        let ordered = order_sites(
            &present(&["c", "x", "b", "a"]),
            &list(&["c", "b"]),
            &list(&["x"]),
            1,
            0,
        );
        assert_eq!(ordered, list(&["c", "a", "b", "x"]));
    }

    #[test]
    fn test_site_in_both_lists_placed_once() {
        let ordered = order_sites(
            &present(&["a", "b"]),
            &list(&["b", "a"]),
            &list(&["b"]),
            10,
            10,
        );
        assert_eq!(ordered, list(&["b", "a"]));
    }

    #[test]
    fn test_order_is_stable() {
        let sites = present(&["m", "k", "q"]);
        let popular = list(&["q"]);
        let first = order_sites(&sites, &popular, &[], 5, 5);
        let second = order_sites(&sites, &popular, &[], 5, 5);
        assert_eq!(first, second);
        assert_eq!(first, list(&["q", "k", "m"]));
    }

    #[test]
    fn test_empty_present() {
        let ordered = order_sites(&present(&[]), &list(&["a"]), &list(&["b"]), 10, 10);
        assert!(ordered.is_empty());
    }
}
