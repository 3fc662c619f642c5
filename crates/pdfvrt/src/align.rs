use crate::opts::PageFilter;

/// Page indexes to compare, in increasing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub pairs: Vec<usize>,
    pub page_count_mismatch: bool,
}

/// Pair pages by index over the baseline's page range.
///
/// A page listed in `skip_page_indexes` is never compared, even when it is
/// also listed in `only_page_indexes`.
pub fn align(
    baseline_pages: usize,
    actual_pages: usize,
    filter: &PageFilter,
    match_page_count: bool,
) -> Alignment {
    let pairs = (0..baseline_pages)
        .filter(|i| !filter.skip_page_indexes.contains(i))
        .filter(|i| filter.only_page_indexes.is_empty() || filter.only_page_indexes.contains(i))
        .collect();

    Alignment {
        pairs,
        page_count_mismatch: match_page_count && baseline_pages != actual_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(only: &[usize], skip: &[usize]) -> PageFilter {
        PageFilter {
            only_page_indexes: only.to_vec(),
            skip_page_indexes: skip.to_vec(),
        }
    }

    #[test]
    fn no_filter_pairs_every_baseline_page() {
        let a = align(3, 3, &PageFilter::default(), true);
        assert_eq!(a.pairs, [0, 1, 2]);
        assert!(!a.page_count_mismatch);
    }

    #[test]
    fn skip_removes_pages() {
        assert_eq!(align(4, 4, &filter(&[], &[1, 3]), true).pairs, [0, 2]);
    }

    #[test]
    fn only_restricts_pages() {
        assert_eq!(align(4, 4, &filter(&[2, 0], &[]), true).pairs, [0, 2]);
    }

    #[test]
    fn skip_wins_over_only() {
        assert!(align(3, 3, &filter(&[1], &[1]), true).pairs.is_empty());
    }

    #[test]
    fn only_index_beyond_range_is_ignored() {
        assert_eq!(align(2, 2, &filter(&[0, 7], &[]), true).pairs, [0]);
    }

    #[test]
    fn mismatch_flag_follows_policy() {
        let strict = align(3, 2, &PageFilter::default(), true);
        assert!(strict.page_count_mismatch);
        assert_eq!(strict.pairs, [0, 1, 2]);

        let lenient = align(3, 2, &filter(&[0], &[]), false);
        assert!(!lenient.page_count_mismatch);
        assert_eq!(lenient.pairs, [0]);
    }

    #[test]
    fn empty_baseline_has_no_pairs() {
        assert!(align(0, 5, &PageFilter::default(), false).pairs.is_empty());
    }
}
