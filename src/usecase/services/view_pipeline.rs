//! Derives the displayed slice of a grid: match, sort, paginate.
//!
//! Everything here is a pure function of its inputs. The snapshot is only read.

use std::cmp::Ordering;

use crate::domain::entities::grid::{GridSnapshot, Row};
use crate::domain::entities::query::{
    FilterSpec, PageSpec, SearchSpec, SortDirection, SortSpec, ViewResult, ViewRow,
};

pub fn compute_view(
    snapshot: &GridSnapshot,
    search: &SearchSpec,
    filters: &FilterSpec,
    sort: Option<&SortSpec>,
    page: &PageSpec,
) -> ViewResult {
    let mut matched = matching_rows(snapshot, search, filters);

    if let Some(sort) = sort {
        if snapshot.has_column(&sort.column) {
            sort_matches(snapshot, &mut matched, sort);
        }
    }

    let total_matches = matched.len();
    let (start, end) = page.bounds();
    let rows = matched
        .into_iter()
        .skip(start)
        .take(end - start)
        .filter_map(|original_index| {
            snapshot.row_values(original_index).map(|values| ViewRow {
                original_index,
                values,
            })
        })
        .collect();

    ViewResult {
        rows,
        total_matches,
    }
}

/// Original indices of rows passing search and filters, in grid order.
pub fn matching_rows(
    snapshot: &GridSnapshot,
    search: &SearchSpec,
    filters: &FilterSpec,
) -> Vec<usize> {
    let needle = search.text.to_lowercase();
    let patterns: Vec<(&str, String)> = filters
        .active()
        .map(|(column, pattern)| (column, pattern.to_lowercase()))
        .collect();

    snapshot
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row_matches_search(row, &needle) && row_matches_filters(row, &patterns))
        .map(|(idx, _)| idx)
        .collect()
}

fn row_matches_search(row: &Row, needle: &str) -> bool {
    needle.is_empty() || row.values().any(|value| value.to_lowercase().contains(needle))
}

// A pattern on a column the row lacks cannot be satisfied.
fn row_matches_filters(row: &Row, patterns: &[(&str, String)]) -> bool {
    patterns.iter().all(|(column, pattern)| {
        row.get(column)
            .is_some_and(|value| value.to_lowercase().contains(pattern.as_str()))
    })
}

fn sort_matches(snapshot: &GridSnapshot, matched: &mut Vec<usize>, sort: &SortSpec) {
    let key = |idx: usize| snapshot.cell(idx, &sort.column).unwrap_or("");
    let direction = sort.direction;
    stable_sort_by(matched, |a, b| {
        let ordering = compare_cells(key(*a), key(*b));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Numeric when both sides parse as floats, otherwise case-insensitive text order.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

// Only finite values count as numbers; "nan" and "inf" sort as text.
fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Bottom-up merge sort. Equal elements keep their relative order.
///
/// `compare_cells` mixes numeric and text ordering, so it is not a total order
/// over arbitrary columns; `slice::sort_by` is allowed to panic on such
/// comparators, this never does.
fn stable_sort_by<T: Copy, F>(items: &mut Vec<T>, mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len < 2 {
        return;
    }

    let mut src = items.clone();
    let mut dst = Vec::with_capacity(len);
    let mut width = 1;
    while width < len {
        dst.clear();
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right) = (start, mid);
            while left < mid && right < end {
                // Take from the right run only when strictly smaller.
                if compare(&src[right], &src[left]) == Ordering::Less {
                    dst.push(src[right]);
                    right += 1;
                } else {
                    dst.push(src[left]);
                    left += 1;
                }
            }
            dst.extend_from_slice(&src[left..mid]);
            dst.extend_from_slice(&src[right..end]);
            start = end;
        }
        std::mem::swap(&mut src, &mut dst);
        width *= 2;
    }
    *items = src;
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::usecase::services::grid_store::GridStore;
    use crate::usecase::services::history::HistoryCapacity;

    fn grid(columns: &[&str], rows: &[&[&str]]) -> GridStore {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .map(|values| Row::from_values(&columns, values))
            .collect();
        GridStore::with_data(columns, rows, HistoryCapacity::Unbounded).expect("valid grid")
    }

    fn all_rows() -> PageSpec {
        PageSpec::first(NonZeroUsize::new(1000).expect("non-zero"))
    }

    fn column_values(view: &ViewResult, col_idx: usize) -> Vec<String> {
        view.rows.iter().map(|row| row.values[col_idx].clone()).collect()
    }

    #[test]
    fn numeric_values_sort_numerically() {
        let store = grid(&["N"], &[&["10"], &["2"], &["30"]]);

        let view = compute_view(
            store.snapshot(),
            &SearchSpec::default(),
            &FilterSpec::default(),
            Some(&SortSpec::asc("N")),
            &all_rows(),
        );

        assert_eq!(column_values(&view, 0), vec!["2", "10", "30"]);
        assert_eq!(view.original_indices(), vec![1, 0, 2]);
    }

    #[test]
    fn non_finite_spellings_are_text_not_numbers() {
        assert_eq!(parse_number(" 1e3 "), Some(1000.0));
        assert_eq!(parse_number("-0.5"), Some(-0.5));
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-Infinity"), None);

        assert_eq!(compare_cells("inf", "5"), Ordering::Greater);
        assert_eq!(compare_cells("10", "9"), Ordering::Greater);
    }

    #[test]
    fn text_values_sort_case_insensitively() {
        let store = grid(&["T"], &[&["banana"], &["Apple"], &["cherry"]]);

        let view = compute_view(
            store.snapshot(),
            &SearchSpec::default(),
            &FilterSpec::default(),
            Some(&SortSpec::desc("T")),
            &all_rows(),
        );

        assert_eq!(column_values(&view, 0), vec!["cherry", "banana", "Apple"]);
    }

    #[test]
    fn sort_is_stable_for_duplicate_keys_in_both_directions() {
        let store = grid(
            &["K", "Id"],
            &[&["b", "1"], &["a", "2"], &["b", "3"], &["a", "4"], &["B", "5"]],
        );
        let run = |sort: SortSpec| {
            compute_view(
                store.snapshot(),
                &SearchSpec::default(),
                &FilterSpec::default(),
                Some(&sort),
                &all_rows(),
            )
        };

        let asc = run(SortSpec::asc("K"));
        assert_eq!(column_values(&asc, 1), vec!["2", "4", "1", "3", "5"]);
        assert_eq!(asc, run(SortSpec::asc("K")));

        let desc = run(SortSpec::desc("K"));
        assert_eq!(column_values(&desc, 1), vec!["1", "3", "5", "2", "4"]);
    }

    #[test]
    fn mixed_column_sort_does_not_panic() {
        let store = grid(
            &["M"],
            &[&["2"], &["10"], &["1a"], &["x"], &[""], &["NaN"], &["-3.5"], &["1e2"]],
        );

        let view = compute_view(
            store.snapshot(),
            &SearchSpec::default(),
            &FilterSpec::default(),
            Some(&SortSpec::asc("M")),
            &all_rows(),
        );

        assert_eq!(view.rows.len(), 8);
        assert_eq!(view.total_matches, 8);
    }

    #[test]
    fn unknown_sort_column_keeps_original_order() {
        let store = grid(&["A"], &[&["b"], &["a"]]);

        let view = compute_view(
            store.snapshot(),
            &SearchSpec::default(),
            &FilterSpec::default(),
            Some(&SortSpec::asc("missing")),
            &all_rows(),
        );

        assert_eq!(view.original_indices(), vec![0, 1]);
    }

    #[test]
    fn search_matches_any_cell_case_insensitively() {
        let store = grid(
            &["Name", "Status"],
            &[&["ABC corp", "open"], &["xyz", "closed"], &["other", "AbCd"]],
        );

        let view = compute_view(
            store.snapshot(),
            &SearchSpec::new("abc"),
            &FilterSpec::default(),
            None,
            &all_rows(),
        );

        assert_eq!(view.original_indices(), vec![0, 2]);
        assert_eq!(view.total_matches, 2);
    }

    #[test]
    fn search_and_filters_compose_as_intersection() {
        let store = grid(
            &["Name", "Status"],
            &[
                &["abc one", "open"],
                &["abc two", "closed"],
                &["zzz", "Open"],
                &["ABC three", "reopened"],
                &["none", "pending"],
            ],
        );
        let snapshot = store.snapshot();
        let search = SearchSpec::new("abc");
        let filters = FilterSpec::new().with("Status", "open");

        let both = matching_rows(snapshot, &search, &filters);
        let search_only = matching_rows(snapshot, &search, &FilterSpec::default());
        let filter_only = matching_rows(snapshot, &SearchSpec::default(), &filters);
        let intersection: Vec<usize> = search_only
            .iter()
            .copied()
            .filter(|idx| filter_only.contains(idx))
            .collect();

        assert_eq!(both, intersection);
        assert_eq!(both, vec![0, 3]);
    }

    #[test]
    fn empty_filter_patterns_are_ignored_and_unknown_columns_match_nothing() {
        let store = grid(&["A"], &[&["1"], &["2"]]);

        let blank = FilterSpec::new().with("A", "");
        let unknown = FilterSpec::new().with("Nope", "1");

        assert_eq!(
            matching_rows(store.snapshot(), &SearchSpec::default(), &blank),
            vec![0, 1]
        );
        assert!(matching_rows(store.snapshot(), &SearchSpec::default(), &unknown).is_empty());
    }

    #[test]
    fn pagination_slices_matches_and_tolerates_out_of_range_pages() {
        let store = grid(&["A"], &[&["1"], &["2"], &["3"], &["4"], &["5"]]);
        let size = NonZeroUsize::new(2).expect("non-zero");
        let page = |page: usize| {
            compute_view(
                store.snapshot(),
                &SearchSpec::default(),
                &FilterSpec::default(),
                None,
                &PageSpec::new(page, size),
            )
        };

        assert_eq!(page(1).original_indices(), vec![0, 1]);
        assert_eq!(page(3).rows.len(), 1);
        assert_eq!(page(3).total_matches, 5);
        assert!(page(4).rows.is_empty());
        assert_eq!(page(4).total_matches, 5);
        assert_eq!(page(0), page(1));
        assert_eq!(page(3).page_count(size), 3);
    }

    #[test]
    fn compute_view_is_referentially_transparent() {
        let store = grid(&["A", "B"], &[&["3", "x"], &["1", "y"], &["2", "x"]]);
        let snapshot = store.snapshot().clone();
        let filters = FilterSpec::new().with("B", "x");
        let sort = SortSpec::asc("A");
        let page = all_rows();

        let first = compute_view(&snapshot, &SearchSpec::default(), &filters, Some(&sort), &page);
        let second = compute_view(&snapshot, &SearchSpec::default(), &filters, Some(&sort), &page);

        assert_eq!(first, second);
        assert_eq!(first.original_indices(), vec![2, 0]);
        assert_eq!(**store.snapshot(), *snapshot);
    }
}
