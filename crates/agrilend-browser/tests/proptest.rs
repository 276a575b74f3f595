//! Property-based tests for the browse pipeline using proptest.

use agrilend_browser::{
    BrowseQuery, Capabilities, ColumnSpec, DateRange, Dir, Pagination, Schema, Timestamp, Value,
};
use proptest::prelude::*;

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone)]
struct Item {
    id: usize,
    name: String,
    score: Option<i64>,
    seen: Option<Timestamp>,
}

fn schema() -> Schema<Item> {
    Schema::builder()
        .column(ColumnSpec::new("id", "ID", |i: &Item| {
            Value::from(i.id as u64)
        }))
        .column(ColumnSpec::new("name", "Name", |i: &Item| {
            Value::from(&i.name)
        }))
        .column(ColumnSpec::new("score", "Score", |i: &Item| {
            Value::from(i.score)
        }))
        .column(ColumnSpec::new("seen", "Seen", |i: &Item| {
            Value::from(i.seen)
        }))
        .build()
        .unwrap()
}

// 2000-01-01 .. 2040-01-01 in milliseconds
fn millis_strategy() -> impl Strategy<Value = i64> {
    946_684_800_000i64..2_208_988_800_000i64
}

fn items_strategy() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(
        (
            "[a-zA-Z]{1,8}",
            prop::option::of(-1000i64..1000),
            prop::option::of(millis_strategy()),
        ),
        0..60,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(id, (name, score, seen))| Item {
                id,
                name,
                score,
                seen: seen.map(Timestamp::from_millis),
            })
            .collect()
    })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Search keeps exactly the records with a column containing the needle.
    #[test]
    fn search_matches_reference(items in items_strategy(), needle in "[a-zA-Z]{0,3}") {
        let schema = schema();
        let query = BrowseQuery::new().search(needle.clone());
        let got: Vec<usize> = query.filter_sorted(&items, &schema).iter().map(|i| i.id).collect();

        let lower = needle.to_lowercase();
        let expected: Vec<usize> = items
            .iter()
            .filter(|item| {
                lower.is_empty()
                    || schema.columns().iter().any(|c| {
                        c.value(*item)
                            .coerce_string()
                            .is_some_and(|s| s.to_lowercase().contains(&lower))
                    })
            })
            .map(|i| i.id)
            .collect();
        prop_assert_eq!(got, expected);
    }

    /// Records without a score come after every scored record, both ways.
    #[test]
    fn nulls_sort_last(items in items_strategy(), asc in any::<bool>()) {
        let dir = if asc { Dir::Asc } else { Dir::Desc };
        let rows = BrowseQuery::new().sort_by("score", dir).filter_sorted(&items, &schema());
        let first_null = rows.iter().position(|i| i.score.is_none()).unwrap_or(rows.len());
        prop_assert!(rows[first_null..].iter().all(|i| i.score.is_none()));

        let scores: Vec<i64> = rows[..first_null].iter().filter_map(|i| i.score).collect();
        for pair in scores.windows(2) {
            if asc {
                prop_assert!(pair[0] <= pair[1]);
            } else {
                prop_assert!(pair[0] >= pair[1]);
            }
        }
    }

    /// Page count is ceil(n/p) with a floor of 1; the last page holds the rest.
    #[test]
    fn pagination_invariant(n in 0usize..200, p in 1usize..25) {
        let pagination = Pagination::new(1, p);
        let count = pagination.page_count(n);
        prop_assert_eq!(count, n.div_ceil(p).max(1));

        let rows: Vec<usize> = (0..n).collect();
        for k in 1..=count {
            let slice = Pagination::new(k, p).slice(&rows);
            prop_assert!(slice.len() <= p);
            if k == count && n > 0 {
                prop_assert_eq!(slice.len(), n - (k - 1) * p);
            }
        }
    }

    /// Concatenating every page reproduces the unpaged result.
    #[test]
    fn pages_partition_the_result(items in items_strategy(), p in 1usize..15) {
        let schema = schema();
        let all: Vec<usize> = BrowseQuery::new()
            .sort_asc("name")
            .filter_sorted(&items, &schema)
            .iter()
            .map(|i| i.id)
            .collect();

        let first = BrowseQuery::new()
            .sort_asc("name")
            .page_size(p)
            .run(&items, &schema, Capabilities::default());
        let mut paged = Vec::new();
        for k in 1..=first.info.page_count {
            let view = BrowseQuery::new()
                .sort_asc("name")
                .page_size(p)
                .page(k)
                .run(&items, &schema, Capabilities::default());
            paged.extend(view.rows.iter().map(|i| i.id));
        }
        prop_assert_eq!(paged, all);
    }

    /// A range filter keeps exactly the dated records inside the widened bounds.
    #[test]
    fn date_range_matches_reference(
        items in items_strategy(),
        a in millis_strategy(),
        b in millis_strategy(),
    ) {
        let (from, to) = (Timestamp::from_millis(a.min(b)), Timestamp::from_millis(a.max(b)));
        let range = DateRange::new(Some(from), Some(to));
        let got: Vec<usize> = BrowseQuery::new()
            .filter("seen", range)
            .filter_sorted(&items, &schema())
            .iter()
            .map(|i| i.id)
            .collect();
        let expected: Vec<usize> = items
            .iter()
            .filter(|i| {
                i.seen.is_some_and(|s| s >= from.start_of_day() && s <= to.end_of_day())
            })
            .map(|i| i.id)
            .collect();
        prop_assert_eq!(got, expected);
    }

    /// Filtering never grows the collection.
    #[test]
    fn filter_never_grows(items in items_strategy(), needle in "[a-z]{0,2}") {
        let query = BrowseQuery::new().search(needle).filter("score", "0");
        prop_assert!(query.count(&items, &schema()) <= items.len());
    }
}
