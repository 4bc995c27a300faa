pub mod activity;
pub mod business;
pub mod cache;
pub mod content;
pub mod counters;
pub mod favorite;
pub mod keyword;
pub mod review;
pub mod user;
pub mod views;

use sea_orm::sea_query::LikeExpr;
use std::collections::BTreeMap;

/// Lowercased form kept in the `search_*` columns. `LIKE` in SQLite only
/// folds ASCII, so text matching runs on these instead of the raw columns.
#[must_use]
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// `LIKE` pattern matching `needle` as a literal, case-folded substring.
pub(crate) fn contains_pattern(needle: &str) -> LikeExpr {
    let folded = fold(needle);
    let mut pattern = String::with_capacity(folded.len() + 2);
    pattern.push('%');
    for c in folded.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

/// Buckets RFC3339 timestamps by their `YYYY-MM-DD` prefix.
pub(crate) fn count_by_day(timestamps: impl IntoIterator<Item = String>) -> Vec<(String, i64)> {
    let mut buckets: BTreeMap<String, i64> = BTreeMap::new();
    for ts in timestamps {
        let day = ts.get(..10).unwrap_or(&ts).to_string();
        *buckets.entry(day).or_default() += 1;
    }
    buckets.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::{count_by_day, fold};

    #[test]
    fn test_count_by_day_groups_and_sorts() {
        let rows = count_by_day(vec![
            "2026-03-02T10:00:00+00:00".to_string(),
            "2026-03-01T23:59:59+00:00".to_string(),
            "2026-03-02T01:00:00+00:00".to_string(),
        ]);
        assert_eq!(
            rows,
            vec![("2026-03-01".to_string(), 1), ("2026-03-02".to_string(), 2)]
        );
    }

    #[test]
    fn test_fold_handles_accents() {
        assert_eq!(fold("CAFÉ Éclair"), "café éclair");
    }
}
