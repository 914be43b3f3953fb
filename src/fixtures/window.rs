//! Date helpers for fixture windows.

use chrono::{Datelike, Duration, NaiveDate};

/// Parse a strict `YYYY-MM-DD` date.  Anything else (other separators,
/// missing zero padding, impossible dates) is rejected.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Split `[start, end]` into consecutive inclusive spans of at most
/// `max_days` days each.  An inverted range yields nothing.
pub fn chunk_range(start: NaiveDate, end: NaiveDate, max_days: u32) -> Vec<(NaiveDate, NaiveDate)> {
    let step = Duration::days(i64::from(max_days.max(1)));
    let mut chunks = Vec::new();
    let mut from = start;
    while from <= end {
        let to = (from + step - Duration::days(1)).min(end);
        chunks.push((from, to));
        from = to + Duration::days(1);
    }
    chunks
}

/// `today+1 ..= today+days`.
pub fn rolling_window(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    (
        today + Duration::days(1),
        today + Duration::days(i64::from(days.max(1))),
    )
}

/// First and last day of `today`'s month.
pub fn month_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = today.with_day(1).unwrap_or(today);
    let next_month = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
    };
    let last = next_month
        .map(|d| d - Duration::days(1))
        .unwrap_or(today);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn twenty_five_days_make_three_chunks() {
        let chunks = chunk_range(d("2025-01-01"), d("2025-01-25"), 10);
        assert_eq!(
            chunks,
            vec![
                (d("2025-01-01"), d("2025-01-10")),
                (d("2025-01-11"), d("2025-01-20")),
                (d("2025-01-21"), d("2025-01-25")),
            ]
        );
    }

    #[test]
    fn single_day_is_one_chunk() {
        let chunks = chunk_range(d("2025-03-05"), d("2025-03-05"), 10);
        assert_eq!(chunks, vec![(d("2025-03-05"), d("2025-03-05"))]);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let chunks = chunk_range(d("2025-01-01"), d("2025-01-20"), 10);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].1, d("2025-01-20"));
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(chunk_range(d("2025-01-10"), d("2025-01-01"), 10).is_empty());
    }

    #[test]
    fn chunks_cross_month_boundaries() {
        let chunks = chunk_range(d("2025-02-25"), d("2025-03-06"), 10);
        assert_eq!(chunks, vec![(d("2025-02-25"), d("2025-03-06"))]);
    }

    #[test]
    fn strict_date_parsing() {
        assert_eq!(parse_date("2025-03-05"), Some(d("2025-03-05")));
        assert_eq!(parse_date("2025-3-5"), None);
        assert_eq!(parse_date("2025/03/05"), None);
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date("tomorrow"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn rolling_window_starts_tomorrow() {
        assert_eq!(
            rolling_window(d("2025-01-31"), 31),
            (d("2025-02-01"), d("2025-03-03"))
        );
    }

    #[test]
    fn month_window_handles_december_and_february() {
        assert_eq!(month_window(d("2025-12-15")), (d("2025-12-01"), d("2025-12-31")));
        assert_eq!(month_window(d("2024-02-10")), (d("2024-02-01"), d("2024-02-29")));
    }
}
