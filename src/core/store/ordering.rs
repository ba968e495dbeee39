//! Field comparators and the four sort orders.

use super::{FileRecord, SortMode};
use std::cmp::Ordering;

/// Compare file names case-insensitively, with every non-alphanumeric
/// character collating as `'~'` (after letters and digits, equal to each other).
///
/// When one name is a prefix of the other, the shorter sorts first.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    fn collate(c: char) -> char {
        if c.is_alphanumeric() {
            c.to_uppercase().next().unwrap_or(c)
        } else {
            '~'
        }
    }

    a.chars().map(collate).cmp(b.chars().map(collate))
}

/// Positional substring that tolerates short or malformed values
fn slice(value: &str, start: usize, len: usize) -> &str {
    let end = (start + len).min(value.len());
    value.get(start.min(end)..end).unwrap_or("")
}

/// Compare `mm/dd/yyyy` dates by year first, then by `mm/dd`
pub fn compare_dates(a: &str, b: &str) -> Ordering {
    slice(a, 6, 4)
        .cmp(slice(b, 6, 4))
        .then_with(|| slice(a, 0, 5).cmp(slice(b, 0, 5)))
}

/// Times are `hh:mm`, so plain string order is chronological
pub fn compare_times(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Sizes are right-justified to a fixed width, so plain string order is numeric
pub fn compare_sizes(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Total order for a sort mode, including its tie-break chain
pub fn compare_records(mode: SortMode, a: &FileRecord, b: &FileRecord) -> Ordering {
    let by_name = || compare_names(&a.name, &b.name);

    match mode {
        SortMode::ByDigest => a.digest.cmp(&b.digest).then_with(by_name),
        SortMode::ByName => by_name(),
        SortMode::ByDateTime => compare_dates(&a.date, &b.date)
            .then_with(|| compare_times(&a.time, &b.time))
            .then_with(by_name),
        SortMode::BySize => compare_sizes(&a.size, &b.size).then_with(by_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_ignore_case() {
        assert_eq!(compare_names("Report.PDF", "report.pdf"), Ordering::Equal);
        assert_eq!(compare_names("alpha", "BETA"), Ordering::Less);
    }

    #[test]
    fn punctuation_sorts_after_letters_and_digits() {
        assert_eq!(compare_names("a.txt", "ab.txt"), Ordering::Greater);
        assert_eq!(compare_names("a_1", "a9"), Ordering::Greater);
        assert_eq!(compare_names("a-b", "a.b"), Ordering::Equal);
    }

    #[test]
    fn shorter_prefix_sorts_first() {
        assert_eq!(compare_names("photo", "photo1"), Ordering::Less);
        assert_eq!(compare_names("photo.jpg", "photo"), Ordering::Greater);
    }

    #[test]
    fn dates_compare_by_year_first() {
        assert_eq!(compare_dates("01/01/2024", "12/31/2023"), Ordering::Greater);
        assert_eq!(compare_dates("12/31/2023", "01/01/2024"), Ordering::Less);
        assert_eq!(compare_dates("02/01/2024", "01/15/2024"), Ordering::Greater);
        assert_eq!(compare_dates("03/03/2020", "03/03/2020"), Ordering::Equal);
    }

    #[test]
    fn malformed_dates_do_not_panic() {
        assert_eq!(compare_dates("", "01/01/2024"), Ordering::Less);
        assert_eq!(compare_dates("01/0", "01/0"), Ordering::Equal);
    }

    #[test]
    fn padded_sizes_order_numerically() {
        assert_eq!(compare_sizes("      100", "     2000"), Ordering::Less);
    }

    #[test]
    fn date_mode_breaks_ties_on_time_then_name() {
        let early = FileRecord::new("", "05/05/2022", "09:00", "1", "z");
        let late_a = FileRecord::new("", "05/05/2022", "17:30", "1", "a");
        let late_b = FileRecord::new("", "05/05/2022", "17:30", "1", "B");

        assert_eq!(compare_records(SortMode::ByDateTime, &early, &late_a), Ordering::Less);
        assert_eq!(compare_records(SortMode::ByDateTime, &late_a, &late_b), Ordering::Less);
    }
}
