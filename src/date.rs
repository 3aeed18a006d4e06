//! Best-effort calendar date extraction from filename stems.
//!
//! Patterns are tried in a fixed priority order and the first one that
//! produces a valid calendar date wins.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

/// Separators accepted between numeric groups: dots, hyphens and spaces, mixed.
const SEPARATOR: &str = r"[.\- ]+";

/// Two-digit years below this map to `20YY`, the rest to `19YY`.
const SHORT_YEAR_PIVOT: i32 = 50;

/// Order of the date fields in a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrder {
    YearMonthDay,
    DayMonthYear,
}

/// Number of digits used for the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearWidth {
    Full,
    Short,
}

/// Describes one date pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePattern {
    pub order: FieldOrder,
    pub year: YearWidth,
    /// Groups separated by dots, hyphens or spaces instead of written together.
    pub separated: bool,
    /// Date must be enclosed in parentheses.
    pub parenthesized: bool,
}

/// All date patterns in priority order.
pub const DATE_PATTERNS: [DatePattern; 11] = [
    DatePattern::separated(FieldOrder::YearMonthDay, YearWidth::Full),
    DatePattern::separated(FieldOrder::DayMonthYear, YearWidth::Full),
    DatePattern::separated(FieldOrder::YearMonthDay, YearWidth::Short),
    DatePattern::separated(FieldOrder::DayMonthYear, YearWidth::Short),
    DatePattern::compact(FieldOrder::YearMonthDay, YearWidth::Full),
    DatePattern::compact(FieldOrder::DayMonthYear, YearWidth::Full),
    DatePattern::compact(FieldOrder::DayMonthYear, YearWidth::Short),
    DatePattern::separated(FieldOrder::YearMonthDay, YearWidth::Full).in_parentheses(),
    DatePattern::separated(FieldOrder::DayMonthYear, YearWidth::Full).in_parentheses(),
    DatePattern::separated(FieldOrder::YearMonthDay, YearWidth::Short).in_parentheses(),
    DatePattern::separated(FieldOrder::DayMonthYear, YearWidth::Short).in_parentheses(),
];

// Compiled once on first use, in the same order as `DATE_PATTERNS`.
static COMPILED_PATTERNS: LazyLock<Vec<(DatePattern, Regex)>> = LazyLock::new(|| {
    DATE_PATTERNS
        .iter()
        .map(|pattern| {
            let regex = Regex::new(&pattern.regex_string())
                .unwrap_or_else(|error| panic!("Failed to create regex pattern for {pattern}: {error}"));
            (*pattern, regex)
        })
        .collect()
});

impl DatePattern {
    #[must_use]
    pub const fn separated(order: FieldOrder, year: YearWidth) -> Self {
        Self {
            order,
            year,
            separated: true,
            parenthesized: false,
        }
    }

    #[must_use]
    pub const fn compact(order: FieldOrder, year: YearWidth) -> Self {
        Self {
            order,
            year,
            separated: false,
            parenthesized: false,
        }
    }

    #[must_use]
    pub const fn in_parentheses(self) -> Self {
        Self {
            parenthesized: true,
            ..self
        }
    }

    /// Build the regex source for this pattern.
    ///
    /// Bare patterns require a string boundary or a non-digit on both sides
    /// so that digits inside longer numbers are never picked up.
    #[must_use]
    pub fn regex_string(&self) -> String {
        let year = match self.year {
            YearWidth::Full => r"(?P<year>[0-9]{4})",
            YearWidth::Short => r"(?P<year>[0-9]{2})",
        };
        let month = r"(?P<month>[0-9]{2})";
        let day = r"(?P<day>[0-9]{2})";
        let separator = if self.separated { SEPARATOR } else { "" };

        let body = match self.order {
            FieldOrder::YearMonthDay => format!("{year}{separator}{month}{separator}{day}"),
            FieldOrder::DayMonthYear => format!("{day}{separator}{month}{separator}{year}"),
        };

        if self.parenthesized {
            format!(r"\({body}\)")
        } else {
            format!("(?:^|[^0-9]){body}(?:[^0-9]|$)")
        }
    }

    /// Try to read a valid date from the first occurrence of this pattern.
    fn parse(&self, regex: &Regex, stem: &str) -> Option<NaiveDate> {
        let captures = regex.captures(stem)?;
        date_from_captures(&captures, self.year)
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = match self.year {
            YearWidth::Full => "YYYY",
            YearWidth::Short => "YY",
        };
        let separator = if self.separated { "-" } else { "" };
        let body = match self.order {
            FieldOrder::YearMonthDay => format!("{year}{separator}MM{separator}DD"),
            FieldOrder::DayMonthYear => format!("DD{separator}MM{separator}{year}"),
        };
        if self.parenthesized {
            write!(f, "({body})")
        } else {
            write!(f, "{body}")
        }
    }
}

/// Extract a date from a filename stem.
///
/// Returns `None` when no pattern yields a valid calendar date.
///
/// ```rust
/// use chrono::NaiveDate;
/// use subber::date::extract_date;
///
/// assert_eq!(extract_date("video_2024-01-24_test"), NaiveDate::from_ymd_opt(2024, 1, 24));
/// assert_eq!(extract_date("Movie (24.01.2024)"), NaiveDate::from_ymd_opt(2024, 1, 24));
/// assert_eq!(extract_date("no_date_here"), None);
/// ```
#[must_use]
pub fn extract_date(stem: &str) -> Option<NaiveDate> {
    COMPILED_PATTERNS
        .iter()
        .find_map(|(pattern, regex)| pattern.parse(regex, stem))
}

/// Extract a date using only the given pattern.
#[cfg(test)]
fn extract_date_with(pattern: &DatePattern, stem: &str) -> Option<NaiveDate> {
    COMPILED_PATTERNS
        .iter()
        .find(|(compiled, _)| compiled == pattern)
        .and_then(|(pattern, regex)| pattern.parse(regex, stem))
}

/// Expand a two-digit year to a full year.
#[must_use]
pub const fn expand_short_year(year: i32) -> i32 {
    if year < SHORT_YEAR_PIVOT { 2000 + year } else { 1900 + year }
}

fn date_from_captures(captures: &Captures, width: YearWidth) -> Option<NaiveDate> {
    let year = captures.name("year")?.as_str().parse::<i32>().ok()?;
    let month = captures.name("month")?.as_str().parse::<u32>().ok()?;
    let day = captures.name("day")?.as_str().parse::<u32>().ok()?;

    let year = match width {
        YearWidth::Full => year,
        YearWidth::Short => expand_short_year(year),
    };

    NaiveDate::from_ymd_opt(year, month, day)
}
