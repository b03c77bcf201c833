use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};

/// Aggregation window selectable by callers. Defaults to `Month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TimeRange {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

/// How a window's bounds are derived from its anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Granularity {
    Day,
    /// ISO-8601 week, Monday through Sunday.
    IsoWeek,
    Month,
    Year,
}

pub(crate) struct WindowRule {
    pub(crate) range: TimeRange,
    pub(crate) name: &'static str,
    pub(crate) granularity: Granularity,
    /// strftime pattern used to label a window.
    pub(crate) label_format: &'static str,
}

pub(crate) static WINDOW_RULES: [WindowRule; 4] = [
    WindowRule {
        range: TimeRange::Day,
        name: "day",
        granularity: Granularity::Day,
        label_format: "%Y-%m-%d",
    },
    WindowRule {
        range: TimeRange::Week,
        name: "week",
        granularity: Granularity::IsoWeek,
        label_format: "%G-W%V",
    },
    WindowRule {
        range: TimeRange::Month,
        name: "month",
        granularity: Granularity::Month,
        label_format: "%Y-%m",
    },
    WindowRule {
        range: TimeRange::Year,
        name: "year",
        granularity: Granularity::Year,
        label_format: "%Y",
    },
];

impl TimeRange {
    pub(crate) fn rule(self) -> &'static WindowRule {
        let idx = match self {
            Self::Day => 0,
            Self::Week => 1,
            Self::Month => 2,
            Self::Year => 3,
        };
        &WINDOW_RULES[idx]
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.rule().name
    }

    pub(crate) fn parse(s: &str) -> LedgerResult<Self> {
        let wanted = s.trim().to_lowercase();
        WINDOW_RULES
            .iter()
            .find(|r| r.name == wanted)
            .map(|r| r.range)
            .ok_or_else(|| {
                LedgerError::invalid_input(format!(
                    "time range must be one of day, week, month, year; got '{s}'"
                ))
            })
    }

    /// Parses an optional request parameter, falling back to the default.
    pub(crate) fn from_param(param: Option<&str>) -> LedgerResult<Self> {
        match param {
            Some(s) => Self::parse(s),
            None => Ok(Self::default()),
        }
    }

    /// The window of this range containing `anchor`.
    pub(crate) fn window(self, anchor: NaiveDate) -> LedgerResult<DateWindow> {
        let rule = self.rule();
        let (start, end) = rule.granularity.bounds(anchor).ok_or_else(|| {
            LedgerError::invalid_input(format!("no {} window around {anchor}", rule.name))
        })?;
        Ok(DateWindow {
            range: self,
            start,
            end,
            label: start.format(rule.label_format).to_string(),
        })
    }

    /// The `count` windows ending with the one containing `anchor`, oldest first.
    pub(crate) fn trailing_windows(self, anchor: NaiveDate, count: usize) -> LedgerResult<Vec<DateWindow>> {
        let mut windows = Vec::new();
        let mut cursor = anchor;
        for _ in 0..count {
            let window = self.window(cursor)?;
            cursor = window.start.pred_opt().ok_or_else(|| {
                LedgerError::invalid_input(format!("no window before {}", window.start))
            })?;
            windows.push(window);
        }
        windows.reverse();
        Ok(windows)
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Granularity {
    fn bounds(self, anchor: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::Day => Some((anchor, anchor)),
            Self::IsoWeek => {
                let start = anchor.checked_sub_days(Days::new(
                    u64::from(anchor.weekday().num_days_from_monday()),
                ))?;
                Some((start, start.checked_add_days(Days::new(6))?))
            }
            Self::Month => {
                let start = anchor.with_day(1)?;
                let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
                Some((start, end))
            }
            Self::Year => Some((
                NaiveDate::from_ymd_opt(anchor.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(anchor.year(), 12, 31)?,
            )),
        }
    }
}

/// An inclusive calendar-date span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DateWindow {
    pub(crate) range: TimeRange,
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
    pub(crate) label: String,
}
