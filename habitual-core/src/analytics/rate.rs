//! Completion rate over a trailing window.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::date::CalendarDay;

/// Trailing windows offered by the analytics views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RateWindow {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl RateWindow {
    /// Number of days covered by the window.
    pub fn days(&self) -> i64 {
        match self {
            RateWindow::Week => 7,
            RateWindow::Month => 30,
            RateWindow::Quarter => 90,
            RateWindow::Year => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RateWindow::Week => "7d",
            RateWindow::Month => "30d",
            RateWindow::Quarter => "90d",
            RateWindow::Year => "1y",
        }
    }
}

impl std::fmt::Display for RateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RateWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(RateWindow::Week),
            "30d" => Ok(RateWindow::Month),
            "90d" => Ok(RateWindow::Quarter),
            "1y" | "365d" => Ok(RateWindow::Year),
            _ => Err(format!(
                "unknown rate window: {} (expected 7d, 30d, 90d or 1y)",
                s
            )),
        }
    }
}

/// Percentage (0-100) of the `window_size_days` days ending at `reference_day`
/// that have at least one completion.
///
/// Rounds half up. A non-positive window yields 0.
pub fn completion_rate(days: &[CalendarDay], window_size_days: i64, reference_day: CalendarDay) -> u8 {
    if window_size_days <= 0 {
        return 0;
    }

    let window_start = reference_day.add_days(-(window_size_days - 1));
    let completed = days
        .iter()
        .filter(|d| **d >= window_start && **d <= reference_day)
        .collect::<HashSet<_>>()
        .len() as i128;

    // round-half-up on integers: floor((2 * 100 * c + w) / (2 * w))
    let window = window_size_days as i128;
    let rate = (200 * completed + window) / (2 * window);
    rate.clamp(0, 100) as u8
}
