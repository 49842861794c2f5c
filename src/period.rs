//! Identity keys (a calendar date or an ISO week) and the time windows they cover.

use crate::error::{DevLogError, Result};
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc, Weekday,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Whether a report covers a single day or an ISO week
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    #[default]
    Daily,
    Weekly,
}

impl ReportMode {
    /// Directory under `DevLog/` holding reports of this mode
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Daily => "Daily DevLog",
            Self::Weekly => "Weekly DevLog",
        }
    }
}

/// Identity key addressing one metrics/report pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKey {
    Daily(NaiveDate),
    Weekly { year: i32, week: u32 },
}

impl ReportKey {
    /// Parse either `YYYY-MM-DD` or `YYYY-Www`
    pub fn parse(label: &str) -> Result<Self> {
        let label = label.trim();
        if label.contains('W') {
            Self::parse_week(label)
        } else {
            Self::parse_date(label)
        }
    }

    pub fn parse_date(label: &str) -> Result<Self> {
        NaiveDate::parse_from_str(label.trim(), "%Y-%m-%d")
            .map(Self::Daily)
            .map_err(|_| DevLogError::InvalidPeriod(format!("expected YYYY-MM-DD, got '{}'", label)))
    }

    pub fn parse_week(label: &str) -> Result<Self> {
        let invalid = || DevLogError::InvalidPeriod(format!("expected YYYY-Www, got '{}'", label));

        let (year, week) = label.trim().split_once("-W").ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let week: u32 = week.parse().map_err(|_| invalid())?;

        // Rejects week 0 and week 53 in years that only have 52
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(invalid)?;

        Ok(Self::Weekly { year, week })
    }

    pub fn mode(&self) -> ReportMode {
        match self {
            Self::Daily(_) => ReportMode::Daily,
            Self::Weekly { .. } => ReportMode::Weekly,
        }
    }

    /// First and last calendar day covered by this key
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        match *self {
            Self::Daily(date) => (date, date),
            Self::Weekly { year, week } => {
                // Validated on construction
                let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
                    .unwrap_or(NaiveDate::MIN);
                (monday, monday + Duration::days(6))
            }
        }
    }

    /// Inclusive time window covered by this key in the given offset
    pub fn window(&self, offset: FixedOffset) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
        let (first, last) = self.date_range();
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        (
            local_datetime(offset, first.and_time(NaiveTime::MIN)),
            local_datetime(offset, last.and_time(end_of_day)),
        )
    }

    /// Meeting note key a daily report links to by default (the previous day)
    pub fn default_meeting_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Daily(date) => date.pred_opt(),
            Self::Weekly { .. } => None,
        }
    }

    /// `<docs_root>/DevLog/Metrics/<key>.json`
    pub fn metrics_path(&self, docs_root: &Path) -> PathBuf {
        docs_root
            .join("DevLog")
            .join("Metrics")
            .join(format!("{}.json", self))
    }

    /// Older layouts stored the snapshot next to the Markdown file
    pub fn legacy_metrics_path(&self, docs_root: &Path) -> PathBuf {
        docs_root
            .join("DevLog")
            .join(self.mode().dir_name())
            .join(format!("{}.metrics.json", self))
    }

    /// `<docs_root>/DevLog/{Daily,Weekly}/<key>.md`
    pub fn report_path(&self, docs_root: &Path) -> PathBuf {
        docs_root
            .join("DevLog")
            .join(self.mode().dir_name())
            .join(format!("{}.md", self))
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Weekly { year, week } => write!(f, "{}-W{:02}", year, week),
        }
    }
}

/// Fixed offset for a whole number of hours, clamped to the valid range
pub fn offset_hours(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours.clamp(-14, 14) * 3600).unwrap_or_else(|| Utc.fix())
}

fn local_datetime(offset: FixedOffset, naive: chrono::NaiveDateTime) -> DateTime<FixedOffset> {
    offset
        .from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| offset.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_daily_key() {
        let key = ReportKey::parse("2025-11-12").unwrap();
        assert_eq!(key.mode(), ReportMode::Daily);
        assert_eq!(key.to_string(), "2025-11-12");
    }

    #[test]
    fn test_parse_weekly_key() {
        let key = ReportKey::parse("2025-W46").unwrap();
        assert_eq!(key, ReportKey::Weekly { year: 2025, week: 46 });
        assert_eq!(key.to_string(), "2025-W46");

        let (monday, sunday) = key.date_range();
        assert_eq!(monday, NaiveDate::from_ymd_opt(2025, 11, 10).unwrap());
        assert_eq!(sunday, NaiveDate::from_ymd_opt(2025, 11, 16).unwrap());
    }

    #[test]
    fn test_parse_invalid_keys() {
        assert!(ReportKey::parse("2025-13-01").is_err());
        assert!(ReportKey::parse("2025-W00").is_err());
        assert!(ReportKey::parse("2025-W54").is_err());
        assert!(ReportKey::parse("yesterday").is_err());
        assert!(ReportKey::parse("").is_err());
    }

    #[test]
    fn test_daily_window_bounds() {
        let key = ReportKey::parse("2025-11-12").unwrap();
        let (since, until) = key.window(offset_hours(9));
        assert_eq!(since.to_rfc3339(), "2025-11-12T00:00:00+09:00");
        assert_eq!(until.to_rfc3339(), "2025-11-12T23:59:59+09:00");
    }

    #[test]
    fn test_paths() {
        let root = Path::new("Documents");
        let key = ReportKey::parse("2025-W46").unwrap();
        assert_eq!(
            key.metrics_path(root),
            PathBuf::from("Documents/DevLog/Metrics/2025-W46.json")
        );
        assert_eq!(
            key.legacy_metrics_path(root),
            PathBuf::from("Documents/DevLog/Weekly/2025-W46.metrics.json")
        );
        assert_eq!(
            key.report_path(root),
            PathBuf::from("Documents/DevLog/Weekly/2025-W46.md")
        );
    }

    #[test]
    fn test_default_meeting_date() {
        let key = ReportKey::parse("2025-11-01").unwrap();
        assert_eq!(
            key.default_meeting_date(),
            Some(NaiveDate::from_ymd_opt(2025, 10, 31).unwrap())
        );
        assert_eq!(ReportKey::parse("2025-W46").unwrap().default_meeting_date(), None);
    }
}
