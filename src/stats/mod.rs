/// Statistics over timed entries
///
/// Pure functions over a slice of entries already scoped to one
/// account: averages, personal records, period filtering, and date or
/// month grouping. No I/O and no clock access; callers pass the
/// current date in, so everything here is safe to run on any thread
/// over an immutable snapshot.
use crate::entries::{Entry, EntryKind};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A relative time window for scoping statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    /// Last 7 days, inclusive of the cutoff day
    #[serde(rename = "7d")]
    Week,
    /// Last 30 days, inclusive of the cutoff day
    #[serde(rename = "30d")]
    Month,
    /// No filtering
    #[serde(rename = "all")]
    All,
}

impl Period {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "7d" => Some(Period::Week),
            "30d" => Some(Period::Month),
            "all" => Some(Period::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "7d",
            Period::Month => "30d",
            Period::All => "all",
        }
    }

    fn days(&self) -> Option<i64> {
        match self {
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::All => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entries of one calendar date, split by kind
#[derive(Debug, Clone, Serialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub sprints: Vec<Entry>,
    pub blocks: Vec<Entry>,
}

/// Entries of one calendar month (`YYYY-MM`), split by kind
#[derive(Debug, Clone, Serialize)]
pub struct MonthGroup {
    pub month: String,
    pub sprints: Vec<Entry>,
    pub blocks: Vec<Entry>,
}

/// Arithmetic mean of durations, `None` on empty input
pub fn average(entries: &[Entry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    let sum: f64 = entries.iter().map(|e| e.duration_secs).sum();
    Some(sum / entries.len() as f64)
}

/// The minimum-duration entry, `None` on empty input
///
/// Ties go to the earliest entry in the given order: the comparison is
/// strict, so a later equal duration never displaces the current best.
pub fn personal_record(entries: &[Entry]) -> Option<&Entry> {
    let mut best: Option<&Entry> = None;
    for entry in entries {
        match best {
            Some(current) if entry.duration_secs < current.duration_secs => best = Some(entry),
            None => best = Some(entry),
            _ => {}
        }
    }
    best
}

/// Keep entries dated within the period, measured from `today` at day
/// granularity. The cutoff day itself is included.
pub fn filter_by_period(entries: &[Entry], period: Period, today: NaiveDate) -> Vec<Entry> {
    match period.days() {
        None => entries.to_vec(),
        Some(days) => {
            let cutoff = today - Duration::days(days);
            entries
                .iter()
                .filter(|e| e.date >= cutoff)
                .cloned()
                .collect()
        }
    }
}

/// Partition by exact date, most recent date first
pub fn group_by_date(entries: &[Entry]) -> Vec<DateGroup> {
    let mut map: BTreeMap<NaiveDate, DateGroup> = BTreeMap::new();

    for entry in entries {
        let group = map.entry(entry.date).or_insert_with(|| DateGroup {
            date: entry.date,
            sprints: Vec::new(),
            blocks: Vec::new(),
        });
        match entry.kind {
            EntryKind::Sprint => group.sprints.push(entry.clone()),
            EntryKind::Block => group.blocks.push(entry.clone()),
        }
    }

    map.into_values().rev().collect()
}

/// Partition by calendar month, most recent month first
pub fn group_by_month(entries: &[Entry]) -> Vec<MonthGroup> {
    let mut map: BTreeMap<String, MonthGroup> = BTreeMap::new();

    for entry in entries {
        let month = format!("{:04}-{:02}", entry.date.year(), entry.date.month());
        let group = map.entry(month.clone()).or_insert_with(|| MonthGroup {
            month,
            sprints: Vec::new(),
            blocks: Vec::new(),
        });
        match entry.kind {
            EntryKind::Sprint => group.sprints.push(entry.clone()),
            EntryKind::Block => group.blocks.push(entry.clone()),
        }
    }

    map.into_values().rev().collect()
}

/// Entries of one exact date and kind: the "current logging session"
/// view while the user is entering runs.
pub fn session_entries(entries: &[Entry], date: NaiveDate, kind: EntryKind) -> Vec<Entry> {
    entries
        .iter()
        .filter(|e| e.date == date && e.kind == kind)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(kind: EntryKind, duration_secs: f64, date: &str) -> Entry {
        Entry {
            id: Uuid::new_v4().to_string(),
            account_id: "acct-1".to_string(),
            kind,
            duration_secs,
            date: date.parse().unwrap(),
            location: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_empty_is_none() {
        assert_eq!(average(&[]), None);
    }

    #[test]
    fn test_average_of_two() {
        let entries = vec![
            entry(EntryKind::Sprint, 10.0, "2024-06-15"),
            entry(EntryKind::Sprint, 20.0, "2024-06-15"),
        ];
        assert_eq!(average(&entries), Some(15.0));
    }

    #[test]
    fn test_personal_record_empty_is_none() {
        assert!(personal_record(&[]).is_none());
    }

    #[test]
    fn test_personal_record_tie_goes_to_first() {
        let entries = vec![
            entry(EntryKind::Sprint, 12.3, "2024-06-15"),
            entry(EntryKind::Sprint, 9.8, "2024-06-15"),
            entry(EntryKind::Sprint, 9.8, "2024-06-15"),
        ];
        let pr = personal_record(&entries).unwrap();
        assert_eq!(pr.duration_secs, 9.8);
        assert_eq!(pr.id, entries[1].id);
    }

    #[test]
    fn test_filter_by_period_cutoff_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let entries = vec![
            entry(EntryKind::Sprint, 10.0, "2024-06-07"),
            entry(EntryKind::Sprint, 11.0, "2024-06-08"),
            entry(EntryKind::Sprint, 12.0, "2024-06-15"),
        ];

        let kept = filter_by_period(&entries, Period::Week, today);
        let dates: Vec<String> = kept.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-06-08", "2024-06-15"]);
    }

    #[test]
    fn test_filter_by_period_thirty_days() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let entries = vec![
            entry(EntryKind::Block, 10.0, "2024-05-15"),
            entry(EntryKind::Block, 11.0, "2024-05-16"),
        ];

        let kept = filter_by_period(&entries, Period::Month, today);
        assert_eq!(kept.len(), 2);

        let entries = vec![entry(EntryKind::Block, 10.0, "2024-05-14")];
        assert!(filter_by_period(&entries, Period::Month, today).is_empty());
    }

    #[test]
    fn test_filter_by_period_all_keeps_everything() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let entries = vec![entry(EntryKind::Sprint, 10.0, "1999-01-01")];
        assert_eq!(filter_by_period(&entries, Period::All, today).len(), 1);
    }

    #[test]
    fn test_group_by_date_splits_and_orders_descending() {
        let entries = vec![
            entry(EntryKind::Sprint, 10.0, "2024-06-14"),
            entry(EntryKind::Block, 11.0, "2024-06-15"),
            entry(EntryKind::Sprint, 12.0, "2024-06-15"),
        ];

        let groups = group_by_date(&entries);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].date.to_string(), "2024-06-15");
        assert_eq!(groups[0].sprints.len(), 1);
        assert_eq!(groups[0].blocks.len(), 1);

        assert_eq!(groups[1].date.to_string(), "2024-06-14");
        assert_eq!(groups[1].sprints.len(), 1);
        assert!(groups[1].blocks.is_empty());
    }

    #[test]
    fn test_group_by_month_uses_zero_padded_keys() {
        let entries = vec![
            entry(EntryKind::Sprint, 10.0, "2024-09-30"),
            entry(EntryKind::Sprint, 11.0, "2024-10-01"),
            entry(EntryKind::Block, 12.0, "2024-10-12"),
        ];

        let groups = group_by_month(&entries);
        let months: Vec<&str> = groups.iter().map(|g| g.month.as_str()).collect();
        // Zero padding keeps lexicographic and chronological order aligned
        assert_eq!(months, vec!["2024-10", "2024-09"]);
        assert_eq!(groups[0].sprints.len(), 1);
        assert_eq!(groups[0].blocks.len(), 1);
    }

    #[test]
    fn test_session_entries_matches_exact_date_and_kind() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let entries = vec![
            entry(EntryKind::Sprint, 10.0, "2024-06-15"),
            entry(EntryKind::Block, 11.0, "2024-06-15"),
            entry(EntryKind::Sprint, 12.0, "2024-06-14"),
        ];

        let session = session_entries(&entries, date, EntryKind::Sprint);
        assert_eq!(session.len(), 1);
        assert_eq!(session[0].duration_secs, 10.0);
    }

    #[test]
    fn test_period_parse_and_format() {
        assert_eq!(Period::parse("7d"), Some(Period::Week));
        assert_eq!(Period::parse("30d"), Some(Period::Month));
        assert_eq!(Period::parse("all"), Some(Period::All));
        assert_eq!(Period::parse("90d"), None);
        assert_eq!(Period::Week.as_str(), "7d");
    }
}
