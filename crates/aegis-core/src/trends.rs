//! Outage trend aggregation
//!
//! Buckets outage history by UTC calendar day of the start time.

use crate::records::{ImpactLevel, Outage};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TREND_DAYS: u32 = 7;

/// What each day's counts are keyed by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendBreakdown {
    #[default]
    Impact,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendCount {
    pub key: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendDay {
    pub date: NaiveDate,
    pub total: u32,
    pub counts: Vec<TrendCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendReport {
    pub breakdown: TrendBreakdown,
    pub keys: Vec<String>,
    pub days: Vec<TrendDay>,
}

/// Count outages per day over the `days` days ending `today`, oldest first.
///
/// Every day carries every key, starting at zero. Outages without a start
/// time or starting outside the window are skipped.
pub fn outage_trends(
    history: &[Outage],
    today: NaiveDate,
    days: u32,
    breakdown: TrendBreakdown,
) -> TrendReport {
    let keys = trend_keys(history, breakdown);
    let span = i64::from(days.max(1));
    let first = today - Duration::days(span - 1);

    let mut buckets: Vec<TrendDay> = (0..span)
        .map(|offset| TrendDay {
            date: first + Duration::days(offset),
            total: 0,
            counts: keys
                .iter()
                .map(|key| TrendCount {
                    key: key.clone(),
                    count: 0,
                })
                .collect(),
        })
        .collect();

    for outage in history {
        let Some(started) = outage.start_time else {
            continue;
        };
        let offset = (started.date_naive() - first).num_days();
        if !(0..span).contains(&offset) {
            continue;
        }
        let key = breakdown_key(outage, breakdown);
        let Some(day) = usize::try_from(offset).ok().and_then(|i| buckets.get_mut(i)) else {
            continue;
        };
        day.total += 1;
        if let Some(entry) = day.counts.iter_mut().find(|c| c.key == key) {
            entry.count += 1;
        }
    }

    TrendReport {
        breakdown,
        keys,
        days: buckets,
    }
}

fn trend_keys(history: &[Outage], breakdown: TrendBreakdown) -> Vec<String> {
    match breakdown {
        TrendBreakdown::Impact => ImpactLevel::ALL
            .iter()
            .map(|level| level.as_str().to_string())
            .collect(),
        TrendBreakdown::System => {
            let mut keys: Vec<String> = Vec::new();
            for outage in history {
                if !keys.contains(&outage.system_name) {
                    keys.push(outage.system_name.clone());
                }
            }
            keys
        }
    }
}

fn breakdown_key(outage: &Outage, breakdown: TrendBreakdown) -> &str {
    match breakdown {
        TrendBreakdown::Impact => outage.impact_level.as_str(),
        TrendBreakdown::System => &outage.system_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn outage(system: &str, level: ImpactLevel, day: u32) -> Outage {
        Outage {
            id: format!("{system}-{day}"),
            system_name: system.to_string(),
            impact_level: level,
            start_time: Utc.with_ymd_and_hms(2024, 3, day, 9, 30, 0).single(),
            eta: None,
            teams_bridge_url: None,
            description: String::new(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn test_impact_breakdown() {
        let history = vec![
            outage("db", ImpactLevel::Sev1, 7),
            outage("web", ImpactLevel::Sev1, 7),
            outage("web", ImpactLevel::Sev3, 5),
        ];
        let report = outage_trends(&history, today(), 7, TrendBreakdown::Impact);

        assert_eq!(report.keys, vec!["SEV1", "SEV2", "SEV3", "Degraded"]);
        assert_eq!(report.days.len(), 7);
        assert_eq!(report.days[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        let last = &report.days[6];
        assert_eq!(last.total, 2);
        assert_eq!(last.counts[0].count, 2);
        assert_eq!(report.days[4].counts[2].count, 1);
        assert_eq!(report.days[3].total, 0);
    }

    #[test]
    fn test_system_breakdown_keeps_first_seen_order() {
        let history = vec![
            outage("web", ImpactLevel::Sev2, 6),
            outage("db", ImpactLevel::Sev2, 6),
            outage("web", ImpactLevel::Sev2, 7),
        ];
        let report = outage_trends(&history, today(), 3, TrendBreakdown::System);

        assert_eq!(report.keys, vec!["web", "db"]);
        assert_eq!(report.days[1].counts[0].count, 1);
        assert_eq!(report.days[1].counts[1].count, 1);
        assert_eq!(report.days[2].counts[0].count, 1);
    }

    #[test]
    fn test_skips_undated_and_out_of_window() {
        let mut undated = outage("db", ImpactLevel::Sev1, 7);
        undated.start_time = None;
        let history = vec![undated, outage("db", ImpactLevel::Sev1, 1)];

        let report = outage_trends(&history, today(), 3, TrendBreakdown::Impact);
        assert!(report.days.iter().all(|d| d.total == 0));
    }

    #[test]
    fn test_breakdown_wire_names() {
        let parsed: TrendBreakdown = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(parsed, TrendBreakdown::System);
    }
}
