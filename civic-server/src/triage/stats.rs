//! Dashboard statistics
//!
//! Derived counts over a row set (filtered or unfiltered, the caller
//! decides). Date buckets compare calendar dates in UTC; month windows are
//! built from explicit first/last-of-month boundaries.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use shared::types::Department;

use super::flatten::FlattenedRow;

/// Resolved/pending split for one department
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct DepartmentLoad {
    pub total: usize,
    pub resolved: usize,
    pub pending: usize,
}

/// Full aggregate for one dashboard render
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: usize,
    /// Resolved or closed
    pub resolved: usize,
    /// Everything else; `resolved + pending == total` always
    pub pending: usize,
    /// Still in the open state
    #[serde(rename = "new")]
    pub new_count: usize,
    /// Settled with `resolved_at` on the current date
    pub today_completed: usize,
    pub yesterday_completed: usize,
    /// Settled since the 1st of the current month
    pub this_month: usize,
    /// Settled within the full previous calendar month
    pub last_month: usize,
    /// Created on the current date
    pub today_new: usize,
    /// Rows per canonical issue type
    pub issue_distribution: HashMap<String, usize>,
    /// Rows per area
    pub area_distribution: HashMap<String, usize>,
    /// Issue types broken down per area
    pub issues_per_area: HashMap<String, HashMap<String, usize>>,
    /// Roads/Garbage workload split (unassigned types are not counted here)
    pub department_workload: HashMap<Department, DepartmentLoad>,
}

/// First day of the month containing `date`
fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// (first, last) day of the month before the one containing `date`
fn previous_month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let this_month_start = month_start(date);
    let last_month_end = this_month_start.pred_opt().unwrap_or(this_month_start);
    (month_start(last_month_end), last_month_end)
}

/// Aggregate a row set as of `today`.
pub fn aggregate(rows: &[FlattenedRow], today: NaiveDate) -> TicketStats {
    let yesterday = today.pred_opt().unwrap_or(today);
    let this_month_start = month_start(today);
    let (last_month_start, last_month_end) = previous_month_bounds(today);

    let mut stats = TicketStats {
        total: rows.len(),
        resolved: 0,
        pending: 0,
        new_count: 0,
        today_completed: 0,
        yesterday_completed: 0,
        this_month: 0,
        last_month: 0,
        today_new: 0,
        issue_distribution: HashMap::new(),
        area_distribution: HashMap::new(),
        issues_per_area: HashMap::new(),
        department_workload: HashMap::from([
            (Department::Roads, DepartmentLoad::default()),
            (Department::Garbage, DepartmentLoad::default()),
        ]),
    };

    for row in rows {
        let settled = row.status.is_settled();
        if settled {
            stats.resolved += 1;
        } else {
            stats.pending += 1;
        }
        if row.status == shared::types::IssueStatus::Open {
            stats.new_count += 1;
        }

        let resolved_date = row.resolved_at.map(|dt| dt.date_naive());
        if settled && let Some(date) = resolved_date {
            if date == today {
                stats.today_completed += 1;
            }
            if date == yesterday {
                stats.yesterday_completed += 1;
            }
            if date >= this_month_start {
                stats.this_month += 1;
            }
            if date >= last_month_start && date <= last_month_end {
                stats.last_month += 1;
            }
        }

        let created_date = row.created_at.map(|dt| dt.date_naive());
        if created_date == Some(today) {
            stats.today_new += 1;
        }

        *stats
            .issue_distribution
            .entry(row.category.clone())
            .or_insert(0) += 1;

        let area = row
            .area
            .clone()
            .unwrap_or_else(|| "Unknown Area".to_string());
        *stats.area_distribution.entry(area.clone()).or_insert(0) += 1;
        *stats
            .issues_per_area
            .entry(area)
            .or_default()
            .entry(row.category.clone())
            .or_insert(0) += 1;

        if matches!(row.department, Department::Roads | Department::Garbage) {
            let load = stats.department_workload.entry(row.department).or_default();
            load.total += 1;
            if settled {
                load.resolved += 1;
            } else {
                load.pending += 1;
            }
        }
    }

    stats
}
