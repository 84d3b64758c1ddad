//! Row filtering, sorting and pagination
//!
//! Applied after flattening, before aggregation. An empty filtered result is
//! a valid state, not an error.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use shared::types::IssueStatus;

use super::flatten::FlattenedRow;
use super::taxonomy::normalize;

/// Fixed page size across every dashboard listing
pub const PAGE_SIZE: usize = 10;

/// Date-range filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    All,
    Last7Days,
    Last30Days,
    /// A specific calendar date (compared on the `YYYY-MM-DD` prefix)
    On(NaiveDate),
}

impl DateRange {
    fn matches(&self, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match self {
            DateRange::All => true,
            DateRange::Last7Days => {
                created_at.is_some_and(|dt| dt >= now - Duration::days(7))
            }
            DateRange::Last30Days => {
                created_at.is_some_and(|dt| dt >= now - Duration::days(30))
            }
            DateRange::On(date) => created_at.is_some_and(|dt| dt.date_naive() == *date),
        }
    }
}

/// Status filter
///
/// `New` and the pending/resolved groupings match how the dashboards read
/// status: "pending" is anything not settled, "resolved" includes closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    /// Newly reported, not yet picked up
    New,
    /// Not resolved and not closed
    Pending,
    /// Resolved or closed
    Resolved,
    /// One exact lifecycle status
    Exact(IssueStatus),
}

impl StatusFilter {
    fn matches(&self, status: IssueStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::New => status == IssueStatus::Open,
            StatusFilter::Pending => !status.is_settled(),
            StatusFilter::Resolved => status.is_settled(),
            StatusFilter::Exact(wanted) => status == *wanted,
        }
    }
}

/// Combined filter configuration for one listing request
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    pub date_range: DateRange,
    pub status: StatusFilter,
    /// Canonical issue type; `None` means all categories
    pub category: Option<String>,
}

impl RowFilter {
    fn matches(&self, row: &FlattenedRow, now: DateTime<Utc>) -> bool {
        if !self.date_range.matches(row.created_at, now) {
            return false;
        }
        if !self.status.matches(row.status) {
            return false;
        }
        if let Some(category) = &self.category
            && row.category != normalize(category)
        {
            return false;
        }
        true
    }
}

/// Filter rows, then sort newest first.
///
/// Rows without a creation date sort as oldest (epoch). The sort is stable,
/// so same-instant rows keep their flattening order.
pub fn apply_filter(
    mut rows: Vec<FlattenedRow>,
    filter: &RowFilter,
    now: DateTime<Utc>,
) -> Vec<FlattenedRow> {
    rows.retain(|row| filter.matches(row, now));
    sort_newest_first(&mut rows);
    rows
}

/// Stable newest-first ordering; missing `created_at` sorts last
pub fn sort_newest_first(rows: &mut [FlattenedRow]) {
    rows.sort_by_key(|row| {
        std::cmp::Reverse(row.created_at.map(|dt| dt.timestamp_millis()).unwrap_or(0))
    });
}

/// One page of rows plus paging metadata
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub rows: Vec<FlattenedRow>,
    pub total: usize,
    pub page: usize,
    #[serde(rename = "pageSize")]
    pub page_size: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
}

/// Slice out one 10-row page (1-based page numbers, clamped to ≥ 1).
///
/// `total_pages = ceil(total / 10)`; a page past the end yields an empty row
/// list with the metadata intact.
pub fn paginate(rows: Vec<FlattenedRow>, page: usize) -> PageView {
    let total = rows.len();
    let total_pages = total.div_ceil(PAGE_SIZE);
    let page = page.max(1);
    let start = (page - 1) * PAGE_SIZE;

    let rows = if start >= total {
        Vec::new()
    } else {
        rows.into_iter().skip(start).take(PAGE_SIZE).collect()
    };

    PageView {
        rows,
        total,
        page,
        page_size: PAGE_SIZE,
        total_pages,
    }
}
