use chrono::{Duration, NaiveDate, TimeZone, Utc};
use shared::models::{SubTicketView, TicketView};
use shared::types::{Department, IssueStatus};

use super::*;

fn sub(id: i64, issue_type: &str, status: IssueStatus, created_at: &str) -> SubTicketView {
    SubTicketView {
        id,
        sub_id: format!("SUB-{:04}", id),
        issue_type: issue_type.to_string(),
        authority: String::new(),
        status,
        assigned_to: None,
        latitude: None,
        longitude: None,
        confidence: Some(0.9),
        image_id: Some(id),
        media_type: None,
        image_count: 1,
        images: vec![],
        created_at: Some(created_at.to_string()),
        resolved_at: None,
        resolved_by: None,
        resolution_comment: None,
    }
}

fn ticket(ticket_id: &str, area: &str, created_at: &str, subs: Vec<SubTicketView>) -> TicketView {
    TicketView {
        ticket_id: ticket_id.to_string(),
        user_id: Some(1),
        user_name: "Asha Rao".to_string(),
        latitude: Some(12.97),
        longitude: Some(77.59),
        area: Some(area.to_string()),
        district: Some("Central".to_string()),
        address: None,
        status: IssueStatus::Open,
        created_at: Some(created_at.to_string()),
        updated_at: None,
        resolved_at: None,
        sub_tickets: subs,
    }
}

// ============================================================================
// Normalizer
// ============================================================================

#[test]
fn test_normalize_synonym_families() {
    for raw in ["WaterPuddle", "water puddle", "water_puddles", " puddles "] {
        assert_eq!(normalize(raw), "water_puddles", "input: {:?}", raw);
    }
    assert_eq!(normalize("Garbage_Overflow"), "garbage_overflow");
    assert_eq!(normalize("sandonroad"), "sand_on_road");
    assert_eq!(normalize("POTHOLE"), "potholes");
    assert_eq!(normalize("debris"), "street_debris");
}

#[test]
fn test_normalize_empty_input() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("   "), "");
}

#[test]
fn test_normalize_unmapped_passes_through_cleaned() {
    assert_eq!(normalize("  Broken StreetLight "), "broken streetlight");
}

#[test]
fn test_normalize_is_idempotent() {
    for raw in ["WaterPuddle", "something odd", "poweroutage", ""] {
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }
}

#[test]
fn test_normalize_is_exact_match_not_fuzzy() {
    // Two slightly different unmapped strings stay distinct categories
    assert_ne!(normalize("watter puddle"), normalize("watter puddles"));
}

#[test]
fn test_display_name() {
    assert_eq!(display_name("sand_on_road"), "Sand On Road");
    assert_eq!(display_name("all"), "ALL");
}

// ============================================================================
// Department classifier
// ============================================================================

#[test]
fn test_every_canonical_tag_has_a_department() {
    let roads = [
        "sand_on_road",
        "road_cracks",
        "potholes",
        "water_puddles",
        "open_manholes",
        "street_debris",
    ];
    let garbage = ["street_hawkers", "animal_carcases", "garbage_overflow"];

    for tag in canonical_tags() {
        let dept = department_for(tag);
        if roads.contains(&tag) {
            assert_eq!(dept, Department::Roads, "tag: {}", tag);
        } else {
            assert!(garbage.contains(&tag), "unaccounted tag: {}", tag);
            assert_eq!(dept, Department::Garbage, "tag: {}", tag);
        }
    }
}

#[test]
fn test_department_accepts_raw_variants() {
    assert_eq!(department_for("Garbage Overflow"), Department::Garbage);
    assert_eq!(department_for("pothole"), Department::Roads);
}

#[test]
fn test_unknown_issue_is_unassigned() {
    // The old inspector view defaulted these to Roads; that was the bug.
    assert_eq!(department_for("poweroutage"), Department::Unassigned);
    assert_eq!(department_for(""), Department::Unassigned);
}

// ============================================================================
// SLA evaluator
// ============================================================================

#[test]
fn test_sla_open_past_deadline_is_breached() {
    let table = SlaTable::default();
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let created = now - Duration::hours(13);

    let eval = table.evaluate("potholes", IssueStatus::Open, Some(created), None, now);
    assert_eq!(eval.status, SlaStatus::Breached);
    assert_eq!(eval.sla_hours, 12.0);
    assert!((eval.hours_elapsed - 13.0).abs() < 1e-9);
}

#[test]
fn test_sla_open_within_deadline_is_on_track() {
    let table = SlaTable::default();
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let created = now - Duration::hours(5);

    let eval = table.evaluate("potholes", IssueStatus::Open, Some(created), None, now);
    assert_eq!(eval.status, SlaStatus::OnTrack);
}

#[test]
fn test_sla_resolved_within_deadline() {
    let table = SlaTable::default();
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let resolved = created + Duration::hours(10);
    // Evaluated long after resolution: the reference time is resolved_at,
    // so the verdict does not drift as the clock advances.
    let now = created + Duration::days(30);

    let eval = table.evaluate(
        "potholes",
        IssueStatus::Resolved,
        Some(created),
        Some(resolved),
        now,
    );
    assert_eq!(eval.status, SlaStatus::SolvedWithinSla);
    assert!((eval.hours_elapsed - 10.0).abs() < 1e-9);
}

#[test]
fn test_sla_resolved_after_deadline() {
    let table = SlaTable::default();
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let resolved = created + Duration::hours(40);
    let now = created + Duration::hours(41);

    let eval = table.evaluate(
        "potholes",
        IssueStatus::Closed,
        Some(created),
        Some(resolved),
        now,
    );
    assert_eq!(eval.status, SlaStatus::SolvedAfterSla);
}

#[test]
fn test_sla_without_dates_is_unknown() {
    let table = SlaTable::default();
    let now = Utc::now();
    let eval = table.evaluate("potholes", IssueStatus::Open, None, None, now);
    assert_eq!(eval.status, SlaStatus::Unknown);
    assert_eq!(eval.hours_elapsed, 0.0);
}

#[test]
fn test_sla_default_hours_for_unknown_type() {
    let table = SlaTable::default();
    assert_eq!(table.hours_for("poweroutage"), 24.0);
    assert_eq!(table.hours_for("Garbage Overflow"), 8.0);
}

#[test]
fn test_hours_between_is_fractional() {
    let from = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let to = from + Duration::minutes(90);
    assert!((sla::hours_between(from, to) - 1.5).abs() < 1e-9);
}

// ============================================================================
// Flattener
// ============================================================================

#[test]
fn test_flatten_empty_ticket_yields_no_rows() {
    let tickets = vec![ticket("MDMS-0001", "Indiranagar", "2024-01-01T00:00:00Z", vec![])];
    let rows = flatten(&tickets, Scope::All, &SlaTable::default(), Utc::now());
    assert!(rows.is_empty());
}

#[test]
fn test_flatten_carries_parent_fields() {
    let tickets = vec![ticket(
        "MDMS-0001",
        "Indiranagar",
        "2024-01-01T00:00:00Z",
        vec![
            sub(1, "potholes", IssueStatus::Open, "2024-01-01T01:00:00Z"),
            sub(2, "garbage_overflow", IssueStatus::Open, "2024-01-01T02:00:00Z"),
            sub(3, "road_cracks", IssueStatus::Open, "2024-01-01T03:00:00Z"),
        ],
    )];
    let rows = flatten(&tickets, Scope::All, &SlaTable::default(), Utc::now());

    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.ticket_id, "MDMS-0001");
        assert_eq!(row.area.as_deref(), Some("Indiranagar"));
        assert_eq!(row.district.as_deref(), Some("Central"));
        assert_eq!(row.user_name, "Asha Rao");
        // Sub-ticket had no coordinates of its own: parent's apply
        assert_eq!(row.latitude, Some(12.97));
    }
}

#[test]
fn test_flatten_created_at_falls_back_to_parent() {
    let mut orphan = sub(1, "potholes", IssueStatus::Open, "");
    orphan.created_at = None;
    let tickets = vec![ticket("MDMS-0001", "Indiranagar", "2024-01-05T00:00:00Z", vec![orphan])];

    let rows = flatten(&tickets, Scope::All, &SlaTable::default(), Utc::now());
    assert_eq!(
        rows[0].created_at,
        Some(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_flatten_inspector_scope_filters_assignment() {
    let mut mine = sub(1, "potholes", IssueStatus::Open, "2024-01-01T01:00:00Z");
    mine.assigned_to = Some(7);
    let mut theirs = sub(2, "potholes", IssueStatus::Open, "2024-01-01T02:00:00Z");
    theirs.assigned_to = Some(8);
    let unassigned = sub(3, "potholes", IssueStatus::Open, "2024-01-01T03:00:00Z");

    let tickets = vec![ticket(
        "MDMS-0001",
        "Indiranagar",
        "2024-01-01T00:00:00Z",
        vec![mine, theirs, unassigned],
    )];

    let rows = flatten(&tickets, Scope::AssignedTo(7), &SlaTable::default(), Utc::now());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sub_id, "SUB-0001");
}

// ============================================================================
// Filter / sort / paginate
// ============================================================================

fn many_rows(count: usize) -> Vec<FlattenedRow> {
    let subs: Vec<SubTicketView> = (0..count)
        .map(|i| {
            let day = 1 + (i % 27) as u32;
            sub(
                i as i64,
                "potholes",
                IssueStatus::Open,
                &format!("2024-01-{:02}T00:00:00Z", day),
            )
        })
        .collect();
    let tickets = vec![ticket("MDMS-0001", "Indiranagar", "2024-01-01T00:00:00Z", subs)];
    flatten(&tickets, Scope::All, &SlaTable::default(), Utc::now())
}

#[test]
fn test_filter_resolved_includes_closed() {
    let tickets = vec![ticket(
        "MDMS-0001",
        "Indiranagar",
        "2024-01-01T00:00:00Z",
        vec![
            sub(1, "potholes", IssueStatus::Resolved, "2024-01-01T01:00:00Z"),
            sub(2, "potholes", IssueStatus::Closed, "2024-01-01T02:00:00Z"),
            sub(3, "potholes", IssueStatus::Open, "2024-01-01T03:00:00Z"),
            sub(4, "potholes", IssueStatus::InProgress, "2024-01-01T04:00:00Z"),
        ],
    )];
    let now = Utc::now();
    let rows = flatten(&tickets, Scope::All, &SlaTable::default(), now);

    let filter = RowFilter {
        status: StatusFilter::Resolved,
        ..Default::default()
    };
    let filtered = apply_filter(rows.clone(), &filter, now);
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|r| r.status.is_settled()));

    let filter = RowFilter {
        status: StatusFilter::Pending,
        ..Default::default()
    };
    let filtered = apply_filter(rows, &filter, now);
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|r| !r.status.is_settled()));
}

#[test]
fn test_filter_by_category_uses_normalized_type() {
    let tickets = vec![ticket(
        "MDMS-0001",
        "Indiranagar",
        "2024-01-01T00:00:00Z",
        vec![
            sub(1, "Garbage_Overflow", IssueStatus::Open, "2024-01-01T01:00:00Z"),
            sub(2, "garbageoverflow", IssueStatus::Open, "2024-01-01T02:00:00Z"),
            sub(3, "potholes", IssueStatus::Open, "2024-01-01T03:00:00Z"),
        ],
    )];
    let now = Utc::now();
    let rows = flatten(&tickets, Scope::All, &SlaTable::default(), now);

    let filter = RowFilter {
        category: Some("garbage_overflow".to_string()),
        ..Default::default()
    };
    let filtered = apply_filter(rows, &filter, now);
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|r| r.category == "garbage_overflow"));
}

#[test]
fn test_filter_by_specific_date() {
    let tickets = vec![ticket(
        "MDMS-0001",
        "Indiranagar",
        "2024-01-01T00:00:00Z",
        vec![
            sub(1, "potholes", IssueStatus::Open, "2024-01-01T09:00:00Z"),
            sub(2, "potholes", IssueStatus::Open, "2024-01-02T09:00:00Z"),
        ],
    )];
    let now = Utc::now();
    let rows = flatten(&tickets, Scope::All, &SlaTable::default(), now);

    let filter = RowFilter {
        date_range: DateRange::On(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
        ..Default::default()
    };
    let filtered = apply_filter(rows, &filter, now);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].sub_id, "SUB-0002");
}

#[test]
fn test_sort_newest_first_with_missing_dates_last() {
    let tickets = vec![ticket(
        "MDMS-0001",
        "Indiranagar",
        "2024-01-01T00:00:00Z",
        vec![
            sub(1, "potholes", IssueStatus::Open, "2024-01-01T01:00:00Z"),
            sub(2, "potholes", IssueStatus::Open, "2024-01-03T01:00:00Z"),
            sub(3, "potholes", IssueStatus::Open, "2024-01-02T01:00:00Z"),
        ],
    )];
    let now = Utc::now();
    let mut rows = flatten(&tickets, Scope::All, &SlaTable::default(), now);
    // Strip every date source so the row genuinely has none
    rows[0].created_at = None;
    sort_rows(&mut rows);

    assert_eq!(rows[0].sub_id, "SUB-0002");
    assert_eq!(rows[1].sub_id, "SUB-0003");
    assert_eq!(rows[2].sub_id, "SUB-0001");
}

fn sort_rows(rows: &mut [FlattenedRow]) {
    pipeline::sort_newest_first(rows);
}

#[test]
fn test_pagination_of_25_rows() {
    let rows = many_rows(25);

    let page1 = paginate(rows.clone(), 1);
    assert_eq!(page1.rows.len(), 10);
    assert_eq!(page1.total, 25);
    assert_eq!(page1.total_pages, 3);

    let page3 = paginate(rows.clone(), 3);
    assert_eq!(page3.rows.len(), 5);

    let past_end = paginate(rows, 9);
    assert!(past_end.rows.is_empty());
    assert_eq!(past_end.total_pages, 3);
}

#[test]
fn test_pagination_of_empty_set_is_valid() {
    let page = paginate(Vec::new(), 1);
    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.rows.is_empty());
}

// ============================================================================
// Stats aggregator
// ============================================================================

#[test]
fn test_stats_resolved_plus_pending_is_total() {
    let now = Utc::now();
    let rows = {
        let tickets = vec![ticket(
            "MDMS-0001",
            "Indiranagar",
            "2024-01-01T00:00:00Z",
            vec![
                sub(1, "potholes", IssueStatus::Resolved, "2024-01-01T01:00:00Z"),
                sub(2, "potholes", IssueStatus::Open, "2024-01-01T02:00:00Z"),
                sub(3, "potholes", IssueStatus::InProgress, "2024-01-01T03:00:00Z"),
                sub(4, "potholes", IssueStatus::Closed, "2024-01-01T04:00:00Z"),
            ],
        )];
        flatten(&tickets, Scope::All, &SlaTable::default(), now)
    };

    let stats = aggregate(&rows, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(stats.total, 4);
    assert_eq!(stats.resolved + stats.pending, stats.total);
    assert_eq!(stats.resolved, 2);
    assert_eq!(stats.new_count, 1);
}

#[test]
fn test_stats_date_buckets() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

    let mut resolved_today = sub(1, "potholes", IssueStatus::Resolved, "2024-03-10T00:00:00Z");
    resolved_today.resolved_at = Some("2024-03-15T08:00:00Z".to_string());
    let mut resolved_yesterday = sub(2, "potholes", IssueStatus::Resolved, "2024-03-10T00:00:00Z");
    resolved_yesterday.resolved_at = Some("2024-03-14T08:00:00Z".to_string());
    let mut resolved_last_month = sub(3, "potholes", IssueStatus::Closed, "2024-02-10T00:00:00Z");
    resolved_last_month.resolved_at = Some("2024-02-20T08:00:00Z".to_string());
    let created_today = sub(4, "potholes", IssueStatus::Open, "2024-03-15T09:00:00Z");

    let tickets = vec![ticket(
        "MDMS-0001",
        "Indiranagar",
        "2024-03-01T00:00:00Z",
        vec![resolved_today, resolved_yesterday, resolved_last_month, created_today],
    )];
    let rows = flatten(&tickets, Scope::All, &SlaTable::default(), now);
    let stats = aggregate(&rows, today);

    assert_eq!(stats.today_completed, 1);
    assert_eq!(stats.yesterday_completed, 1);
    assert_eq!(stats.this_month, 2);
    assert_eq!(stats.last_month, 1);
    assert_eq!(stats.today_new, 1);
    assert!(stats.today_completed <= stats.resolved);
}

#[test]
fn test_stats_department_workload_skips_unassigned() {
    let now = Utc::now();
    let tickets = vec![ticket(
        "MDMS-0001",
        "Indiranagar",
        "2024-01-01T00:00:00Z",
        vec![
            sub(1, "potholes", IssueStatus::Open, "2024-01-01T01:00:00Z"),
            sub(2, "garbage_overflow", IssueStatus::Resolved, "2024-01-01T02:00:00Z"),
            sub(3, "poweroutage", IssueStatus::Open, "2024-01-01T03:00:00Z"),
        ],
    )];
    let rows = flatten(&tickets, Scope::All, &SlaTable::default(), now);
    let stats = aggregate(&rows, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

    let roads = stats.department_workload[&Department::Roads];
    let garbage = stats.department_workload[&Department::Garbage];
    assert_eq!(roads.total, 1);
    assert_eq!(roads.pending, 1);
    assert_eq!(garbage.total, 1);
    assert_eq!(garbage.resolved, 1);
    // The poweroutage row is counted in distributions but not in workload
    assert_eq!(roads.total + garbage.total, 2);
    assert_eq!(stats.issue_distribution["poweroutage"], 1);
}
