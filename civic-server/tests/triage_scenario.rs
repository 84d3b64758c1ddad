//! End-to-end triage scenario through the public library API:
//! two tickets flow through flatten → normalize/classify/evaluate →
//! filter → stats, and every derived value is checked.

use chrono::{NaiveDate, TimeZone, Utc};
use civic_server::triage::{
    self, RowFilter, Scope, SlaTable, StatusFilter,
};
use shared::models::{SubTicketView, TicketView};
use shared::types::{Department, IssueStatus};

fn sub_ticket(
    id: i64,
    issue_type: &str,
    status: IssueStatus,
    created_at: &str,
    resolved_at: Option<&str>,
) -> SubTicketView {
    SubTicketView {
        id,
        sub_id: format!("SUB-{:04}", id),
        issue_type: issue_type.to_string(),
        authority: String::new(),
        status,
        assigned_to: None,
        latitude: None,
        longitude: None,
        confidence: Some(0.8),
        image_id: None,
        media_type: None,
        image_count: 0,
        images: vec![],
        created_at: Some(created_at.to_string()),
        resolved_at: resolved_at.map(str::to_string),
        resolved_by: None,
        resolution_comment: None,
    }
}

fn scenario_tickets() -> Vec<TicketView> {
    let ticket_a = TicketView {
        ticket_id: "MDMS-A".to_string(),
        user_id: Some(1),
        user_name: "Citizen A".to_string(),
        latitude: None,
        longitude: None,
        area: Some("North Ward".to_string()),
        district: Some("Central".to_string()),
        address: None,
        status: IssueStatus::Open,
        created_at: Some("2024-01-01T00:00:00Z".to_string()),
        updated_at: None,
        resolved_at: None,
        sub_tickets: vec![sub_ticket(
            1,
            "potholes",
            IssueStatus::Open,
            "2024-01-01T00:00:00Z",
            None,
        )],
    };

    let ticket_b = TicketView {
        ticket_id: "MDMS-B".to_string(),
        user_id: Some(2),
        user_name: "Citizen B".to_string(),
        latitude: None,
        longitude: None,
        area: Some("South Ward".to_string()),
        district: Some("Central".to_string()),
        address: None,
        status: IssueStatus::Open,
        created_at: Some("2024-01-02T00:00:00Z".to_string()),
        updated_at: None,
        resolved_at: None,
        sub_tickets: vec![
            sub_ticket(
                2,
                "Garbage_Overflow",
                IssueStatus::Resolved,
                "2024-01-02T00:00:00Z",
                Some("2024-01-02T04:00:00Z"),
            ),
            sub_ticket(3, "sandonroad", IssueStatus::Open, "2024-01-02T00:00:00Z", None),
        ],
    };

    vec![ticket_a, ticket_b]
}

#[test]
fn two_ticket_scenario_flows_through_the_whole_pipeline() {
    let now = Utc.with_ymd_and_hms(2024, 1, 2, 6, 0, 0).unwrap();
    let tickets = scenario_tickets();

    // Flatten: 1 + 2 sub-tickets → 3 rows
    let rows = triage::flatten(&tickets, Scope::All, &SlaTable::default(), now);
    assert_eq!(rows.len(), 3);

    // Normalization
    let mut categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    categories.sort();
    assert_eq!(
        categories,
        vec!["garbage_overflow", "potholes", "sand_on_road"]
    );

    // Department split: Roads = {potholes, sand_on_road}, Garbage = {garbage_overflow}
    let roads = rows
        .iter()
        .filter(|r| r.department == Department::Roads)
        .count();
    let garbage = rows
        .iter()
        .filter(|r| r.department == Department::Garbage)
        .count();
    assert_eq!(roads, 2);
    assert_eq!(garbage, 1);

    // Parent fields carried onto every row
    let pothole_row = rows.iter().find(|r| r.category == "potholes").unwrap();
    assert_eq!(pothole_row.ticket_id, "MDMS-A");
    assert_eq!(pothole_row.area.as_deref(), Some("North Ward"));

    // SLA: the garbage_overflow row settled in 4h against an 8h deadline
    let garbage_row = rows.iter().find(|r| r.category == "garbage_overflow").unwrap();
    assert_eq!(garbage_row.sla.status, triage::SlaStatus::SolvedWithinSla);
    assert!((garbage_row.sla.hours_elapsed - 4.0).abs() < 1e-9);

    // The pothole opened 30h ago against a 12h deadline
    assert_eq!(pothole_row.sla.status, triage::SlaStatus::Breached);

    // Stats over the full row set
    let stats = triage::aggregate(&rows, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    assert_eq!(stats.total, 3);
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.resolved + stats.pending, stats.total);
    assert_eq!(stats.today_completed, 1);
    assert_eq!(stats.department_workload[&Department::Roads].pending, 2);
    assert_eq!(stats.department_workload[&Department::Garbage].resolved, 1);

    // Filter: resolved-only keeps the settled row
    let resolved_rows = triage::apply_filter(
        rows.clone(),
        &RowFilter {
            status: StatusFilter::Resolved,
            ..Default::default()
        },
        now,
    );
    assert_eq!(resolved_rows.len(), 1);
    assert_eq!(resolved_rows[0].category, "garbage_overflow");

    // Sorting: newest first (both B rows precede the A row)
    let sorted = triage::apply_filter(rows, &RowFilter::default(), now);
    assert_eq!(sorted[2].ticket_id, "MDMS-A");

    // Pagination metadata on a small set
    let page = triage::paginate(sorted, 1);
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.rows.len(), 3);
}
