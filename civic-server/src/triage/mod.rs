//! Complaint triage pipeline
//!
//! The data-shaping core shared by every dashboard endpoint. Raw nested
//! tickets flow one direction:
//!
//! ```text
//! tickets → flatten → (normalize / classify / evaluate SLA) → filter/sort/page → stats
//! ```
//!
//! Everything here is pure: no I/O, no clocks — callers pass "now" in, so
//! the same inputs always produce the same outputs and every stage is
//! testable in isolation.

pub mod department;
pub mod flatten;
pub mod pipeline;
pub mod sla;
pub mod stats;
pub mod taxonomy;

#[cfg(test)]
mod tests;

pub use department::department_for;
pub use flatten::{FlattenedRow, Scope, flatten};
pub use pipeline::{DateRange, PageView, RowFilter, StatusFilter, apply_filter, paginate, PAGE_SIZE};
pub use sla::{SlaEvaluation, SlaStatus, SlaTable};
pub use stats::{DepartmentLoad, TicketStats, aggregate};
pub use taxonomy::{canonical_tags, display_name, normalize};
