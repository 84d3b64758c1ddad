//! Database record models
//!
//! Storage shapes, distinct from the wire DTOs in `shared::models`.
//! Conversion to view models happens in the API layer.

pub mod media;
pub mod sub_ticket;
pub mod ticket;
pub mod user;
pub mod watermark;

pub use media::{MediaCreate, MediaRecord};
pub use sub_ticket::{SubTicketCreate, SubTicketRecord};
pub use ticket::{TicketCreate, TicketRecord};
pub use user::{UserCreate, UserRecord};
pub use watermark::WatermarkRecord;
