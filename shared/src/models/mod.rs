//! View models exchanged between server and dashboards

pub mod ticket;
pub mod user;

pub use ticket::{MediaInfo, SubTicketView, TicketView};
pub use user::UserPublic;
