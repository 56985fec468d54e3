//! Data model: tickets, users, and the two view-state selections.

pub mod ticket;
pub mod view_state;

pub use ticket::{Payload, Priority, Status, Ticket, User};
pub use view_state::{GroupingDimension, ParseEnumError, SortCriterion};
