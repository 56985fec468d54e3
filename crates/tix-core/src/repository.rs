//! In-memory ticket repository, populated once per session.

use crate::model::{Payload, Ticket, User};

/// Immutable holder for the tickets and users of one session.
///
/// Built from a single [`Payload`]; there is no API for edits or merges.
#[derive(Debug, Clone, Default)]
pub struct TicketRepository {
    tickets: Vec<Ticket>,
    users: Vec<User>,
}

impl TicketRepository {
    /// Repository used when the fetch failed or has not happened.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_payload(payload: Payload) -> Self {
        Self {
            tickets: payload.tickets,
            users: payload.users,
        }
    }

    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}
