//! Aggregation engine: partition tickets into labeled groups.
//!
//! Grouping runs in three steps:
//!
//! 1. validate every ticket priority against the label table,
//! 2. partition by the dimension's key function, in first-seen key order,
//! 3. apply the dimension's post-processing step.
//!
//! Post-processing differs per dimension. Status gets canonical
//! padding and ordering ([`pad_canonical_statuses`]); user grouping resolves
//! dangling assignees to [`UNKNOWN_USER`] while keying; priority grouping has
//! neither.

use std::collections::HashMap;

use tracing::debug;

use crate::error::ErrorCode;
use crate::model::{GroupingDimension, Priority, Status, Ticket, User};

/// Group key for tickets whose `userId` matches no known user.
pub const UNKNOWN_USER: &str = "Unknown";

/// Errors raised while grouping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error("ticket {ticket_id} has priority {value}, expected 0-4")]
    PriorityOutOfRange { ticket_id: String, value: i64 },
}

impl AggregateError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::PriorityOutOfRange { .. } => ErrorCode::PriorityOutOfRange,
        }
    }
}

/// One labeled bucket of tickets. Ticket order is input order until sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: String,
    pub tickets: Vec<Ticket>,
}

/// Ordered map from group key to tickets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouped {
    groups: Vec<Group>,
    index: HashMap<String, usize>,
}

impl Grouped {
    fn bucket(&mut self, key: &str) -> &mut Vec<Ticket> {
        let idx = if let Some(idx) = self.index.get(key) {
            *idx
        } else {
            let idx = self.groups.len();
            self.groups.push(Group {
                key: key.to_string(),
                tickets: Vec::new(),
            });
            self.index.insert(key.to_string(), idx);
            idx
        };
        &mut self.groups[idx].tickets
    }

    /// Tickets under `key`, if the group exists.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[Ticket]> {
        self.index
            .get(key)
            .map(|idx| self.groups[*idx].tickets.as_slice())
    }

    /// Group keys in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.key.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    /// Number of groups, including empty padded ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total tickets across all groups.
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.groups.iter().map(|group| group.tickets.len()).sum()
    }
}

impl<'a> IntoIterator for &'a Grouped {
    type Item = &'a Group;
    type IntoIter = std::slice::Iter<'a, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Partition `tickets` into groups along `dimension`.
///
/// Every input ticket lands in exactly one group. Pure; `tickets` and
/// `users` are only read.
///
/// # Errors
///
/// Returns [`AggregateError::PriorityOutOfRange`] for the first ticket whose
/// priority falls outside `0..=4`, whatever the dimension.
pub fn group(
    tickets: &[Ticket],
    users: &[User],
    dimension: GroupingDimension,
) -> Result<Grouped, AggregateError> {
    validate_priorities(tickets)?;

    let grouped = match dimension {
        GroupingDimension::ByStatus => {
            pad_canonical_statuses(partition(tickets, |ticket| ticket.status.as_str()))
        }
        GroupingDimension::ByUser => {
            let names = user_names(users);
            partition(tickets, |ticket| user_key(&names, ticket))
        }
        GroupingDimension::ByPriority => partition(tickets, priority_key),
    };

    debug!(
        dimension = dimension.as_str(),
        groups = grouped.len(),
        tickets = grouped.ticket_count(),
        "grouped tickets"
    );
    Ok(grouped)
}

fn validate_priorities(tickets: &[Ticket]) -> Result<(), AggregateError> {
    match tickets.iter().find(|ticket| ticket.priority_level().is_none()) {
        Some(ticket) => Err(AggregateError::PriorityOutOfRange {
            ticket_id: ticket.id.clone(),
            value: ticket.priority,
        }),
        None => Ok(()),
    }
}

fn partition<'t, 'k>(tickets: &'t [Ticket], key_of: impl Fn(&'t Ticket) -> &'k str) -> Grouped {
    let mut grouped = Grouped::default();
    for ticket in tickets {
        grouped.bucket(key_of(ticket)).push(ticket.clone());
    }
    grouped
}

/// Reorder status groups canonically and insert the missing ones empty.
fn pad_canonical_statuses(mut partitioned: Grouped) -> Grouped {
    let mut padded = Grouped::default();
    for status in Status::CANONICAL {
        let tickets = std::mem::take(partitioned.bucket(status.as_str()));
        padded.bucket(status.as_str()).extend(tickets);
    }
    padded
}

/// Id to display name. The first record wins when ids repeat.
fn user_names(users: &[User]) -> HashMap<&str, &str> {
    let mut names = HashMap::with_capacity(users.len());
    for user in users {
        names.entry(user.id.as_str()).or_insert(user.name.as_str());
    }
    names
}

fn user_key<'u>(names: &HashMap<&str, &'u str>, ticket: &Ticket) -> &'u str {
    names
        .get(ticket.user_id.as_str())
        .copied()
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_USER)
}

fn priority_key(ticket: &Ticket) -> &'static str {
    // Priorities were validated before partitioning.
    ticket
        .priority_level()
        .map_or(Priority::NONE.label(), Priority::label)
}
