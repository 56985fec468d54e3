//! View model builder: grouped + sorted + counted, ready for a renderer.

use serde::Serialize;

use crate::aggregate::Grouped;
use crate::model::{GroupingDimension, Priority, SortCriterion, Status, Ticket};
use crate::sort::sort;

/// One rendered column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    pub key: String,
    /// Size of the group as aggregated. Always equals `tickets.len()`.
    pub count: usize,
    pub tickets: Vec<Ticket>,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub dimension: GroupingDimension,
    pub criterion: SortCriterion,
    pub groups: Vec<GroupView>,
}

impl BoardView {
    #[must_use]
    pub fn new(
        dimension: GroupingDimension,
        criterion: SortCriterion,
        grouped: &Grouped,
    ) -> Self {
        Self {
            dimension,
            criterion,
            groups: build(grouped, criterion),
        }
    }

    /// Total tickets across all groups.
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.groups.iter().map(|group| group.count).sum()
    }
}

/// Sort every group in iteration order and attach its count.
///
/// No group or ticket is filtered out.
#[must_use]
pub fn build(grouped: &Grouped, criterion: SortCriterion) -> Vec<GroupView> {
    grouped
        .iter()
        .map(|group| {
            let count = group.tickets.len();
            let tickets = sort(&group.tickets, criterion);
            debug_assert_eq!(count, tickets.len());
            GroupView {
                key: group.key.clone(),
                count,
                tickets,
            }
        })
        .collect()
}

/// Icons a renderer can draw next to group headers and ticket cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    NoPriority,
    Low,
    Medium,
    High,
    Urgent,
    Todo,
    InProgress,
    Backlog,
    Done,
}

impl Icon {
    #[must_use]
    pub const fn for_status(status: Status) -> Self {
        match status {
            Status::Todo => Self::Todo,
            Status::InProgress => Self::InProgress,
            Status::Backlog => Self::Backlog,
            Status::Done => Self::Done,
        }
    }

    #[must_use]
    pub const fn for_priority(priority: Priority) -> Self {
        match priority.value() {
            0 => Self::NoPriority,
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::Urgent,
        }
    }

    /// Priority icon for one ticket card, from the ticket's own priority.
    #[must_use]
    pub fn for_ticket_priority(ticket: &Ticket) -> Option<Self> {
        ticket.priority_level().map(Self::for_priority)
    }

    /// Header icon for a group, if the dimension has one for `key`.
    ///
    /// User groups never have an icon.
    #[must_use]
    pub fn for_group(dimension: GroupingDimension, key: &str) -> Option<Self> {
        match dimension {
            GroupingDimension::ByStatus => Status::CANONICAL
                .into_iter()
                .find(|status| status.as_str() == key)
                .map(Self::for_status),
            GroupingDimension::ByPriority => Priority::LABELS
                .iter()
                .position(|label| *label == key)
                .and_then(|idx| i64::try_from(idx).ok())
                .and_then(Priority::new)
                .map(Self::for_priority),
            GroupingDimension::ByUser => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoPriority => "no-priority",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Backlog => "backlog",
            Self::Done => "done",
        }
    }
}
