use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four board columns a ticket can sit in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Todo,
    #[serde(rename = "In progress")]
    InProgress,
    Backlog,
    Done,
}

impl Status {
    /// Display and iteration order of the status columns.
    pub const CANONICAL: [Self; 4] = [Self::Todo, Self::InProgress, Self::Backlog, Self::Done];

    /// Group label, identical to the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::InProgress => "In progress",
            Self::Backlog => "Backlog",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated ticket priority in `0..=4`.
///
/// Higher is more urgent. The raw wire value lives on [`Ticket::priority`]
/// so that out-of-range input survives decoding and can be rejected by the
/// grouping engine instead of being clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    pub const NONE: Self = Self(0);
    pub const LOW: Self = Self(1);
    pub const MEDIUM: Self = Self(2);
    pub const HIGH: Self = Self(3);
    pub const URGENT: Self = Self(4);

    /// Fixed label table, indexed by priority value.
    pub const LABELS: [&'static str; 5] = ["No priority", "Low", "Medium", "High", "Urgent"];

    /// Validate a raw wire value.
    #[must_use]
    pub fn new(raw: i64) -> Option<Self> {
        u8::try_from(raw)
            .ok()
            .filter(|value| usize::from(*value) < Self::LABELS.len())
            .map(Self)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        Self::LABELS[usize::from(self.0)]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One work item as served by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tag: Vec<String>,
    pub user_id: String,
    pub status: Status,
    /// Raw priority; see [`Ticket::priority_level`]. Integers beyond `i64`
    /// saturate to `i64::MAX`.
    #[serde(deserialize_with = "deserialize_raw_priority")]
    pub priority: i64,
}

impl Ticket {
    /// Validated priority, or `None` when the raw value is outside `0..=4`.
    #[must_use]
    pub fn priority_level(&self) -> Option<Priority> {
        Priority::new(self.priority)
    }
}

fn deserialize_raw_priority<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    struct RawPriority;

    impl Visitor<'_> for RawPriority {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer priority")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
            Ok(i64::try_from(value).unwrap_or(i64::MAX))
        }
    }

    deserializer.deserialize_i64(RawPriority)
}

/// An assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub available: bool,
}

/// The full response body of a data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub tickets: Vec<Ticket>,
    pub users: Vec<User>,
}
