use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The attribute tickets are partitioned by. Persisted between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GroupingDimension {
    #[default]
    #[serde(rename = "status")]
    ByStatus,
    #[serde(rename = "user")]
    ByUser,
    #[serde(rename = "priority")]
    ByPriority,
}

impl GroupingDimension {
    pub const ALL: [Self; 3] = [Self::ByStatus, Self::ByUser, Self::ByPriority];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ByStatus => "status",
            Self::ByUser => "user",
            Self::ByPriority => "priority",
        }
    }
}

/// The order applied inside each group. Resets every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortCriterion {
    #[default]
    #[serde(rename = "priority")]
    ByPriorityDesc,
    #[serde(rename = "title")]
    ByTitleAsc,
}

impl SortCriterion {
    pub const ALL: [Self; 2] = [Self::ByPriorityDesc, Self::ByTitleAsc];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ByPriorityDesc => "priority",
            Self::ByTitleAsc => "title",
        }
    }
}

/// Error returned when parsing a selection from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for GroupingDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for GroupingDimension {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "status" => Ok(Self::ByStatus),
            "user" => Ok(Self::ByUser),
            "priority" => Ok(Self::ByPriority),
            _ => Err(ParseEnumError {
                expected: "grouping",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for SortCriterion {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "priority" => Ok(Self::ByPriorityDesc),
            "title" => Ok(Self::ByTitleAsc),
            _ => Err(ParseEnumError {
                expected: "sort",
                got: s.to_string(),
            }),
        }
    }
}
