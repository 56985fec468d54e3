//! Sort engine: order the tickets of a single group.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::{SortCriterion, Ticket};

/// Return the tickets of one group ordered by `criterion`.
///
/// Both criteria are stable: tickets that compare equal keep their input
/// order. The input slice is left untouched.
#[must_use]
pub fn sort(tickets: &[Ticket], criterion: SortCriterion) -> Vec<Ticket> {
    let mut sorted = tickets.to_vec();
    match criterion {
        SortCriterion::ByPriorityDesc => {
            sorted.sort_by(|a, b| b.priority.cmp(&a.priority));
        }
        SortCriterion::ByTitleAsc => {
            sorted.sort_by_cached_key(|ticket| CollationKey::new(&ticket.title));
        }
    }
    sorted
}

/// Compare two titles the way a human reader expects a list to be ordered.
#[must_use]
pub fn collate(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}

/// Three-level sort key.
///
/// Level one ignores accents and case, and orders punctuation before digits
/// before letters. Level two breaks ties on accents, level three on case
/// with lowercase first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    primary: Vec<(u8, char)>,
    secondary: Vec<char>,
    tertiary: Vec<bool>,
}

impl CollationKey {
    fn new(text: &str) -> Self {
        let decomposed: Vec<char> = text.nfd().collect();

        let mut primary = Vec::with_capacity(decomposed.len());
        let mut tertiary = Vec::with_capacity(decomposed.len());
        for c in decomposed.iter().copied().filter(|c| !is_combining_mark(*c)) {
            for lower in c.to_lowercase() {
                primary.push((char_class(lower), lower));
            }
            tertiary.push(c.is_uppercase());
        }

        let secondary = decomposed
            .iter()
            .flat_map(|c| c.to_lowercase())
            .collect();

        Self {
            primary,
            secondary,
            tertiary,
        }
    }
}

fn char_class(c: char) -> u8 {
    if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    }
}
