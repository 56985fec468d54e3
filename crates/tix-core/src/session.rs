//! Board session: the `Loading -> Ready | Failed` state machine plus the
//! user's grouping and sort selections.
//!
//! A session fetches at most once. The view pipeline is reachable only after
//! the session has left `Loading`; a failed fetch renders as an empty board.

use tracing::{error, info};

use crate::aggregate::{self, AggregateError};
use crate::model::{GroupingDimension, SortCriterion};
use crate::prefs::{KeyValueStore, PreferenceStore};
use crate::repository::TicketRepository;
use crate::source::{DataSource, SourceError};
use crate::view::BoardView;

/// Fetch phase of a session.
#[derive(Debug)]
pub enum BoardState {
    Loading,
    Ready(TicketRepository),
    Failed(SourceError),
}

impl BoardState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// One board session.
#[derive(Debug)]
pub struct Session<S> {
    state: BoardState,
    dimension: GroupingDimension,
    criterion: SortCriterion,
    prefs: PreferenceStore<S>,
}

impl<S: KeyValueStore> Session<S> {
    /// Start in `Loading` with the stored (or default) dimension and the
    /// default sort criterion.
    pub fn start(prefs: PreferenceStore<S>) -> Self {
        let dimension = prefs.load();
        info!(grouping = dimension.as_str(), "session started");
        Self {
            state: BoardState::Loading,
            dimension,
            criterion: SortCriterion::default(),
            prefs,
        }
    }

    /// Fetch the payload once and leave `Loading`.
    ///
    /// Later calls are no-ops and do not touch `source`.
    pub fn fetch(&mut self, source: &dyn DataSource) -> &BoardState {
        if !matches!(self.state, BoardState::Loading) {
            info!(state = self.state.name(), "fetch already settled, skipping");
            return &self.state;
        }

        self.state = match source.fetch() {
            Ok(payload) => {
                let repository = TicketRepository::from_payload(payload);
                info!(
                    source = %source.describe(),
                    tickets = repository.len(),
                    users = repository.users().len(),
                    "tickets loaded"
                );
                BoardState::Ready(repository)
            }
            Err(err) => {
                error!(
                    source = %source.describe(),
                    code = err.code().code(),
                    %err,
                    "ticket fetch failed, showing empty board"
                );
                BoardState::Failed(err)
            }
        };
        &self.state
    }

    #[must_use]
    pub const fn state(&self) -> &BoardState {
        &self.state
    }

    #[must_use]
    pub const fn dimension(&self) -> GroupingDimension {
        self.dimension
    }

    #[must_use]
    pub const fn criterion(&self) -> SortCriterion {
        self.criterion
    }

    #[must_use]
    pub const fn prefs(&self) -> &PreferenceStore<S> {
        &self.prefs
    }

    /// Explicit user selection of a grouping dimension. Persisted.
    pub fn select_dimension(&mut self, dimension: GroupingDimension) {
        self.dimension = dimension;
        self.prefs.save(dimension);
    }

    /// Explicit user selection of a sort criterion. Not persisted.
    pub fn select_criterion(&mut self, criterion: SortCriterion) {
        self.criterion = criterion;
    }

    /// Build the board for the current selections.
    ///
    /// Returns `Ok(None)` while still `Loading`. A failed fetch yields the
    /// board of an empty repository.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError`] when a loaded ticket violates the input
    /// contract.
    pub fn view(&self) -> Result<Option<BoardView>, AggregateError> {
        let empty;
        let repository = match &self.state {
            BoardState::Loading => return Ok(None),
            BoardState::Ready(repository) => repository,
            BoardState::Failed(_) => {
                empty = TicketRepository::empty();
                &empty
            }
        };

        let grouped = aggregate::group(repository.tickets(), repository.users(), self.dimension)?;
        Ok(Some(BoardView::new(self.dimension, self.criterion, &grouped)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Payload, Status, Ticket, User};
    use crate::prefs::MemoryStore;
    use std::cell::Cell;

    struct StubSource {
        result: fn() -> Result<Payload, SourceError>,
        calls: Cell<usize>,
    }

    impl StubSource {
        fn new(result: fn() -> Result<Payload, SourceError>) -> Self {
            Self {
                result,
                calls: Cell::new(0),
            }
        }
    }

    impl DataSource for StubSource {
        fn fetch(&self) -> Result<Payload, SourceError> {
            self.calls.set(self.calls.get() + 1);
            (self.result)()
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }
    }

    fn payload() -> Result<Payload, SourceError> {
        Ok(Payload {
            tickets: vec![
                Ticket {
                    id: "CAM-1".to_string(),
                    title: "Beta".to_string(),
                    tag: Vec::new(),
                    user_id: "usr-1".to_string(),
                    status: Status::Todo,
                    priority: 1,
                },
                Ticket {
                    id: "CAM-2".to_string(),
                    title: "alpha".to_string(),
                    tag: Vec::new(),
                    user_id: "ghost".to_string(),
                    status: Status::Todo,
                    priority: 3,
                },
            ],
            users: vec![User {
                id: "usr-1".to_string(),
                name: "Anoop".to_string(),
                available: true,
            }],
        })
    }

    fn broken() -> Result<Payload, SourceError> {
        Err(SourceError::Transport {
            url: "https://example.invalid".to_string(),
            message: "connection refused".to_string(),
        })
    }

    fn bad_priority() -> Result<Payload, SourceError> {
        let mut payload = payload()?;
        payload.tickets[0].priority = 12;
        Ok(payload)
    }

    fn session() -> Session<MemoryStore> {
        Session::start(PreferenceStore::new(MemoryStore::default()))
    }

    #[test]
    fn starts_loading_with_defaults() {
        let session = session();
        assert!(matches!(session.state(), BoardState::Loading));
        assert_eq!(session.dimension(), GroupingDimension::ByStatus);
        assert_eq!(session.criterion(), SortCriterion::ByPriorityDesc);
        assert!(session.view().expect("view").is_none());
    }

    #[test]
    fn start_picks_up_stored_dimension() {
        let prefs = PreferenceStore::new(MemoryStore::default());
        prefs.save(GroupingDimension::ByUser);
        let session = Session::start(prefs);
        assert_eq!(session.dimension(), GroupingDimension::ByUser);
    }

    #[test]
    fn successful_fetch_becomes_ready_and_builds_board() {
        let mut session = session();
        let source = StubSource::new(payload);
        assert!(matches!(session.fetch(&source), BoardState::Ready(_)));

        let board = session.view().expect("view").expect("ready board");
        assert_eq!(board.groups.len(), 4);
        let ids: Vec<&str> = board.groups[0].tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["CAM-2", "CAM-1"]);
    }

    #[test]
    fn fetch_happens_once_per_session() {
        let mut session = session();
        let source = StubSource::new(payload);
        session.fetch(&source);
        session.fetch(&source);
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn failed_fetch_renders_empty_padded_board() {
        let mut session = session();
        let source = StubSource::new(broken);
        assert!(matches!(session.fetch(&source), BoardState::Failed(_)));

        let board = session.view().expect("view").expect("failed board");
        assert_eq!(board.groups.len(), 4);
        assert!(board.groups.iter().all(|g| g.count == 0));

        session.fetch(&StubSource::new(payload));
        assert!(matches!(session.state(), BoardState::Failed(_)));
    }

    #[test]
    fn selections_change_view_and_only_dimension_persists() {
        let mut session = session();
        session.fetch(&StubSource::new(payload));

        session.select_dimension(GroupingDimension::ByUser);
        session.select_criterion(SortCriterion::ByTitleAsc);
        let board = session.view().expect("view").expect("board");
        let keys: Vec<&str> = board.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["Anoop", "Unknown"]);
        assert_eq!(board.criterion, SortCriterion::ByTitleAsc);

        assert_eq!(session.prefs().load(), GroupingDimension::ByUser);
        assert_eq!(
            session
                .prefs()
                .backing()
                .get(crate::prefs::GROUPING_KEY)
                .expect("get")
                .as_deref(),
            Some("user")
        );
    }

    #[test]
    fn out_of_range_priority_surfaces_from_view() {
        let mut session = session();
        session.fetch(&StubSource::new(bad_priority));
        let err = session.view().expect_err("must fail");
        assert!(matches!(
            err,
            AggregateError::PriorityOutOfRange { ref ticket_id, value: 12 } if ticket_id == "CAM-1"
        ));
    }
}
