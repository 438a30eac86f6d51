//! The `Objective` facade: a named counter collection on a board.
//!
//! Holds both halves of the interception pair: `raw` for delegation and the
//! injected proxy for handing out to host-side code. Score writes route
//! through the event pipeline so listeners can observe and veto them; a
//! vetoed write comes back as `WriteOutcome::Cancelled`, never as an error.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use panelboard_host::{DisplaySlot, ObjectiveRef};

use crate::board::BoardShared;
use crate::error::{BoardError, Result};
use crate::events::{route_score_write, WriteOutcome};

pub(crate) struct ObjectiveState {
    name: String,
    raw: ObjectiveRef,
    proxy: ObjectiveRef,
    board: Weak<BoardShared>,
    valid: Cell<bool>,
}

impl ObjectiveState {
    pub(crate) fn new(raw: ObjectiveRef, proxy: ObjectiveRef, board: Weak<BoardShared>) -> Rc<Self> {
        Rc::new(ObjectiveState {
            name: raw.name(),
            raw,
            proxy,
            board,
            valid: Cell::new(true),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn proxy(&self) -> ObjectiveRef {
        Rc::clone(&self.proxy)
    }

    pub(crate) fn invalidate(&self) {
        self.valid.set(false);
    }
}

/// Wrapper handle for one objective. Cheap to clone; clones share identity.
#[derive(Clone)]
pub struct Objective {
    state: Rc<ObjectiveState>,
}

impl Objective {
    pub(crate) fn from_state(state: Rc<ObjectiveState>) -> Self {
        Objective { state }
    }

    fn guard(&self) -> Result<Rc<BoardShared>> {
        if !self.state.valid.get() {
            return Err(BoardError::no_longer_valid("objective", &self.state.name));
        }
        match self.state.board.upgrade() {
            Some(board) if board.is_valid() => Ok(board),
            Some(board) => Err(BoardError::no_longer_valid("board", board.display_label())),
            None => Err(BoardError::no_longer_valid("board", &self.state.name)),
        }
    }

    fn host_err(&self, err: panelboard_host::HostError) -> BoardError {
        BoardError::from_host("objective", &self.state.name, err)
    }

    /// Immutable code name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Immutable criterion tag.
    pub fn criterion(&self) -> String {
        self.state.raw.criterion()
    }

    pub fn is_valid(&self) -> bool {
        self.state.valid.get()
    }

    /// The intercepted node host-side code should hold. Mutations through
    /// it still transit the event pipeline.
    pub fn host_node(&self) -> ObjectiveRef {
        self.state.proxy()
    }

    pub fn display_name(&self) -> Result<String> {
        self.guard()?;
        self.state.raw.display_name().map_err(|e| self.host_err(e))
    }

    pub fn set_display_name(&self, name: &str) -> Result<()> {
        self.guard()?;
        self.state
            .raw
            .set_display_name(name)
            .map_err(|e| self.host_err(e))
    }

    pub fn display_slot(&self) -> Result<DisplaySlot> {
        self.guard()?;
        self.state.raw.display_slot().map_err(|e| self.host_err(e))
    }

    pub fn set_display_slot(&self, slot: DisplaySlot) -> Result<()> {
        self.guard()?;
        self.state
            .raw
            .set_display_slot(slot)
            .map_err(|e| self.host_err(e))
    }

    pub fn score(&self, entry: &str) -> Result<i32> {
        self.guard()?;
        self.state.raw.score(entry).map_err(|e| self.host_err(e))
    }

    /// Writes a score through the event pipeline. Returns `Cancelled` when
    /// a listener vetoed the write; neither the entry nor any team total
    /// changed in that case.
    pub fn set_score(&self, entry: &str, value: i32) -> Result<WriteOutcome> {
        let board = self.guard()?;
        route_score_write(&board, &self.state.raw, entry, value).map_err(|e| self.host_err(e))
    }

    /// Read-modify-write convenience over `set_score`; the delta routes
    /// through the same pipeline.
    pub fn add_score(&self, entry: &str, delta: i32) -> Result<WriteOutcome> {
        let board = self.guard()?;
        let current = self.state.raw.score(entry).map_err(|e| self.host_err(e))?;
        route_score_write(
            &board,
            &self.state.raw,
            entry,
            current.saturating_add(delta),
        )
        .map_err(|e| self.host_err(e))
    }

    /// Direct write for panel plumbing rows. Those rows are presentation,
    /// not scores, so they bypass the event pipeline; a listener can never
    /// veto the panel's own layout.
    pub(crate) fn write_row(&self, entry: &str, value: i32) -> Result<()> {
        self.guard()?;
        self.state
            .raw
            .set_score(entry, value)
            .map_err(|e| self.host_err(e))
    }

    /// Removes the entry's row without raising events; this mirrors the
    /// host's own reset path rather than a score write.
    pub fn clear_entry(&self, entry: &str) -> Result<()> {
        self.guard()?;
        self.state
            .raw
            .clear_entry(entry)
            .map_err(|e| self.host_err(e))
    }

    pub fn entries(&self) -> Result<Vec<String>> {
        self.guard()?;
        self.state.raw.entries().map_err(|e| self.host_err(e))
    }

    /// Unregisters the host node and permanently invalidates this wrapper.
    pub fn unregister(&self) -> Result<()> {
        let board = self.guard()?;
        board.forget_objective(&self.state.raw);
        self.state.raw.unregister().map_err(|e| self.host_err(e))
    }
}
