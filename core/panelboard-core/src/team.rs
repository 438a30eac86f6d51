//! The `Team` facade: a membership group with prefix/suffix decoration.
//!
//! Prefix and suffix limits are checked at this API edge before the host is
//! touched, so an over-long label never half-applies. `total` is the derived
//! aggregate the event pipeline also computes: the sum of member scores for
//! one objective, recomputed on demand rather than stored.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use panelboard_host::{unit_len, TeamRef, NAME_LIMIT};

use crate::board::BoardShared;
use crate::error::{BoardError, Result};
use crate::objective::Objective;

pub(crate) struct TeamState {
    name: String,
    raw: TeamRef,
    proxy: TeamRef,
    board: Weak<BoardShared>,
    valid: Cell<bool>,
}

impl TeamState {
    pub(crate) fn new(raw: TeamRef, proxy: TeamRef, board: Weak<BoardShared>) -> Rc<Self> {
        Rc::new(TeamState {
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

    pub(crate) fn proxy(&self) -> TeamRef {
        Rc::clone(&self.proxy)
    }

    pub(crate) fn invalidate(&self) {
        self.valid.set(false);
    }
}

fn check_decoration(label: &str) -> Result<()> {
    let len = unit_len(label);
    if len > NAME_LIMIT {
        return Err(BoardError::LabelTooLong {
            len,
            max: NAME_LIMIT,
        });
    }
    Ok(())
}

/// Wrapper handle for one team. Cheap to clone; clones share identity.
#[derive(Clone)]
pub struct Team {
    state: Rc<TeamState>,
}

impl Team {
    pub(crate) fn from_state(state: Rc<TeamState>) -> Self {
        Team { state }
    }

    fn guard(&self) -> Result<()> {
        if !self.state.valid.get() {
            return Err(BoardError::no_longer_valid("team", &self.state.name));
        }
        match self.state.board.upgrade() {
            Some(board) if board.is_valid() => Ok(()),
            Some(board) => Err(BoardError::no_longer_valid("board", board.display_label())),
            None => Err(BoardError::no_longer_valid("board", &self.state.name)),
        }
    }

    fn host_err(&self, err: panelboard_host::HostError) -> BoardError {
        BoardError::from_host("team", &self.state.name, err)
    }

    /// Immutable code name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn is_valid(&self) -> bool {
        self.state.valid.get()
    }

    /// The intercepted node host-side code should hold.
    pub fn host_node(&self) -> TeamRef {
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

    pub fn prefix(&self) -> Result<String> {
        self.guard()?;
        self.state.raw.prefix().map_err(|e| self.host_err(e))
    }

    pub fn set_prefix(&self, prefix: &str) -> Result<()> {
        check_decoration(prefix)?;
        self.guard()?;
        self.state.raw.set_prefix(prefix).map_err(|e| self.host_err(e))
    }

    pub fn suffix(&self) -> Result<String> {
        self.guard()?;
        self.state.raw.suffix().map_err(|e| self.host_err(e))
    }

    pub fn set_suffix(&self, suffix: &str) -> Result<()> {
        check_decoration(suffix)?;
        self.guard()?;
        self.state.raw.set_suffix(suffix).map_err(|e| self.host_err(e))
    }

    pub fn friendly_fire(&self) -> Result<bool> {
        self.guard()?;
        self.state.raw.friendly_fire().map_err(|e| self.host_err(e))
    }

    pub fn set_friendly_fire(&self, enabled: bool) -> Result<()> {
        self.guard()?;
        self.state
            .raw
            .set_friendly_fire(enabled)
            .map_err(|e| self.host_err(e))
    }

    pub fn can_see_invisible(&self) -> Result<bool> {
        self.guard()?;
        self.state
            .raw
            .can_see_invisible()
            .map_err(|e| self.host_err(e))
    }

    pub fn set_can_see_invisible(&self, enabled: bool) -> Result<()> {
        self.guard()?;
        self.state
            .raw
            .set_can_see_invisible(enabled)
            .map_err(|e| self.host_err(e))
    }

    pub fn members(&self) -> Result<Vec<String>> {
        self.guard()?;
        self.state.raw.members().map_err(|e| self.host_err(e))
    }

    pub fn add_member(&self, entry: &str) -> Result<()> {
        self.guard()?;
        self.state.raw.add_member(entry).map_err(|e| self.host_err(e))
    }

    pub fn remove_member(&self, entry: &str) -> Result<bool> {
        self.guard()?;
        self.state
            .raw
            .remove_member(entry)
            .map_err(|e| self.host_err(e))
    }

    pub fn has_member(&self, entry: &str) -> Result<bool> {
        self.guard()?;
        self.state.raw.has_member(entry).map_err(|e| self.host_err(e))
    }

    /// Derived total of member scores for one objective. Members without a
    /// score count as zero.
    pub fn total(&self, objective: &Objective) -> Result<i32> {
        self.guard()?;
        let mut total = 0i32;
        for member in self.members()? {
            total = total.saturating_add(objective.score(&member).unwrap_or(0));
        }
        Ok(total)
    }

    /// Unregisters the host node and permanently invalidates this wrapper.
    pub fn unregister(&self) -> Result<()> {
        self.guard()?;
        if let Some(board) = self.state.board.upgrade() {
            board.forget_team(&self.state.raw);
        }
        self.state.raw.unregister().map_err(|e| self.host_err(e))
    }
}
