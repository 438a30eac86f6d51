//! Interception proxies: stand-ins satisfying the host node traits.
//!
//! Each proxy keeps two references apart by construction: `raw`, the real
//! host node used for every delegation, and the back-reference to wrapper
//! state used for interception. The proxy never calls wrapper public API
//! while delegating, so delegation cannot cycle back into the wrapper.
//!
//! Interception is a small fixed set:
//! - `ObjectiveProxy::set_score` routes through the event pipeline;
//! - `BoardProxy` node lookups and registrations hand back proxied nodes;
//! - `unregister` through any proxy also invalidates the wrapper cache.
//! Everything else forwards unchanged, so host-side code that found a node
//! through the host's own table cannot tell it holds a proxy.

use std::any::Any;
use std::rc::{Rc, Weak};

use panelboard_host::{
    BoardRef, DisplaySlot, HostBoard, HostObjective, HostTeam, ObjectiveRef, Result, TeamRef,
};

use crate::board::BoardShared;
use crate::events::route_score_write;

// ═══════════════════════════════════════════════════════════════════════════════
// Objective Proxy
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) struct ObjectiveProxy {
    raw: ObjectiveRef,
    board: Weak<BoardShared>,
}

impl ObjectiveProxy {
    pub(crate) fn new(raw: ObjectiveRef, board: Weak<BoardShared>) -> Self {
        ObjectiveProxy { raw, board }
    }

    pub(crate) fn raw(&self) -> &ObjectiveRef {
        &self.raw
    }
}

impl HostObjective for ObjectiveProxy {
    fn name(&self) -> String {
        self.raw.name()
    }

    fn criterion(&self) -> String {
        self.raw.criterion()
    }

    fn display_name(&self) -> Result<String> {
        self.raw.display_name()
    }

    fn set_display_name(&self, name: &str) -> Result<()> {
        self.raw.set_display_name(name)
    }

    fn display_slot(&self) -> Result<DisplaySlot> {
        self.raw.display_slot()
    }

    fn set_display_slot(&self, slot: DisplaySlot) -> Result<()> {
        self.raw.set_display_slot(slot)
    }

    fn score(&self, entry: &str) -> Result<i32> {
        self.raw.score(entry)
    }

    fn set_score(&self, entry: &str, value: i32) -> Result<()> {
        match self.board.upgrade() {
            // A cancelled write is a successful no-op from the host's side;
            // host callers have no cancellation channel.
            Some(board) if board.is_valid() => {
                route_score_write(&board, &self.raw, entry, value).map(|_| ())
            }
            _ => self.raw.set_score(entry, value),
        }
    }

    fn clear_entry(&self, entry: &str) -> Result<()> {
        self.raw.clear_entry(entry)
    }

    fn entries(&self) -> Result<Vec<String>> {
        self.raw.entries()
    }

    fn is_registered(&self) -> bool {
        self.raw.is_registered()
    }

    fn unregister(&self) -> Result<()> {
        if let Some(board) = self.board.upgrade() {
            board.forget_objective(&self.raw);
        }
        self.raw.unregister()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Team Proxy
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) struct TeamProxy {
    raw: TeamRef,
    board: Weak<BoardShared>,
}

impl TeamProxy {
    pub(crate) fn new(raw: TeamRef, board: Weak<BoardShared>) -> Self {
        TeamProxy { raw, board }
    }

    pub(crate) fn raw(&self) -> &TeamRef {
        &self.raw
    }
}

impl HostTeam for TeamProxy {
    fn name(&self) -> String {
        self.raw.name()
    }

    fn display_name(&self) -> Result<String> {
        self.raw.display_name()
    }

    fn set_display_name(&self, name: &str) -> Result<()> {
        self.raw.set_display_name(name)
    }

    fn prefix(&self) -> Result<String> {
        self.raw.prefix()
    }

    fn set_prefix(&self, prefix: &str) -> Result<()> {
        self.raw.set_prefix(prefix)
    }

    fn suffix(&self) -> Result<String> {
        self.raw.suffix()
    }

    fn set_suffix(&self, suffix: &str) -> Result<()> {
        self.raw.set_suffix(suffix)
    }

    fn friendly_fire(&self) -> Result<bool> {
        self.raw.friendly_fire()
    }

    fn set_friendly_fire(&self, enabled: bool) -> Result<()> {
        self.raw.set_friendly_fire(enabled)
    }

    fn can_see_invisible(&self) -> Result<bool> {
        self.raw.can_see_invisible()
    }

    fn set_can_see_invisible(&self, enabled: bool) -> Result<()> {
        self.raw.set_can_see_invisible(enabled)
    }

    fn members(&self) -> Result<Vec<String>> {
        self.raw.members()
    }

    fn add_member(&self, entry: &str) -> Result<()> {
        self.raw.add_member(entry)
    }

    fn remove_member(&self, entry: &str) -> Result<bool> {
        self.raw.remove_member(entry)
    }

    fn has_member(&self, entry: &str) -> Result<bool> {
        self.raw.has_member(entry)
    }

    fn is_registered(&self) -> bool {
        self.raw.is_registered()
    }

    fn unregister(&self) -> Result<()> {
        if let Some(board) = self.board.upgrade() {
            board.forget_team(&self.raw);
        }
        self.raw.unregister()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Board Proxy
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) struct BoardProxy {
    raw: BoardRef,
    shared: Weak<BoardShared>,
}

impl BoardProxy {
    pub(crate) fn new(raw: BoardRef, shared: Weak<BoardShared>) -> Self {
        BoardProxy { raw, shared }
    }

    pub(crate) fn shared(&self) -> Option<Rc<BoardShared>> {
        self.shared.upgrade()
    }

    pub(crate) fn raw(&self) -> &BoardRef {
        &self.raw
    }

    fn wrap_objective(&self, node: ObjectiveRef) -> ObjectiveRef {
        match self.shared.upgrade() {
            Some(shared) if shared.is_valid() => shared.adopt_objective(node).proxy(),
            _ => node,
        }
    }

    fn wrap_team(&self, node: TeamRef) -> TeamRef {
        match self.shared.upgrade() {
            Some(shared) if shared.is_valid() => shared.adopt_team(node).proxy(),
            _ => node,
        }
    }
}

impl HostBoard for BoardProxy {
    fn objective(&self, name: &str) -> Option<ObjectiveRef> {
        self.raw.objective(name).map(|node| self.wrap_objective(node))
    }

    fn register_objective(&self, name: &str, criterion: &str) -> Result<ObjectiveRef> {
        let node = self.raw.register_objective(name, criterion)?;
        Ok(self.wrap_objective(node))
    }

    fn objectives(&self) -> Vec<ObjectiveRef> {
        self.raw
            .objectives()
            .into_iter()
            .map(|node| self.wrap_objective(node))
            .collect()
    }

    fn replace_objective(&self, name: &str, node: ObjectiveRef) -> Result<()> {
        self.raw.replace_objective(name, node)
    }

    fn team(&self, name: &str) -> Option<TeamRef> {
        self.raw.team(name).map(|node| self.wrap_team(node))
    }

    fn register_team(&self, name: &str) -> Result<TeamRef> {
        let node = self.raw.register_team(name)?;
        Ok(self.wrap_team(node))
    }

    fn teams(&self) -> Vec<TeamRef> {
        self.raw
            .teams()
            .into_iter()
            .map(|node| self.wrap_team(node))
            .collect()
    }

    fn replace_team(&self, name: &str, node: TeamRef) -> Result<()> {
        self.raw.replace_team(name, node)
    }

    fn entry_team(&self, entry: &str) -> Option<TeamRef> {
        self.raw.entry_team(entry).map(|node| self.wrap_team(node))
    }

    fn reset_entry(&self, entry: &str) -> Result<()> {
        self.raw.reset_entry(entry)
    }

    fn is_registered(&self) -> bool {
        self.raw.is_registered()
    }

    fn unregister(&self) -> Result<()> {
        if let Some(shared) = self.shared.upgrade() {
            shared.invalidate();
        }
        self.raw.unregister()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
