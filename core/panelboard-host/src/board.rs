//! Board and board-directory traits.
//!
//! `HostBoard` is one scoreboard's node table; `Host` is the directory of
//! boards keyed by label, with the main board living outside the labelled
//! table. The `replace_*` methods are the injection seam: they overwrite a
//! table entry in place without the host treating it as an unregister +
//! re-register, so all future lookups for that code name hand out the
//! replacement.

use std::any::Any;
use std::rc::Rc;

use crate::error::Result;
use crate::node::{ObjectiveRef, TeamRef};

/// One scoreboard: a node table of objectives and teams plus the entry → team
/// membership index.
pub trait HostBoard {
    fn objective(&self, name: &str) -> Option<ObjectiveRef>;
    /// Registers a fresh objective. Fails with `NameTaken` on collision and
    /// `LabelTooLong` for names over 16 chars.
    fn register_objective(&self, name: &str, criterion: &str) -> Result<ObjectiveRef>;
    fn objectives(&self) -> Vec<ObjectiveRef>;
    /// Overwrites the table slot for `name` with `node`. The previous
    /// occupant keeps working; only lookups change.
    fn replace_objective(&self, name: &str, node: ObjectiveRef) -> Result<()>;

    fn team(&self, name: &str) -> Option<TeamRef>;
    fn register_team(&self, name: &str) -> Result<TeamRef>;
    fn teams(&self) -> Vec<TeamRef>;
    fn replace_team(&self, name: &str, node: TeamRef) -> Result<()>;

    /// The team an entry key belongs to, if any. Membership is exclusive.
    fn entry_team(&self, entry: &str) -> Option<TeamRef>;

    /// Drops the entry's scores from every objective and its team
    /// membership, as the host does when an entry leaves the board.
    fn reset_entry(&self, entry: &str) -> Result<()>;

    fn is_registered(&self) -> bool;
    /// Tears down the board and every node on it. The main board cannot be
    /// unregistered; directories reject that upstream.
    fn unregister(&self) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

/// Directory of boards. The main board is a process lifetime singleton; the
/// labelled boards are caller-created and disposable.
pub trait Host {
    fn main_board(&self) -> BoardRef;
    fn board(&self, label: &str) -> Option<BoardRef>;
    /// Creates and registers a labelled board. `NameTaken` on collision.
    fn create_board(&self, label: &str) -> Result<BoardRef>;
    /// Injection seam for the board table itself. Never valid for the main
    /// board; callers enforce that before reaching here.
    fn replace_board(&self, label: &str, board: BoardRef) -> Result<()>;
    /// Removes a labelled board from the directory.
    fn remove_board(&self, label: &str) -> Result<()>;
}

pub type BoardRef = Rc<dyn HostBoard>;
pub type HostRef = Rc<dyn Host>;
