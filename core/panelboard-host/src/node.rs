//! Node traits the host exposes for objectives and teams.
//!
//! All methods take `&self`: nodes are shared through `Rc` and host
//! implementations use interior mutability. Mutators return
//! `HostError::Unregistered` once the node has been unregistered.
//!
//! `as_any` exists so the wrapper core can tell its own interception proxies
//! apart from raw host nodes when asked to wrap something it may have already
//! wrapped.

use std::any::Any;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ═══════════════════════════════════════════════════════════════════════════════
// Display Slots
// ═══════════════════════════════════════════════════════════════════════════════

/// Where the host renders an objective, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplaySlot {
    #[default]
    None,
    SideBar,
    BelowName,
    PlayerList,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Objective Nodes
// ═══════════════════════════════════════════════════════════════════════════════

/// A named counter collection owned by a host board.
///
/// Code name and criterion are immutable and host-assigned; everything else
/// may change over the node's life. Score entries come into existence on
/// first `set_score` and are never independently destroyed.
pub trait HostObjective {
    /// Immutable code name (≤16 chars). Usable even after unregistration,
    /// for diagnostics.
    fn name(&self) -> String;

    /// Immutable criterion tag assigned at registration.
    fn criterion(&self) -> String;

    fn display_name(&self) -> Result<String>;
    fn set_display_name(&self, name: &str) -> Result<()>;

    fn display_slot(&self) -> Result<DisplaySlot>;
    fn set_display_slot(&self, slot: DisplaySlot) -> Result<()>;

    /// Current value for an entry key; 0 if the entry has never been scored.
    fn score(&self, entry: &str) -> Result<i32>;
    fn set_score(&self, entry: &str, value: i32) -> Result<()>;

    /// Removes the entry's row from this objective, if present.
    fn clear_entry(&self, entry: &str) -> Result<()>;

    /// Entry keys that currently hold a score, in no particular order.
    fn entries(&self) -> Result<Vec<String>>;

    fn is_registered(&self) -> bool;
    fn unregister(&self) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Team Nodes
// ═══════════════════════════════════════════════════════════════════════════════

/// A named membership group. Prefix and suffix render around every member's
/// row, which is what makes them usable for label extension.
pub trait HostTeam {
    /// Immutable code name (≤16 chars).
    fn name(&self) -> String;

    fn display_name(&self) -> Result<String>;
    fn set_display_name(&self, name: &str) -> Result<()>;

    fn prefix(&self) -> Result<String>;
    /// Rejects prefixes over 16 chars with `LabelTooLong`.
    fn set_prefix(&self, prefix: &str) -> Result<()>;

    fn suffix(&self) -> Result<String>;
    /// Rejects suffixes over 16 chars with `LabelTooLong`.
    fn set_suffix(&self, suffix: &str) -> Result<()>;

    fn friendly_fire(&self) -> Result<bool>;
    fn set_friendly_fire(&self, enabled: bool) -> Result<()>;

    fn can_see_invisible(&self) -> Result<bool>;
    fn set_can_see_invisible(&self, enabled: bool) -> Result<()>;

    fn members(&self) -> Result<Vec<String>>;
    /// Adding an entry removes it from any team it was on before; the host
    /// keeps membership exclusive.
    fn add_member(&self, entry: &str) -> Result<()>;
    /// Returns whether the entry was actually a member.
    fn remove_member(&self, entry: &str) -> Result<bool>;
    fn has_member(&self, entry: &str) -> Result<bool>;

    fn is_registered(&self) -> bool;
    fn unregister(&self) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

/// Shared handle aliases. The graph is single-threaded by host guarantee, so
/// plain `Rc` is the ownership model throughout.
pub type ObjectiveRef = Rc<dyn HostObjective>;
pub type TeamRef = Rc<dyn HostTeam>;
