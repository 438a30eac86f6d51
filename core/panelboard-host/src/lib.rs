//! Host scoreboard boundary shared by panelboard and its embedders.
//!
//! This crate is the single seam between the wrapper core and whatever
//! actually owns the scoreboard graph. The wrapper core never names a
//! concrete host type; it depends on the traits here, which an embedder
//! implements over the real host. The traits deliberately include the
//! `replace_*` table operations the interception layer needs to swap a raw
//! node for a proxy; that is the one documented capability edge into host
//! internals.
//!
//! `MemoryHost` is a complete in-memory implementation used as the reference
//! host in tests and by embedders that own the whole graph themselves.

pub mod board;
pub mod error;
pub mod memory;
pub mod node;

pub use board::{BoardRef, Host, HostBoard, HostRef};
pub use error::{HostError, Result};
pub use memory::MemoryHost;
pub use node::{DisplaySlot, HostObjective, HostTeam, ObjectiveRef, TeamRef};

/// Hard host-side limit, in chars, for code names and team prefix/suffix.
pub const NAME_LIMIT: usize = 16;

/// Counts a label the way the host does. One unit = one `char`.
pub fn unit_len(s: &str) -> usize {
    s.chars().count()
}
