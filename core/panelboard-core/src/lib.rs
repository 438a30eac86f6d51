//! # panelboard-core
//!
//! Transparent wrapper layer over a host-owned scoreboard graph.
//!
//! The host keeps full authority over its boards, objectives, teams, and
//! scores; this crate wraps those nodes so that:
//!
//! - every raw node has exactly one wrapper, found again on every re-wrap;
//! - mutation is intercepted even when callers reach a node through the
//!   host's own lookup paths, because the wrapper injects a proxy into the
//!   host's node table on first contact;
//! - score writes become cancellable events, with a derived, independently
//!   cancellable team-total event behind them;
//! - panel fields render labels up to 48 chars across the host's 16-char
//!   fields using team prefix/suffix packing.
//!
//! ## Design Principles
//!
//! - **Synchronous**: every call completes in-process; nothing blocks.
//! - **Single-threaded**: the host drives this graph from one thread, so
//!   the crate uses `Rc`/`RefCell` and must not be shared across threads.
//! - **Host truth wins**: the identity tables are caches; a host
//!   "unregistered" signal invalidates the wrapper, it never papers over it.
//!
//! ## Quick Start
//!
//! ```rust
//! use panelboard_core::{Board, EventKind, Panel};
//! use panelboard_host::{HostRef, MemoryHost};
//!
//! let host: HostRef = MemoryHost::new();
//! let board = Board::main(&host);
//! let objective = board.register_objective("points", "dummy")?;
//!
//! let _guard = board.add_listener(EventKind::ScoreChange, |event| {
//!     if event.is_cancelled() {
//!         // an earlier listener vetoed the write
//!     }
//! });
//! objective.set_score("alice", 10)?;
//!
//! let panel = Panel::new(&board, "sidebar")?;
//! let field = panel.register_field("a label well over sixteen chars", Some("42"), true)?;
//! # panel.unregister_field(field)?;
//! # Ok::<(), panelboard_core::BoardError>(())
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod events;
pub mod objective;
pub mod panel;
pub mod team;

mod proxy;
mod registry;

pub use board::Board;
pub use config::{load_panel_config, save_panel_config, PanelConfig};
pub use error::{BoardError, Result};
pub use events::{
    BoardEvent, EventKind, ListenerGuard, ScoreChange, TeamTotalChange, WriteOutcome,
};
pub use objective::Objective;
pub use panel::pack::FIELD_LABEL_LIMIT;
pub use panel::{FieldId, FieldInfo, Panel};
pub use team::Team;
