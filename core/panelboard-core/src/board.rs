//! The `Board` facade over one host scoreboard.
//!
//! A board owns the per-kind identity tables, the listener set, and the
//! injection step that makes interception transparent: when a node is first
//! wrapped on a non-main board, its table slot in the host is overwritten
//! with the proxy, so later host-path lookups hand out the intercepted
//! object without the host ever learning anything changed. The main board's
//! host tables are never touched; only caller-created labelled boards are
//! eligible for injection.
//!
//! The main board is a process-lifetime singleton behind an init-once cell;
//! labelled boards live in a thread-local directory from `open` until
//! `unregister`, which is what keeps their wrappers alive for the life of
//! the underlying host nodes.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use once_cell::unsync::OnceCell;

use panelboard_host::{BoardRef, HostRef, ObjectiveRef, TeamRef};

use crate::error::{BoardError, Result};
use crate::events::{BoardEvent, EventKind, ListenerGuard, ListenerSet};
use crate::objective::{Objective, ObjectiveState};
use crate::proxy::{BoardProxy, ObjectiveProxy, TeamProxy};
use crate::registry::{identity_key, IdentityTable};
use crate::team::{Team, TeamState};

thread_local! {
    static MAIN_BOARD: OnceCell<Rc<BoardShared>> = OnceCell::new();
    static OPEN_BOARDS: RefCell<HashMap<String, Rc<BoardShared>>> =
        RefCell::new(HashMap::new());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Shared Board State
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) struct BoardShared {
    label: Option<String>,
    main: bool,
    valid: Cell<bool>,
    host: HostRef,
    raw: BoardRef,
    proxy: RefCell<Option<BoardRef>>,
    listeners: ListenerSet,
    objectives: IdentityTable<ObjectiveState>,
    teams: IdentityTable<TeamState>,
    weak_self: RefCell<Weak<BoardShared>>,
}

impl BoardShared {
    fn new(host: HostRef, raw: BoardRef, label: Option<String>, main: bool) -> Rc<Self> {
        let shared = Rc::new(BoardShared {
            label,
            main,
            valid: Cell::new(true),
            host,
            raw,
            proxy: RefCell::new(None),
            listeners: ListenerSet::default(),
            objectives: IdentityTable::new(),
            teams: IdentityTable::new(),
            weak_self: RefCell::new(Weak::new()),
        });
        *shared.weak_self.borrow_mut() = Rc::downgrade(&shared);

        if !shared.main {
            let proxy: BoardRef = Rc::new(BoardProxy::new(
                Rc::clone(&shared.raw),
                Rc::downgrade(&shared),
            ));
            *shared.proxy.borrow_mut() = Some(Rc::clone(&proxy));
            if let Some(label) = &shared.label {
                if let Err(error) = shared.host.replace_board(label, proxy) {
                    tracing::warn!(
                        kind = "board",
                        name = %label,
                        %error,
                        "Board proxy injection failed; host-path lookups stay raw"
                    );
                }
            }
        }
        shared
    }

    fn weak(&self) -> Weak<BoardShared> {
        self.weak_self.borrow().clone()
    }

    pub(crate) fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    pub(crate) fn raw(&self) -> &BoardRef {
        &self.raw
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.valid.get()
    }

    pub(crate) fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("main")
    }

    /// Resolves a raw objective to its one wrapper, creating and injecting a
    /// proxy on first contact. Idempotent for proxies this board produced.
    pub(crate) fn adopt_objective(&self, node: ObjectiveRef) -> Rc<ObjectiveState> {
        let unwrapped = {
            if let Some(proxy) = node.as_any().downcast_ref::<ObjectiveProxy>() {
                if let Some(state) = self.objectives.get(identity_key(proxy.raw())) {
                    return state;
                }
                Some(Rc::clone(proxy.raw()))
            } else {
                None
            }
        };
        let node = unwrapped.unwrap_or(node);

        let key = identity_key(&node);
        if let Some(state) = self.objectives.get(key) {
            return state;
        }

        let proxy: ObjectiveRef = Rc::new(ObjectiveProxy::new(Rc::clone(&node), self.weak()));
        let state = ObjectiveState::new(node, Rc::clone(&proxy), self.weak());
        self.objectives.insert(key, Rc::clone(&state));

        if !self.main {
            if let Err(error) = self.raw.replace_objective(state.name(), proxy) {
                tracing::warn!(
                    kind = "objective",
                    name = %state.name(),
                    %error,
                    "Proxy injection failed; host-path lookups stay raw"
                );
            }
        }
        state
    }

    /// Team counterpart of `adopt_objective`.
    pub(crate) fn adopt_team(&self, node: TeamRef) -> Rc<TeamState> {
        let unwrapped = {
            if let Some(proxy) = node.as_any().downcast_ref::<TeamProxy>() {
                if let Some(state) = self.teams.get(identity_key(proxy.raw())) {
                    return state;
                }
                Some(Rc::clone(proxy.raw()))
            } else {
                None
            }
        };
        let node = unwrapped.unwrap_or(node);

        let key = identity_key(&node);
        if let Some(state) = self.teams.get(key) {
            return state;
        }

        let proxy: TeamRef = Rc::new(TeamProxy::new(Rc::clone(&node), self.weak()));
        let state = TeamState::new(node, Rc::clone(&proxy), self.weak());
        self.teams.insert(key, Rc::clone(&state));

        if !self.main {
            if let Err(error) = self.raw.replace_team(state.name(), proxy) {
                tracing::warn!(
                    kind = "team",
                    name = %state.name(),
                    %error,
                    "Proxy injection failed; host-path lookups stay raw"
                );
            }
        }
        state
    }

    /// Drops the cache entry for a node the host no longer has and marks its
    /// wrapper dead. Host truth is authoritative here.
    pub(crate) fn forget_objective(&self, raw: &ObjectiveRef) {
        if let Some(state) = self.objectives.remove(identity_key(raw)) {
            state.invalidate();
        }
    }

    pub(crate) fn forget_team(&self, raw: &TeamRef) {
        if let Some(state) = self.teams.remove(identity_key(raw)) {
            state.invalidate();
        }
    }

    /// Kills the board wrapper and every node wrapper it produced.
    pub(crate) fn invalidate(&self) {
        self.valid.set(false);
        for state in self.objectives.drain() {
            state.invalidate();
        }
        for state in self.teams.drain() {
            state.invalidate();
        }
    }

    fn check_valid(&self) -> Result<()> {
        if self.valid.get() {
            Ok(())
        } else {
            Err(BoardError::no_longer_valid("board", self.display_label()))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Public Facade
// ═══════════════════════════════════════════════════════════════════════════════

/// Wrapper over one host scoreboard. Cheap to clone; clones share identity.
#[derive(Clone)]
pub struct Board {
    shared: Rc<BoardShared>,
}

impl Board {
    /// The main board singleton. The first call binds it to `host`'s main
    /// board for the life of the process; later calls return the same
    /// wrapper and ignore the argument.
    pub fn main(host: &HostRef) -> Board {
        MAIN_BOARD.with(|cell| Board {
            shared: Rc::clone(cell.get_or_init(|| {
                BoardShared::new(Rc::clone(host), host.main_board(), None, true)
            })),
        })
    }

    /// Opens the labelled board, creating it on the host if needed. Opening
    /// the same label twice yields the same wrapper.
    pub fn open(host: &HostRef, label: &str) -> Result<Board> {
        if label.is_empty() {
            return Err(BoardError::EmptyName);
        }
        if let Some(shared) = OPEN_BOARDS.with(|boards| boards.borrow().get(label).cloned()) {
            if shared.is_valid() {
                return Ok(Board { shared });
            }
        }

        let raw = match host.board(label) {
            Some(board) => board,
            None => host
                .create_board(label)
                .map_err(|e| BoardError::from_host("board", label, e))?,
        };
        // An injected proxy from an earlier wrapper resolves back to it; a
        // stale proxy is unwrapped so the new wrapper delegates to the real
        // board, never through a dead proxy.
        let unwrapped = {
            if let Some(proxy) = raw.as_any().downcast_ref::<BoardProxy>() {
                if let Some(shared) = proxy.shared() {
                    if shared.is_valid() {
                        return Ok(Board { shared });
                    }
                }
                Some(Rc::clone(proxy.raw()))
            } else {
                None
            }
        };
        let raw = unwrapped.unwrap_or(raw);

        let shared = BoardShared::new(Rc::clone(host), raw, Some(label.to_string()), false);
        OPEN_BOARDS.with(|boards| {
            boards
                .borrow_mut()
                .insert(label.to_string(), Rc::clone(&shared))
        });
        Ok(Board { shared })
    }

    pub fn label(&self) -> Option<&str> {
        self.shared.label.as_deref()
    }

    pub fn is_main(&self) -> bool {
        self.shared.main
    }

    pub fn is_valid(&self) -> bool {
        self.shared.is_valid()
    }

    /// The reference host-side code should hold: the injected board proxy
    /// for labelled boards, the raw main board otherwise.
    pub fn host_view(&self) -> BoardRef {
        self.shared
            .proxy
            .borrow()
            .clone()
            .unwrap_or_else(|| Rc::clone(&self.shared.raw))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Objectives
    // ─────────────────────────────────────────────────────────────────────

    /// Looks up an objective by code name. Lookup on a dead board degrades
    /// to `None` rather than erroring; mutation paths reject instead.
    pub fn objective(&self, name: &str) -> Option<Objective> {
        if !self.shared.is_valid() {
            tracing::debug!(name, "Objective lookup on invalidated board");
            return None;
        }
        self.shared
            .raw
            .objective(name)
            .map(|node| Objective::from_state(self.shared.adopt_objective(node)))
    }

    pub fn register_objective(&self, name: &str, criterion: &str) -> Result<Objective> {
        self.shared.check_valid()?;
        if name.is_empty() {
            return Err(BoardError::EmptyName);
        }
        let node = self
            .shared
            .raw
            .register_objective(name, criterion)
            .map_err(|e| BoardError::from_host("objective", name, e))?;
        Ok(Objective::from_state(self.shared.adopt_objective(node)))
    }

    pub fn objectives(&self) -> Vec<Objective> {
        if !self.shared.is_valid() {
            return Vec::new();
        }
        self.shared
            .raw
            .objectives()
            .into_iter()
            .map(|node| Objective::from_state(self.shared.adopt_objective(node)))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Teams
    // ─────────────────────────────────────────────────────────────────────

    pub fn team(&self, name: &str) -> Option<Team> {
        if !self.shared.is_valid() {
            tracing::debug!(name, "Team lookup on invalidated board");
            return None;
        }
        self.shared
            .raw
            .team(name)
            .map(|node| Team::from_state(self.shared.adopt_team(node)))
    }

    pub fn register_team(&self, name: &str) -> Result<Team> {
        self.shared.check_valid()?;
        if name.is_empty() {
            return Err(BoardError::EmptyName);
        }
        let node = self
            .shared
            .raw
            .register_team(name)
            .map_err(|e| BoardError::from_host("team", name, e))?;
        Ok(Team::from_state(self.shared.adopt_team(node)))
    }

    pub fn teams(&self) -> Vec<Team> {
        if !self.shared.is_valid() {
            return Vec::new();
        }
        self.shared
            .raw
            .teams()
            .into_iter()
            .map(|node| Team::from_state(self.shared.adopt_team(node)))
            .collect()
    }

    /// The team an entry belongs to, if any.
    pub fn entry_team(&self, entry: &str) -> Option<Team> {
        if !self.shared.is_valid() {
            return None;
        }
        self.shared
            .raw
            .entry_team(entry)
            .map(|node| Team::from_state(self.shared.adopt_team(node)))
    }

    /// Drops an entry's scores and team membership across the board.
    pub fn reset_entry(&self, entry: &str) -> Result<()> {
        self.shared.check_valid()?;
        self.shared
            .raw
            .reset_entry(entry)
            .map_err(|e| BoardError::from_host("board", self.shared.display_label(), e))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Listeners
    // ─────────────────────────────────────────────────────────────────────

    /// Subscribes a callback to events of exactly `kind`. The subscription
    /// lives as long as the returned guard.
    #[must_use = "dropping the guard unsubscribes the listener"]
    pub fn add_listener(
        &self,
        kind: EventKind,
        callback: impl FnMut(&mut BoardEvent) + 'static,
    ) -> ListenerGuard {
        self.shared.listeners.add(kind, callback)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Tears down a labelled board: invalidates every wrapper it produced,
    /// unregisters the host board, and removes it from the directory. The
    /// main board is refused.
    pub fn unregister(&self) -> Result<()> {
        if self.shared.main {
            return Err(BoardError::CannotUnregisterMain);
        }
        self.shared.check_valid()?;
        self.shared.invalidate();

        let label = self.shared.display_label().to_string();
        self.shared
            .raw
            .unregister()
            .map_err(|e| BoardError::from_host("board", &label, e))?;
        if let Some(label) = &self.shared.label {
            OPEN_BOARDS.with(|boards| boards.borrow_mut().remove(label));
            if let Err(error) = self.shared.host.remove_board(label) {
                tracing::warn!(kind = "board", name = %label, %error, "Directory removal failed");
            }
        }
        Ok(())
    }
}
