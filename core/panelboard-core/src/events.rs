//! Cancellable score events, the listener set, and the write pipeline.
//!
//! Every score write that transits an interception proxy or a wrapper facade
//! comes through `route_score_write`. The individual `ScoreChange` always
//! fires first; if the entry sits on a team, a derived `TeamTotalChange` is
//! recomputed (never read from stored state) and fires second with its
//! cancelled flag defaulted from the individual event. Cancelling either one
//! vetoes the raw write.
//!
//! Listener liveness follows the guard pattern: the set holds weak
//! references and sweeps dead slots lazily on dispatch, so dropping a
//! `ListenerGuard` is the unsubscribe.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Serialize;

use panelboard_host::{HostError, ObjectiveRef};

use crate::board::BoardShared;

// ═══════════════════════════════════════════════════════════════════════════════
// Event Payloads
// ═══════════════════════════════════════════════════════════════════════════════

/// Dispatch tags. Listeners only receive events whose kind matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ScoreChange,
    TeamTotalChange,
}

/// One entry's score is about to change.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreChange {
    pub objective: String,
    pub entry: String,
    pub previous: i32,
    pub value: i32,
    cancelled: bool,
}

/// A team's derived total for one objective is about to change, because a
/// member entry's score is. `previous_total` and `total` are recomputed at
/// write time over the current membership.
#[derive(Debug, Clone, Serialize)]
pub struct TeamTotalChange {
    pub team: String,
    pub objective: String,
    /// The member entry whose write triggered this event.
    pub entry: String,
    pub previous_total: i32,
    pub total: i32,
    cancelled: bool,
}

/// The one argument every listener callback receives.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardEvent {
    Score(ScoreChange),
    TeamTotal(TeamTotalChange),
}

impl BoardEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BoardEvent::Score(_) => EventKind::ScoreChange,
            BoardEvent::TeamTotal(_) => EventKind::TeamTotalChange,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            BoardEvent::Score(e) => e.cancelled,
            BoardEvent::TeamTotal(e) => e.cancelled,
        }
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        match self {
            BoardEvent::Score(e) => e.cancelled = cancelled,
            BoardEvent::TeamTotal(e) => e.cancelled = cancelled,
        }
    }

    pub fn cancel(&mut self) {
        self.set_cancelled(true);
    }
}

/// What happened to a score write routed through the pipeline. Cancellation
/// is a normal outcome, distinguishable from every error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    Cancelled,
}

impl WriteOutcome {
    pub fn applied(self) -> bool {
        self == WriteOutcome::Applied
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Listener Set
// ═══════════════════════════════════════════════════════════════════════════════

struct ListenerSlot {
    kind: EventKind,
    callback: RefCell<Box<dyn FnMut(&mut BoardEvent)>>,
}

/// Keeps a listener subscribed. Dropping the guard unsubscribes; the set
/// sweeps the dead slot on the next dispatch.
pub struct ListenerGuard {
    slot: Rc<ListenerSlot>,
}

impl ListenerGuard {
    pub fn kind(&self) -> EventKind {
        self.slot.kind
    }
}

/// Ordered listener list scanned at dispatch time. Not safe against a
/// listener unsubscribing itself from inside its own callback.
#[derive(Default)]
pub(crate) struct ListenerSet {
    slots: RefCell<Vec<Weak<ListenerSlot>>>,
}

impl ListenerSet {
    pub(crate) fn add(
        &self,
        kind: EventKind,
        callback: impl FnMut(&mut BoardEvent) + 'static,
    ) -> ListenerGuard {
        let slot = Rc::new(ListenerSlot {
            kind,
            callback: RefCell::new(Box::new(callback)),
        });
        self.slots.borrow_mut().push(Rc::downgrade(&slot));
        ListenerGuard { slot }
    }

    pub(crate) fn dispatch(&self, event: &mut BoardEvent) {
        // Snapshot live slots first so callbacks never run under the list
        // borrow; dead guards are swept in the same pass.
        let live: Vec<Rc<ListenerSlot>> = {
            let mut slots = self.slots.borrow_mut();
            let before = slots.len();
            slots.retain(|slot| slot.strong_count() > 0);
            let swept = before - slots.len();
            if swept > 0 {
                tracing::debug!(swept, "Swept dead listener slots");
            }
            slots.iter().filter_map(Weak::upgrade).collect()
        };

        let kind = event.kind();
        for slot in live {
            if slot.kind == kind {
                (slot.callback.borrow_mut())(event);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Write Pipeline
// ═══════════════════════════════════════════════════════════════════════════════

/// Routes one score write through the event pipeline against the internal
/// raw objective reference. Never touches the node's proxy, so the pipeline
/// cannot re-enter itself through an intercepted write.
pub(crate) fn route_score_write(
    board: &BoardShared,
    raw: &ObjectiveRef,
    entry: &str,
    value: i32,
) -> Result<WriteOutcome, HostError> {
    let previous = raw.score(entry)?;

    let mut event = BoardEvent::Score(ScoreChange {
        objective: raw.name(),
        entry: entry.to_string(),
        previous,
        value,
        cancelled: false,
    });
    board.listeners().dispatch(&mut event);
    let individual_cancelled = event.is_cancelled();

    let mut aggregate_cancelled = false;
    if let Some(team) = board.raw().entry_team(entry) {
        let mut previous_total = 0i32;
        for member in team.members()? {
            previous_total = previous_total.saturating_add(raw.score(&member).unwrap_or(0));
        }
        let total = previous_total.saturating_add(value.saturating_sub(previous));

        let mut aggregate = BoardEvent::TeamTotal(TeamTotalChange {
            team: team.name(),
            objective: raw.name(),
            entry: entry.to_string(),
            previous_total,
            total,
            cancelled: individual_cancelled,
        });
        board.listeners().dispatch(&mut aggregate);
        aggregate_cancelled = aggregate.is_cancelled();
    }

    if individual_cancelled || aggregate_cancelled {
        return Ok(WriteOutcome::Cancelled);
    }
    raw.set_score(entry, value)?;
    Ok(WriteOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_drop_unsubscribes() {
        let set = ListenerSet::default();
        let guard = set.add(EventKind::ScoreChange, |event| event.cancel());

        let mut event = BoardEvent::Score(ScoreChange {
            objective: "points".into(),
            entry: "alice".into(),
            previous: 0,
            value: 1,
            cancelled: false,
        });
        set.dispatch(&mut event);
        assert!(event.is_cancelled());

        drop(guard);
        let mut event = BoardEvent::Score(ScoreChange {
            objective: "points".into(),
            entry: "alice".into(),
            previous: 0,
            value: 1,
            cancelled: false,
        });
        set.dispatch(&mut event);
        assert!(!event.is_cancelled());
    }

    #[test]
    fn dispatch_matches_kind_exactly() {
        let set = ListenerSet::default();
        let _guard = set.add(EventKind::TeamTotalChange, |event| event.cancel());

        let mut event = BoardEvent::Score(ScoreChange {
            objective: "points".into(),
            entry: "alice".into(),
            previous: 0,
            value: 1,
            cancelled: false,
        });
        set.dispatch(&mut event);
        assert!(!event.is_cancelled());
    }

    #[test]
    fn later_listener_sees_earlier_cancellation() {
        let set = ListenerSet::default();
        let _cancel = set.add(EventKind::ScoreChange, |event| event.cancel());
        let seen = Rc::new(RefCell::new(None::<bool>));
        let seen_in = Rc::clone(&seen);
        let _observe = set.add(EventKind::ScoreChange, move |event| {
            *seen_in.borrow_mut() = Some(event.is_cancelled());
        });

        let mut event = BoardEvent::Score(ScoreChange {
            objective: "points".into(),
            entry: "alice".into(),
            previous: 0,
            value: 1,
            cancelled: false,
        });
        set.dispatch(&mut event);
        assert_eq!(*seen.borrow(), Some(true));
    }
}
