//! In-memory reference host.
//!
//! A complete `Host` implementation with the semantics the wrapper core
//! relies on: exclusive team membership, score entries that appear on first
//! write, `Unregistered` surfaced from every mutator after teardown, and
//! `replace_*` table slots that swap what lookups return without touching
//! the old node.
//!
//! Every test in the workspace runs against this host; embedders that own
//! the whole graph can use it directly instead of bridging to an external
//! scoreboard.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::board::{BoardRef, Host, HostBoard};
use crate::error::{HostError, Result};
use crate::node::{DisplaySlot, HostObjective, HostTeam, ObjectiveRef, TeamRef};
use crate::{unit_len, NAME_LIMIT};

fn check_name(name: &str) -> Result<()> {
    let len = unit_len(name);
    if len > NAME_LIMIT {
        return Err(HostError::LabelTooLong {
            len,
            max: NAME_LIMIT,
        });
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Objectives
// ═══════════════════════════════════════════════════════════════════════════════

struct MemoryObjective {
    name: String,
    criterion: String,
    display_name: RefCell<String>,
    slot: Cell<DisplaySlot>,
    scores: RefCell<HashMap<String, i32>>,
    registered: Cell<bool>,
    board: Weak<MemoryBoard>,
}

impl MemoryObjective {
    fn check(&self) -> Result<()> {
        if self.registered.get() {
            Ok(())
        } else {
            Err(HostError::unregistered("objective", &self.name))
        }
    }
}

impl HostObjective for MemoryObjective {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn criterion(&self) -> String {
        self.criterion.clone()
    }

    fn display_name(&self) -> Result<String> {
        self.check()?;
        Ok(self.display_name.borrow().clone())
    }

    fn set_display_name(&self, name: &str) -> Result<()> {
        self.check()?;
        *self.display_name.borrow_mut() = name.to_string();
        Ok(())
    }

    fn display_slot(&self) -> Result<DisplaySlot> {
        self.check()?;
        Ok(self.slot.get())
    }

    fn set_display_slot(&self, slot: DisplaySlot) -> Result<()> {
        self.check()?;
        self.slot.set(slot);
        Ok(())
    }

    fn score(&self, entry: &str) -> Result<i32> {
        self.check()?;
        Ok(self.scores.borrow().get(entry).copied().unwrap_or(0))
    }

    fn set_score(&self, entry: &str, value: i32) -> Result<()> {
        self.check()?;
        self.scores.borrow_mut().insert(entry.to_string(), value);
        Ok(())
    }

    fn clear_entry(&self, entry: &str) -> Result<()> {
        self.check()?;
        self.scores.borrow_mut().remove(entry);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<String>> {
        self.check()?;
        Ok(self.scores.borrow().keys().cloned().collect())
    }

    fn is_registered(&self) -> bool {
        self.registered.get()
    }

    fn unregister(&self) -> Result<()> {
        self.check()?;
        self.registered.set(false);
        if let Some(board) = self.board.upgrade() {
            board.objectives.borrow_mut().remove(&self.name);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Teams
// ═══════════════════════════════════════════════════════════════════════════════

struct MemoryTeam {
    name: String,
    display_name: RefCell<String>,
    prefix: RefCell<String>,
    suffix: RefCell<String>,
    friendly_fire: Cell<bool>,
    see_invisible: Cell<bool>,
    members: RefCell<Vec<String>>,
    registered: Cell<bool>,
    board: Weak<MemoryBoard>,
}

impl MemoryTeam {
    fn check(&self) -> Result<()> {
        if self.registered.get() {
            Ok(())
        } else {
            Err(HostError::unregistered("team", &self.name))
        }
    }
}

impl HostTeam for MemoryTeam {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn display_name(&self) -> Result<String> {
        self.check()?;
        Ok(self.display_name.borrow().clone())
    }

    fn set_display_name(&self, name: &str) -> Result<()> {
        self.check()?;
        *self.display_name.borrow_mut() = name.to_string();
        Ok(())
    }

    fn prefix(&self) -> Result<String> {
        self.check()?;
        Ok(self.prefix.borrow().clone())
    }

    fn set_prefix(&self, prefix: &str) -> Result<()> {
        self.check()?;
        check_name(prefix)?;
        *self.prefix.borrow_mut() = prefix.to_string();
        Ok(())
    }

    fn suffix(&self) -> Result<String> {
        self.check()?;
        Ok(self.suffix.borrow().clone())
    }

    fn set_suffix(&self, suffix: &str) -> Result<()> {
        self.check()?;
        check_name(suffix)?;
        *self.suffix.borrow_mut() = suffix.to_string();
        Ok(())
    }

    fn friendly_fire(&self) -> Result<bool> {
        self.check()?;
        Ok(self.friendly_fire.get())
    }

    fn set_friendly_fire(&self, enabled: bool) -> Result<()> {
        self.check()?;
        self.friendly_fire.set(enabled);
        Ok(())
    }

    fn can_see_invisible(&self) -> Result<bool> {
        self.check()?;
        Ok(self.see_invisible.get())
    }

    fn set_can_see_invisible(&self, enabled: bool) -> Result<()> {
        self.check()?;
        self.see_invisible.set(enabled);
        Ok(())
    }

    fn members(&self) -> Result<Vec<String>> {
        self.check()?;
        Ok(self.members.borrow().clone())
    }

    fn add_member(&self, entry: &str) -> Result<()> {
        self.check()?;
        // Membership is exclusive: leave any previous team first.
        if let Some(board) = self.board.upgrade() {
            if let Some(previous) = board.entry_team(entry) {
                if previous.name() != self.name {
                    previous.remove_member(entry)?;
                }
            }
        }
        let mut members = self.members.borrow_mut();
        if !members.iter().any(|m| m == entry) {
            members.push(entry.to_string());
        }
        Ok(())
    }

    fn remove_member(&self, entry: &str) -> Result<bool> {
        self.check()?;
        let mut members = self.members.borrow_mut();
        let before = members.len();
        members.retain(|m| m != entry);
        Ok(members.len() != before)
    }

    fn has_member(&self, entry: &str) -> Result<bool> {
        self.check()?;
        Ok(self.members.borrow().iter().any(|m| m == entry))
    }

    fn is_registered(&self) -> bool {
        self.registered.get()
    }

    fn unregister(&self) -> Result<()> {
        self.check()?;
        self.registered.set(false);
        if let Some(board) = self.board.upgrade() {
            board.teams.borrow_mut().remove(&self.name);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Boards
// ═══════════════════════════════════════════════════════════════════════════════

struct MemoryBoard {
    label: Option<String>,
    registered: Cell<bool>,
    objectives: RefCell<HashMap<String, ObjectiveRef>>,
    teams: RefCell<HashMap<String, TeamRef>>,
    weak_self: RefCell<Weak<MemoryBoard>>,
}

impl MemoryBoard {
    fn new(label: Option<String>) -> Rc<Self> {
        let board = Rc::new(MemoryBoard {
            label,
            registered: Cell::new(true),
            objectives: RefCell::new(HashMap::new()),
            teams: RefCell::new(HashMap::new()),
            weak_self: RefCell::new(Weak::new()),
        });
        *board.weak_self.borrow_mut() = Rc::downgrade(&board);
        board
    }

    fn check(&self) -> Result<()> {
        if self.registered.get() {
            Ok(())
        } else {
            Err(HostError::unregistered(
                "board",
                self.label.as_deref().unwrap_or("main"),
            ))
        }
    }
}

impl HostBoard for MemoryBoard {
    fn objective(&self, name: &str) -> Option<ObjectiveRef> {
        self.objectives.borrow().get(name).cloned()
    }

    fn register_objective(&self, name: &str, criterion: &str) -> Result<ObjectiveRef> {
        self.check()?;
        check_name(name)?;
        if self.objectives.borrow().contains_key(name) {
            return Err(HostError::NameTaken {
                kind: "objective",
                name: name.to_string(),
            });
        }
        let node: ObjectiveRef = Rc::new(MemoryObjective {
            name: name.to_string(),
            criterion: criterion.to_string(),
            display_name: RefCell::new(name.to_string()),
            slot: Cell::new(DisplaySlot::None),
            scores: RefCell::new(HashMap::new()),
            registered: Cell::new(true),
            board: self.weak_self.borrow().clone(),
        });
        self.objectives
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&node));
        Ok(node)
    }

    fn objectives(&self) -> Vec<ObjectiveRef> {
        self.objectives.borrow().values().cloned().collect()
    }

    fn replace_objective(&self, name: &str, node: ObjectiveRef) -> Result<()> {
        self.check()?;
        tracing::debug!(name, "Objective table slot replaced");
        self.objectives.borrow_mut().insert(name.to_string(), node);
        Ok(())
    }

    fn team(&self, name: &str) -> Option<TeamRef> {
        self.teams.borrow().get(name).cloned()
    }

    fn register_team(&self, name: &str) -> Result<TeamRef> {
        self.check()?;
        check_name(name)?;
        if self.teams.borrow().contains_key(name) {
            return Err(HostError::NameTaken {
                kind: "team",
                name: name.to_string(),
            });
        }
        let node: TeamRef = Rc::new(MemoryTeam {
            name: name.to_string(),
            display_name: RefCell::new(name.to_string()),
            prefix: RefCell::new(String::new()),
            suffix: RefCell::new(String::new()),
            friendly_fire: Cell::new(false),
            see_invisible: Cell::new(false),
            members: RefCell::new(Vec::new()),
            registered: Cell::new(true),
            board: self.weak_self.borrow().clone(),
        });
        self.teams
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&node));
        Ok(node)
    }

    fn teams(&self) -> Vec<TeamRef> {
        self.teams.borrow().values().cloned().collect()
    }

    fn replace_team(&self, name: &str, node: TeamRef) -> Result<()> {
        self.check()?;
        tracing::debug!(name, "Team table slot replaced");
        self.teams.borrow_mut().insert(name.to_string(), node);
        Ok(())
    }

    fn entry_team(&self, entry: &str) -> Option<TeamRef> {
        self.teams
            .borrow()
            .values()
            .find(|t| t.has_member(entry).unwrap_or(false))
            .cloned()
    }

    fn reset_entry(&self, entry: &str) -> Result<()> {
        self.check()?;
        for objective in self.objectives() {
            objective.clear_entry(entry)?;
        }
        if let Some(team) = self.entry_team(entry) {
            team.remove_member(entry)?;
        }
        Ok(())
    }

    fn is_registered(&self) -> bool {
        self.registered.get()
    }

    fn unregister(&self) -> Result<()> {
        self.check()?;
        tracing::debug!(label = self.label.as_deref().unwrap_or("main"), "Board torn down");
        for objective in self.objectives() {
            // Already-dead nodes are fine during teardown.
            let _ = objective.unregister();
        }
        for team in self.teams() {
            let _ = team.unregister();
        }
        self.registered.set(false);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Directory
// ═══════════════════════════════════════════════════════════════════════════════

/// The board directory. One main board for the process, any number of
/// labelled boards.
pub struct MemoryHost {
    main: BoardRef,
    boards: RefCell<HashMap<String, BoardRef>>,
}

impl MemoryHost {
    pub fn new() -> Rc<Self> {
        Rc::new(MemoryHost {
            main: MemoryBoard::new(None),
            boards: RefCell::new(HashMap::new()),
        })
    }
}

impl Host for MemoryHost {
    fn main_board(&self) -> BoardRef {
        Rc::clone(&self.main)
    }

    fn board(&self, label: &str) -> Option<BoardRef> {
        self.boards.borrow().get(label).cloned()
    }

    fn create_board(&self, label: &str) -> Result<BoardRef> {
        if self.boards.borrow().contains_key(label) {
            return Err(HostError::NameTaken {
                kind: "board",
                name: label.to_string(),
            });
        }
        let board: BoardRef = MemoryBoard::new(Some(label.to_string()));
        self.boards
            .borrow_mut()
            .insert(label.to_string(), Rc::clone(&board));
        Ok(board)
    }

    fn replace_board(&self, label: &str, board: BoardRef) -> Result<()> {
        let mut boards = self.boards.borrow_mut();
        if !boards.contains_key(label) {
            return Err(HostError::NoSuchBoard(label.to_string()));
        }
        boards.insert(label.to_string(), board);
        Ok(())
    }

    fn remove_board(&self, label: &str) -> Result<()> {
        if self.boards.borrow_mut().remove(label).is_none() {
            return Err(HostError::NoSuchBoard(label.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_default_to_zero_and_appear_on_first_write() {
        let host = MemoryHost::new();
        let board = host.main_board();
        let obj = board.register_objective("points", "dummy").unwrap();

        assert_eq!(obj.score("alice").unwrap(), 0);
        assert!(obj.entries().unwrap().is_empty());

        obj.set_score("alice", 7).unwrap();
        assert_eq!(obj.score("alice").unwrap(), 7);
        assert_eq!(obj.entries().unwrap(), vec!["alice".to_string()]);
    }

    #[test]
    fn duplicate_objective_name_is_rejected() {
        let host = MemoryHost::new();
        let board = host.main_board();
        board.register_objective("points", "dummy").unwrap();
        assert!(matches!(
            board.register_objective("points", "dummy"),
            Err(HostError::NameTaken { .. })
        ));
    }

    #[test]
    fn long_code_names_are_rejected() {
        let host = MemoryHost::new();
        let board = host.main_board();
        assert!(matches!(
            board.register_objective("seventeen-chars-x", "dummy"),
            Err(HostError::LabelTooLong { len: 17, max: 16 })
        ));
    }

    #[test]
    fn unregistered_objective_reports_dead_handle() {
        let host = MemoryHost::new();
        let board = host.main_board();
        let obj = board.register_objective("points", "dummy").unwrap();
        obj.unregister().unwrap();

        assert!(board.objective("points").is_none());
        let err = obj.set_score("alice", 1).unwrap_err();
        assert!(err.is_unregistered());
    }

    #[test]
    fn team_membership_is_exclusive() {
        let host = MemoryHost::new();
        let board = host.main_board();
        let red = board.register_team("red").unwrap();
        let blue = board.register_team("blue").unwrap();

        red.add_member("alice").unwrap();
        blue.add_member("alice").unwrap();

        assert!(!red.has_member("alice").unwrap());
        assert!(blue.has_member("alice").unwrap());
        assert_eq!(board.entry_team("alice").unwrap().name(), "blue");
    }

    #[test]
    fn reset_entry_clears_scores_and_membership() {
        let host = MemoryHost::new();
        let board = host.main_board();
        let obj = board.register_objective("points", "dummy").unwrap();
        let red = board.register_team("red").unwrap();
        obj.set_score("alice", 3).unwrap();
        red.add_member("alice").unwrap();

        board.reset_entry("alice").unwrap();

        assert!(obj.entries().unwrap().is_empty());
        assert!(board.entry_team("alice").is_none());
    }

    #[test]
    fn replace_objective_changes_what_lookup_returns() {
        let host = MemoryHost::new();
        assert!(host.board("arena").is_none());
        let arena = host.create_board("arena").unwrap();
        let original = arena.register_objective("points", "dummy").unwrap();
        let stand_in = MemoryBoard::new(Some("scratch".to_string()))
            .register_objective("points", "dummy")
            .unwrap();

        arena
            .replace_objective("points", Rc::clone(&stand_in))
            .unwrap();

        let looked_up = arena.objective("points").unwrap();
        assert!(Rc::ptr_eq(&looked_up, &stand_in));
        // The replaced node keeps working through its own handle.
        original.set_score("alice", 1).unwrap();
    }

    #[test]
    fn board_unregister_kills_every_node() {
        let host = MemoryHost::new();
        let arena = host.create_board("arena").unwrap();
        let obj = arena.register_objective("points", "dummy").unwrap();
        let team = arena.register_team("red").unwrap();

        arena.unregister().unwrap();
        host.remove_board("arena").unwrap();

        assert!(!arena.is_registered());
        assert!(obj.set_score("a", 1).unwrap_err().is_unregistered());
        assert!(team.add_member("a").unwrap_err().is_unregistered());
        assert!(host.board("arena").is_none());
    }
}
