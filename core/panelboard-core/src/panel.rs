//! Panels: paired label/value rows at synthetic ordering scores.
//!
//! A field is two consecutive scores on one objective: the entry row at the
//! higher score, the value row directly beneath it. Fields added to the top
//! raise a high-water mark and fields added to the bottom lower a low-water
//! mark, so positions never collide regardless of insertion order and a
//! field keeps its slot for its whole life. Long labels render through
//! `pack`: the row's entry carries the middle 16 chars and a synthetic team
//! carries the rest as prefix/suffix.

pub mod pack;

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use panelboard_host::{unit_len, NAME_LIMIT};

use crate::board::Board;
use crate::config::PanelConfig;
use crate::error::{BoardError, Result};
use crate::objective::Objective;
use crate::team::Team;

/// Stable handle to a registered panel field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldId(u64);

/// Read-only snapshot of a field's registered state.
#[derive(Debug, Clone, Serialize)]
pub struct FieldInfo {
    pub label: String,
    pub value: Option<String>,
    pub entry_score: i32,
    pub value_score: i32,
    pub hidden: bool,
}

/// One live host row: the entry key shown at a score, plus the synthetic
/// team carrying prefix/suffix overflow, if the label needed one.
#[derive(Debug, Clone)]
struct Row {
    key: String,
    team: Option<String>,
}

struct FieldState {
    entry_score: i32,
    value_score: i32,
    label: String,
    value: Option<String>,
    hidden: bool,
    entry_row: Option<Row>,
    value_row: Option<Row>,
}

fn team_name_for(score: i32) -> String {
    // Scores are unique per row for the panel's life, so this never
    // collides. i32 digits keep it well under the 16-char name limit.
    format!("pf{score}")
}

/// A label/value layout over one objective of a wrapped board.
pub struct Panel {
    board: Board,
    objective: Objective,
    fields: RefCell<BTreeMap<u64, FieldState>>,
    next_id: Cell<u64>,
    top: Cell<i32>,
    bottom: Cell<i32>,
}

impl Panel {
    /// Opens a panel on `objective_name` with default settings, registering
    /// the objective if the board does not have it yet.
    pub fn new(board: &Board, objective_name: &str) -> Result<Panel> {
        let config = PanelConfig {
            objective: objective_name.to_string(),
            ..PanelConfig::default()
        };
        Panel::from_config(board, &config)
    }

    pub fn from_config(board: &Board, config: &PanelConfig) -> Result<Panel> {
        if config.objective.is_empty() {
            return Err(BoardError::EmptyName);
        }
        let objective = match board.objective(&config.objective) {
            Some(objective) => objective,
            None => board.register_objective(&config.objective, &config.criterion)?,
        };
        objective.set_display_slot(config.display_slot)?;

        Ok(Panel {
            board: board.clone(),
            objective,
            fields: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(1),
            top: Cell::new(config.start_mark),
            bottom: Cell::new(config.start_mark),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Registered field ids in score order is not guaranteed; this is
    /// registration order.
    pub fn field_ids(&self) -> Vec<FieldId> {
        self.fields.borrow().keys().map(|id| FieldId(*id)).collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Field Surface
    // ─────────────────────────────────────────────────────────────────────

    /// Registers a field and renders it immediately. The two synthetic
    /// scores it gets are its permanently: they are never reassigned, even
    /// after the field is unregistered.
    pub fn register_field(
        &self,
        label: &str,
        value: Option<&str>,
        add_to_top: bool,
    ) -> Result<FieldId> {
        pack::check(label)?;
        if let Some(value) = value {
            pack::check(value)?;
        }

        let (entry_score, value_score) = if add_to_top {
            let value_score = self.top.get() + 1;
            let entry_score = value_score + 1;
            self.top.set(entry_score);
            (entry_score, value_score)
        } else {
            let entry_score = self.bottom.get() - 1;
            let value_score = entry_score - 1;
            self.bottom.set(value_score);
            (entry_score, value_score)
        };

        let entry_row = self.render_row(entry_score, label, None)?;
        // The entry row is not in the field map yet, so its key must be
        // reserved by hand or an identical value would land on the same row.
        let value_row = match value {
            Some(value) => Some(self.render_row(value_score, value, Some(&entry_row.key))?),
            None => None,
        };

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.fields.borrow_mut().insert(
            id,
            FieldState {
                entry_score,
                value_score,
                label: label.to_string(),
                value: value.map(str::to_string),
                hidden: false,
                entry_row: Some(entry_row),
                value_row,
            },
        );
        Ok(FieldId(id))
    }

    pub fn get_field(&self, id: FieldId) -> Result<FieldInfo> {
        let fields = self.fields.borrow();
        let field = fields.get(&id.0).ok_or(BoardError::UnknownField(id.0))?;
        Ok(FieldInfo {
            label: field.label.clone(),
            value: field.value.clone(),
            entry_score: field.entry_score,
            value_score: field.value_score,
            hidden: field.hidden,
        })
    }

    pub fn set_label(&self, id: FieldId, label: &str) -> Result<()> {
        pack::check(label)?;
        let (hidden, old_row, entry_score) = {
            let fields = self.fields.borrow();
            let field = fields.get(&id.0).ok_or(BoardError::UnknownField(id.0))?;
            (field.hidden, field.entry_row.clone(), field.entry_score)
        };

        let new_row = if hidden {
            None
        } else {
            if let Some(row) = &old_row {
                self.erase_row(row)?;
            }
            Some(self.render_row(entry_score, label, None)?)
        };

        let mut fields = self.fields.borrow_mut();
        if let Some(field) = fields.get_mut(&id.0) {
            field.label = label.to_string();
            if !hidden {
                field.entry_row = new_row;
            }
        }
        Ok(())
    }

    pub fn set_value(&self, id: FieldId, value: Option<&str>) -> Result<()> {
        if let Some(value) = value {
            pack::check(value)?;
        }
        let (hidden, old_row, value_score) = {
            let fields = self.fields.borrow();
            let field = fields.get(&id.0).ok_or(BoardError::UnknownField(id.0))?;
            (field.hidden, field.value_row.clone(), field.value_score)
        };

        let new_row = if hidden {
            None
        } else {
            if let Some(row) = &old_row {
                self.erase_row(row)?;
            }
            match value {
                Some(value) => Some(self.render_row(value_score, value, None)?),
                None => None,
            }
        };

        let mut fields = self.fields.borrow_mut();
        if let Some(field) = fields.get_mut(&id.0) {
            field.value = value.map(str::to_string);
            if !hidden {
                field.value_row = new_row;
            }
        }
        Ok(())
    }

    /// Hiding removes the field's live host rows but keeps its scores and
    /// labels, so unhiding restores it exactly as it was.
    pub fn set_hidden(&self, id: FieldId, hidden: bool) -> Result<()> {
        let snapshot = {
            let fields = self.fields.borrow();
            let field = fields.get(&id.0).ok_or(BoardError::UnknownField(id.0))?;
            if field.hidden == hidden {
                return Ok(());
            }
            (
                field.label.clone(),
                field.value.clone(),
                field.entry_score,
                field.value_score,
                field.entry_row.clone(),
                field.value_row.clone(),
            )
        };
        let (label, value, entry_score, value_score, entry_row, value_row) = snapshot;

        let (new_entry_row, new_value_row) = if hidden {
            if let Some(row) = &entry_row {
                self.erase_row(row)?;
            }
            if let Some(row) = &value_row {
                self.erase_row(row)?;
            }
            (None, None)
        } else {
            let entry = self.render_row(entry_score, &label, None)?;
            let value_row = match &value {
                Some(value) => Some(self.render_row(value_score, value, Some(&entry.key))?),
                None => None,
            };
            (Some(entry), value_row)
        };

        let mut fields = self.fields.borrow_mut();
        if let Some(field) = fields.get_mut(&id.0) {
            field.hidden = hidden;
            field.entry_row = new_entry_row;
            field.value_row = new_value_row;
        }
        Ok(())
    }

    /// Removes the field and its synthetic teams. Its scores are retired
    /// for good; the water marks never move back in.
    pub fn unregister_field(&self, id: FieldId) -> Result<()> {
        let field = self
            .fields
            .borrow_mut()
            .remove(&id.0)
            .ok_or(BoardError::UnknownField(id.0))?;
        for row in field.entry_row.iter().chain(field.value_row.iter()) {
            self.erase_row(row)?;
        }
        // A hidden field has no live rows, so its synthetic teams are found
        // by score instead.
        for score in [field.entry_score, field.value_score] {
            if let Some(team) = self.board.team(&team_name_for(score)) {
                team.unregister()?;
            }
        }
        Ok(())
    }

    /// Unregisters every field.
    pub fn clear(&self) -> Result<()> {
        for id in self.field_ids() {
            self.unregister_field(id)?;
        }
        Ok(())
    }

    /// The label as a viewer of the host board sees it: live team prefix +
    /// entry key + live team suffix. Falls back to the stored label while
    /// the field is hidden.
    pub fn rendered_label(&self, id: FieldId) -> Result<String> {
        let (label, row) = {
            let fields = self.fields.borrow();
            let field = fields.get(&id.0).ok_or(BoardError::UnknownField(id.0))?;
            (field.label.clone(), field.entry_row.clone())
        };
        match row {
            Some(row) => self.render_back(&row),
            None => Ok(label),
        }
    }

    /// Value-row counterpart of `rendered_label`.
    pub fn rendered_value(&self, id: FieldId) -> Result<Option<String>> {
        let (value, row) = {
            let fields = self.fields.borrow();
            let field = fields.get(&id.0).ok_or(BoardError::UnknownField(id.0))?;
            (field.value.clone(), field.value_row.clone())
        };
        match row {
            Some(row) => self.render_back(&row).map(Some),
            None => Ok(value),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Row Plumbing
    // ─────────────────────────────────────────────────────────────────────

    fn render_back(&self, row: &Row) -> Result<String> {
        match &row.team {
            Some(team_name) => {
                let team = self
                    .board
                    .team(team_name)
                    .ok_or_else(|| BoardError::no_longer_valid("team", team_name.clone()))?;
                Ok(format!("{}{}{}", team.prefix()?, row.key, team.suffix()?))
            }
            None => Ok(row.key.clone()),
        }
    }

    fn render_row(&self, score: i32, text: &str, reserved: Option<&str>) -> Result<Row> {
        let packed = pack::pack(text)?;
        let key = self.unique_key(&packed.name, reserved);

        let team = if packed.needs_team() {
            let team_name = team_name_for(score);
            let team = self.row_team(&team_name)?;
            team.set_prefix(&packed.prefix)?;
            team.set_suffix(&packed.suffix)?;
            team.add_member(&key)?;
            Some(team_name)
        } else {
            None
        };

        self.objective.write_row(&key, score)?;
        Ok(Row { key, team })
    }

    fn erase_row(&self, row: &Row) -> Result<()> {
        self.objective.clear_entry(&row.key)?;
        if let Some(team_name) = &row.team {
            if let Some(team) = self.board.team(team_name) {
                team.remove_member(&row.key)?;
            }
        }
        Ok(())
    }

    fn row_team(&self, name: &str) -> Result<Team> {
        match self.board.team(name) {
            Some(team) => Ok(team),
            None => self.board.register_team(name),
        }
    }

    /// Entry keys must be unique across the objective's rows. Collisions
    /// between identical 16-char name parts are resolved by trading
    /// trailing label chars for spaces, staying inside the 16-char budget.
    /// `reserved` covers a sibling row rendered before its field is stored.
    fn unique_key(&self, base: &str, reserved: Option<&str>) -> String {
        let mut taken: HashSet<String> = self
            .fields
            .borrow()
            .values()
            .flat_map(|f| f.entry_row.iter().chain(f.value_row.iter()))
            .map(|row| row.key.clone())
            .collect();
        if let Some(key) = reserved {
            taken.insert(key.to_string());
        }

        let base = if base.is_empty() {
            " ".to_string()
        } else {
            base.to_string()
        };

        let mut candidate = base.clone();
        while taken.contains(&candidate) && unit_len(&candidate) < NAME_LIMIT {
            candidate.push(' ');
        }
        let mut kept = NAME_LIMIT;
        while taken.contains(&candidate) && kept > 0 {
            kept -= 1;
            candidate = base.chars().take(kept).collect();
            while unit_len(&candidate) < NAME_LIMIT {
                candidate.push(' ');
            }
        }
        candidate
    }
}
