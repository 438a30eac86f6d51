//! Integration tests for panel field ordering, label packing, hiding, and
//! lifecycle.

use panelboard_core::{Board, BoardError, EventKind, Panel, PanelConfig};
use panelboard_host::{DisplaySlot, HostRef, MemoryHost};

fn arena_panel() -> (HostRef, Board, Panel) {
    let host: HostRef = MemoryHost::new();
    let board = Board::open(&host, "arena").unwrap();
    let panel = Panel::new(&board, "sidebar").unwrap();
    (host, board, panel)
}

#[test]
fn test_panel_registers_its_objective_on_the_sidebar() {
    let (_host, board, panel) = arena_panel();
    let objective = board.objective("sidebar").unwrap();
    assert_eq!(objective.display_slot().unwrap(), DisplaySlot::SideBar);
    assert_eq!(panel.objective().name(), "sidebar");
}

#[test]
fn test_field_scores_are_consecutive_and_never_collide() {
    let (_host, _board, panel) = arena_panel();
    let f1 = panel.register_field("first", None, false).unwrap();
    let f2 = panel.register_field("second", None, true).unwrap();
    let f3 = panel.register_field("third", None, false).unwrap();

    let i1 = panel.get_field(f1).unwrap();
    let i2 = panel.get_field(f2).unwrap();
    let i3 = panel.get_field(f3).unwrap();

    for info in [&i1, &i2, &i3] {
        assert_eq!(info.entry_score, info.value_score + 1);
    }
    // Top additions climb, bottom additions sink.
    assert!(i2.entry_score > i1.entry_score);
    assert!(i3.entry_score < i1.entry_score);

    let mut scores = vec![
        i1.entry_score,
        i1.value_score,
        i2.entry_score,
        i2.value_score,
        i3.entry_score,
        i3.value_score,
    ];
    scores.sort_unstable();
    scores.dedup();
    assert_eq!(scores.len(), 6);
}

#[test]
fn test_scores_survive_field_unregistration() {
    let (_host, _board, panel) = arena_panel();
    let first = panel.register_field("first", None, true).unwrap();
    let first_info = panel.get_field(first).unwrap();
    panel.unregister_field(first).unwrap();

    // The retired slot is never handed out again.
    let second = panel.register_field("second", None, true).unwrap();
    let second_info = panel.get_field(second).unwrap();
    assert!(second_info.value_score > first_info.entry_score);
}

#[test]
fn test_forty_char_label_round_trips_through_packing() {
    let (_host, _board, panel) = arena_panel();
    let label: String = ('a'..='z').cycle().take(40).collect();
    let field = panel.register_field(&label, None, true).unwrap();
    assert_eq!(panel.rendered_label(field).unwrap(), label);
}

#[test]
fn test_forty_nine_char_label_is_rejected_not_truncated() {
    let (_host, _board, panel) = arena_panel();
    let label = "x".repeat(49);
    let err = panel.register_field(&label, None, true).unwrap_err();
    assert!(matches!(err, BoardError::LabelTooLong { len: 49, max: 48 }));
    assert!(panel.field_ids().is_empty());
}

#[test]
fn test_short_labels_render_without_a_team() {
    let (_host, board, panel) = arena_panel();
    let field = panel.register_field("kills", None, true).unwrap();
    assert_eq!(panel.rendered_label(field).unwrap(), "kills");
    // No synthetic team was needed.
    assert!(board.teams().is_empty());
}

#[test]
fn test_long_labels_render_through_a_synthetic_team() {
    let (_host, board, panel) = arena_panel();
    let label = "p".repeat(16) + &"n".repeat(16) + "suffix";
    let field = panel.register_field(&label, None, true).unwrap();

    assert_eq!(panel.rendered_label(field).unwrap(), label);
    let teams = board.teams();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].prefix().unwrap(), "p".repeat(16));
    assert_eq!(teams[0].suffix().unwrap(), "suffix");
}

#[test]
fn test_set_label_moves_between_length_bands() {
    let (_host, board, panel) = arena_panel();
    let field = panel.register_field("short", None, true).unwrap();
    assert!(board.teams().is_empty());

    let long: String = "0123456789".repeat(4);
    panel.set_label(field, &long).unwrap();
    assert_eq!(panel.rendered_label(field).unwrap(), long);
    assert_eq!(board.teams().len(), 1);

    panel.set_label(field, "short again").unwrap();
    assert_eq!(panel.rendered_label(field).unwrap(), "short again");
}

#[test]
fn test_values_render_on_the_row_below() {
    let (_host, _board, panel) = arena_panel();
    let field = panel.register_field("damage", Some("1500"), true).unwrap();
    let info = panel.get_field(field).unwrap();
    assert_eq!(info.value.as_deref(), Some("1500"));
    assert_eq!(panel.rendered_value(field).unwrap().as_deref(), Some("1500"));

    panel.set_value(field, Some("1750")).unwrap();
    assert_eq!(panel.rendered_value(field).unwrap().as_deref(), Some("1750"));

    panel.set_value(field, None).unwrap();
    assert_eq!(panel.rendered_value(field).unwrap(), None);
}

#[test]
fn test_hiding_restores_fields_exactly() {
    let (_host, board, panel) = arena_panel();
    let label: String = ('a'..='z').cycle().take(40).collect();
    let field = panel.register_field(&label, Some("42"), true).unwrap();
    let objective = board.objective("sidebar").unwrap();
    let before = {
        let mut entries = objective.entries().unwrap();
        entries.sort();
        entries
    };

    panel.set_hidden(field, true).unwrap();
    assert!(objective.entries().unwrap().is_empty());
    // Labels and scores are kept while hidden.
    let info = panel.get_field(field).unwrap();
    assert!(info.hidden);
    assert_eq!(info.label, label);
    assert_eq!(panel.rendered_label(field).unwrap(), label);

    panel.set_hidden(field, false).unwrap();
    let after = {
        let mut entries = objective.entries().unwrap();
        entries.sort();
        entries
    };
    assert_eq!(before, after);
    assert_eq!(panel.rendered_label(field).unwrap(), label);
}

#[test]
fn test_identical_labels_get_distinct_rows() {
    let (_host, board, panel) = arena_panel();
    panel.register_field("twin", None, true).unwrap();
    panel.register_field("twin", None, true).unwrap();

    let objective = board.objective("sidebar").unwrap();
    assert_eq!(objective.entries().unwrap().len(), 2);
}

#[test]
fn test_identical_label_and_value_occupy_two_rows() {
    let (_host, board, panel) = arena_panel();
    let field = panel.register_field("same", Some("same"), true).unwrap();

    let objective = board.objective("sidebar").unwrap();
    assert_eq!(objective.entries().unwrap().len(), 2);

    // Hiding and unhiding re-renders both rows without collapsing them.
    panel.set_hidden(field, true).unwrap();
    panel.set_hidden(field, false).unwrap();
    assert_eq!(objective.entries().unwrap().len(), 2);
}

#[test]
fn test_listeners_cannot_veto_panel_rows() {
    let (_host, board, panel) = arena_panel();
    let _guard = board.add_listener(EventKind::ScoreChange, |event| event.cancel());

    let field = panel.register_field("kills", Some("7"), true).unwrap();
    let objective = board.objective("sidebar").unwrap();
    assert_eq!(objective.entries().unwrap().len(), 2);
    assert_eq!(panel.rendered_label(field).unwrap(), "kills");
}

#[test]
fn test_unregister_field_removes_rows_and_teams() {
    let (_host, board, panel) = arena_panel();
    let label = "y".repeat(20);
    let field = panel.register_field(&label, None, true).unwrap();
    assert_eq!(board.teams().len(), 1);

    panel.unregister_field(field).unwrap();

    let objective = board.objective("sidebar").unwrap();
    assert!(objective.entries().unwrap().is_empty());
    assert!(board.teams().is_empty());
    assert!(matches!(
        panel.get_field(field),
        Err(BoardError::UnknownField(_))
    ));
}

#[test]
fn test_hidden_field_unregister_removes_its_team() {
    let (_host, board, panel) = arena_panel();
    let label = "y".repeat(20);
    let field = panel.register_field(&label, None, true).unwrap();
    assert_eq!(board.teams().len(), 1);

    panel.set_hidden(field, true).unwrap();
    panel.unregister_field(field).unwrap();
    assert!(board.teams().is_empty());
}

#[test]
fn test_panel_operations_fail_after_board_unregister() {
    let (_host, board, panel) = arena_panel();
    let field = panel.register_field("doomed", None, true).unwrap();

    board.unregister().unwrap();

    assert!(matches!(
        panel.register_field("more", None, true),
        Err(BoardError::NoLongerValid { .. })
    ));
    assert!(matches!(
        panel.set_label(field, "renamed"),
        Err(BoardError::NoLongerValid { .. })
    ));
}

#[test]
fn test_panel_from_config_applies_start_mark() {
    let host: HostRef = MemoryHost::new();
    let board = Board::open(&host, "arena").unwrap();
    let config = PanelConfig {
        objective: "hud".to_string(),
        start_mark: 100,
        ..PanelConfig::default()
    };
    let panel = Panel::from_config(&board, &config).unwrap();

    let top = panel.register_field("top", None, true).unwrap();
    let bottom = panel.register_field("bottom", None, false).unwrap();
    assert_eq!(panel.get_field(top).unwrap().entry_score, 102);
    assert_eq!(panel.get_field(bottom).unwrap().entry_score, 99);
}
