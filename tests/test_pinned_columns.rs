// Pinned column ordering and sticky offsets, end to end through the layout

use candidate_grid::data::columns::synthesize_columns;
use candidate_grid::data::record::Record;
use candidate_grid::data::record_view::RecordView;
use candidate_grid::ui::pin_manager::{LayoutPhase, PinManager};
use candidate_grid::ui::table_render_context::{GridViewport, TableRenderContext};
use serde_json::json;
use std::sync::Arc;

fn create_test_view() -> RecordView {
    RecordView::new(Arc::new(vec![
        Record::from_json(
            "rec1",
            json!({"Name": "Ann", "Email": "ann@example.com", "Priority": "High", "Notes": "short"}),
        ),
        Record::from_json("rec2", json!({"Name": "Bob", "Email": "bob@example.com", "Notes": null})),
    ]))
}

fn ids(pins: &PinManager, fields: &[&str]) -> Vec<String> {
    let fields: Vec<String> = fields.iter().map(|s| s.to_string()).collect();
    pins.reorder(&synthesize_columns(&fields))
        .into_iter()
        .map(|c| c.id)
        .collect()
}

#[test]
fn test_frozen_columns_move_to_front_in_pin_order() {
    let fields = ["Email", "Name", "Notes", "Priority"];
    let mut pins = PinManager::new();

    assert_eq!(ids(&pins, &fields), vec!["Email", "Name", "Notes", "Priority"]);

    pins.toggle("Priority");
    pins.toggle("Name");
    assert_eq!(ids(&pins, &fields), vec!["Priority", "Name", "Email", "Notes"]);

    pins.toggle("Priority");
    assert_eq!(ids(&pins, &fields), vec!["Name", "Email", "Notes", "Priority"]);
}

#[test]
fn test_offsets_use_default_until_measured() {
    let mut pins = PinManager::with_default_width(150);
    pins.toggle("Name");
    pins.toggle("Email");

    pins.begin_layout(&["Name", "Email", "Notes"]);
    assert_eq!(pins.offset_of("Name"), Some(0));
    assert_eq!(pins.offset_of("Email"), Some(150));
    assert_eq!(pins.offset_of("Notes"), None);
    assert_eq!(pins.phase(), LayoutPhase::Provisional);

    let changed = pins.apply_measurements(vec![("Name".to_string(), 120), ("Email".to_string(), 80)]);
    assert!(changed);
    assert_eq!(pins.offset_of("Email"), Some(120));
    assert_eq!(pins.phase(), LayoutPhase::Settled);
}

#[test]
fn test_unpinned_columns_do_not_shift_offsets() {
    let mut pins = PinManager::new();
    pins.toggle("A");
    pins.toggle("C");
    pins.record_width("A", 10);
    pins.record_width("B", 999);
    pins.record_width("C", 30);

    pins.begin_layout(&["A", "C", "B"]);
    assert_eq!(pins.offset_of("A"), Some(0));
    assert_eq!(pins.offset_of("C"), Some(10));
    assert_eq!(pins.offset_of("B"), None);
}

#[test]
fn test_render_context_places_frozen_at_offsets() {
    let view = create_test_view();
    let columns = synthesize_columns(&[
        "Email".to_string(),
        "Name".to_string(),
        "Notes".to_string(),
        "Priority".to_string(),
    ]);
    let mut pins = PinManager::new();
    assert!(pins.auto_pin(&columns));
    pins.toggle("Priority");

    let ordered = pins.reorder(&columns);
    let ordered_ids: Vec<&str> = ordered.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ordered_ids, vec!["Name", "Priority", "Email", "Notes"]);

    let viewport = GridViewport {
        width: 200,
        height: 10,
        ..Default::default()
    };

    // First pass: "Priority" sits after the default width of "Name"
    pins.begin_layout(&ordered_ids);
    let ctx = TableRenderContext::build(&ordered, &view, &pins, viewport, 0, None);
    let priority = ctx.columns.iter().find(|c| c.id == "Priority").unwrap();
    assert_eq!(priority.x, 150);

    // Second pass: offsets follow the measured width of "Name"
    assert!(pins.apply_measurements(ctx.measurements()));
    pins.begin_layout(&ordered_ids);
    let ctx = TableRenderContext::build(&ordered, &view, &pins, viewport, 0, None);
    let name = ctx.columns.iter().find(|c| c.id == "Name").unwrap();
    let priority = ctx.columns.iter().find(|c| c.id == "Priority").unwrap();
    assert_eq!(name.x, 0);
    assert_eq!(priority.x, name.width);
    assert!(priority.frozen && priority.last_frozen);
    assert!(!name.last_frozen);

    let email = ctx.columns.iter().find(|c| c.id == "Email").unwrap();
    assert!(!email.frozen);
    assert_eq!(email.x, priority.x + priority.width);

    // Stable once measured
    assert!(!pins.apply_measurements(ctx.measurements()));
}

#[test]
fn test_frozen_columns_stay_while_scrolling() {
    let view = create_test_view();
    let columns = synthesize_columns(&[
        "Email".to_string(),
        "Name".to_string(),
        "Notes".to_string(),
        "Priority".to_string(),
    ]);
    let mut pins = PinManager::new();
    pins.toggle("Name");
    pins.record_width("Name", 7);

    let ordered = pins.reorder(&columns);
    let ordered_ids: Vec<&str> = ordered.iter().map(|c| c.id.as_str()).collect();
    pins.begin_layout(&ordered_ids);

    let viewport = GridViewport {
        width: 200,
        height: 10,
        column_offset: 1,
        ..Default::default()
    };
    let ctx = TableRenderContext::build(&ordered, &view, &pins, viewport, 0, None);
    let visible: Vec<&str> = ctx.columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(visible, vec!["Name", "Notes", "Priority"]);
    assert_eq!(ctx.columns[0].x, 0);
    assert_eq!(ctx.columns[1].x, 7);
    assert_eq!(ctx.frozen_count, 1);
}
