// Field collection, column labels and the shared cell formatting policy

use candidate_grid::data::cell_format::{format_cell, CellContent, FormatContext};
use candidate_grid::data::columns::synthesize_columns;
use candidate_grid::data::field_collector::collect_fields;
use candidate_grid::data::record::Record;
use candidate_grid::data::record_view::{RecordView, RowFilter, SortOrder};
use candidate_grid::ui::pin_manager::PinManager;
use serde_json::json;
use std::sync::Arc;

fn worked_example() -> Vec<Record> {
    vec![
        Record::from_json("r1", json!({"Name": "Ann", "Priority": "High"})),
        Record::from_json("r2", json!({"Name": "Bob", "Email": "bob@example.com"})),
    ]
}

#[test]
fn test_fields_are_union_sorted() {
    let fields = collect_fields(&worked_example());
    assert_eq!(fields, vec!["Email", "Name", "Priority"]);

    let columns = synthesize_columns(&fields);
    let mut pins = PinManager::new();
    pins.auto_pin(&columns);
    assert_eq!(pins.frozen_ids(), &["Name".to_string()]);
}

#[test]
fn test_collect_is_deterministic_and_handles_empty() {
    assert!(collect_fields(&[]).is_empty());

    let mut reversed = worked_example();
    reversed.reverse();
    assert_eq!(collect_fields(&reversed), collect_fields(&worked_example()));
}

#[test]
fn test_columns_match_fields_one_to_one() {
    let fields = vec![
        "firstName".to_string(),
        "years_of_experience".to_string(),
        "Why are you interested in this role".to_string(),
    ];
    let columns = synthesize_columns(&fields);
    assert_eq!(columns.len(), 3);
    for (column, field) in columns.iter().zip(&fields) {
        assert_eq!(&column.id, field);
        assert!(column.sortable);
    }
    assert_eq!(columns[0].full_label, "First Name");
    assert_eq!(columns[1].full_label, "Years Of Experience");
    assert_eq!(columns[2].display_label, "Why Are You Int...");
    assert_eq!(columns[2].full_label, "Why Are You Interested In This Role");
}

#[test]
fn test_grid_and_modal_formatting_differ() {
    let empty = json!([]);
    assert_eq!(format_cell("Tags", Some(&empty), FormatContext::Grid), CellContent::Empty);
    assert_eq!(
        format_cell("Tags", Some(&empty), FormatContext::Modal).display(FormatContext::Modal),
        "None"
    );

    let nested = json!({"city": "Lisbon", "remote": true});
    let grid = format_cell("Location", Some(&nested), FormatContext::Grid);
    assert_eq!(grid.display(FormatContext::Grid), "{\"city\":\"Lisbon...");
    assert_eq!(grid.full(), Some("{\"city\":\"Lisbon\",\"remote\":true}"));
    let modal = format_cell("Location", Some(&nested), FormatContext::Modal);
    assert!(modal.display(FormatContext::Modal).contains('\n'));

    // Null and empty string are not the same thing
    assert!(format_cell("Notes", Some(&json!(null)), FormatContext::Grid).is_empty());
    let blank = format_cell("Notes", Some(&json!("")), FormatContext::Grid);
    assert!(!blank.is_empty());
    assert_eq!(blank.display(FormatContext::Grid), "");

    assert!(format_cell("PRIORITY", Some(&json!("Low")), FormatContext::Grid).is_badge());
    assert!(format_cell("priority", Some(&json!("Low")), FormatContext::Modal).is_badge());
    assert!(!format_cell("priority", Some(&json!(3)), FormatContext::Grid).is_badge());
}

#[test]
fn test_sort_cycle_and_null_placement() {
    let records = vec![
        Record::from_json("a", json!({"Score": 10})),
        Record::from_json("b", json!({"Score": null})),
        Record::from_json("c", json!({"Score": 2})),
        Record::from_json("d", json!({})),
        Record::from_json("e", json!({"Score": 7})),
    ];
    let mut view = RecordView::new(Arc::new(records));
    let order = |view: &RecordView| view.rows().map(|r| r.id.clone()).collect::<Vec<_>>();

    view.toggle_sort("Score");
    assert_eq!(view.sort_state().order_for("Score"), Some(SortOrder::Ascending));
    assert_eq!(order(&view), vec!["c", "e", "a", "b", "d"]);

    view.toggle_sort("Score");
    assert_eq!(view.sort_state().order_for("Score"), Some(SortOrder::Descending));
    assert_eq!(order(&view), vec!["a", "e", "c", "b", "d"]);

    view.toggle_sort("Score");
    assert_eq!(view.sort_state().order_for("Score"), Some(SortOrder::Ascending));
}

#[test]
fn test_filter_narrows_rows() {
    let mut view = RecordView::new(Arc::new(worked_example()));
    view.set_filter(RowFilter::parse("bob@"));
    assert_eq!(view.row_count(), 1);
    assert_eq!(view.get_row(0).map(|r| r.id.as_str()), Some("r2"));

    view.set_filter(RowFilter::parse(""));
    assert_eq!(view.row_count(), 2);
}
