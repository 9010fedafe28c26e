// Detail popup contents and lifecycle

use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde_json::json;

use candidate_grid::data::cell_format::FormatContext;
use candidate_grid::data::record::Record;
use candidate_grid::ui::detail_modal::{detail_entries, ColumnNames, DetailModal, ModalState};

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let area = buf.area;
    let mut text = String::new();
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            text.push_str(buf[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

#[test]
fn test_blank_values_are_hidden() {
    let record = Record::from_json(
        "rec7",
        json!({
            "Notes": "",
            "Tags": [],
            "Priority": "High",
            "Extra": {},
            "Bio": "   ",
            "Missing": null,
        }),
    );
    let entries = detail_entries(&record, None);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].field, "Priority");
    assert!(entries[0].content.is_badge());
    assert_eq!(entries[0].content.display(FormatContext::Modal), "High");
}

#[test]
fn test_modal_values_are_not_truncated() {
    let long = "I have been building data pipelines for a decade";
    let record = Record::from_json(
        "rec1",
        json!({"whyJoin": long, "skills": ["rust", null, 3], "address": {"city": "Porto"}}),
    );
    let entries = detail_entries(&record, None);
    let by_field = |f: &str| entries.iter().find(|e| e.field == f).unwrap();

    assert_eq!(by_field("whyJoin").label, "Why Join");
    assert_eq!(by_field("whyJoin").content.display(FormatContext::Modal), long);
    assert_eq!(by_field("skills").content.display(FormatContext::Modal), "rust, , 3");
    assert_eq!(
        by_field("address").content.display(FormatContext::Modal),
        "{\n  \"city\": \"Porto\"\n}"
    );
}

#[test]
fn test_render_shows_labels_and_title() {
    let record = Record::from_json("recA", json!({"fullName": "Ann Lee", "Priority": "Low"}));
    let names = ColumnNames::from([("fullName".to_string(), "Candidate".to_string())]);

    let mut modal = DetailModal::new();
    modal.open(record);

    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    terminal.draw(|f| modal.render(f, Some(&names))).unwrap();
    let text = screen_text(&terminal);
    assert!(text.contains("Candidate Details (recA)"));
    assert!(text.contains("Candidate"));
    assert!(text.contains("Ann Lee"));
    assert!(text.contains(" Low "));
    assert!(text.contains("─"));
}

#[test]
fn test_closed_modal_draws_nothing() {
    let modal = DetailModal::new();
    assert_eq!(modal.state(), &ModalState::Closed);

    let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
    terminal.draw(|f| modal.render(f, None)).unwrap();
    assert!(screen_text(&terminal).trim().is_empty());
}
