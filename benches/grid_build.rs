use candidate_grid::data::columns::synthesize_columns;
use candidate_grid::data::field_collector::collect_fields;
use candidate_grid::data::record::Record;
use candidate_grid::data::record_view::{RecordView, RowFilter};
use candidate_grid::ui::pin_manager::PinManager;
use candidate_grid::ui::table_render_context::{GridViewport, TableRenderContext};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::sync::Arc;

fn create_test_records(rows: usize) -> Vec<Record> {
    let roles = [
        "Backend Engineer",
        "Data Analyst",
        "Product Designer",
        "Site Reliability Engineer",
        "Technical Writer",
    ];
    let priorities = ["High", "Medium", "Low"];

    (0..rows)
        .map(|i| {
            // Sparse on purpose: every third record lacks a portfolio
            let mut fields = json!({
                "Name": format!("Candidate {}", i),
                "Email": format!("candidate{}@example.com", i),
                "Role": roles[i % roles.len()],
                "Priority": priorities[i % priorities.len()],
                "Years Of Experience": i % 20,
                "Skills": ["rust", "sql", "kubernetes"],
            });
            if i % 3 != 0 {
                fields["Portfolio"] = json!(format!("https://example.com/portfolio/{}", i));
            }
            Record::from_json(format!("rec{:06}", i), fields)
        })
        .collect()
}

fn benchmark_context_build(c: &mut Criterion) {
    let records = create_test_records(5_000);
    let columns = synthesize_columns(&collect_fields(&records));
    let view = RecordView::new(Arc::new(records));

    let mut pins = PinManager::new();
    pins.auto_pin(&columns);
    pins.toggle("Priority");
    let ordered = pins.reorder(&columns);
    let ids: Vec<&str> = ordered.iter().map(|c| c.id.as_str()).collect();
    pins.begin_layout(&ids);

    let viewport = GridViewport {
        width: 200,
        height: 50,
        ..Default::default()
    };

    let mut group = c.benchmark_group("grid_build");

    group.bench_function("collect_fields_5k", |b| {
        b.iter(|| collect_fields(black_box(view.source())));
    });

    // Two-pass layout, as a frame does it
    group.bench_function("layout_two_pass_5k", |b| {
        b.iter(|| {
            let mut pins = PinManager::new();
            pins.toggle("Name");
            pins.toggle("Priority");
            pins.begin_layout(&ids);
            let ctx = TableRenderContext::build(&ordered, &view, &pins, viewport, 0, None);
            if pins.apply_measurements(ctx.measurements()) {
                pins.begin_layout(&ids);
                black_box(TableRenderContext::build(&ordered, &view, &pins, viewport, 0, None));
            }
        });
    });

    group.bench_function("sort_and_filter_5k", |b| {
        b.iter(|| {
            let mut view = view.clone();
            view.toggle_sort("Years Of Experience");
            view.set_filter(RowFilter::parse(black_box("engineer")));
            view.row_count()
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_context_build);
criterion_main!(benches);
