use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use ipl_form::extract::parse_player_table;
use ipl_form::form::compute_recent_form;
use ipl_form::history::append;
use ipl_form::pipeline::build_form_table;
use ipl_form::snapshot::{HistoryTable, Snapshot};

const PLAYERS: usize = 250;
const DAYS: u32 = 60;

fn sample_history() -> HistoryTable {
    let headers: Vec<String> = ["Name", "Team", "Runs", "Bat Avg", "Wickets", "Bowl Avg"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let start = NaiveDate::from_ymd_opt(2025, 3, 22).expect("valid date");
    let mut history = HistoryTable::default();
    for day in 0..DAYS {
        let date = start + chrono::Duration::days(i64::from(day));
        let rows: Vec<Vec<String>> = (0..PLAYERS)
            .map(|idx| {
                let d = day as usize;
                vec![
                    format!("Player {idx}"),
                    format!("T{}", idx % 10),
                    (idx * 3 + d * 7).to_string(),
                    format!("{:.2}", (idx % 40) as f64 + d as f64 * 0.1),
                    if idx % 3 == 0 { "-".to_string() } else { (d % 5).to_string() },
                    format!("{:.2}", 18.0 + (idx % 17) as f64),
                ]
            })
            .collect();
        history = append(history, Snapshot::from_table(date, &headers, &rows));
    }
    history
}

fn sample_page() -> String {
    let mut html = String::from(
        r#"<table class="TableLined"><tr><th>Name</th><th>Runs</th><th>Bat Avg</th><th>Wickets</th><th>Bowl Avg</th></tr>"#,
    );
    for idx in 0..PLAYERS {
        html.push_str(&format!(
            "<tr><td><a href=\"p{idx}\">Player {idx}</a></td><td>{}</td><td>{}.50</td><td>{}</td><td>-</td></tr>",
            idx * 4,
            idx % 60,
            idx % 9
        ));
    }
    html.push_str("</table>");
    html
}

fn bench_recent_form(c: &mut Criterion) {
    let history = sample_history();
    c.bench_function("recent_form", |b| {
        b.iter(|| {
            let form = compute_recent_form(black_box(&history));
            black_box(form.len());
        })
    });
}

fn bench_form_table(c: &mut Criterion) {
    let history = sample_history();
    c.bench_function("form_table", |b| {
        b.iter(|| {
            let table = build_form_table(black_box(&history));
            black_box(table.map(|t| t.row_count()));
        })
    });
}

fn bench_player_table_parse(c: &mut Criterion) {
    let page = sample_page();
    c.bench_function("player_table_parse", |b| {
        b.iter(|| {
            let (_, rows) = parse_player_table(black_box(&page)).unwrap();
            black_box(rows.len());
        })
    });
}

criterion_group!(
    benches,
    bench_recent_form,
    bench_form_table,
    bench_player_table_parse
);
criterion_main!(benches);
