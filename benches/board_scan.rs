// benches/board_scan.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use chrono::Local;
use std::time::Duration;

use attok_monitor::{extract::Extractor, filter::NameFilter};

const FAMILY: [&str; 10] = ["김", "이", "박", "최", "정", "강", "조", "윤", "장", "임"];
const GIVEN: [&str; 20] = [
    "민준", "서연", "도윤", "하은", "지호", "수아", "예준", "지우", "시우", "서윤",
    "주원", "하린", "건우", "유나", "현우", "채원", "준서", "지민", "우진", "소율",
];

/// 200 students with a mix of states, qualifiers and page chrome.
fn synthetic_board() -> String {
    let mut out = String::from("출결 관리\n전체 (200)\n등원(120)\n하원(40)\n로그아웃\n");
    for (i, (f, g)) in FAMILY.iter().flat_map(|f| GIVEN.iter().map(move |g| (f, g))).enumerate() {
        let name = if i % 7 == 0 { format!("{f}{g}(침산초)") } else { format!("{f}{g}") };
        let note = match i % 5 {
            0 | 1 | 2 => format!("등원 {:02}:{:02} 하원 -", 13 + i % 5, i % 60),
            3 => format!("등원 13:{:02} 하원 17:{:02}", i % 60, i % 60),
            _ => "등원 - 하원 -".to_string(),
        };
        out.push_str(&format!("{name}\n{note}\n"));
        if i % 25 == 0 {
            out.push_str("원장님\n등원 - 하원 -\n");
        }
    }
    out
}

fn bench_board_scan(c: &mut Criterion) {
    let board = synthetic_board();
    let extractor = Extractor::new(NameFilter::default(), Duration::from_secs(10));
    let filter = NameFilter::default();
    let lines: Vec<&str> = board.lines().collect();

    c.bench_function("filter_all_lines", |b| {
        b.iter(|| black_box(lines.iter().filter(|l| filter.accepts(black_box(l))).count()))
    });

    c.bench_function("extract_200", |b| {
        let now = Local::now();
        b.iter(|| {
            let obs = extractor.parse(black_box(&board), now).unwrap_or_default();
            black_box(obs.len())
        })
    });
}

criterion_group!(benches, bench_board_scan);
criterion_main!(benches);
