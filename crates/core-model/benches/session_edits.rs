use core_actions::{EditIntent, Motion};
use core_model::{EditorSession, SessionOptions};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Instant;

fn large_document(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("    let value_{i} = compute({i}) + offset; // line {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn session_with(lines: usize) -> EditorSession {
    let mut s = EditorSession::new(SessionOptions::default());
    s.load(&large_document(lines), Instant::now());
    s
}

fn bench_typing(c: &mut Criterion) {
    c.bench_function("type_char_10k_lines", |b| {
        let mut s = session_with(10_000);
        s.scroll_to_line(5_000);
        let now = Instant::now();
        b.iter(|| {
            s.apply(EditIntent::Insert("x".into()), now);
            s.apply(EditIntent::Backspace, now);
        });
    });
}

fn bench_multiline_paste(c: &mut Criterion) {
    let chunk = large_document(200);
    c.bench_function("paste_200_lines_into_10k", |b| {
        b.iter_batched(
            || session_with(10_000),
            |mut s| {
                s.apply(EditIntent::Paste(chunk.clone()), Instant::now());
                black_box(s.engine().buffer().line_count())
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

fn bench_frame(c: &mut Criterion) {
    let mut s = session_with(50_000);
    s.apply(
        EditIntent::Move {
            motion: Motion::PageDown(1_000),
            extend: true,
        },
        Instant::now(),
    );
    c.bench_function("frame_50k_lines_with_selection", |b| {
        b.iter(|| black_box(s.frame()));
    });
}

criterion_group!(benches, bench_typing, bench_multiline_paste, bench_frame);
criterion_main!(benches);
