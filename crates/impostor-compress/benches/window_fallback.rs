use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use impostor_compress::{fallback_summary, partition, render_prompt_context};
use impostor_core::{CompressorConfig, Message, Role};
use std::hint::black_box;

fn transcript(n: i64) -> Vec<Message> {
    (1..=n)
        .map(|id| Message {
            id,
            session_id: "bench".to_string(),
            role: if id % 2 == 1 { Role::User } else { Role::Assistant },
            content: "I was fixing wires in electrical when the lights went out, \
                      and I heard someone run toward storage."
                .repeat(3),
            timestamp: Utc::now(),
        })
        .collect()
}

fn bench_fallback_50_messages(c: &mut Criterion) {
    let config = CompressorConfig::default();
    let messages = transcript(50);
    let existing = "Red accused Blue of venting near medbay. ".repeat(10);

    c.bench_function("fallback_50_messages", |b| {
        b.iter(|| {
            let window = partition(black_box(&messages), config.keep_recent);
            fallback_summary(window.old, Some(existing.as_str()), &config)
        });
    });
}

fn bench_render_recent_window(c: &mut Criterion) {
    let messages = transcript(3);
    let summary = "Blue claims to have been in admin the whole round.";

    c.bench_function("render_recent_window", |b| {
        b.iter(|| render_prompt_context(black_box(summary), black_box(&messages)));
    });
}

criterion_group!(benches, bench_fallback_50_messages, bench_render_recent_window);
criterion_main!(benches);
