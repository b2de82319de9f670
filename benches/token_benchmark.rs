use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;
use tokengate::models::{Role, TokenKind};
use tokengate::services::TokenService;

fn benchmark_tokens(c: &mut Criterion) {
    let service = TokenService::new(
        b"bench_access_key_32_bytes_long!!",
        b"bench_refresh_key_32_bytes_long!",
        Duration::from_secs(15 * 60),
        Duration::from_secs(720 * 3600),
    )
    .expect("Failed to build token service");

    let now = 1_700_000_000;
    let subject = "0b7c1a9e-4c1e-4f35-9d6a-2f1b9c3e7a10";
    let credentials = Role::Admin.credentials();
    let pair = service
        .issue(subject, credentials.clone(), now)
        .expect("Failed to issue pair");

    let mut group = c.benchmark_group("tokens");

    group.bench_function("issue_pair", |b| {
        b.iter(|| service.issue(black_box(subject), credentials.clone(), now))
    });

    group.bench_function("parse_access", |b| {
        b.iter(|| service.parse(black_box(&pair.access), TokenKind::Access))
    });

    group.bench_function("parse_refresh", |b| {
        b.iter(|| service.parse(black_box(&pair.refresh), TokenKind::Refresh))
    });

    group.finish();
}

criterion_group!(benches, benchmark_tokens);
criterion_main!(benches);
