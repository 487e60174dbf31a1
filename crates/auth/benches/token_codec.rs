use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bookly_auth::{Role, SigningAlgorithm, SigningSecret, SubjectClaims, TokenClaims, TokenCodec, TokenKind};
use bookly_core::UserId;
use std::time::Duration;

fn subject() -> SubjectClaims {
    SubjectClaims {
        user_uid: UserId::new(),
        email: "reader@example.com".to_string(),
        role: Some(Role::USER),
    }
}

/// Encode cost per algorithm (login and refresh pay this).
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_encode");
    let secret = SigningSecret::new("bench-secret");

    for alg in [SigningAlgorithm::Hs256, SigningAlgorithm::Hs384, SigningAlgorithm::Hs512] {
        let codec = TokenCodec::new(&secret, alg);
        let subject = subject();
        group.bench_with_input(BenchmarkId::from_parameter(alg), &alg, |b, _| {
            b.iter(|| {
                let issued = codec
                    .encode(subject.clone(), TokenKind::Access, Duration::from_secs(900))
                    .unwrap();
                black_box(issued.token);
            });
        });
    }

    group.finish();
}

/// Decode cost per algorithm (every authenticated request pays this).
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_decode");
    group.sample_size(1000);
    let secret = SigningSecret::new("bench-secret");

    for alg in [SigningAlgorithm::Hs256, SigningAlgorithm::Hs384, SigningAlgorithm::Hs512] {
        let codec = TokenCodec::new(&secret, alg);
        let token = codec
            .encode(subject(), TokenKind::Access, Duration::from_secs(900))
            .unwrap()
            .token;
        group.bench_with_input(BenchmarkId::from_parameter(alg), &token, |b, token| {
            b.iter(|| {
                let claims: TokenClaims = codec.decode(black_box(token)).unwrap();
                black_box(claims.jti);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
