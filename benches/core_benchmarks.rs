use cardvault::engine::export::ExportOrder;
use cardvault::engine::tokenizer::RandomDigitTokenizer;
use cardvault::store::InMemoryUserRepository;
use cardvault::vault_core::audit::AuditLogger;
use cardvault::{CardId, CardTokenizer, Config, LoginRequest, Session, SessionContext, User};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn context() -> SessionContext {
    let users = (0..100).map(|i| User::new(format!("user{}", i), "pw"));
    SessionContext::new(
        Arc::new(Config::default()),
        Arc::new(InMemoryUserRepository::with_users(users)),
        Arc::new(RandomDigitTokenizer::new()),
    )
    .with_audit(AuditLogger::disabled())
}

fn bench_tokenize(c: &mut Criterion) {
    let card = CardId::new("4111111111111111");
    let tokenizer = RandomDigitTokenizer::new();

    c.bench_function("tokenize_16_digits", |b| {
        b.iter(|| tokenizer.tokenize(black_box(&card)))
    });
}

fn bench_register_card(c: &mut Criterion) {
    let ctx = context();
    let mut session = Session::authenticate(&ctx, LoginRequest::new("user0", "pw"))
        .expect("Failed to authenticate");
    let card = CardId::new("4111111111111111");

    c.bench_function("register_card_in_memory", |b| {
        b.iter(|| session.register_card(black_box(&card)))
    });
}

fn bench_export_sorted(c: &mut Criterion) {
    let ctx = context();
    let mut session = Session::authenticate(&ctx, LoginRequest::new("user1", "pw"))
        .expect("Failed to authenticate");
    for i in 0..1_000 {
        session
            .register_card(&CardId::new(format!("5500{:012}", i)))
            .expect("Failed to register card");
    }

    c.bench_function("export_sorted_1000_rows", |b| {
        b.iter(|| {
            let mut out = Vec::<u8>::with_capacity(64 * 1024);
            let _ = session.export_sorted(|a, b| ExportOrder::Descending.compare(a, b), &mut out);
            out
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_register_card, bench_export_sorted);
criterion_main!(benches);
