use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use chrono::NaiveDate;
use newsflash::assets::MemoryAssetLoader;
use newsflash::rendering::layout::wrap_lines;
use newsflash::rendering::text::{FontSet, Weight};
use newsflash::{ArticleRecord, CardRenderer};

const SUMMARY: &str = "The finance minister presented the annual budget in Parliament, raising the \
    income tax exemption limit and increasing capital expenditure on railways, roads and rural \
    housing for the coming financial year.";

fn bench_wrap(c: &mut Criterion) {
    let fonts = FontSet::block();
    let face = fonts.face(Weight::Regular);
    c.bench_function("wrap_summary", |b| {
        b.iter(|| wrap_lines(SUMMARY, 960.0, 0.0, 60.0, |s| face.measure(s, 48.0)))
    });
}

fn bench_render_card(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let renderer = CardRenderer::new(FontSet::block(), Arc::new(MemoryAssetLoader::new()))
        .with_logo(None)
        .with_date(NaiveDate::from_ymd_opt(2026, 10, 16).expect("date"));
    let article = ArticleRecord {
        title: "Budget 2025 announced".into(),
        summary: Some(SUMMARY.into()),
        category: Some("business".into()),
        ..Default::default()
    };

    c.bench_function("render_card", |b| {
        b.iter(|| rt.block_on(renderer.render_card(&article, false)).expect("render"))
    });

    let card = rt.block_on(renderer.render_card(&article, false)).expect("render");
    c.bench_function("encode_png", |b| b.iter(|| card.encode_png().expect("encode")));
}

criterion_group!(benches, bench_wrap, bench_render_card);
criterion_main!(benches);
