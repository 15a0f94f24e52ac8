use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use newsflash::assets::MemoryAssetLoader;
use newsflash::rendering::text::FontSet;
use newsflash::{ArticleRecord, CardRenderer};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

fn check_golden(name: &str, digest: &str) {
    let expected_path = golden_path(name);
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, digest).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    let exp = fs::read_to_string(&expected_path)
        .unwrap_or_else(|e| panic!("missing golden {:?} ({}); run with UPDATE_GOLDENS=1", expected_path, e));
    assert_eq!(digest, exp.trim());
}

fn fixture() -> ArticleRecord {
    let raw = fs::read_to_string("tests/goldens/articles/budget.json").expect("read fixture");
    serde_json::from_str(&raw).expect("parse fixture")
}

fn renderer() -> CardRenderer {
    CardRenderer::new(FontSet::block(), Arc::new(MemoryAssetLoader::new()))
        .with_logo(None)
        .with_date(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
}

#[tokio::test]
async fn golden_card_english() {
    let card = renderer().render_card(&fixture(), false).await.unwrap();
    check_golden("budget_en.sha256", &card.pixel_digest());
}

#[tokio::test]
async fn golden_card_localized() {
    let card = renderer().render_card(&fixture(), true).await.unwrap();
    check_golden("budget_hi.sha256", &card.pixel_digest());
}
