#![cfg(feature = "http")]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use image::{ImageFormat, Rgba, RgbaImage};
use tiny_http::{Header, Response, Server};

use newsflash::assets::DefaultAssetLoader;
use newsflash::rendering::text::FontSet;
use newsflash::{ArticleRecord, CardRenderer, NewsflashConfig};

const PHOTO: Rgba<u8> = Rgba([200, 30, 30, 255]);
const LOGO: Rgba<u8> = Rgba([20, 160, 60, 255]);
const BADGE: Rgba<u8> = Rgba([0x63, 0x66, 0xf1, 255]);
const BACKGROUND: Rgba<u8> = Rgba([0xf8, 0xf9, 0xfa, 255]);

fn png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, color);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Asset server on an ephemeral port; counts hits per path.
struct AssetServer {
    base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl AssetServer {
    fn start() -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::new(Mutex::new(HashMap::new()));
        let counter = hits.clone();
        let photo = png(64, 48, PHOTO);
        let logo = png(100, 50, LOGO);
        std::thread::spawn(move || {
            for request in server.incoming_requests() {
                let path = request.url().to_string();
                *counter.lock().unwrap().entry(path.clone()).or_default() += 1;
                let content_type = "Content-Type: image/png".parse::<Header>().unwrap();
                let resp = match path.as_str() {
                    "/photo.png" => Response::from_data(photo.clone()).with_header(content_type),
                    "/logo.png" => Response::from_data(logo.clone()).with_header(content_type),
                    "/broken.png" => Response::from_data(b"definitely not a png".to_vec()).with_header(content_type),
                    _ => Response::from_data(Vec::new()).with_status_code(404),
                };
                let _ = request.respond(resp);
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            hits,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

fn renderer(logo: Option<String>) -> CardRenderer {
    let loader = DefaultAssetLoader::new(&NewsflashConfig::default()).unwrap();
    CardRenderer::new(FontSet::block(), Arc::new(loader))
        .with_logo(logo)
        .with_date(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
}

fn close(a: Rgba<u8>, b: Rgba<u8>) -> bool {
    a.0.iter().zip(b.0.iter()).all(|(x, y)| (*x as i16 - *y as i16).abs() <= 2)
}

#[tokio::test]
async fn budget_story_end_to_end() {
    let server = AssetServer::start();
    let article = ArticleRecord {
        title: "Budget 2025 announced".into(),
        summary: Some("The finance minister presented the annual budget today.".into()),
        category: Some("business".into()),
        image_loc: Some(format!("{{'identifier': '{}'}}", server.url("/photo.png"))),
        ..Default::default()
    };

    let card = renderer(Some(server.url("/logo.png")))
        .render_card(&article, false)
        .await
        .unwrap();
    let surface = card.surface();

    assert_eq!((card.width(), card.height()), (1080, 1920));
    // border, background, divider
    assert_eq!(*surface.get_pixel(1, 900), Rgba([0xe9, 0xec, 0xef, 255]));
    assert_eq!(*surface.get_pixel(30, 1000), BACKGROUND);
    assert_eq!(*surface.get_pixel(540, 1760), Rgba([0xde, 0xe2, 0xe6, 255]));
    // logo block, 2:1 aspect at height 240
    assert!(close(*surface.get_pixel(100, 100), LOGO));
    assert!(close(*surface.get_pixel(530, 270), LOGO));
    // pill behind the category label
    assert_eq!(*surface.get_pixel(856, 182), BADGE);
    // article image centre
    assert!(close(*surface.get_pixel(540, 590), PHOTO));

    let png = card.encode_png().unwrap();
    assert_eq!(&png[1..4], b"PNG");
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1080, 1920));
}

#[tokio::test]
async fn broken_image_renders_like_no_image() {
    let server = AssetServer::start();
    let r = renderer(None);
    let base = ArticleRecord {
        title: "Markets rally".into(),
        category: Some("markets".into()),
        ..Default::default()
    };
    let broken = ArticleRecord {
        image_loc: Some(server.url("/broken.png")),
        ..base.clone()
    };
    let missing = ArticleRecord {
        image_loc: Some(server.url("/missing.png")),
        ..base.clone()
    };

    let without = r.render_card(&base, false).await.unwrap();
    let with_broken = r.render_card(&broken, false).await.unwrap();
    let with_missing = r.render_card(&missing, false).await.unwrap();

    assert_eq!(without.pixel_digest(), with_broken.pixel_digest());
    assert_eq!(without.pixel_digest(), with_missing.pixel_digest());
    assert_eq!(server.hits("/broken.png"), 1);
    // no image block: background where the picture would sit
    assert_eq!(*without.surface().get_pixel(540, 800), BACKGROUND);
}

#[tokio::test]
async fn placeholder_and_malformed_locators_skip_the_image() {
    let r = renderer(None);
    let plain = ArticleRecord {
        title: "Quiet day".into(),
        ..Default::default()
    };
    let placeholder = ArticleRecord {
        image_loc: Some("https://www.thehindu.com/theme/images/og-image.png".into()),
        ..plain.clone()
    };
    let malformed = ArticleRecord {
        image_loc: Some("{'identifier': ".into()),
        ..plain.clone()
    };
    let expected = r.render_card(&plain, false).await.unwrap().pixel_digest();
    assert_eq!(r.render_card(&placeholder, false).await.unwrap().pixel_digest(), expected);
    assert_eq!(r.render_card(&malformed, false).await.unwrap().pixel_digest(), expected);
}

#[tokio::test]
async fn rendering_is_idempotent_and_logo_is_fetched_once() {
    let server = AssetServer::start();
    let r = renderer(Some(server.url("/logo.png")));
    let article = ArticleRecord {
        title: "Same input, same pixels".into(),
        image_loc: Some(server.url("/photo.png")),
        ..Default::default()
    };
    let first = r.render_card(&article, true).await.unwrap();
    let second = r.render_card(&article, true).await.unwrap();
    assert_eq!(first.pixel_digest(), second.pixel_digest());
    assert_eq!(server.hits("/logo.png"), 1);
    assert_eq!(server.hits("/photo.png"), 2);
}

#[tokio::test]
async fn missing_logo_falls_back_to_wordmark() {
    let server = AssetServer::start();
    let article = ArticleRecord {
        title: "t".into(),
        ..Default::default()
    };
    let card = renderer(Some(server.url("/nologo.png")))
        .render_card(&article, false)
        .await
        .unwrap();
    // first block glyph of the bold wordmark
    assert_eq!(*card.surface().get_pixel(70, 100), Rgba([0x21, 0x25, 0x29, 255]));
    assert!(!close(*card.surface().get_pixel(100, 100), LOGO));
}

#[tokio::test]
async fn concurrent_renders_are_independent() {
    let r = Arc::new(renderer(None));
    let hits = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();
    for i in 0..4 {
        let r = r.clone();
        let hits = hits.clone();
        handles.push(tokio::spawn(async move {
            let article = ArticleRecord {
                title: format!("Story number {}", i % 2),
                ..Default::default()
            };
            let card = r.render_card(&article, false).await.unwrap();
            hits.fetch_add(1, Ordering::SeqCst);
            (i % 2, card.pixel_digest())
        }));
    }
    let mut digests: HashMap<i32, String> = HashMap::new();
    for h in handles {
        let (key, digest) = h.await.unwrap();
        if let Some(prev) = digests.insert(key, digest.clone()) {
            assert_eq!(prev, digest);
        }
    }
    assert_eq!(hits.load(Ordering::SeqCst), 4);
    assert_ne!(digests[&0], digests[&1]);
}
