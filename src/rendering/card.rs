//! Share-card composition.
//!
//! [`CardRenderer::render_card`] loads the logo and the article image, lays the
//! card out into paint commands and rasterizes them onto a fixed 1080×1920
//! portrait surface. Asset failures never fail a render: a missing logo is
//! replaced by a text wordmark and a missing article image is skipped.

use chrono::{Datelike, Local, NaiveDate};
use image::RgbaImage;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::article::ArticleRecord;
use crate::assets::{load_image, AssetLoader, DefaultAssetLoader};
use crate::rendering::layout::{truncate_chars, wrap_lines, Rect};
use crate::rendering::paint::{rgb, rgba, ImageFit, PaintCommand, Shadow, TextAlign};
use crate::rendering::raster;
use crate::rendering::text::{FontSet, Weight};
use crate::rendering::RenderedImage;
use crate::{NewsflashConfig, Result};

pub const CANVAS_WIDTH: u32 = 1080;
pub const CANVAS_HEIGHT: u32 = 1920;

const WIDTH: f32 = CANVAS_WIDTH as f32;
const HEIGHT: f32 = CANVAS_HEIGHT as f32;
const PADDING: f32 = 60.0;
const CONTENT_Y: f32 = 120.0;
const CONTENT_WIDTH: f32 = WIDTH - PADDING * 2.0;

const BORDER_WIDTH: f32 = 4.0;

const LOGO_HEIGHT: f32 = 240.0;
const LOGO_MAX_WIDTH: f32 = CONTENT_WIDTH;
const LOGO_RAISE: f32 = 80.0;
const WORDMARK: &str = "NewsFlash";
const WORDMARK_SIZE: f32 = 56.0;

const BADGE_SIZE: f32 = 28.0;
const BADGE_PADDING: f32 = 40.0;
const BADGE_HEIGHT: f32 = 44.0;
const BADGE_RADIUS: f32 = 22.0;
const BADGE_DROP: f32 = 40.0;
const BADGE_BASELINE: f32 = 30.0;

const BODY_TOP: f32 = CONTENT_Y + 200.0;

const IMAGE_WIDTH: f32 = 960.0;
const IMAGE_HEIGHT: f32 = 540.0;
const IMAGE_RADIUS: f32 = 24.0;
const IMAGE_GAP: f32 = 80.0;

const TITLE_SIZE: f32 = 68.0;
const TITLE_LINE_HEIGHT: f32 = 80.0;
const UNTITLED: &str = "Untitled";

const SUMMARY_SIZE: f32 = 48.0;
const SUMMARY_LINE_HEIGHT: f32 = 60.0;
const SUMMARY_GAP: f32 = 40.0;
pub const SUMMARY_MAX_CHARS: usize = 200;

const FOOTER_Y: f32 = HEIGHT - 120.0;
const DIVIDER_Y: f32 = FOOTER_Y - 40.0;
const DIVIDER_WIDTH: f32 = 3.0;
const FOOTER_SIZE: f32 = 38.0;
const DATE_SIZE: f32 = 32.0;
/// Lowest baseline body text may use before it would collide with the footer
const CONTENT_LIMIT: f32 = DIVIDER_Y - 20.0;

const FOOTER_TEXT: &str = "📱 Read more at NewsFlash";
const FOOTER_TEXT_LOCALIZED: &str = "📱 NewsFlash पर और पढ़ें";

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
    "November", "December",
];

const MONTHS_HI: [&str; 12] = [
    "जनवरी", "फ़रवरी", "मार्च", "अप्रैल", "मई", "जून", "जुलाई", "अगस्त", "सितंबर", "अक्टूबर", "नवंबर", "दिसंबर",
];

/// Long-form date for the card footer: "October 16, 2026" or, localized,
/// "16 अक्टूबर 2026".
pub fn format_card_date(date: NaiveDate, localized: bool) -> String {
    let month = date.month0() as usize;
    if localized {
        format!("{} {} {}", date.day(), MONTHS_HI[month], date.year())
    } else {
        format!("{} {}, {}", MONTHS[month], date.day(), date.year())
    }
}

/// Summary text as it appears on the card.
pub fn card_summary(summary: &str) -> String {
    truncate_chars(summary, SUMMARY_MAX_CHARS)
}

/// Renders articles into share cards.
pub struct CardRenderer {
    fonts: FontSet,
    loader: Arc<dyn AssetLoader>,
    logo: Option<String>,
    logo_cache: OnceCell<Arc<RgbaImage>>,
    date: Option<NaiveDate>,
}

impl CardRenderer {
    pub fn new(fonts: FontSet, loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            fonts,
            loader,
            logo: None,
            logo_cache: OnceCell::new(),
            date: None,
        }
    }

    /// Build a renderer from configuration: fonts from the configured paths
    /// (or system fonts), assets through the default loader.
    pub fn from_config(config: &NewsflashConfig) -> Result<Self> {
        let fonts = FontSet::load(
            config.regular_font.as_deref(),
            config.bold_font.as_deref(),
            &config.fallback_fonts,
        );
        let loader = DefaultAssetLoader::new(config)?;
        let mut renderer = Self::new(fonts, Arc::new(loader)).with_logo(config.logo.clone());
        renderer.date = config.date_override;
        Ok(renderer)
    }

    /// Location of the logo asset; `None` always draws the text wordmark.
    pub fn with_logo(mut self, logo: Option<String>) -> Self {
        self.logo = logo;
        self.logo_cache = OnceCell::new();
        self
    }

    /// Pin the footer date instead of using today's local date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Date printed in the footer.
    pub fn card_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Render `article` into a 1080×1920 card. `localized` selects the Hindi
    /// title, summary, footer and date format.
    pub async fn render_card(&self, article: &ArticleRecord, localized: bool) -> Result<RenderedImage> {
        let (logo, picture) = futures::join!(self.load_logo(), self.load_article_image(article));
        let commands = self.compose(article, localized, logo, picture);
        log::debug!("rasterizing share card with {} paint commands", commands.len());
        let surface = raster::rasterize(CANVAS_WIDTH, CANVAS_HEIGHT, &commands, &self.fonts)?;
        Ok(RenderedImage::new(surface))
    }

    async fn load_logo(&self) -> Option<Arc<RgbaImage>> {
        let location = self.logo.as_deref()?;
        let loaded = self
            .logo_cache
            .get_or_try_init(|| async {
                load_image(self.loader.as_ref(), location).await.map(Arc::new)
            })
            .await;
        match loaded {
            Ok(logo) => Some(logo.clone()),
            Err(e) => {
                log::warn!("logo unavailable, drawing wordmark: {}", e);
                None
            }
        }
    }

    async fn load_article_image(&self, article: &ArticleRecord) -> Option<Arc<RgbaImage>> {
        let url = article.image_url()?;
        match load_image(self.loader.as_ref(), &url).await {
            Ok(img) => Some(Arc::new(img)),
            Err(e) => {
                log::warn!("continuing without article image: {}", e);
                None
            }
        }
    }

    /// Lay the card out into paint commands. Pure: no I/O, no clock reads
    /// beyond [`CardRenderer::card_date`].
    pub fn compose(
        &self,
        article: &ArticleRecord,
        localized: bool,
        logo: Option<Arc<RgbaImage>>,
        picture: Option<Arc<RgbaImage>>,
    ) -> Vec<PaintCommand> {
        let mut cmds = Vec::new();

        cmds.push(PaintCommand::Fill { color: rgb(0xf8f9fa) });
        cmds.push(PaintCommand::StrokeRect {
            rect: Rect::new(0.0, 0.0, WIDTH, HEIGHT),
            width: BORDER_WIDTH,
            color: rgb(0xe9ecef),
        });

        match logo.filter(|l| l.width() > 0 && l.height() > 0) {
            Some(logo) => {
                let logo_width = (logo.width() as f32 / logo.height() as f32 * LOGO_HEIGHT).min(LOGO_MAX_WIDTH);
                cmds.push(PaintCommand::Image {
                    rect: Rect::new(PADDING, CONTENT_Y - LOGO_RAISE, logo_width, LOGO_HEIGHT),
                    radius: 0.0,
                    fit: ImageFit::Stretch,
                    shadow: None,
                    image: logo,
                });
            }
            None => cmds.push(PaintCommand::Text {
                x: PADDING,
                baseline: CONTENT_Y,
                text: WORDMARK.to_string(),
                size: WORDMARK_SIZE,
                weight: Weight::Bold,
                align: TextAlign::Left,
                color: rgb(0x212529),
            }),
        }

        self.compose_badge(&mut cmds, article.category_label());

        let mut y = BODY_TOP;
        if let Some(picture) = picture {
            cmds.push(PaintCommand::Image {
                rect: Rect::new(PADDING, y, IMAGE_WIDTH, IMAGE_HEIGHT),
                radius: IMAGE_RADIUS,
                fit: ImageFit::Cover,
                shadow: Some(Shadow {
                    color: rgba(0x000000, 26),
                    blur: 20.0,
                    offset_x: 0.0,
                    offset_y: 10.0,
                }),
                image: picture,
            });
            y += IMAGE_HEIGHT + IMAGE_GAP;
        }

        let title = article.display_title(localized);
        let title = if title.trim().is_empty() { UNTITLED } else { title };
        y = self.compose_paragraph(&mut cmds, title, y, Weight::Bold, TITLE_SIZE, TITLE_LINE_HEIGHT, rgb(0x212529));

        if let Some(summary) = article.display_summary(localized) {
            y += SUMMARY_GAP;
            let summary = card_summary(summary);
            self.compose_paragraph(&mut cmds, &summary, y, Weight::Regular, SUMMARY_SIZE, SUMMARY_LINE_HEIGHT, rgb(0x495057));
        }

        self.compose_footer(&mut cmds, localized);
        cmds
    }

    fn compose_badge(&self, cmds: &mut Vec<PaintCommand>, category: &str) {
        let label = category.to_uppercase();
        let width = self.fonts.measure(Weight::Bold, &label, BADGE_SIZE) + BADGE_PADDING;
        let x = WIDTH - PADDING - width;
        let y = CONTENT_Y + BADGE_DROP;
        cmds.push(PaintCommand::RoundedRect {
            rect: Rect::new(x, y, width, BADGE_HEIGHT),
            radius: BADGE_RADIUS,
            color: rgb(0x6366f1),
        });
        cmds.push(PaintCommand::Text {
            x: x + width / 2.0,
            baseline: y + BADGE_BASELINE,
            text: label,
            size: BADGE_SIZE,
            weight: Weight::Bold,
            align: TextAlign::Center,
            color: rgb(0xffffff),
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn compose_paragraph(
        &self,
        cmds: &mut Vec<PaintCommand>,
        text: &str,
        y: f32,
        weight: Weight,
        size: f32,
        line_height: f32,
        color: image::Rgba<u8>,
    ) -> f32 {
        let face = self.fonts.face(weight);
        let block = wrap_lines(text, CONTENT_WIDTH, y, line_height, |s| face.measure(s, size));
        for line in block.lines {
            if line.baseline_y > CONTENT_LIMIT {
                log::debug!("clipping text below the footer: {:?}", line.text);
                continue;
            }
            cmds.push(PaintCommand::Text {
                x: PADDING,
                baseline: line.baseline_y,
                text: line.text,
                size,
                weight,
                align: TextAlign::Left,
                color,
            });
        }
        block.next_y
    }

    fn compose_footer(&self, cmds: &mut Vec<PaintCommand>, localized: bool) {
        cmds.push(PaintCommand::HLine {
            x0: PADDING,
            x1: WIDTH - PADDING,
            y: DIVIDER_Y,
            width: DIVIDER_WIDTH,
            color: rgb(0xdee2e6),
        });
        cmds.push(PaintCommand::Text {
            x: PADDING,
            baseline: FOOTER_Y,
            text: (if localized { FOOTER_TEXT_LOCALIZED } else { FOOTER_TEXT }).to_string(),
            size: FOOTER_SIZE,
            weight: Weight::Bold,
            align: TextAlign::Left,
            color: rgb(0x495057),
        });
        cmds.push(PaintCommand::Text {
            x: WIDTH - PADDING,
            baseline: FOOTER_Y,
            text: format_card_date(self.card_date(), localized),
            size: DATE_SIZE,
            weight: Weight::Regular,
            align: TextAlign::Right,
            color: rgb(0x6c757d),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetLoader;

    fn renderer() -> CardRenderer {
        CardRenderer::new(FontSet::block(), Arc::new(MemoryAssetLoader::new()))
            .with_date(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    fn texts(cmds: &[PaintCommand]) -> Vec<&str> {
        cmds.iter().filter_map(|c| c.text()).collect()
    }

    #[test]
    fn dates_follow_language() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(format_card_date(d, false), "October 16, 2026");
        assert_eq!(format_card_date(d, true), "16 अक्टूबर 2026");
    }

    #[test]
    fn missing_logo_draws_wordmark() {
        let article = ArticleRecord {
            title: "Hello".into(),
            ..Default::default()
        };
        let cmds = renderer().compose(&article, false, None, None);
        assert!(texts(&cmds).contains(&WORDMARK));
        assert!(!cmds.iter().any(|c| matches!(c, PaintCommand::Image { .. })));
    }

    #[test]
    fn logo_keeps_aspect_ratio() {
        let logo = Arc::new(RgbaImage::new(300, 100));
        let article = ArticleRecord::default();
        let cmds = renderer().compose(&article, false, Some(logo), None);
        let rect = cmds
            .iter()
            .find_map(|c| match c {
                PaintCommand::Image { rect, .. } => Some(*rect),
                _ => None,
            })
            .unwrap();
        assert_eq!(rect, Rect::new(60.0, 40.0, 720.0, 240.0));
        assert!(!texts(&cmds).contains(&WORDMARK));
        assert!(texts(&cmds).contains(&UNTITLED));
    }

    #[test]
    fn very_wide_logo_stays_on_the_canvas() {
        let logo = Arc::new(RgbaImage::new(20_000, 10));
        let cmds = renderer().compose(&ArticleRecord::default(), false, Some(logo), None);
        let rect = cmds
            .iter()
            .find_map(|c| match c {
                PaintCommand::Image { rect, .. } => Some(*rect),
                _ => None,
            })
            .unwrap();
        assert_eq!(rect.width, LOGO_MAX_WIDTH);
        assert!(rect.right() <= WIDTH - PADDING);
    }

    #[tokio::test]
    async fn strip_shaped_article_image_renders() {
        let mut bytes = std::io::Cursor::new(Vec::new());
        RgbaImage::from_pixel(1, 20_000, image::Rgba([200, 30, 30, 255]))
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        let loader = MemoryAssetLoader::new().with("https://img.example/strip.png", bytes.into_inner());
        let r = CardRenderer::new(FontSet::block(), Arc::new(loader))
            .with_date(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        let article = ArticleRecord {
            title: "Tall picture".into(),
            image_loc: Some("https://img.example/strip.png".into()),
            ..Default::default()
        };
        let card = r.render_card(&article, false).await.unwrap();
        assert_eq!((card.width(), card.height()), (CANVAS_WIDTH, CANVAS_HEIGHT));
        assert_eq!(card.surface().get_pixel(540, 590), &image::Rgba([200, 30, 30, 255]));
    }

    #[test]
    fn long_business_story_without_image() {
        let summary: String = "abcdefghij".repeat(25);
        assert_eq!(summary.chars().count(), 250);
        let article = ArticleRecord {
            title: "Budget 2025 announced with sweeping changes to income tax slabs and rail spending".into(),
            summary: Some(summary.clone()),
            category: Some("business".into()),
            image_loc: None,
            ..Default::default()
        };
        let cmds = renderer().compose(&article, false, None, None);

        assert!(!cmds.iter().any(|c| matches!(c, PaintCommand::Image { .. })));
        let t = texts(&cmds);
        assert!(t.contains(&"BUSINESS"));

        let title_lines: Vec<&PaintCommand> = cmds
            .iter()
            .filter(|c| matches!(c, PaintCommand::Text { size, .. } if *size == TITLE_SIZE))
            .collect();
        assert!(title_lines.len() > 1);

        let drawn_summary: Vec<&str> = cmds
            .iter()
            .filter_map(|c| match c {
                PaintCommand::Text { text, size, .. } if *size == SUMMARY_SIZE => Some(text.as_str()),
                _ => None,
            })
            .collect();
        let expected = format!("{}...", &summary[..200]);
        assert_eq!(drawn_summary.join(" "), expected);
    }

    #[test]
    fn badge_is_right_anchored() {
        let article = ArticleRecord {
            title: "t".into(),
            category: Some("sports".into()),
            ..Default::default()
        };
        let r = renderer();
        let cmds = r.compose(&article, false, None, None);
        let badge = cmds
            .iter()
            .find_map(|c| match c {
                PaintCommand::RoundedRect { rect, radius, .. } => Some((*rect, *radius)),
                _ => None,
            })
            .unwrap();
        let expected_w = r.fonts().measure(Weight::Bold, "SPORTS", 28.0) + 40.0;
        assert_eq!(badge.1, 22.0);
        assert_eq!(badge.0.height, 44.0);
        assert!((badge.0.width - expected_w).abs() < 1e-3);
        assert!((badge.0.right() - 1020.0).abs() < 1e-3);
        assert!(texts(&cmds).contains(&"SPORTS"));
    }

    #[test]
    fn picture_pushes_title_below_image_block() {
        let article = ArticleRecord {
            title: "Short".into(),
            ..Default::default()
        };
        let pic = Arc::new(RgbaImage::new(10, 10));
        let cmds = renderer().compose(&article, false, None, Some(pic));
        let title_baseline = cmds
            .iter()
            .find_map(|c| match c {
                PaintCommand::Text { text, baseline, .. } if text == "Short" => Some(*baseline),
                _ => None,
            })
            .unwrap();
        assert_eq!(title_baseline, 320.0 + 540.0 + 80.0);

        let no_pic = renderer().compose(&article, false, None, None);
        let baseline = no_pic
            .iter()
            .find_map(|c| match c {
                PaintCommand::Text { text, baseline, .. } if text == "Short" => Some(*baseline),
                _ => None,
            })
            .unwrap();
        assert_eq!(baseline, 320.0);
    }

    #[test]
    fn body_text_never_reaches_footer() {
        let article = ArticleRecord {
            title: "word ".repeat(200),
            summary: Some("more ".repeat(100)),
            ..Default::default()
        };
        let cmds = renderer().compose(&article, false, None, None);
        for cmd in &cmds {
            if let PaintCommand::Text { baseline, size, .. } = cmd {
                if *size == TITLE_SIZE || *size == SUMMARY_SIZE {
                    assert!(*baseline <= CONTENT_LIMIT);
                }
            }
        }
    }

    #[test]
    fn localized_footer() {
        let article = ArticleRecord {
            title: "Budget".into(),
            titlehindi: Some("बजट".into()),
            ..Default::default()
        };
        let cmds = renderer().compose(&article, true, None, None);
        let t = texts(&cmds);
        assert!(t.contains(&"बजट"));
        assert!(t.contains(&FOOTER_TEXT_LOCALIZED));
        assert!(t.contains(&"16 अक्टूबर 2026"));
    }
}
