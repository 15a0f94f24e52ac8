//! newsflash - render NewsFlash share cards from the command line

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use newsflash::links::{ShareLinks, SocialPlatform};
use newsflash::platform::{DirectorySaver, NoopShareSheet};
use newsflash::{api, generate_filename, ArticleRecord, CardRenderer, NewsflashConfig, ShareDispatcher};

#[derive(Parser)]
#[command(name = "newsflash", version)]
#[command(about = "Render NewsFlash share cards and share links")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an article JSON file into a 1080x1920 PNG card
    Render {
        /// Article JSON (as served by the news API)
        #[arg(short, long)]
        article: PathBuf,

        /// Use the Hindi title, summary, footer and date
        #[arg(long)]
        localized: bool,

        /// Write the card to this file
        #[arg(short, long, conflicts_with = "out_dir")]
        out: Option<PathBuf>,

        /// Save the card into this directory under a generated filename
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Logo path or URL
        #[arg(long)]
        logo: Option<String>,

        /// Skip the logo and draw the text wordmark
        #[arg(long, conflicts_with = "logo")]
        no_logo: bool,

        /// Directory relative asset paths resolve against
        #[arg(long)]
        asset_dir: Option<PathBuf>,

        /// Regular weight TrueType font
        #[arg(long)]
        font: Option<PathBuf>,

        /// Bold weight TrueType font
        #[arg(long)]
        bold_font: Option<PathBuf>,

        /// Font for characters the main fonts lack; repeat to add more
        #[arg(long = "fallback-font")]
        fallback_fonts: Vec<PathBuf>,

        /// Footer date (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print the download filename for a title
    Filename {
        title: String,

        /// Date (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print social share links for a URL
    Links {
        #[arg(long)]
        url: String,

        #[arg(long, default_value = "")]
        title: String,

        /// Only print the link for this platform
        #[arg(long)]
        platform: Option<String>,
    },

    /// Print the category menu as JSON
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            article,
            localized,
            out,
            out_dir,
            logo,
            no_logo,
            asset_dir,
            font,
            bold_font,
            fallback_fonts,
            date,
        } => {
            let mut config = NewsflashConfig {
                asset_dir,
                regular_font: font,
                bold_font,
                fallback_fonts,
                date_override: date,
                ..Default::default()
            };
            if no_logo {
                config.logo = None;
            } else if logo.is_some() {
                config.logo = logo;
            }

            let raw = std::fs::read_to_string(&article)
                .with_context(|| format!("reading article {}", article.display()))?;
            let record: ArticleRecord =
                serde_json::from_str(&raw).with_context(|| format!("parsing article {}", article.display()))?;

            let renderer = CardRenderer::from_config(&config).context("building renderer")?;
            let card = renderer.render_card(&record, localized).await?;

            if let Some(path) = out {
                std::fs::write(&path, card.encode_png()?)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("{}", path.display());
            } else {
                let dir = out_dir.unwrap_or_else(|| PathBuf::from("."));
                let mut dispatcher = ShareDispatcher::new(Arc::new(NoopShareSheet::new()), Arc::new(DirectorySaver::new(dir)));
                if let Some(date) = config.date_override {
                    dispatcher = dispatcher.with_date(date);
                }
                let report = dispatcher
                    .dispatch(&card, Some(record.display_title(localized)))
                    .await?;
                if let Some(path) = report.path {
                    println!("{}", path.display());
                }
            }
        }

        Commands::Filename { title, date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            println!("{}", generate_filename(Some(&title), date));
        }

        Commands::Links { url, title, platform } => {
            let links = ShareLinks::new(&url, &title);
            match platform {
                Some(name) => {
                    let platform = SocialPlatform::from_name(&name)
                        .with_context(|| format!("unknown platform {:?}", name))?;
                    println!("{}", links.for_platform(platform));
                }
                None => {
                    for (platform, link) in links.all() {
                        println!("{}\t{}", platform.name(), link);
                    }
                }
            }
        }

        Commands::Categories => {
            println!("{}", serde_json::to_string_pretty(&api::category_groups())?);
        }
    }

    Ok(())
}
