use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tagsift::app::{self, SearchRequest};
use tagsift::config::Config;
use tagsift::date::{DateRange, Timestamp};
use tagsift::prelude::*;
use tagsift::query::RatingMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tagsift")]
#[command(about = "Tag query engine over a JSON photo record fixture", long_about = None)]
pub struct Cli {
    #[arg(short, long, help = "Path to the JSON record fixture")]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the records matched by a query.
    Match {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Count each value of a category among the matched records.
    Classify {
        #[arg(help = "Category to classify")]
        category: String,

        #[command(flatten)]
        query: QueryArgs,

        #[arg(long, value_enum, default_value_t = MediaArg::Any)]
        media: MediaArg,

        #[arg(long, help = "Stop once a second value shows up")]
        partial: bool,
    },

    /// Count matched records per date window.
    Dates {
        #[command(flatten)]
        query: QueryArgs,

        #[arg(
            short,
            long = "window",
            value_parser = parse_window,
            help = "Window as FROM..TO (YYYY-MM-DD); defaults to the full range"
        )]
        windows: Vec<DateRange>,
    },

    /// Report suspicious match text.
    Check {
        #[command(flatten)]
        query: QueryArgs,
    },
}

#[derive(Args)]
pub struct QueryArgs {
    #[arg(
        short,
        long = "category",
        value_parser = parse_category,
        help = "Match text as CATEGORY=TEXT, e.g. 'People=Jesper & !Jim'"
    )]
    categories: Vec<(String, String)>,

    #[arg(long)]
    label: Option<String>,

    #[arg(long, help = "Words that must all appear in the description")]
    description: Option<String>,

    #[arg(long)]
    rating: Option<u8>,

    #[arg(long, value_enum, default_value_t = RatingArg::Exact)]
    rating_mode: RatingArg,

    #[arg(long, help = "Only RAW files")]
    raw: bool,

    #[arg(long, help = "Regex on the file name")]
    pattern: Option<String>,

    #[arg(long, help = "Case-insensitive text searched everywhere")]
    freeform: Option<String>,
}

impl QueryArgs {
    fn to_request(&self) -> SearchRequest {
        SearchRequest {
            categories: self.categories.iter().cloned().collect::<BTreeMap<_, _>>(),
            label: self.label.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            rating: self.rating,
            rating_mode: self.rating_mode.into(),
            raw_only: self.raw,
            file_name_pattern: self.pattern.clone(),
            freeform: self.freeform.clone(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MediaArg {
    Image,
    Video,
    Any,
}

impl From<MediaArg> for MediaMask {
    fn from(value: MediaArg) -> Self {
        match value {
            MediaArg::Image => MediaMask::IMAGE,
            MediaArg::Video => MediaMask::VIDEO,
            MediaArg::Any => MediaMask::ANY,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RatingArg {
    Exact,
    AtLeast,
    LessThan,
    NotEqual,
}

impl From<RatingArg> for RatingMode {
    fn from(value: RatingArg) -> Self {
        match value {
            RatingArg::Exact => RatingMode::Exact,
            RatingArg::AtLeast => RatingMode::AtLeast,
            RatingArg::LessThan => RatingMode::LessThan,
            RatingArg::NotEqual => RatingMode::NotEqual,
        }
    }
}

fn parse_category(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(category, text)| (category.trim().to_string(), text.to_string()))
        .ok_or_else(|| format!("expected CATEGORY=TEXT, got {arg:?}"))
}

fn parse_day(arg: &str) -> Result<Timestamp, String> {
    NaiveDate::parse_from_str(arg.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| format!("expected YYYY-MM-DD, got {arg:?}"))
}

fn parse_window(arg: &str) -> Result<DateRange, String> {
    let (from, to) = arg
        .split_once("..")
        .ok_or_else(|| format!("expected FROM..TO, got {arg:?}"))?;
    Ok(DateRange::between(parse_day(from)?, parse_day(to)?))
}

fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = app::load_store(&cli.store)?;

    match cli.command {
        Commands::Match { query } => {
            let mut query = query.to_request().build(&store)?;
            let names: Vec<&str> = app::search(&store, &mut query)
                .into_iter()
                .map(|image| image.file_name.as_str())
                .collect();

            println!("{}", serde_json::to_string_pretty(&names)?);
        }
        Commands::Classify {
            category,
            query,
            media,
            partial,
        } => {
            let query = query.to_request().build(&store)?;
            let mode = if partial || config.partial_count {
                CountMode::Partial
            } else {
                CountMode::Exact
            };
            let counts = app::classify(&store, &query, &category, media.into(), mode);

            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
        Commands::Dates { query, windows } => {
            let mut query = query.to_request().build(&store)?;
            let index = app::date_index(&store, &mut query, config.date_cache_capacity);
            let windows = if windows.is_empty() {
                vec![DateRange::between(index.lower_bound(), index.upper_bound())]
            } else {
                windows
            };

            let counts: Vec<(DateRange, ImageCount)> = windows
                .into_iter()
                .map(|window| (window, index.count(&window)))
                .collect();

            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
        Commands::Check { query } => {
            let request = query.to_request();
            request.validate()?;

            let query = request.build(&store)?;
            println!("✅ {}", query.to_display_string());
        }
    }

    Ok(())
}
