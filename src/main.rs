mod app;
mod market;
mod util;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::market::{SizingMode, Timeframe};

const MIN_REFRESH_SECS: u64 = 5;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Market snapshot in the CoinGecko `/coins/markets` JSON shape.
    #[arg(long, default_value = "markets.json")]
    snapshot: PathBuf,

    /// Directory holding coin logos, looked up by the file name of each image URL.
    #[arg(long)]
    images: Option<PathBuf>,

    #[arg(long, default_value_t = 60)]
    refresh_secs: u64,

    /// Entities kept after stablecoin and wrapped-asset exclusion.
    #[arg(long, default_value_t = 100)]
    fetch_limit: usize,

    #[arg(long, default_value_t = 100)]
    max_count: usize,

    /// In change mode without a search, keep only the N biggest movers.
    #[arg(long, default_value_t = 100)]
    auto_trim: usize,

    #[arg(long, value_enum, default_value_t = Timeframe::Day)]
    timeframe: Timeframe,

    #[arg(long, value_enum, default_value_t = SizingMode::Change)]
    mode: SizingMode,
}

impl Args {
    fn into_config(self) -> app::AppConfig {
        app::AppConfig {
            snapshot: self.snapshot,
            images: self.images,
            refresh_interval: Duration::from_secs(self.refresh_secs.max(MIN_REFRESH_SECS)),
            fetch_limit: self.fetch_limit.max(1),
            max_count: self.max_count.max(1),
            auto_trim: self.auto_trim,
            timeframe: self.timeframe,
            mode: self.mode,
        }
    }
}

fn main() -> eframe::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("coin_bubbles=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Args::parse().into_config();
    tracing::info!(snapshot = %config.snapshot.display(), "starting coin bubbles");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Coin Bubbles",
        options,
        Box::new(move |cc| Ok(Box::new(app::BubbleApp::new(cc, config)))),
    )
}
