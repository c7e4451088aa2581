mod app;
mod ledger;
mod util;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON bank export to visualize.
    #[arg(long, default_value = "expenses.json")]
    ledger: PathBuf,

    /// Diagram width in pixels; drives the horizontal day scale.
    #[arg(long, default_value_t = 750.0)]
    width: f32,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let store = ledger::load_ledger(&args.ledger)
        .with_context(|| format!("loading ledger {}", args.ledger.display()))?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width + 60.0, 920.0]),
        ..Default::default()
    };

    let width = args.width;
    eframe::run_native(
        "ledgerviz",
        options,
        Box::new(move |cc| Ok(Box::new(app::LedgerApp::new(cc, store, width)))),
    )
    .map_err(|error| anyhow::anyhow!("running ledgerviz window: {error}"))
}
