use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod price;
mod script;
mod session;

use price::TickScale;
use script::parse_line;
use session::{Event, Session};

#[derive(Parser)]
#[command(name = "lob-cli")]
#[command(about = "Drive an in-process limit order book from an order script")]
struct Cli {
    /// Decimal places of one price tick (2 means 100.50 is 10050 ticks)
    #[arg(long, default_value_t = 2)]
    price_decimals: u32,
    /// Print one JSON object per command instead of text
    #[arg(long)]
    json: bool,
    /// Log filter, overrides RUST_LOG (e.g. "debug", "orderbook=trace")
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script file, or stdin when no file is given
    Run { file: Option<PathBuf> },
    /// Walk through building, crossing, sweeping and cancelling
    Demo,
}

// Mirrors the walkthrough: two bids, two asks, an aggressive buy,
// a market sell, then a cancel of the deeper bid.
const DEMO_SCRIPT: &str = "\
limit buy 99.5 100
limit buy 99.0 150
limit sell 100.5 80
limit sell 101.0 120
top
count
limit buy 100.7 100
trades
top
market sell 50
trades
top
cancel 2
count
";

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn emit(out: &mut impl Write, event: &Event, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, event)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{event}")?;
    }
    Ok(())
}

fn run_script(session: &mut Session, input: impl BufRead, json: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (n, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", n + 1))?;
        let Some(cmd) = parse_line(&line).with_context(|| format!("line {}: '{}'", n + 1, line.trim()))?
        else {
            continue;
        };
        debug!(line = n + 1, ?cmd, "executing");
        let event = session.execute(cmd);
        emit(&mut out, &event, json)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let scale = TickScale::new(cli.price_decimals)?;
    debug!(decimals = scale.decimals(), "tick scale");
    let mut session = Session::new(scale);

    match cli.command {
        Commands::Run { file: Some(path) } => {
            let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
            run_script(&mut session, BufReader::new(file), cli.json)?;
        }
        Commands::Run { file: None } => {
            run_script(&mut session, io::stdin().lock(), cli.json)?;
        }
        Commands::Demo => {
            run_script(&mut session, DEMO_SCRIPT.as_bytes(), cli.json)?;
        }
    }

    let stats = session.book().stats();
    debug!(
        active = session.book().active_order_count(),
        conserved = stats.is_conserved(),
        "script finished"
    );
    Ok(())
}
