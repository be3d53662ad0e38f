use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use mosque_display::{
    BackendClient, BoardCadence, CombinedNotifier, DisplaySession, MonthlySchedule, SystemClock,
    calendar, config::AppConfig, display, run_board, traits::Clock,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "mosque-display")]
#[command(about = "Mosque TV display - Hijri calendar and prayer countdown")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the board (default)
    Display,
    /// Print the Hijri date for a Gregorian day
    Hijri {
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print or export the monthly prayer schedule
    Schedule {
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        /// Write a CSV into this directory instead of printing
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("mosque_display=debug");

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match args.command.unwrap_or(Command::Display) {
        Command::Hijri { date } => {
            print_hijri(date.unwrap_or_else(|| SystemClock.now_naive_local().date()));
            Ok(())
        }
        Command::Display => {
            let config = Arc::new(AppConfig::load().context("Failed to load configuration")?);
            let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
            run_display(rt, config)
        }
        Command::Schedule { month, year, export } => {
            let config = AppConfig::load().context("Failed to load configuration")?;
            let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
            rt.block_on(run_schedule(&config, month, year, export))
        }
    }
}

fn print_hijri(date: NaiveDate) {
    let hijri = calendar::resolve(date);
    println!("{}", display::format_date_indonesian(date));
    println!("{}", hijri.format_latin());
    println!("{}", hijri.format_arabic());
    if let Some(day) = hijri.ramadan_day() {
        println!("Ramadan hari ke-{}", day);
    }
    if let Some(next) = calendar::next_islamic_event(date) {
        println!(
            "Berikutnya: {} ({}) dalam {} hari",
            next.event.name, next.event.hijri_label, next.days_until
        );
    }
}

/// Run the board until Ctrl-C.
fn run_display(rt: tokio::runtime::Runtime, config: Arc<AppConfig>) -> Result<()> {
    rt.block_on(async {
        tracing::info!("Starting mosque display, backend {}", config.backend.base_url);

        let client = BackendClient::new(config.backend.base_url.clone(), &config.network)?;
        let notifier = CombinedNotifier::from_topic(config.notifications.ntfy_topic.as_deref());
        let mut session = DisplaySession::new(
            config.display.clone(),
            Arc::new(notifier),
            config.notifications.enabled,
        );

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        let clear_screen = config.display.clear_screen;
        run_board(
            client,
            &mut session,
            &SystemClock,
            BoardCadence::from(&config.refresh),
            shutdown,
            |frame| draw(&display::render_board(frame), clear_screen),
        )
        .await;

        Ok(())
    })
}

fn draw(board: &str, clear_screen: bool) {
    if clear_screen {
        // ANSI: clear screen and move cursor home
        print!("\x1b[2J\x1b[H");
    }
    println!("{}", board);
}

async fn run_schedule(
    config: &AppConfig,
    month: Option<u32>,
    year: Option<i32>,
    export: Option<PathBuf>,
) -> Result<()> {
    let today = SystemClock.now_naive_local().date();
    let month = month.unwrap_or(today.month());
    let year = year.unwrap_or(today.year());
    if !(1..=12).contains(&month) {
        anyhow::bail!("Month must be between 1 and 12, got {}", month);
    }

    let client = BackendClient::new(config.backend.base_url.clone(), &config.network)?;
    let response = client
        .fetch_monthly_schedule(month, year)
        .await
        .context("Failed to fetch monthly schedule")?;
    let schedule = MonthlySchedule::from_response(response, config.display.imsak_offset_minutes)?;

    match export {
        Some(dir) => {
            let path = schedule.export_to_csv(&dir, &SystemClock).await?;
            println!("{}", path.display());
        }
        None => print!("{}", schedule.render_table()),
    }

    Ok(())
}
