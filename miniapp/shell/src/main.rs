//! NightLab Shell - Headless Driver for the Mini-App Core
//!
//! Runs the mini-app controller against a live API without a web view.
//! Surface messages and host commands are written to the log; view data is
//! printed as JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Home stats and unread badge
//! nightlab-shell show home
//!
//! # Two pages of confirmed applications
//! nightlab-shell show applications --status confirmed --pages 2
//!
//! # Create an application as a signed-in host user
//! nightlab-shell --init-data "$INIT_DATA" --user-id 42 create --country 1 --bank 5 --amount 1500
//!
//! # Mark a notification read
//! nightlab-shell mark-read 17
//!
//! # Verbose logging
//! RUST_LOG=debug nightlab-shell show profile
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use nightlab_core::bridge::{self, HostCommand, HostInit};
use nightlab_core::config::{load_config, load_config_from_path, ConfigOverrides};
use nightlab_core::format::{format_currency, format_date, format_datetime, notification_icon};
use nightlab_core::views::Loaded;
use nightlab_core::{
    Application, ApplicationStatus, MiniApp, Notification, StatusFilter, SurfaceMessage,
    UserSummary, ViewId, WizardStep,
};

/// NightLab Shell - drive the mini-app core from a terminal
#[derive(Parser, Debug)]
#[command(name = "nightlab-shell")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "NIGHTLAB_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// API origin (overrides config and environment)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Host init data; without it the shell runs in fallback mode
    #[arg(long, env = "NIGHTLAB_INIT_DATA", value_name = "DATA")]
    init_data: Option<String>,

    /// Host user id to report alongside the init data
    #[arg(long, value_name = "ID")]
    user_id: Option<i64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "NIGHTLAB_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a view and print its data
    Show {
        /// home, applications, create, notifications or profile
        view: ViewId,

        /// Status filter for the applications view
        #[arg(long, value_name = "STATUS")]
        status: Option<String>,

        /// Pages to load for the applications view
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Run the creation wizard non-interactively
    Create {
        /// Country id
        #[arg(long)]
        country: i64,

        /// Bank id
        #[arg(long)]
        bank: i64,

        /// Amount in UAH (comma or dot decimal)
        #[arg(long)]
        amount: String,
    },

    /// Mark a notification read
    MarkRead {
        /// Notification id
        id: i64,
    },
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("nightlab_shell={level},nightlab_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse a status filter argument
fn parse_status(raw: Option<&str>) -> Result<StatusFilter> {
    let Some(raw) = raw else {
        return Ok(StatusFilter::All);
    };
    if raw.eq_ignore_ascii_case("all") {
        return Ok(StatusFilter::All);
    }
    let status: ApplicationStatus =
        serde_json::from_value(serde_json::Value::String(raw.to_ascii_uppercase()))
            .with_context(|| format!("Invalid status: {raw}"))?;
    if status == ApplicationStatus::Unknown {
        bail!("Unknown status: {raw}");
    }
    Ok(StatusFilter::Only(status))
}

/// One list row: `#12 Confirmed ₴1 500 BankX 01.05.2024, 10:00`
fn application_line(application: &Application) -> String {
    let mut line = format!(
        "#{} {} {} {} {}",
        application.id,
        application.status_label,
        format_currency(Some(application.amount_uah)),
        application.bank_name,
        format_datetime(Some(&application.created_at)),
    );
    if let Some(expires) = application.expires_at.as_deref() {
        line.push_str(&format!(" (expires {})", format_datetime(Some(expires))));
    }
    line
}

fn notification_line(notification: &Notification) -> String {
    format!(
        "{} {}{} {}: {}",
        notification_icon(&notification.kind),
        if notification.is_read { "" } else { "* " },
        format_date(Some(&notification.created_at)),
        notification.title,
        notification.message,
    )
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Wait for a view loader to finish
async fn open(app: &MiniApp, view: ViewId) -> Result<()> {
    if let Some(load) = app.navigate(view) {
        load.await.context("View loader panicked")?;
    }
    Ok(())
}

async fn show(app: &MiniApp, view: ViewId, status: Option<&str>, pages: usize) -> Result<()> {
    match view {
        ViewId::Home => {
            app.start().await;
            match app.home().stats() {
                Loaded::Ready(stats) => print_json(&stats)?,
                Loaded::Failed(e) => bail!("Failed to load stats: {e}"),
                Loaded::Pending => bail!("Stats not loaded"),
            }
            println!("unread: {}", app.notifications().unread());
        }
        ViewId::Applications => {
            // A filtered listing fetches page 1 once, with the filter applied
            match parse_status(status)? {
                StatusFilter::All => open(app, ViewId::Applications).await?,
                filter => {
                    app.select_filter(filter).await?;
                }
            }
            for _ in 1..pages {
                if !app.applications().list().has_more() {
                    break;
                }
                app.load_more().await?;
            }
            for application in app.applications().list().records() {
                println!("{}", application_line(&application));
            }
        }
        ViewId::Create => {
            open(app, ViewId::Create).await?;
            print_json(&app.countries().await)?;
        }
        ViewId::Notifications => {
            open(app, ViewId::Notifications).await?;
            for notification in app.notifications().records() {
                println!("{}", notification_line(&notification));
            }
        }
        ViewId::Profile => {
            open(app, ViewId::Profile).await?;
            match app.profile().data() {
                Loaded::Ready(data) => {
                    print_json(&data.profile)?;
                    print_json(&data.stats)?;
                    println!("spent: {}", format_currency(Some(data.stats.total_spent)));
                }
                Loaded::Failed(e) => bail!("Failed to load profile: {e}"),
                Loaded::Pending => bail!("Profile not loaded"),
            }
        }
    }
    Ok(())
}

async fn create(app: &MiniApp, country: i64, bank: i64, amount: &str) -> Result<()> {
    app.reset_wizard().await?;

    let countries = app.countries().await;
    let country = countries
        .iter()
        .find(|c| c.id == country)
        .with_context(|| format!("Country {country} not offered"))?;
    app.select_country(country.id, &country.name).await?;

    let banks = app.banks().await;
    let bank = banks
        .iter()
        .find(|b| b.id == bank)
        .with_context(|| format!("Bank {bank} not offered in {}", country.name))?;
    app.select_bank(bank.id, &bank.name).await?;

    let step = app.submit_amount(amount).await?;
    let session = app.wizard_session().await;
    match step {
        WizardStep::Success => {
            let result = session.result.context("Missing submission result")?;
            println!("created application #{}", result.app_id.unwrap_or_default());
            match result.requisites {
                Some(requisites) => println!("requisites: {requisites}"),
                None => println!("waiting for an operator to issue requisites"),
            }
            Ok(())
        }
        _ => bail!(
            "Creation failed: {}",
            session.error.unwrap_or_else(|| "unknown error".to_string())
        ),
    }
}

async fn run(app: &MiniApp, command: Command) -> Result<()> {
    match command {
        Command::Show {
            view,
            status,
            pages,
        } => show(app, view, status.as_deref(), pages).await,
        Command::Create {
            country,
            bank,
            amount,
        } => create(app, country, bank, &amount).await,
        Command::MarkRead { id } => {
            app.mark_read(id).await?;
            println!("unread: {}", app.notifications().unread());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);
    info!("NightLab shell starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = match args.config {
        Some(path) => load_config_from_path(Some(path)),
        None => load_config(),
    }
    .context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(url) = args.api_url {
        overrides = overrides.with_api_base_url(url);
    }
    if let Some(secs) = args.timeout {
        overrides = overrides.with_timeout_secs(secs);
    }
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    info!(source = %config.source(), api = %config.api_base_url, "Configuration resolved");

    let init = args.init_data.map(|init_data| HostInit {
        init_data,
        user: args.user_id.map(|id| UserSummary { id, username: None }),
    });
    let (host, commands) = bridge::resolve(init);

    // Stand-in host runtime: log what a real host would execute
    if let Some(mut commands) = commands {
        tokio::spawn(async move {
            while let Some(command) = commands.recv().await {
                match command {
                    HostCommand::Pulse(kind) => debug!(?kind, "Host pulse"),
                    HostCommand::SendData(payload) => info!(%payload, "Host relay"),
                    HostCommand::OpenLink(url) => info!(%url, "Host open link"),
                }
            }
        });
    }

    let (tx, mut rx) = mpsc::channel(100);
    let surface = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg {
                SurfaceMessage::Toast { level, message } => warn!(?level, "{}", message),
                other => debug!(?other, "Surface message"),
            }
        }
    });

    let app = MiniApp::connect(config, host, tx).context("Failed to set up API client")?;

    let result = tokio::select! {
        result = run(&app, args.command) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            Ok(())
        }
    };

    // Closing the last sender ends the surface task
    drop(app);
    if let Err(e) = surface.await {
        warn!(error = %e, "Surface task failed");
    }

    result
}
