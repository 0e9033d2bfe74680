//! EcoPay kiosk CLI
//!
//! Usage:
//!   ecopay                       # Interactive terminal kiosk
//!   ecopay --demo                # Unattended demo session
//!   ecopay --serve               # HTTP API server
//!   ecopay --json                # JSON lines instead of screens

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing_subscriber::EnvFilter;

use ecopay::config::load_settings;
use ecopay::core::{run_server, KioskController};
use ecopay::types::{texts, Language, Material, ReasonCode, Step, StepOutput, UserEvent};
use ecopay::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "ecopay",
    version = VERSION,
    about = "EcoPay - simulated self-service recycling kiosk",
    long_about = "EcoPay walks a user through a recycling deposit:\n\n\
                  Steps:\n  \
                  WELCOME     - pick a language, start\n  \
                  SCAN_CARD   - tap the (simulated) card\n  \
                  SELECT_TYPE - plastic (10 pts) or paper (5 pts)\n  \
                  INSERTING   - count items with + and -\n  \
                  PROCESSING  - points credited, eco fact fetched\n  \
                  SUCCESS     - tally shown, resets automatically\n\n\
                  Set GEMINI_API_KEY to enable eco facts."
)]
struct Args {
    /// Run an unattended demo session (ENG, 3 plastic items)
    #[arg(long)]
    demo: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (overrides config)
    #[arg(long)]
    addr: Option<String>,

    /// Config file (default: ./ecopay.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default language: aze, eng, ru
    #[arg(short, long)]
    language: Option<Language>,

    /// Output JSON lines
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Do not call the fact generator
    #[arg(long)]
    no_facts: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(default_log_filter(args.serve));

    if args.no_color {
        colored::control::set_override(false);
    }

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(addr) = &args.addr {
        settings.bind_addr = addr.clone();
    }
    if let Some(language) = args.language {
        settings.default_language = language;
    }
    if args.no_facts {
        settings.fact.enabled = false;
    }

    let controller = KioskController::from_settings(&settings);
    let mode = OutputMode::from_args(&args);

    if args.serve {
        print_header("API Server");
        run_server(&settings.bind_addr, controller)
            .await
            .context("server error")
    } else if args.demo {
        run_demo(controller, mode).await
    } else {
        run_interactive(controller, mode).await
    }
}

/// How updates are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Json,
    Plain,
    Color,
}

impl OutputMode {
    fn from_args(args: &Args) -> Self {
        if args.json {
            OutputMode::Json
        } else if args.no_color {
            OutputMode::Plain
        } else {
            OutputMode::Color
        }
    }
}

/// Server logs at info; terminal modes only surface warnings
fn default_log_filter(serve: bool) -> &'static str {
    if serve {
        "ecopay=info"
    } else {
        "ecopay=warn"
    }
}

/// Log to stderr so kiosk screens on stdout stay readable
fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the interactive terminal kiosk
async fn run_interactive(controller: KioskController, mode: OutputMode) -> Result<()> {
    print_header("Interactive");
    print_help();

    let printer = spawn_printer(controller.subscribe(), mode);
    render(&controller.snapshot().await, mode)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.to_ascii_lowercase().as_str() {
            "quit" | "exit" => break,
            "help" | "?" => {
                print_help();
                continue;
            }
            "status" => {
                render(&controller.snapshot().await, mode)?;
                continue;
            }
            _ => {}
        }

        match UserEvent::parse_command(line) {
            Ok(event) => {
                let output = controller.dispatch(event).await;
                // Applied transitions arrive through the printer
                if output.reason.is_ignored() {
                    print_notice(&output, mode)?;
                }
            }
            Err(e) => println!("{} {}", "⚠".yellow(), e),
        }
    }

    printer.abort();
    println!(
        "\nKiosk closed. Sessions completed: {}",
        controller.completed().await
    );
    Ok(())
}

/// Walk through one full session without input
async fn run_demo(controller: KioskController, mode: OutputMode) -> Result<()> {
    print_header("Demo");

    let timings = controller.timings();
    let mut rx = controller.subscribe();
    let printer = spawn_printer(controller.subscribe(), mode);
    render(&controller.snapshot().await, mode)?;

    let script = [
        UserEvent::SelectLanguage {
            language: Language::Eng,
        },
        UserEvent::Start,
        UserEvent::TapCard,
        UserEvent::ChooseMaterial {
            material: Material::Plastic,
        },
        UserEvent::Increment,
        UserEvent::Increment,
        UserEvent::Increment,
        UserEvent::Confirm,
    ];

    for event in script {
        let output = controller.dispatch(event).await;
        match event {
            UserEvent::TapCard => {
                print_notice(&output, mode)?;
                wait_for_step(&mut rx, Step::SelectType, timings.card_read() * 4).await?;
            }
            UserEvent::Confirm => {
                // Floor plus fact timeout, with slack
                let limit = timings.processing_floor() + Duration::from_secs(30);
                wait_for_step(&mut rx, Step::Success, limit).await?;
            }
            _ => {}
        }
    }

    let limit = timings.success_dwell() + Duration::from_secs(5);
    wait_for_step(&mut rx, Step::Welcome, limit).await?;
    printer.abort();
    Ok(())
}

/// Wait until an update reports `step`
async fn wait_for_step(
    rx: &mut broadcast::Receiver<StepOutput>,
    step: Step,
    limit: Duration,
) -> Result<StepOutput> {
    let wait = async {
        loop {
            match rx.recv().await {
                Ok(output) if output.step == step => return Ok(output),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => bail!("kiosk update channel closed"),
            }
        }
    };
    timeout(limit, wait)
        .await
        .with_context(|| format!("timed out waiting for {}", step))?
}

/// Print every applied transition as it happens
fn spawn_printer(mut rx: broadcast::Receiver<StepOutput>, mode: OutputMode) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(output) => {
                    if let Err(e) = render(&output, mode) {
                        tracing::warn!(error = %e, "failed to render update");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Print one update: status line plus the translated screen
fn render(output: &StepOutput, mode: OutputMode) -> Result<()> {
    let status = match mode {
        OutputMode::Json => {
            println!("{}", serde_json::to_string(output)?);
            return Ok(());
        }
        OutputMode::Plain => output.to_parseable_string(),
        OutputMode::Color => output.to_terminal_string(),
    };

    println!();
    println!("{}", status);
    for line in screen_lines(output) {
        println!("  {}", line);
    }
    Ok(())
}

/// Print an event that changed nothing
fn print_notice(output: &StepOutput, mode: OutputMode) -> Result<()> {
    if mode == OutputMode::Json {
        println!("{}", serde_json::to_string(output)?);
    } else if output.reason == ReasonCode::P001_CARD_READING {
        let t = texts(output.language);
        println!("  {} {}", "…".cyan(), t.simulated_sensor.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), output.reason.description().dimmed());
    }
    Ok(())
}

/// Screen content for the current step
fn screen_lines(output: &StepOutput) -> Vec<String> {
    let t = texts(output.language);
    match output.step {
        Step::Welcome => {
            let selector: Vec<String> = Language::ALL
                .iter()
                .map(|l| {
                    if *l == output.language {
                        format!("[{}]", l).bold().to_string()
                    } else {
                        l.to_string()
                    }
                })
                .collect();
            vec![
                "EcoPay".bold().green().to_string(),
                t.subtitle.to_string(),
                selector.join(" "),
                format!("{} → start", t.welcome.bold()),
            ]
        }
        Step::ScanCard => vec![
            t.scan_card.bold().to_string(),
            t.scan_card_sub.to_string(),
            format!("{}: tap", t.simulated_sensor).dimmed().to_string(),
        ],
        Step::SelectType => {
            let mut lines = vec![t.select_material.bold().to_string()];
            lines.extend(Material::ALL.iter().map(|m| {
                format!(
                    "{:<7} → {} (1 = {} pts)",
                    m.to_string(),
                    t.material_label(*m),
                    m.rate()
                )
            }));
            lines
        }
        Step::Inserting => vec![
            format!(
                "{} ({})",
                t.insert_items.bold(),
                t.material_label(output.material)
            ),
            format!(
                "{}: {}   {}: {}",
                t.count,
                output.count.to_string().bold(),
                t.current_points,
                output.points.to_string().bold()
            ),
            format!("+ / - / {} → confirm", t.confirm).dimmed().to_string(),
        ],
        Step::Processing => vec![t.processing.magenta().to_string()],
        Step::Success => {
            let mut lines = vec![
                t.success_title.bold().green().to_string(),
                t.success_message.to_string(),
                format!("{}: {}", t.count, output.count),
                format!("{}: {}", t.current_points, output.points.to_string().green()),
            ];
            if !output.fact_text().is_empty() {
                lines.push(format!("Eco-Fact (AI): \"{}\"", output.fact_text()).italic().to_string());
            }
            lines
        }
    }
}

fn print_header(mode: &str) {
    println!(
        "{}",
        format!("════ EcoPay v{} - {} ════", VERSION, mode).bold()
    );
}

fn print_help() {
    println!("Commands:");
    println!("  lang <aze|eng|ru>   change language (welcome screen)");
    println!("  start               begin a session");
    println!("  tap                 simulate card tap");
    println!("  plastic | paper     choose material");
    println!("  + | -               add / remove one item");
    println!("  confirm             finish deposit");
    println!("  cancel              back to welcome");
    println!("  status | help | quit");
}
