//! afcdeck - A terminal file and app manager for attached iOS devices
//!
//! This is the binary entry point. All logic lives in the workspace crates.

use std::path::PathBuf;

use afcdeck_app::config::{self, Settings};
use afcdeck_core::prelude::*;
use afcdeck_device::{DeviceBackend, ImobileBackend, ToolAvailability, ToolRunner, Transport};
use clap::{Parser, Subcommand};

/// afcdeck - A terminal file and app manager for attached iOS devices
#[derive(Parser, Debug)]
#[command(name = "afcdeck")]
#[command(about = "A terminal file and app manager for attached iOS devices", long_about = None)]
struct Args {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Device poll interval in milliseconds
    #[arg(long, value_name = "MS")]
    poll_interval: Option<u64>,

    /// Starting folder when the device has no root file access
    #[arg(long, value_name = "PATH")]
    base_path: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the UDIDs of attached devices
    Devices,
    /// Print the lockdown properties of a device as JSON
    Info {
        /// Device to query (defaults to the first attached device)
        udid: Option<String>,
    },
    /// Check which libimobiledevice tools are installed
    Doctor,
    /// Write a default config file if none exists
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref());
    apply_overrides(&mut settings, &args);

    let runner =
        ToolRunner::new(settings.tools.bin_dir()).with_timeout(settings.tools.timeout());

    match args.command {
        None => run_tui(settings, runner).await,
        Some(Command::Devices) => list_devices(runner).await,
        Some(Command::Info { udid }) => print_info(runner, udid).await,
        Some(Command::Doctor) => doctor(&settings),
        Some(Command::InitConfig) => init_config(args.config),
    }
}

fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(ms) = args.poll_interval {
        settings.watcher.poll_interval_ms = ms;
    }
    if let Some(path) = &args.base_path {
        settings.connect.non_root_base_path = path.clone();
    }
}

async fn run_tui(settings: Settings, runner: ToolRunner) -> Result<()> {
    // Initialize error handling
    color_eyre::install().map_err(|e| Error::terminal(e.to_string()))?;

    // Initialize logging (to file, since TUI owns stdout)
    afcdeck_core::logging::init()?;

    let tools = ToolAvailability::check(settings.tools.bin_dir().as_deref());
    if let Some(message) = tools.unavailable_message() {
        warn!("{}", message);
    }
    if !tools.can_detect() {
        eprintln!("❌ idevice_id was not found, so no device can be detected.");
        eprintln!("   Install libimobiledevice or set [tools] bin_dir in the config file.");
        eprintln!("   Run `afcdeck doctor` for details.");
        std::process::exit(1);
    }

    let result = afcdeck_tui::run(settings, ImobileBackend::new(runner)).await;

    if let Err(ref e) = result {
        error!("Application error: {:?}", e);
    }

    result
}

async fn list_devices(runner: ToolRunner) -> Result<()> {
    let backend = ImobileBackend::new(runner);
    let devices = backend.list_devices().await?;
    if devices.is_empty() {
        eprintln!("No devices attached.");
    }
    for udid in devices {
        println!("{}", udid);
    }
    Ok(())
}

async fn print_info(runner: ToolRunner, udid: Option<String>) -> Result<()> {
    let backend = ImobileBackend::new(runner);
    let udid = match udid {
        Some(udid) => udid,
        None => backend
            .list_devices()
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NotConnected)?,
    };

    let transport = backend.open(&udid).await?;
    let properties = transport.properties().await;
    transport.close().await;

    let json = serde_json::to_string_pretty(&properties?)
        .map_err(|e| Error::invalid_data(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn doctor(settings: &Settings) -> Result<()> {
    let tools = ToolAvailability::check(settings.tools.bin_dir().as_deref());
    for tool in &tools.tools {
        match &tool.path {
            Some(path) => println!("✅ {:<22} {}", tool.name, path.display()),
            None => println!("❌ {:<22} missing ({})", tool.name, tool.purpose),
        }
    }
    if let Some(message) = tools.unavailable_message() {
        eprintln!();
        eprintln!("{}", message);
    }
    Ok(())
}

fn init_config(path: Option<PathBuf>) -> Result<()> {
    let path = path
        .or_else(config::default_config_path)
        .ok_or_else(|| Error::config("No config directory available"))?;
    config::init_config_file(&path)?;
    println!("Config file: {}", path.display());
    Ok(())
}
