use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use permkit_app::{ApiLevel, BatchConfig, CycleReport, PermissionScreen};
use permkit_batch::partition;
use permkit_permission::{
    Outcome, Permission, PermissionError, PermissionStatus, PermissionSystem, category_of,
    working_set,
};
use permkit_settings::{SettingsError, SettingsNavigator, SettingsTarget, SpecialAccess};
use render::{print_event, print_events};

#[derive(Parser)]
#[command(name = "permkit-sim")]
#[command(about = "Runs the permission screen against a simulated device", long_about = None)]
struct Cli {
    /// API level of the simulated device
    #[arg(long, global = true, default_value_t = 34)]
    api_level: u32,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the working set and how it is batched
    Plan {
        /// JSON batch configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Press the request button once and answer every dialog
    Run {
        /// JSON batch configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the delay between batches
        #[arg(long)]
        pacing_ms: Option<u64>,
        /// Permissions the simulated user refuses
        #[arg(long = "deny", value_name = "NAME")]
        denied: Vec<String>,
        /// Permissions granted before the button is pressed
        #[arg(long = "granted", value_name = "NAME")]
        granted: Vec<String>,
    },
    /// Pick an entry of the special-permission menu
    Settings {
        /// Menu index; the accessibility button when omitted
        index: Option<usize>,
        /// Entries the simulated device already grants
        #[arg(long = "granted", value_name = "INDEX")]
        granted: Vec<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let level = ApiLevel(cli.api_level);

    match cli.command {
        Commands::Plan { config } => plan(level, &load_config(config.as_deref())?),
        Commands::Run {
            config,
            pacing_ms,
            denied,
            granted,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(pacing_ms) = pacing_ms {
                config = config.with_pacing(Duration::from_millis(pacing_ms));
            }
            run(level, config, &denied, &granted).await
        }
        Commands::Settings { index, granted } => settings(level, index, &granted),
    }
}

fn load_config(path: Option<&Path>) -> Result<BatchConfig> {
    let Some(path) = path else {
        return Ok(BatchConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

/// `CAMERA` and `android.permission.CAMERA` name the same permission.
fn parse_permission(name: &str) -> Permission {
    if name.contains('.') {
        Permission::new(name)
    } else {
        Permission::new(format!("android.permission.{name}"))
    }
}

fn plan(level: ApiLevel, config: &BatchConfig) -> Result<()> {
    let set = working_set(level);
    println!(
        "{}",
        format!("📋 {} permissions on {level}", set.len()).green().bold()
    );
    for (number, batch) in (1..).zip(partition(&set, config)) {
        println!("{}", format!("Batch {number}").yellow().bold());
        for permission in batch.iter() {
            let category = category_of(permission).map_or("?", |c| c.label());
            println!("  {:<32} {}", permission.short_name(), category.dimmed());
        }
    }
    Ok(())
}

async fn run(
    level: ApiLevel,
    config: BatchConfig,
    denied: &[String],
    granted: &[String],
) -> Result<()> {
    let device = SimDevice::new(
        denied.iter().map(|name| parse_permission(name)),
        granted.iter().map(|name| parse_permission(name)),
    );
    println!("{}", format!("🚀 Simulating {level}").green().bold());

    let (screen, events) = PermissionScreen::new(&device, SimSettings::default(), level, config);
    let cycle = async {
        let report = screen.on_request_clicked().await;
        screen.shutdown();
        report
    };
    let (report, ()) = tokio::join!(cycle, print_events(&events));

    match report.context("Request cycle did not run")? {
        CycleReport::Finished {
            batches,
            granted,
            denied,
        } => println!(
            "{}",
            format!("Done: {batches} batches, {granted} granted, {denied} denied")
                .green()
                .bold()
        ),
        CycleReport::AlreadyComplete => println!("{}", "Nothing to request".green()),
        CycleReport::Cancelled => println!("{}", "Cancelled".red()),
    }
    Ok(())
}

fn settings(level: ApiLevel, index: Option<usize>, granted: &[usize]) -> Result<()> {
    let navigator = SimSettings {
        granted: granted
            .iter()
            .filter_map(|&i| SpecialAccess::MENU.get(i).copied())
            .collect(),
    };
    let (screen, events) =
        PermissionScreen::new(SimDevice::default(), navigator, level, BatchConfig::default());

    for (i, title) in screen.special_menu().iter().enumerate() {
        println!("  {i}: {title}");
    }
    let navigation = match index {
        Some(index) => screen.on_special_selected(index),
        None => screen.on_accessibility_clicked(),
    };
    screen.shutdown();
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
    let navigation = navigation.context("Settings screen not opened")?;
    println!("{}", format!("{navigation:?}").green().bold());
    Ok(())
}

/// A device whose user answers every dialog the same way.
#[derive(Debug, Default)]
struct SimDevice {
    granted: Mutex<HashSet<Permission>>,
    refused: HashSet<Permission>,
}

impl SimDevice {
    fn new(
        refused: impl IntoIterator<Item = Permission>,
        granted: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            granted: Mutex::new(granted.into_iter().collect()),
            refused: refused.into_iter().collect(),
        }
    }
}

impl PermissionSystem for SimDevice {
    fn is_granted(&self, permission: &Permission) -> bool {
        self.granted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(permission)
    }

    fn request(
        &self,
        batch: &[Permission],
    ) -> impl Future<Output = Result<Outcome, PermissionError>> {
        let mut granted = self.granted.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome: Outcome = batch
            .iter()
            .map(|permission| {
                let allow = !self.refused.contains(permission);
                if allow {
                    granted.insert(permission.clone());
                }
                (permission.clone(), PermissionStatus::from(allow))
            })
            .collect();
        log::debug!("dialog answered for {} permissions", outcome.len());
        std::future::ready(Ok(outcome))
    }
}

/// Settings screens that always open, and print what they would show.
#[derive(Debug, Default)]
struct SimSettings {
    granted: HashSet<SpecialAccess>,
}

impl SettingsNavigator for SimSettings {
    fn is_granted(&self, access: SpecialAccess) -> Option<bool> {
        Some(self.granted.contains(&access))
    }

    fn launch(&self, target: SettingsTarget) -> Result<(), SettingsError> {
        let scope = if target.package_scoped {
            "package:permkit.sim"
        } else {
            "global"
        };
        println!("{} {} ({scope})", "↗".cyan(), target.action);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_full_names_match() {
        assert_eq!(parse_permission("CAMERA"), parse_permission("android.permission.CAMERA"));
        assert_eq!(
            parse_permission("com.example.CUSTOM").as_str(),
            "com.example.CUSTOM"
        );
    }

    #[tokio::test]
    async fn refused_permissions_stay_denied() {
        let device = SimDevice::new([parse_permission("CAMERA")], []);
        let batch = [parse_permission("CAMERA"), parse_permission("RECORD_AUDIO")];
        let outcome = device.request(&batch).await.unwrap();

        assert_eq!(outcome.status(&batch[0]), Some(PermissionStatus::Denied));
        assert!(device.is_granted(&batch[1]));
        assert!(!device.is_granted(&batch[0]));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        assert_eq!(load_config(None).unwrap(), BatchConfig::default());
        assert!(load_config(Some(Path::new("/nonexistent/permkit.json"))).is_err());
    }
}
