// SPDX-License-Identifier: MIT OR Apache-2.0
//! Craftflow - interactive production chain explorer
//!
//! Starting from one recipe, the chain grows on demand:
//! - "+" on an item pulls in a recipe producing or consuming it
//! - "×" on a recipe removes it along with items nothing else uses
//! - Nodes can be dragged around the surface
//!
//! ## Architecture
//!
//! The layout engine lives in `craftflow_graph`. This binary loads settings
//! and the dataset, hosts the engine's egui view in a winit window and
//! reloads the dataset when its file changes.

mod app;
mod dataset;
mod file_watcher;
mod graphics;
mod icons;
mod settings;

use app::CraftflowApp;
use clap::Parser;
use dataset::DatasetSource;
use settings::{AppSettings, SETTINGS_FILE_NAME};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "craftflow", version, about = "Interactive production chain explorer")]
struct Cli {
    /// Settings file
    #[arg(long, default_value = SETTINGS_FILE_NAME)]
    config: PathBuf,

    /// Dataset JSON file, overriding the settings
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Write default settings to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() {
    let cli = Cli::parse();
    let settings = AppSettings::load_or_default(&cli.config);

    let rejected = init_tracing(
        settings
            .as_ref()
            .ok()
            .and_then(|s| s.log_filter.as_deref()),
    );
    for directive in rejected {
        tracing::warn!("Ignoring invalid log directive: {directive}");
    }

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load settings from {:?}: {e}", cli.config);
            std::process::exit(1);
        }
    };

    if cli.write_default_config {
        match AppSettings::default().save(&cli.config) {
            Ok(()) => tracing::info!("Wrote default settings to {:?}", cli.config),
            Err(e) => {
                tracing::error!("Failed to write settings to {:?}: {e}", cli.config);
                std::process::exit(1);
            }
        }
        return;
    }

    let source = match cli.dataset.or_else(|| settings.dataset_path(&cli.config)) {
        Some(path) => DatasetSource::File(path),
        None => DatasetSource::Embedded,
    };

    tracing::info!("Starting Craftflow v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = CraftflowApp::run(settings, source) {
        tracing::error!("Craftflow crashed: {e}");
        std::process::exit(1);
    }
}

/// Install the fmt subscriber. Returns the extra directives that did not parse.
fn init_tracing(extra: Option<&str>) -> Vec<String> {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("craftflow_app=debug".parse().unwrap())
        .add_directive("craftflow_graph=info".parse().unwrap())
        .add_directive("wgpu=warn".parse().unwrap())
        .add_directive("naga=warn".parse().unwrap());

    let mut rejected = Vec::new();
    for directive in extra.unwrap_or_default().split(',').map(str::trim).filter(|d| !d.is_empty()) {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(_) => rejected.push(directive.to_string()),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    rejected
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["craftflow"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(SETTINGS_FILE_NAME));
        assert!(cli.dataset.is_none());
        assert!(!cli.write_default_config);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "craftflow",
            "--config",
            "alt.ron",
            "--dataset",
            "recipes.json",
            "--write-default-config",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("alt.ron"));
        assert_eq!(cli.dataset, Some(PathBuf::from("recipes.json")));
        assert!(cli.write_default_config);
    }
}
