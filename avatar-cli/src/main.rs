//! # Avatar Rig CLI
//!
//! Replays scripted sessions against the stored profile and inspects it.

use anyhow::Context;
use avatar_cli::{placeholder_catalog, replay, CliArgs, CliConfig, Command, Script};
use avatar_core::HostState;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("avatar_cli=info,avatar_core=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = CliConfig::from(CliArgs::parse());
    tracing::debug!("Data directory: {}", config.data_dir.display());

    let mut rig = config
        .open_rig()
        .with_context(|| format!("Failed to open rig in {}", config.data_dir.display()))?;

    match &config.command {
        Command::Replay { script } => {
            let loaded = Script::from_path(script)
                .with_context(|| format!("Failed to load {}", script.display()))?;
            tracing::info!("Replaying {} steps", loaded.steps.len());
            let report = replay(&mut rig, &loaded)?;
            for event in &report.events {
                println!("{}", serde_json::to_string(event)?);
            }
            println!("{}", serde_json::to_string_pretty(&report.transforms)?);
            if !report.rejected.is_empty() {
                tracing::warn!("{} steps rejected", report.rejected.len());
            }
        }
        Command::Show => {
            let equipment = rig.store().load_equipment();
            let catalog = placeholder_catalog(&equipment);
            let composition = rig.compose(&HostState::display(), &equipment, &catalog);
            let view = serde_json::json!({
                "equipment": equipment,
                "transforms": rig.transforms(),
                "overrides": {
                    "leftArm": rig.has_override(avatar_core::Limb::LeftArm),
                    "rightArm": rig.has_override(avatar_core::Limb::RightArm),
                },
                "composition": composition,
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Reset => {
            rig.reset().context("Failed to reset limb placements")?;
            println!("Limb placements reset");
        }
    }

    Ok(())
}
