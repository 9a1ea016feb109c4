//! # Avatar Rig CLI
//!
//! Command-line host for the avatar rig, backed by a file store.
//!
//! ## Usage
//!
//! ```bash
//! avatar-rig --data-dir ./profile replay session.json
//! avatar-rig --data-dir ./profile show
//! avatar-rig --data-dir ./profile reset
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Resolved data directory, config file and storage key
//! - `script` - Scripted pointer/preset sessions replayed against the rig

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod script;

use std::path::PathBuf;

use avatar_core::{
    Asset, AssetCatalog, AvatarRig, Equipment, FileStore, RigConfig, RigResult,
};
use clap::{Parser, Subcommand};

pub use script::{replay, ReplayReport, Script, ScriptError, Step};

/// Command-line arguments for avatar-rig.
#[derive(Debug, Clone, Parser)]
#[command(name = "avatar-rig")]
#[command(about = "Interactive avatar rig host")]
#[command(version)]
pub struct CliArgs {
    /// Rig configuration file (JSON)
    #[arg(long, env = "AVATAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the stored profile record
    #[arg(long, env = "AVATAR_DATA_DIR", default_value = ".avatar")]
    pub data_dir: PathBuf,

    /// Key the profile record is stored under
    #[arg(long)]
    pub storage_key: Option<String>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Replay a script of pointer and preset steps
    Replay {
        /// Script file (JSON)
        script: PathBuf,
    },
    /// Print equipment, limb placements and the layered view
    Show,
    /// Drop stored limb placements
    Reset,
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Rig configuration file, if any.
    pub config_path: Option<PathBuf>,
    /// Data directory for the file store.
    pub data_dir: PathBuf,
    /// Storage key override.
    pub storage_key: Option<String>,
    /// Requested subcommand.
    pub command: Command,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            config_path: args.config,
            data_dir: args.data_dir,
            storage_key: args.storage_key,
            command: args.command,
        }
    }
}

impl CliConfig {
    /// Load the rig configuration, applying the storage key override.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    pub fn rig_config(&self) -> RigResult<RigConfig> {
        let mut config = match &self.config_path {
            Some(path) => RigConfig::from_path(path)?,
            None => RigConfig::default(),
        };
        if let Some(key) = &self.storage_key {
            config.storage_key.clone_from(key);
        }
        Ok(config)
    }

    /// Open the rig over the file store in the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the data
    /// directory cannot be created.
    pub fn open_rig(&self) -> RigResult<AvatarRig<FileStore>> {
        let config = self.rig_config()?;
        let backend = FileStore::with_data_dir(&self.data_dir)?;
        Ok(AvatarRig::load(backend, config))
    }
}

/// Catalog with a stand-in graphic for every part `equipment` names.
#[must_use]
pub fn placeholder_catalog(equipment: &Equipment) -> AssetCatalog {
    equipment
        .identifiers()
        .fold(AssetCatalog::new(), |catalog, id| {
            catalog.with(Asset::new(id, format!("<svg data-part=\"{id}\"/>")))
        })
}
