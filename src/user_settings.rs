use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::wallet::WalletBackend;

const APP_DIR: &str = "bdb-wallet";
const SETTINGS_FILE: &str = "bdb_wallet_settings.json";

/// Directory where settings and the address history are stored
pub(crate) fn app_data_dir() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        let app_dir = config_dir.join(APP_DIR);
        if !app_dir.exists() {
            let _ = fs::create_dir_all(&app_dir);
        }
        app_dir
    } else {
        // Fall back to current directory
        PathBuf::from(".")
    }
}

fn default_network() -> String {
    "Testnet".to_string()
}

fn default_cli_identity() -> String {
    "default".to_string()
}

fn default_notification_ttl() -> u64 {
    5
}

/// User settings that persist between sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSettings {
    /// Label of the selected network (see `config::NETWORKS`)
    #[serde(default = "default_network")]
    pub selected_network: String,
    /// BDB token contract id (C...); empty = take it from the environment
    #[serde(default)]
    pub contract_id: String,
    /// Custom RPC overrides per network label
    #[serde(default)]
    pub custom_rpcs: HashMap<String, String>,
    /// Where the wallet address comes from
    #[serde(default)]
    pub wallet_backend: WalletBackend,
    /// Stellar CLI identity (`stellar keys address <identity>`)
    #[serde(default = "default_cli_identity")]
    pub cli_identity: String,
    /// Explicit path to the `stellar` executable
    #[serde(default)]
    pub cli_path: Option<String>,
    /// Address used by the watch-only backend
    #[serde(default)]
    pub watch_address: String,
    /// How long toast notifications stay on screen (seconds)
    #[serde(default = "default_notification_ttl")]
    pub notification_ttl_secs: u64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            selected_network: default_network(),
            contract_id: String::new(),
            custom_rpcs: HashMap::new(),
            wallet_backend: WalletBackend::default(),
            cli_identity: default_cli_identity(),
            cli_path: None,
            watch_address: String::new(),
            notification_ttl_secs: default_notification_ttl(),
        }
    }
}

impl UserSettings {
    /// Get the settings file path
    fn settings_path() -> PathBuf {
        app_data_dir().join(SETTINGS_FILE)
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    pub(crate) fn load_from(path: &PathBuf) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(settings) => {
                        tracing::info!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse settings file: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read settings file: {}", e);
                }
            }
        }
        tracing::info!("Using default settings");
        Self::default()
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path())
    }

    pub(crate) fn save_to(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Get the settings file path for display
    pub fn settings_path_display() -> String {
        Self::settings_path().display().to_string()
    }

    /// Get custom RPC for a network, or None if using default
    pub fn get_custom_rpc(&self, network: &str) -> Option<&String> {
        self.custom_rpcs.get(network).filter(|s| !s.is_empty())
    }

    /// Set custom RPC for a network (empty string removes the override)
    pub fn set_custom_rpc(&mut self, network: &str, rpc: String) {
        if rpc.trim().is_empty() {
            self.custom_rpcs.remove(network);
        } else {
            self.custom_rpcs.insert(network.to_string(), rpc.trim().to_string());
        }
    }

    pub fn notification_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.notification_ttl_secs.max(1))
    }
}
