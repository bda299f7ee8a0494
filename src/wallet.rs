//! Wallet connectors.
//! A connector answers two questions: is the wallet available at all, and
//! which account does the user authorize for this session.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::{info, warn};

use crate::user_settings::UserSettings;
use crate::utils::is_valid_account;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Cached path to the stellar executable
static STELLAR_PATH: OnceLock<String> = OnceLock::new();

/// Wallet backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WalletBackend {
    /// Keys managed by the Stellar CLI (`stellar keys`)
    #[default]
    StellarCli,
    /// A fixed public address, read-only
    WatchOnly,
}

impl WalletBackend {
    pub const ALL: [WalletBackend; 2] = [WalletBackend::StellarCli, WalletBackend::WatchOnly];

    pub fn display_name(&self) -> &'static str {
        match self {
            WalletBackend::StellarCli => "Stellar CLI",
            WalletBackend::WatchOnly => "Watch-only address",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WalletBackend::StellarCli => "Uses an identity from the stellar CLI key store (stellar keys address <name>).",
            WalletBackend::WatchOnly => "Uses the public address entered below. No keys are involved.",
        }
    }

    pub fn install_hint(&self) -> &'static str {
        match self {
            WalletBackend::StellarCli => {
                "Please install the Stellar CLI from https://developers.stellar.org/docs/tools/cli and create an identity."
            }
            WalletBackend::WatchOnly => "Please enter a watch-only address in Settings.",
        }
    }
}

/// Source of the active identity.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    fn backend(&self) -> WalletBackend;

    fn name(&self) -> &str {
        self.backend().display_name()
    }

    /// Whether the wallet is present and can be asked for access
    async fn is_installed(&self) -> Result<bool>;

    /// Ask for the user's address. `Ok(None)` means access was denied.
    async fn request_access(&self) -> Result<Option<String>>;
}

/// What the connection attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    NotInstalled,
    Denied,
    Authorized(String),
}

/// Check for the wallet, then request access. No access request is made when
/// the wallet is missing.
pub async fn request_identity(wallet: &dyn WalletConnector) -> Result<ConnectOutcome> {
    if !wallet.is_installed().await? {
        info!("{} wallet not available", wallet.name());
        return Ok(ConnectOutcome::NotInstalled);
    }

    match wallet.request_access().await? {
        Some(address) => {
            let address = address.trim().to_string();
            if !is_valid_account(&address) {
                return Err(anyhow!("Wallet returned an invalid account address: '{}'", address));
            }
            Ok(ConnectOutcome::Authorized(address))
        }
        None => Ok(ConnectOutcome::Denied),
    }
}

/// Build the connector selected in the user settings
pub fn connector_from_settings(settings: &UserSettings) -> Box<dyn WalletConnector> {
    match settings.wallet_backend {
        WalletBackend::StellarCli => Box::new(StellarCliWallet::new(
            settings.cli_identity.clone(),
            settings.cli_path.clone(),
        )),
        WalletBackend::WatchOnly => Box::new(WatchOnlyWallet::new(settings.watch_address.clone())),
    }
}

/// Find the stellar executable, checking common installation paths if not in PATH.
/// The result is cached for subsequent calls.
pub fn get_stellar_path() -> &'static str {
    STELLAR_PATH.get_or_init(|| {
        if is_stellar_available("stellar") {
            info!("Found stellar in PATH");
            return "stellar".to_string();
        }

        for dir in get_stellar_candidate_paths() {
            let path = dir.join(if cfg!(windows) { "stellar.exe" } else { "stellar" });
            if path.exists() {
                let path_str = path.to_string_lossy().to_string();
                if is_stellar_available(&path_str) {
                    info!("Found stellar at: {}", path_str);
                    return path_str;
                }
            }
        }

        // Fall back to "stellar" and let the availability check report it
        warn!("stellar not found in PATH or common locations, falling back to 'stellar'");
        "stellar".to_string()
    })
}

fn get_stellar_candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(home) = dirs::home_dir() {
        // cargo install stellar-cli
        paths.push(home.join(".cargo").join("bin"));
        paths.push(home.join(".local").join("bin"));
    }

    #[cfg(target_os = "macos")]
    paths.push(PathBuf::from("/opt/homebrew/bin"));

    #[cfg(unix)]
    paths.push(PathBuf::from("/usr/local/bin"));

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            paths.push(exe_dir.to_path_buf());
        }
    }

    paths
}

fn is_stellar_available(path: &str) -> bool {
    let mut cmd = std::process::Command::new(path);
    cmd.arg("--version");

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    cmd.output().map(|o| o.status.success()).unwrap_or(false)
}

/// Identity from the Stellar CLI key store.
pub struct StellarCliWallet {
    binary: String,
    identity: String,
}

impl StellarCliWallet {
    pub fn new(identity: String, cli_path: Option<String>) -> Self {
        let binary = cli_path
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| get_stellar_path().to_string());
        Self { binary, identity }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Hide console window on Windows
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        command
    }
}

#[async_trait]
impl WalletConnector for StellarCliWallet {
    fn backend(&self) -> WalletBackend {
        WalletBackend::StellarCli
    }

    async fn is_installed(&self) -> Result<bool> {
        match self.command().arg("--version").output().await {
            Ok(output) => Ok(output.status.success()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to run {}", self.binary)),
        }
    }

    async fn request_access(&self) -> Result<Option<String>> {
        let identity = self.identity.trim();
        if identity.is_empty() {
            warn!("No stellar CLI identity configured");
            return Ok(None);
        }

        let output = self
            .command()
            .arg("keys")
            .arg("address")
            .arg(identity)
            .output()
            .await
            .with_context(|| format!("Failed to run {} keys address", self.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("stellar keys address {} refused: {}", identity, stderr.trim());
            return Ok(None);
        }

        let address = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(address))
    }
}

/// Read-only wallet backed by an address from the settings.
pub struct WatchOnlyWallet {
    address: String,
}

impl WatchOnlyWallet {
    pub fn new(address: String) -> Self {
        Self { address }
    }
}

#[async_trait]
impl WalletConnector for WatchOnlyWallet {
    fn backend(&self) -> WalletBackend {
        WalletBackend::WatchOnly
    }

    async fn is_installed(&self) -> Result<bool> {
        Ok(!self.address.trim().is_empty())
    }

    async fn request_access(&self) -> Result<Option<String>> {
        let address = self.address.trim();
        if is_valid_account(address) {
            Ok(Some(address.to_string()))
        } else {
            warn!("Watch-only address is not a valid account: {}", address);
            Ok(None)
        }
    }
}
