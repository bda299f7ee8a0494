use anyhow::{anyhow, Result};
use std::env;
use url::Url;

use crate::contract::ClientOptions;
use crate::user_settings::UserSettings;

/// Environment variable holding the BDB token contract id (C...).
pub const ENV_CONTRACT_ID: &str = "BDB_CONTRACT_ID";
/// Environment variable overriding the Soroban RPC endpoint.
pub const ENV_RPC_URL: &str = "STELLAR_RPC_URL";
/// Environment variable overriding the network passphrase.
pub const ENV_NETWORK_PASSPHRASE: &str = "STELLAR_NETWORK_PASSPHRASE";
/// Environment variable overriding the token symbol shown next to balances.
pub const ENV_TOKEN_SYMBOL: &str = "BDB_TOKEN_SYMBOL";

pub const DEFAULT_TOKEN_SYMBOL: &str = "BDB";

/// A predefined Stellar network with its passphrase and default Soroban RPC.
#[derive(Clone, Debug)]
pub struct StellarNetwork {
    pub label: &'static str,
    pub passphrase: &'static str,
    pub default_rpc: &'static str,
    /// Path segment used by stellar.expert, if the network is indexed there
    pub explorer_slug: Option<&'static str>,
}

impl StellarNetwork {
    pub const fn new(
        label: &'static str,
        passphrase: &'static str,
        default_rpc: &'static str,
        explorer_slug: Option<&'static str>,
    ) -> Self {
        Self {
            label,
            passphrase,
            default_rpc,
            explorer_slug,
        }
    }
}

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

pub const NETWORKS: &[StellarNetwork] = &[
    StellarNetwork::new("Testnet", TESTNET_PASSPHRASE, "https://soroban-testnet.stellar.org", Some("testnet")),
    StellarNetwork::new("Futurenet", "Test SDF Future Network ; October 2022", "https://rpc-futurenet.stellar.org", None),
    StellarNetwork::new("Local", "Standalone Network ; February 2017", "http://localhost:8000/soroban/rpc", None),
];

pub fn find_network_by_label(label: &str) -> Option<&'static StellarNetwork> {
    NETWORKS.iter().find(|n| n.label.eq_ignore_ascii_case(label))
}

pub fn find_network_by_passphrase(passphrase: &str) -> Option<&'static StellarNetwork> {
    NETWORKS.iter().find(|n| n.passphrase == passphrase)
}

/// Find the index of a network in NETWORKS by label
pub fn find_network_index(label: &str) -> Option<usize> {
    NETWORKS.iter().position(|n| n.label.eq_ignore_ascii_case(label))
}

/// stellar.expert page for an account, when the network is indexed there
pub fn account_explorer_url(passphrase: &str, address: &str) -> Option<String> {
    find_network_by_passphrase(passphrase)
        .and_then(|n| n.explorer_slug)
        .map(|slug| format!("https://stellar.expert/explorer/{}/account/{}", slug, address))
}

/// Runtime configuration for the contract accessor.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub contract_id: String,
    pub network_passphrase: String,
    pub rpc_url: String,
    pub token_symbol: String,
    pub label_override: Option<String>,
}

impl Config {
    pub fn new(contract_id: String, network_passphrase: String, rpc_url: String) -> Self {
        Self {
            contract_id,
            network_passphrase,
            rpc_url,
            token_symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            label_override: None,
        }
    }

    pub fn from_network(network: &StellarNetwork, contract_id: String) -> Self {
        Self::new(contract_id, network.passphrase.to_string(), network.default_rpc.to_string())
    }

    /// Build the session config: network defaults, then user settings, then the environment.
    pub fn from_settings(settings: &UserSettings) -> Self {
        Self::from_settings_with(settings, |key| env::var(key).ok())
    }

    pub(crate) fn from_settings_with(
        settings: &UserSettings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let network = find_network_by_label(&settings.selected_network).unwrap_or(&NETWORKS[0]);
        let mut config = Self::from_network(network, settings.contract_id.trim().to_string());
        if let Some(rpc) = settings.get_custom_rpc(network.label) {
            config.rpc_url = rpc.clone();
        }
        config.apply_overrides(lookup);
        config
    }

    /// Apply the environment override points on top of the current values.
    ///
    /// Unset or blank variables leave the field untouched.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(contract_id) = value(ENV_CONTRACT_ID) {
            self.contract_id = contract_id;
        }
        if let Some(rpc_url) = value(ENV_RPC_URL) {
            self.rpc_url = rpc_url;
        }
        if let Some(passphrase) = value(ENV_NETWORK_PASSPHRASE) {
            self.network_passphrase = passphrase;
        }
        if let Some(symbol) = value(ENV_TOKEN_SYMBOL) {
            self.token_symbol = symbol;
        }
    }

    pub fn network_label(&self) -> &str {
        if let Some(ref label) = self.label_override {
            label.as_str()
        } else {
            find_network_by_passphrase(&self.network_passphrase)
                .map(|n| n.label)
                .unwrap_or("Custom")
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            contract_id: self.contract_id.clone(),
            network_passphrase: self.network_passphrase.clone(),
            rpc_url: self.rpc_url.clone(),
        }
    }

    /// Check that the contract id and RPC URL are usable before issuing a call.
    pub fn validate(&self) -> Result<()> {
        let contract_id = self.contract_id.trim();
        if contract_id.is_empty() {
            return Err(anyhow!(
                "No contract id configured. Set {} or enter one in Settings.",
                ENV_CONTRACT_ID
            ));
        }
        stellar_strkey::Contract::from_string(contract_id)
            .map_err(|_| anyhow!("Invalid contract id '{}'", contract_id))?;

        let url = Url::parse(&self.rpc_url)
            .map_err(|e| anyhow!("Invalid RPC URL '{}': {}", self.rpc_url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow!("RPC URL must use http or https: {}", self.rpc_url));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        // Testnet with the contract id from the environment; settings are layered on by the GUI
        let mut config = Self::from_network(&NETWORKS[0], String::new());
        config.apply_env_overrides();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CONTRACT: &str = "CA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQGAXE";

    // ==================== network lookup tests ====================

    #[test]
    fn test_find_network_by_label_testnet() {
        let network = find_network_by_label("Testnet").unwrap();
        assert_eq!(network.passphrase, "Test SDF Network ; September 2015");
        assert_eq!(network.default_rpc, "https://soroban-testnet.stellar.org");
    }

    #[test]
    fn test_find_network_by_label_is_case_insensitive() {
        assert!(find_network_by_label("futurenet").is_some());
    }

    #[test]
    fn test_find_network_by_label_not_found() {
        assert!(find_network_by_label("Pubnet").is_none());
    }

    #[test]
    fn test_find_network_index() {
        assert_eq!(find_network_index("Testnet"), Some(0));
        assert_eq!(find_network_index("Local"), Some(2));
        assert_eq!(find_network_index("nope"), None);
    }

    #[test]
    fn test_account_explorer_url_testnet() {
        let url = account_explorer_url(TESTNET_PASSPHRASE, "GABC").unwrap();
        assert_eq!(url, "https://stellar.expert/explorer/testnet/account/GABC");
    }

    #[test]
    fn test_account_explorer_url_unindexed_network() {
        assert!(account_explorer_url("Standalone Network ; February 2017", "GABC").is_none());
    }

    // ==================== Config tests ====================

    #[test]
    fn test_config_from_network() {
        let config = Config::from_network(&NETWORKS[0], CONTRACT.to_string());
        assert_eq!(config.rpc_url, "https://soroban-testnet.stellar.org");
        assert_eq!(config.network_passphrase, TESTNET_PASSPHRASE);
        assert_eq!(config.token_symbol, "BDB");
        assert_eq!(config.network_label(), "Testnet");
    }

    #[test]
    fn test_config_network_label_custom() {
        let config = Config::new(CONTRACT.to_string(), "My Net".to_string(), "http://x".to_string());
        assert_eq!(config.network_label(), "Custom");
    }

    #[test]
    fn test_config_network_label_override() {
        let mut config = Config::from_network(&NETWORKS[0], CONTRACT.to_string());
        config.label_override = Some("Staging".to_string());
        assert_eq!(config.network_label(), "Staging");
    }

    #[test]
    fn test_apply_overrides_sets_every_point() {
        let vars: HashMap<&str, &str> = [
            (ENV_CONTRACT_ID, CONTRACT),
            (ENV_RPC_URL, "http://localhost:8000/soroban/rpc"),
            (ENV_NETWORK_PASSPHRASE, "Standalone Network ; February 2017"),
            (ENV_TOKEN_SYMBOL, "TST"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::from_network(&NETWORKS[0], String::new());
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.contract_id, CONTRACT);
        assert_eq!(config.rpc_url, "http://localhost:8000/soroban/rpc");
        assert_eq!(config.network_label(), "Local");
        assert_eq!(config.token_symbol, "TST");
    }

    #[test]
    fn test_apply_overrides_ignores_blank_values() {
        let mut config = Config::from_network(&NETWORKS[0], CONTRACT.to_string());
        config.apply_overrides(|_| Some("   ".to_string()));
        assert_eq!(config.contract_id, CONTRACT);
        assert_eq!(config.rpc_url, "https://soroban-testnet.stellar.org");
    }

    #[test]
    fn test_client_options_mirror_config() {
        let config = Config::from_network(&NETWORKS[0], CONTRACT.to_string());
        let options = config.client_options();
        assert_eq!(options.contract_id, CONTRACT);
        assert_eq!(options.network_passphrase, TESTNET_PASSPHRASE);
        assert_eq!(options.rpc_url, config.rpc_url);
    }

    #[test]
    fn test_from_settings_uses_network_and_custom_rpc() {
        let mut settings = UserSettings::default();
        settings.selected_network = "Futurenet".to_string();
        settings.contract_id = format!("  {}  ", CONTRACT);
        settings.set_custom_rpc("Futurenet", "https://rpc.example.com".to_string());

        let config = Config::from_settings_with(&settings, |_| None);

        assert_eq!(config.network_label(), "Futurenet");
        assert_eq!(config.rpc_url, "https://rpc.example.com");
        assert_eq!(config.contract_id, CONTRACT);
    }

    #[test]
    fn test_from_settings_unknown_network_falls_back_to_testnet() {
        let mut settings = UserSettings::default();
        settings.selected_network = "Nowhere".to_string();
        let config = Config::from_settings_with(&settings, |_| None);
        assert_eq!(config.network_passphrase, TESTNET_PASSPHRASE);
    }

    #[test]
    fn test_from_settings_environment_wins() {
        let mut settings = UserSettings::default();
        settings.contract_id = "CAAACAQDAQCQMBYIBEFAWDANBYHRAEISCMKBKFQXDAMRUGY4DUPB6N4O".to_string();
        let config = Config::from_settings_with(&settings, |key| {
            (key == ENV_CONTRACT_ID).then(|| CONTRACT.to_string())
        });
        assert_eq!(config.contract_id, CONTRACT);
    }

    // ==================== Config::validate tests ====================

    #[test]
    fn test_validate_ok() {
        let config = Config::from_network(&NETWORKS[0], CONTRACT.to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_contract_id() {
        let config = Config::from_network(&NETWORKS[0], String::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(ENV_CONTRACT_ID));
    }

    #[test]
    fn test_validate_rejects_account_as_contract() {
        let config = Config::from_network(
            &NETWORKS[0],
            "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H".to_string(),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut config = Config::from_network(&NETWORKS[0], CONTRACT.to_string());
        config.rpc_url = "ftp://soroban-testnet.stellar.org".to_string();
        assert!(config.validate().is_err());
    }
}
