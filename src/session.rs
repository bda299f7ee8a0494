//! Page controller: identity, balance, notifications and the blocking alert.
//!
//! The GUI drives a `Session` in two halves (`begin_*` on the UI thread,
//! `apply_*` when the background job reports back). The composed async
//! `connect` and `refresh_balance` run both halves in one go.

use anyhow::Result;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::address_history::AddressHistory;
use crate::balance::{query_balance, BalanceReading};
use crate::busy::{BusyGuard, BusyLock};
use crate::contract::TokenContract;
use crate::notifications::{NotificationQueue, Severity};
use crate::wallet::{request_identity, ConnectOutcome, WalletConnector};

/// Balance shown before the first successful query
pub const INITIAL_BALANCE: &str = "0";

/// Blocking message; the page ignores input until it is dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Permission to run one balance query. Busy clears when the ticket drops.
pub struct BalanceTicket {
    account: String,
    _guard: BusyGuard,
}

impl BalanceTicket {
    pub fn account(&self) -> &str {
        &self.account
    }
}

pub struct Session {
    address: Option<String>,
    selected_wallet: Option<String>,
    balance: String,
    pub history: AddressHistory,
    pub notifications: NotificationQueue,
    busy: BusyLock,
    alert: Option<Alert>,
    install_hint: String,
}

impl Session {
    pub fn new(history: AddressHistory, notification_ttl: Duration) -> Self {
        Self {
            address: None,
            selected_wallet: None,
            balance: INITIAL_BALANCE.to_string(),
            history,
            notifications: NotificationQueue::new(notification_ttl),
            busy: BusyLock::new(),
            alert: None,
            install_hint: "Please install a Stellar wallet.".to_string(),
        }
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn selected_wallet(&self) -> Option<&str> {
        self.selected_wallet.as_deref()
    }

    pub fn balance(&self) -> &str {
        &self.balance
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Text of the "wallet not installed" alert for the active backend
    pub fn set_install_hint(&mut self, hint: impl Into<String>) {
        self.install_hint = hint.into();
    }

    pub fn set_notification_ttl(&mut self, ttl: Duration) {
        self.notifications.set_default_ttl(ttl);
    }

    fn raise_alert(&mut self, title: &str, message: &str) {
        self.alert = Some(Alert::new(title, message));
    }

    // ==================== connection ====================

    /// Whether a wallet request should be made. The identity is fixed for the
    /// session, so once connected this only reports it.
    pub fn begin_connect(&mut self) -> bool {
        if let Some(address) = &self.address {
            let message = format!("Already connected as {}", short_address(address));
            self.notifications.push(Severity::Info, "Wallet connected", message);
            return false;
        }
        true
    }

    pub fn apply_connect(&mut self, outcome: Result<ConnectOutcome>) {
        match outcome {
            Ok(ConnectOutcome::Authorized(address)) => {
                info!("Wallet connected: {}", address);
                self.address = Some(address.clone());
                self.selected_wallet = Some(address.clone());

                if let Err(e) = self.history.insert(&address) {
                    error!("Failed to save address history: {:#}", e);
                    self.notifications.push(
                        Severity::Error,
                        "History not saved",
                        format!("The address list could not be written: {}", e),
                    );
                }

                self.notifications.push(
                    Severity::Success,
                    "Wallet connected!",
                    "Your wallet was connected successfully.",
                );
            }
            Ok(ConnectOutcome::Denied) => {
                warn!("Wallet access denied");
                self.notifications.push(
                    Severity::Warning,
                    "Access denied",
                    "Access to the wallet was not granted. Please try again.",
                );
            }
            Ok(ConnectOutcome::NotInstalled) => {
                let hint = self.install_hint.clone();
                self.raise_alert("Wallet not found", &hint);
            }
            Err(e) => {
                error!("Error connecting wallet: {:#}", e);
                self.raise_alert(
                    "Connection error",
                    "Error connecting. Make sure the wallet is installed and unlocked.",
                );
            }
        }
    }

    pub async fn connect(&mut self, wallet: &dyn WalletConnector) {
        if !self.begin_connect() {
            return;
        }
        self.set_install_hint(wallet.backend().install_hint());
        let outcome = request_identity(wallet).await;
        self.apply_connect(outcome);
    }

    // ==================== balance ====================

    /// Claim the busy flag for a balance query.
    ///
    /// Without an identity only the alert is raised. While another query is
    /// in flight the request is turned away with a warning.
    pub fn begin_balance(&mut self) -> Option<BalanceTicket> {
        let Some(account) = self.address.clone() else {
            self.raise_alert("Wallet not connected", "Connect your wallet first.");
            return None;
        };

        match self.busy.try_acquire() {
            Some(guard) => Some(BalanceTicket {
                account,
                _guard: guard,
            }),
            None => {
                self.notifications.push(
                    Severity::Warning,
                    "Please wait",
                    "A balance request is already in progress.",
                );
                None
            }
        }
    }

    pub fn apply_balance(&mut self, result: Result<BalanceReading>) {
        match result {
            Ok(reading) => {
                info!("Balance updated: {} (ledger {})", reading.formatted, reading.latest_ledger);
                self.balance = reading.formatted;
            }
            Err(e) => {
                error!("Error fetching balance: {:#}", e);
                self.raise_alert(
                    "Balance error",
                    "Error fetching the balance. Check that the contract is deployed.",
                );
            }
        }
    }

    /// The query could not be set up (bad configuration), so no remote call
    /// was made. The alert carries the reason.
    pub fn abort_balance(&mut self, ticket: BalanceTicket, reason: anyhow::Error) {
        drop(ticket);
        warn!("Balance query not started: {:#}", reason);
        self.raise_alert("Balance unavailable", &format!("{:#}", reason));
    }

    /// Returns `false` when the request was refused before any remote call.
    pub async fn refresh_balance(&mut self, contract: &dyn TokenContract) -> bool {
        let Some(ticket) = self.begin_balance() else {
            return false;
        };
        let result = query_balance(contract, ticket.account()).await;
        drop(ticket);
        self.apply_balance(result);
        true
    }
}

/// First 8 and last 8 characters joined by "..."
pub fn short_address(address: &str) -> String {
    crate::utils::short_address(address)
}
