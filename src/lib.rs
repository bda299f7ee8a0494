//! BDB Wallet: connect a Stellar wallet, keep a list of known addresses and
//! read the BDB token balance from its Soroban contract.

pub mod address_history;
pub mod balance;
pub mod busy;
pub mod config;
pub mod contract;
pub mod gui;
pub mod notifications;
pub mod session;
pub mod user_settings;
pub mod utils;
pub mod wallet;
