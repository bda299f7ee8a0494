//! GUI module for BDB Wallet
//!
//! This module provides the graphical user interface built with egui/eframe.
//!
//! ## Module Structure
//!
//! - `app` - Main GuiApp struct, background jobs and the frame loop
//! - `async_job` - Generic async job polling for background tasks
//! - `theme` - Centralized theme and styling system (AppTheme)
//! - `helpers` - Notification tags, text truncation and the window icon
//! - `views` - View rendering functions (wallet, history, settings)
//!
//! ## Usage
//!
//! ```no_run
//! use bdb_wallet::config::Config;
//! use bdb_wallet::gui;
//!
//! let config = Config::default();
//! gui::launch(config).expect("Failed to launch GUI");
//! ```

mod app;
pub mod async_job;
pub mod helpers;
pub mod theme;
pub mod views;

pub use app::{launch, GuiApp, GuiSection};

pub use async_job::AsyncJob;
pub use helpers::{load_icon, severity_tag, truncate_chars};
pub use theme::{configure_style, AppTheme};
