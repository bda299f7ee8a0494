//! View modules for the GUI
//!
//! Each submodule adds the rendering methods for one screen to `GuiApp`.
//!
//! - `wallet` - Connect panel, connected account and balance
//! - `history` - Known addresses table and export
//! - `settings` - Network, contract, wallet backend and notification settings
//!
//! The view methods are called from `App::update` in `app.rs`.

pub mod history;
pub mod settings;
pub mod wallet;
