//! Client core for the glance personal dashboard: feed state, favorites,
//! preferences, and their persistence. The binary in `main.rs` is a thin
//! CLI shell over these modules.

pub mod api;
pub mod config;
pub mod state;
pub mod storage;
