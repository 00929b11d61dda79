//! Daily-planning board: interaction engine host and remote sync.
//!
//! The [`canvas`] crate holds the board state and turns input into item
//! mutations. This crate persists those mutations to the remote item store
//! and folds the replies back into the engine.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`board`] | One open board view: engine + sync, the host-facing surface |
//! | [`sync`] | Sync coordinator: persistence calls and reply reconciliation |
//! | [`api`] | `ItemApi` trait, HTTP client, and wire format |
//! | [`config`] | Environment-driven configuration |

pub mod api;
pub mod board;
pub mod config;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use board::Board;
pub use config::BoardConfig;
