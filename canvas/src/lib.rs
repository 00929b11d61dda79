//! Canvas interaction engine for the daily-planning board.
//!
//! Holds the board's in-memory state and turns raw input events into item
//! mutations. The crate does no I/O and no rendering: every handler runs
//! synchronously and returns [`engine::Action`]s for the host to draw and
//! persist.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Gesture controller and command surface ([`engine::EngineCore`]) |
//! | [`doc`] | Items, ids, and the in-memory [`doc::ItemStore`] |
//! | [`kind`] | Per-kind capability table and payload accessors |
//! | [`viewport`] | Pan/zoom transform and coordinate conversions |
//! | [`input`] | Input event types, board session, and the gesture state machine |
//! | [`hit`] | Hit-testing against items and resize handles |
//! | [`history`] | Undo log |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod history;
pub mod hit;
pub mod input;
pub mod kind;
pub mod viewport;
