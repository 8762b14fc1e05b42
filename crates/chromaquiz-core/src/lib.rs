//! chromaquiz-core — Rounds, timing, scoring and the session state machine.
//!
//! This crate holds everything about the game that does not touch a terminal
//! or a disk: palettes, round generation, the streak scoring rules, the
//! session state machine and the async engine that drives it. Rendering and
//! storage are reached through the traits in [`traits`].

pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod mock;
pub mod model;
pub mod palette;
pub mod round;
pub mod scoring;
pub mod session;
pub mod stats;
pub mod timer;
pub mod traits;
