//! Chartify Phones - phone listing CSV cleaning & chart suite
//!
//! Loads a listing CSV, cleans it, derives the inputs of thirteen charts,
//! renders them to PNG and optionally shows them in a gallery window.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod pipeline;
pub mod stats;

pub use config::VizConfig;
pub use pipeline::{Pipeline, RunSummary};
