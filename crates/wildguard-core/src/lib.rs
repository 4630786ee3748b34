//! Core types and definitions for the WILDGUARD session simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! identifiers, components, commands, events, state snapshots, configuration,
//! the currency ledger and the content-lookup seam. It has no RNG and no
//! runtime framework dependency.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod content;
pub mod economy;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;
