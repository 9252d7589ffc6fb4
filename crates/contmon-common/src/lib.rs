//! # contmon-common
//!
//! Shared error definitions, container state tables, constants, and the
//! configuration model used across the contmon workspace.
//!
//! This crate is the leaf of the dependency graph — it depends on no other
//! internal crate and provides the foundational primitives that the event
//! engine and CLI build upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
