//! Event-source multiplexing and decoding engine for contmon.
//!
//! One thread owns every connected event source and blocks in a single
//! poll(2) call until a source becomes readable; readiness multiplexing,
//! not threading, is what lets the monitor service arbitrarily many
//! storage roots.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod connector;
pub mod filter;
pub mod multiplex;
pub mod quit;
pub mod record;
