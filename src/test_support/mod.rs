//! Shared helpers for unit tests: socket guard and in-memory fakes.

#![allow(clippy::unwrap_used)]

pub mod fakes;
pub mod socket_guard;
