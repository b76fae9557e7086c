//! Binary-side application flow.

pub(crate) mod exit_handler;
pub(crate) mod logging;
pub(crate) mod runtime;
