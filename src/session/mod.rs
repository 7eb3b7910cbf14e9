//! Per-connection session state

pub mod context;

pub use context::SessionContext;
