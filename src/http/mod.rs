//! HTTP layer: endpoint construction, transport, and the per-method calls.

pub mod common;
pub mod files;
pub mod generation;
pub mod transport;
