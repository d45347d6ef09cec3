//! Chat-completion gateway fronting a single upstream inference provider.
//!
//! Two serving paths share one endpoint: a direct passthrough (buffered
//! JSON or a verbatim streaming relay) and an optional two-stage Enhanced
//! Chain-of-Draft pipeline that drafts, verifies, and returns a combined
//! envelope with merged token accounting.

pub mod config;
pub mod logging;
pub mod routers;
pub mod server;
pub mod upstream;
