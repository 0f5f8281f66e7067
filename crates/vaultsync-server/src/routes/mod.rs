//! HTTP route modules for the `vaultsync` server.

pub mod secrets;
pub mod sync;
pub mod sys;
