// ABOUTME: Library root for briefex-ops - exposes the orchestration components.
// ABOUTME: The main binary is in main.rs.

pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod migration;
pub mod output;
pub mod release;
pub mod types;
