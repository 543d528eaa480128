//! Taskflow client library
//!
//! Client core for a task-approval system: session handling, backend
//! readiness probing, task normalization and the approval workflow.
//! The `taskflow` binary is a thin CLI over these components.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod normalize;
pub mod probe;
pub mod session;
pub mod storage;
pub mod token;
pub mod types;
pub mod view;
pub mod workflow;

pub use client::TaskClient;
