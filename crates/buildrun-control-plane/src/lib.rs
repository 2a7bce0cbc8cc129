//! BuildRun Control Plane Library
//!
//! This crate provides the control plane for BuildRun: the scheduler
//! backends, build dispatch, status translation, the reaper, and the HTTP API.

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod http;
pub mod reaper;
pub mod state;
pub mod translator;

pub use config::Config;
pub use dispatcher::Dispatcher;
pub use reaper::{Reaper, SweepReport};
pub use state::AppState;
pub use translator::StatusTranslator;
