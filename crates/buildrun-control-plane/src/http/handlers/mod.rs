//! HTTP request handlers.

mod builds;
mod health;

pub use builds::{build_status, launch_build};
pub use health::{health_check, ready};
