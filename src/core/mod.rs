//! Core domain models for workflows
//!
//! This module defines the context threaded through a run, the step
//! abstraction, run state and the tool's configuration.

pub mod config;
pub mod context;
pub mod state;
pub mod step;
pub mod template;
pub mod text;
pub mod workflow;

pub use config::Config;
pub use context::*;
pub use state::*;
pub use step::*;
pub use workflow::*;
