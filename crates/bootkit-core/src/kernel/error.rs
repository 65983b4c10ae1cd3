//! # Bootkit Core Kernel Errors
//!
//! Defines the kernel-level [`Error`] enum. Subsystem errors
//! ([`ConfigError`], [`PluginSystemError`]) convert into it with `?`, and the
//! boot orchestrator reports contained panics through
//! [`Error::Panicked`] tagged with the [`KernelLifecyclePhase`] they
//! interrupted.
use std::result::Result as StdResult;

use crate::config::error::ConfigError;
use crate::plugin_system::error::PluginSystemError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Boot document or section problem
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// A panic escaped the bootstrap or shutdown sequence.
    #[error("Panic during {phase}: {message}")]
    Panicked {
        phase: KernelLifecyclePhase,
        message: String,
    },
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Bootstrap")]
    Bootstrap,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;
