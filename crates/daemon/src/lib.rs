// SPDX-License-Identifier: MIT

//! Composition root and config store for the `lifetraced` binary: loads
//! `config.yaml`, wires every worker crate together, and owns the
//! background tick loop that drives the scheduler.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod app_config;
pub mod composition;
pub mod config;
pub mod error;
pub mod logging;

pub use app_config::AppConfig;
pub use composition::Composition;
pub use config::{ChangeType, Config, ConfigPaths};
pub use error::{CompositionError, ConfigError};
