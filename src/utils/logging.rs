// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tracing subscriber setup for hosts embedding the vault.

use anyhow::{anyhow, Result};
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install a global subscriber writing to stderr.
///
/// `RUST_LOG` wins over `config.log_level`. Fails if a global subscriber
/// is already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("cardvault=debug,info"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber
            .json()
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
    } else {
        subscriber
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
    }
}
