// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logger initialization for the demo binary.

use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. `"info"` or
/// `"quiver_plot=debug"`). When unset, `RUST_LOG` is used, then `info`.
#[derive(Debug, Clone)]
pub(crate) struct LoggingConfig {
    pub(crate) env_filter: Option<String>,
    pub(crate) write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub(crate) fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(log::LevelFilter::Info);
            }
        }
        builder.write_style(config.write_style);
        builder.init();
        log::debug!("logging initialized");
    });
}
