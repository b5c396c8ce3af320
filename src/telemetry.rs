// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Logging subscriber initialisation.

use tracing_subscriber::{
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Registry,
};

use crate::config::LogFormat;

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

pub fn init_tracing(format: LogFormat) -> Result<(), TryInitError> {
    match format {
        LogFormat::Pretty => init_with_layer(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        ),
        LogFormat::Json => init_with_layer(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true),
        ),
    }
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_with_layer<L>(fmt_layer: L) -> Result<(), TryInitError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter())
        .try_init()
}
