// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. An explicit filter (from `TUCKSHOP_LOG` or
/// `RUST_LOG`) wins over the verbosity flag.
pub fn init(filter: Option<&str>, verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let directive = filter
        .map(str::to_string)
        .unwrap_or_else(|| format!("tuckshop={}", default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
