// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::env;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Tuckshop", "tuckshop"));

pub const ENV_DB: &str = "TUCKSHOP_DB";
pub const ENV_SESSION: &str = "TUCKSHOP_SESSION";
pub const ENV_LOG: &str = "TUCKSHOP_LOG";
pub const ENV_PASSWORD: &str = "TUCKSHOP_ADMIN_PASSWORD";

/// Runtime configuration resolved from the environment, falling back to the
/// platform data directory.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub session_path: PathBuf,
    pub log_filter: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let db_path = match non_empty_var(ENV_DB) {
            Some(p) => PathBuf::from(p),
            None => data_dir()?.join("tuckshop.sqlite"),
        };
        let session_path = match non_empty_var(ENV_SESSION) {
            Some(p) => PathBuf::from(p),
            None => db_path
                .parent()
                .map(|d| d.join("session"))
                .unwrap_or_else(|| PathBuf::from("session")),
        };
        let log_filter = non_empty_var(ENV_LOG).or_else(|| non_empty_var("RUST_LOG"));
        Ok(Self {
            db_path,
            session_path,
            log_filter,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let dir = proj.data_dir();
    fs::create_dir_all(dir).context("Failed to create data dir")?;
    Ok(dir.to_path_buf())
}
