// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth;
use crate::error::WalletError;
use crate::utils::{get_currency, set_currency};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::Path;

/// `session_path` is where the login token is kept between invocations.
pub fn handle(conn: &Connection, m: &clap::ArgMatches, session_path: &Path) -> Result<()> {
    let password = m.get_one::<String>("password").map(|s| s.as_str());
    match m.subcommand() {
        Some(("set-password", sub)) => {
            let new_pw = sub.get_one::<String>("new").unwrap();
            auth::set_password(conn, password, new_pw)?;
            if session_path.exists() {
                fs::remove_file(session_path).ok();
            }
            println!("Admin password updated");
        }
        Some(("login", _)) => {
            let pw = password.ok_or_else(|| {
                WalletError::Unauthorized("pass --password or set TUCKSHOP_ADMIN_PASSWORD".into())
            })?;
            let token = auth::login(conn, pw)?;
            fs::write(session_path, &token)
                .with_context(|| format!("Write session file {}", session_path.display()))?;
            println!("Logged in; session valid for {} hours", auth::SESSION_HOURS);
        }
        Some(("logout", _)) => {
            if let Some(token) = read_session(session_path)? {
                auth::logout(conn, &token)?;
                fs::remove_file(session_path)
                    .with_context(|| format!("Remove session file {}", session_path.display()))?;
            }
            println!("Logged out");
        }
        Some(("status", _)) => {
            let configured = auth::has_password(conn)?;
            let session = match read_session(session_path)? {
                Some(token) => auth::session_valid(conn, &token)?,
                None => false,
            };
            println!(
                "Admin password: {}\nSession: {}",
                if configured { "configured" } else { "not set" },
                if session { "active" } else { "none" }
            );
        }
        Some(("currency", sub)) => {
            if let Some(ccy) = sub.get_one::<String>("set") {
                let ccy = ccy.trim().to_uppercase();
                set_currency(conn, &ccy)?;
                println!("Currency set to {}", ccy);
            } else {
                println!("{}", get_currency(conn)?);
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn read_session(session_path: &Path) -> Result<Option<String>> {
    if !session_path.exists() {
        return Ok(None);
    }
    let token = fs::read_to_string(session_path)
        .with_context(|| format!("Read session file {}", session_path.display()))?;
    let token = token.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}
