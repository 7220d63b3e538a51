// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Admin credentials and sessions. Anonymous callers may only check
//! balances; everything that reads the full ledger or writes to it needs an
//! admin password or a live session token.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::WalletError;
use crate::utils::{fmt_ts, get_setting, set_setting};

pub const SESSION_HOURS: i64 = 12;

const KEY_HASH: &str = "admin_password_hash";
const KEY_SALT: &str = "admin_password_salt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Anonymous,
    Admin,
}

#[derive(Debug, Default, Clone)]
pub struct Credentials {
    pub password: Option<String>,
    pub session_token: Option<String>,
}

/// Top-level commands reachable without admin rights.
pub fn is_public_command(name: &str) -> bool {
    matches!(name, "balance" | "admin" | "init")
}

/// Everything except balance checks, the admin group and `init` is admin-only;
/// changing the currency label also needs admin.
pub fn needs_admin(matches: &clap::ArgMatches) -> bool {
    match matches.subcommand() {
        Some(("admin", sub)) => matches!(
            sub.subcommand(),
            Some(("currency", c)) if c.get_one::<String>("set").is_some()
        ),
        Some((name, _)) => !is_public_command(name),
        None => false,
    }
}

fn sha256_hex(parts: &[&str]) -> String {
    let mut h = Sha256::new();
    for p in parts {
        h.update(p.as_bytes());
    }
    format!("{:x}", h.finalize())
}

pub fn has_password(conn: &Connection) -> Result<bool> {
    Ok(get_setting(conn, KEY_HASH)?.is_some())
}

pub fn verify_password(conn: &Connection, password: &str) -> Result<bool> {
    let (Some(hash), Some(salt)) = (get_setting(conn, KEY_HASH)?, get_setting(conn, KEY_SALT)?)
    else {
        return Ok(false);
    };
    Ok(sha256_hex(&[salt.as_str(), password]) == hash)
}

/// Sets the admin password. Once one exists, `current` must match it.
pub fn set_password(conn: &Connection, current: Option<&str>, new_password: &str) -> Result<()> {
    if new_password.trim().len() < 6 {
        return Err(WalletError::Validation(
            "Admin password must be at least 6 characters".into(),
        )
        .into());
    }
    if has_password(conn)? {
        let ok = match current {
            Some(pw) => verify_password(conn, pw)?,
            None => false,
        };
        if !ok {
            warn!("admin password change rejected");
            return Err(WalletError::Unauthorized("current password is incorrect".into()).into());
        }
    }
    let salt = Uuid::new_v4().to_string();
    set_setting(conn, KEY_SALT, &salt)?;
    set_setting(conn, KEY_HASH, &sha256_hex(&[salt.as_str(), new_password]))?;
    // Outstanding sessions belong to the old password.
    conn.execute("DELETE FROM sessions", [])?;
    info!("admin password updated");
    Ok(())
}

/// Verifies the password and opens a session; returns the raw token.
pub fn login(conn: &Connection, password: &str) -> Result<String> {
    if !verify_password(conn, password)? {
        warn!("admin login rejected");
        return Err(WalletError::Unauthorized("invalid password".into()).into());
    }
    let token = Uuid::new_v4().to_string();
    let now = Utc::now();
    let expires = now + Duration::hours(SESSION_HOURS);
    conn.execute(
        "INSERT INTO sessions(token_hash, created_at, expires_at) VALUES (?1, ?2, ?3)",
        params![sha256_hex(&[token.as_str()]), fmt_ts(now), fmt_ts(expires)],
    )?;
    conn.execute(
        "DELETE FROM sessions WHERE expires_at < ?1",
        params![fmt_ts(now)],
    )?;
    info!("admin session opened");
    Ok(token)
}

pub fn logout(conn: &Connection, token: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM sessions WHERE token_hash=?1",
        params![sha256_hex(&[token.trim()])],
    )?;
    info!("admin session closed");
    Ok(())
}

pub fn session_valid(conn: &Connection, token: &str) -> Result<bool> {
    let expires: Option<String> = conn
        .query_row(
            "SELECT expires_at FROM sessions WHERE token_hash=?1",
            params![sha256_hex(&[token.trim()])],
            |r| r.get(0),
        )
        .optional()?;
    let Some(expires) = expires else {
        return Ok(false);
    };
    let expires = DateTime::parse_from_rfc3339(&expires)?.with_timezone(&Utc);
    Ok(expires > Utc::now())
}

pub fn authenticate(conn: &Connection, creds: &Credentials) -> Result<Role> {
    if let Some(pw) = creds.password.as_deref() {
        if verify_password(conn, pw)? {
            return Ok(Role::Admin);
        }
    }
    if let Some(token) = creds.session_token.as_deref() {
        if session_valid(conn, token)? {
            return Ok(Role::Admin);
        }
    }
    Ok(Role::Anonymous)
}

pub fn require_admin(conn: &Connection, creds: &Credentials) -> Result<()> {
    if authenticate(conn, creds)? == Role::Admin {
        return Ok(());
    }
    let reason = if !has_password(conn)? {
        "no admin password configured; run `tuckshop admin set-password`"
    } else if creds.password.is_some() {
        "invalid password"
    } else {
        "log in with `tuckshop admin login` or pass --password"
    };
    warn!(reason, "admin command refused");
    Err(WalletError::Unauthorized(reason.into()).into())
}
