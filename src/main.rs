// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::process::ExitCode;

use tuckshop::{auth, cli, commands, config::AppConfig, db, logging};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::warn!(error = %format!("{:#}", err), "command failed");
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = AppConfig::from_env()?;
    logging::init(cfg.log_filter.as_deref(), matches.get_flag("verbose"));

    let mut conn = db::open_at(&cfg.db_path)?;

    if auth::needs_admin(&matches) {
        let creds = auth::Credentials {
            password: matches.get_one::<String>("password").cloned(),
            session_token: commands::admin::read_session(&cfg.session_path)?,
        };
        auth::require_admin(&conn, &creds)?;
    }

    match matches.subcommand() {
        Some(("init", _)) => {
            println!(
                "Database initialized at {} (schema v{})",
                cfg.db_path.display(),
                db::schema_version(&conn)?
            );
        }
        Some(("admin", sub)) => commands::admin::handle(&conn, sub, &cfg.session_path)?,
        Some(("student", sub)) => commands::students::handle(&conn, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, sub)?,
        Some(("item", sub)) => commands::items::handle(&conn, sub)?,
        Some(("purchase", sub)) => commands::purchases::handle(&mut conn, sub)?,
        Some(("restock", sub)) => commands::restock::handle(&mut conn, sub)?,
        Some(("sale", sub)) => commands::sales::handle(&mut conn, sub)?,
        Some(("balance", sub)) => commands::balance::handle(&conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
