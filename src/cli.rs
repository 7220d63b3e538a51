// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, ArgGroup, Command, value_parser};

use crate::config::ENV_PASSWORD;

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    ]
}

fn req(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn limit_arg() -> Arg {
    Arg::new("limit")
        .long("limit")
        .value_parser(value_parser!(usize))
        .help("Show at most N rows")
}

fn format_args() -> [Arg; 2] {
    [
        Arg::new("format")
            .long("format")
            .default_value("csv")
            .help("csv or json"),
        req("out", "Output file"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("tuckshop")
        .about("Prepaid student wallets, stock and daily sales for a campus store")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("password")
                .long("password")
                .global(true)
                .env(ENV_PASSWORD)
                .hide_env_values(true)
                .help("Admin password (otherwise the saved session is used)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log each change to stderr"),
        )
        .subcommand(Command::new("init").about("Create or migrate the database"))
        .subcommand(
            Command::new("admin")
                .about("Admin password, sessions and settings")
                .subcommand(
                    Command::new("set-password")
                        .about("Set or change the admin password")
                        .arg(req("new", "New password")),
                )
                .subcommand(Command::new("login").about("Open a session using --password"))
                .subcommand(Command::new("logout").about("Close the saved session"))
                .subcommand(Command::new("status").about("Show password and session state"))
                .subcommand(
                    Command::new("currency")
                        .about("Show or set the currency label")
                        .arg(opt("set", "New currency label, e.g. KES")),
                ),
        )
        .subcommand(
            Command::new("student")
                .about("Student accounts")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Full name"))
                        .arg(req("admission", "Admission number"))
                        .arg(req("class", "Class code")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("search", "Match name, admission number or class"))
                        .arg(opt("class", "Only this class code"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("show")
                        .arg(req("admission", "Admission number"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("update")
                        .arg(req("admission", "Admission number"))
                        .arg(opt("name", "New name"))
                        .arg(opt("class", "New class code"))
                        .arg(opt("new-admission", "New admission number")),
                )
                .subcommand(Command::new("rm").arg(req("admission", "Admission number"))),
        )
        .subcommand(
            Command::new("import").about("Bulk import").subcommand(
                Command::new("students")
                    .about("Import students from CSV (name,admission_no,class_code)")
                    .arg(req("path", "CSV file")),
            ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data and templates")
                .subcommand(
                    Command::new("template")
                        .about("Write a student import template")
                        .arg(req("out", "Output file")),
                )
                .subcommand(Command::new("students").args(format_args()))
                .subcommand(Command::new("transactions").args(format_args())),
        )
        .subcommand(
            Command::new("tx")
                .about("Deposits and spends")
                .subcommand(tx_command("deposit", "Credit a student's wallet"))
                .subcommand(tx_command("spend", "Debit a student's wallet"))
                .subcommand(
                    Command::new("list")
                        .arg(opt("admission", "Only this student"))
                        .arg(opt("type", "deposit or spend"))
                        .arg(limit_arg())
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("item")
                .about("Stock catalogue")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Item name"))
                        .arg(opt("quantity", "Opening quantity").default_value("0"))
                        .arg(req("cost", "Cost price per unit"))
                        .arg(req("price", "Selling price per unit")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("search", "Match item name"))
                        .arg(
                            Arg::new("low")
                                .long("low")
                                .value_parser(value_parser!(i64))
                                .help("Only items with quantity at or below N"),
                        )
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("update")
                        .arg(req("name", "Item name"))
                        .arg(opt("rename", "New name"))
                        .arg(opt("quantity", "New quantity"))
                        .arg(opt("cost", "New cost price"))
                        .arg(opt("price", "New selling price")),
                )
                .subcommand(Command::new("rm").arg(req("name", "Item name"))),
        )
        .subcommand(
            Command::new("purchase")
                .about("Student purchases paid from the wallet")
                .subcommand(
                    Command::new("record")
                        .arg(req("admission", "Admission number"))
                        .arg(req("item", "Item name"))
                        .arg(req("quantity", "Units")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("admission", "Only this student"))
                        .arg(limit_arg())
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("restock")
                .about("Stock bought from suppliers")
                .subcommand(
                    Command::new("record")
                        .arg(req("item", "Item name"))
                        .arg(req("supplier", "Supplier name"))
                        .arg(req("quantity", "Units"))
                        .arg(req("cost", "Cost per unit")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("item", "Only this item"))
                        .arg(limit_arg())
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("sale")
                .about("Over-the-counter daily sales")
                .subcommand(
                    Command::new("record")
                        .arg(req("item", "Item name"))
                        .arg(req("quantity", "Units"))
                        .arg(opt("date", "Sale date YYYY-MM-DD (default today)")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("date", "Only this date YYYY-MM-DD"))
                        .arg(limit_arg())
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("balance")
                .about("Check wallet balances (no login needed)")
                .arg(opt("admission", "Admission number"))
                .arg(opt("class", "Class code"))
                .group(
                    ArgGroup::new("lookup")
                        .args(["admission", "class"])
                        .required(true),
                )
                .args(json_args()),
        )
        .subcommand(
            Command::new("report")
                .about("Sales and wallet reports")
                .subcommand(
                    Command::new("daily-sales")
                        .arg(opt("from", "First date YYYY-MM-DD"))
                        .arg(opt("to", "Last date YYYY-MM-DD"))
                        .args(json_args()),
                )
                .subcommand(Command::new("summary").args(json_args())),
        )
        .subcommand(Command::new("doctor").about("Check ledger consistency"))
}

fn tx_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(req("admission", "Admission number"))
        .arg(req("amount", "Amount"))
        .arg(opt("method", "online, cash or credit").default_value("cash"))
        .arg(opt("note", "Free-text note"))
}
