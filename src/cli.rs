// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

pub fn build_cli() -> Command {
    Command::new("tillbook")
        .about("Multi-user till ledger: taxed income/expense entries and staff advances")
        .version(crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .global(true)
                .help("Database file (defaults to the platform data dir)"),
        )
        .subcommand(Command::new("init").about("Create the database and schema"))
        .subcommand(user_cmd())
        .subcommand(settings_cmd())
        .subcommand(tx_cmd())
        .subcommand(debt_cmd())
        .subcommand(report_cmd())
        .subcommand(export_cmd())
        .subcommand(
            Command::new("doctor")
                .about("Audit stored derived fields for drift")
                .args(json_flags()),
        )
}

fn user_cmd() -> Command {
    Command::new("user")
        .about("Manage users")
        .subcommand(
            Command::new("add")
                .about("Create a user with default settings")
                .arg(Arg::new("name").required(true).help("Unique user name")),
        )
        .subcommand(Command::new("list").about("List users").args(json_flags()))
        .subcommand(
            Command::new("rm")
                .about("Delete a user and every ledger row they own")
                .arg(Arg::new("name").required(true)),
        )
}

fn settings_cmd() -> Command {
    Command::new("settings")
        .about("Per-user configuration")
        .subcommand(
            Command::new("show")
                .about("Show settings")
                .arg(user_flag())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("set")
                .about("Update settings; omitted flags keep their stored values")
                .arg(user_flag())
                .arg(Arg::new("currency").long("currency").value_name("SYMBOL"))
                .arg(
                    Arg::new("tax-income-rate")
                        .long("tax-income-rate")
                        .value_name("PCT")
                        .help("Percentage in [0,100] applied to income entries"),
                )
                .arg(
                    Arg::new("tax-expense-rate")
                        .long("tax-expense-rate")
                        .value_name("PCT")
                        .help("Percentage in [0,100] applied to expense entries"),
                )
                .arg(
                    Arg::new("monthly-cap")
                        .long("monthly-cap")
                        .value_name("AMOUNT")
                        .help("Advisory monthly expense cap (0 disables)"),
                )
                .arg(
                    Arg::new("categories")
                        .long("categories")
                        .value_name("LIST")
                        .help("Comma-separated category vocabulary"),
                )
                .arg(
                    Arg::new("payment-methods")
                        .long("payment-methods")
                        .value_name("LIST")
                        .help("Comma-separated payment method vocabulary"),
                ),
        )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Income and expense entries")
        .subcommand(
            Command::new("add")
                .about("Record a transaction; tax and total are derived")
                .arg(user_flag())
                .arg(
                    Arg::new("date")
                        .long("date")
                        .required(true)
                        .value_name("YYYY-MM-DD"),
                )
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .required(true)
                        .value_name("income|expense"),
                )
                .arg(Arg::new("category").long("category").required(true))
                .arg(
                    Arg::new("base")
                        .long("base")
                        .required(true)
                        .value_name("AMOUNT")
                        .help("Pre-tax amount; negative records a correction"),
                )
                .arg(Arg::new("employee").long("employee"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(
            Command::new("list")
                .about("List transactions, newest first")
                .arg(user_flag())
                .arg(Arg::new("kind").long("kind").value_name("income|expense"))
                .arg(
                    Arg::new("employee")
                        .long("employee")
                        .help("Case-insensitive employee match"),
                )
                .arg(Arg::new("from").long("from").value_name("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").value_name("YYYY-MM-DD"))
                .arg(
                    Arg::new("month")
                        .long("month")
                        .value_name("YYYY-MM")
                        .conflicts_with_all(["from", "to"]),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                )
                .args(json_flags()),
        )
        .subcommand(
            Command::new("show")
                .about("Show one transaction")
                .arg(user_flag())
                .arg(id_arg())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("edit")
                .about("Update fields; tax and total are re-derived at the current rate")
                .arg(user_flag())
                .arg(id_arg())
                .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
                .arg(Arg::new("kind").long("kind").value_name("income|expense"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("base").long("base").value_name("AMOUNT"))
                .arg(Arg::new("employee").long("employee"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction")
                .arg(user_flag())
                .arg(id_arg()),
        )
}

fn debt_cmd() -> Command {
    Command::new("debt")
        .about("Staff advances and repayments")
        .subcommand(
            Command::new("add")
                .about("Record a movement; the signed delta is derived")
                .arg(user_flag())
                .arg(
                    Arg::new("date")
                        .long("date")
                        .required(true)
                        .value_name("YYYY-MM-DD"),
                )
                .arg(
                    Arg::new("employee")
                        .long("employee")
                        .required(true)
                        .help("Employee the movement belongs to"),
                )
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .required(true)
                        .value_name("advance|repay"),
                )
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .required(true)
                        .value_name("AMOUNT")
                        .help("Magnitude, never negative"),
                )
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(
            Command::new("list")
                .about("List movements, oldest first")
                .arg(user_flag())
                .arg(Arg::new("kind").long("kind").value_name("advance|repay"))
                .arg(
                    Arg::new("employee")
                        .long("employee")
                        .help("Case-insensitive employee match"),
                )
                .arg(Arg::new("from").long("from").value_name("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").value_name("YYYY-MM-DD"))
                .arg(
                    Arg::new("month")
                        .long("month")
                        .value_name("YYYY-MM")
                        .conflicts_with_all(["from", "to"]),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                )
                .args(json_flags()),
        )
        .subcommand(
            Command::new("show")
                .about("Show one movement")
                .arg(user_flag())
                .arg(id_arg())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("edit")
                .about("Update fields; the delta is re-derived")
                .arg(user_flag())
                .arg(id_arg())
                .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
                .arg(Arg::new("employee").long("employee"))
                .arg(Arg::new("kind").long("kind").value_name("advance|repay"))
                .arg(Arg::new("amount").long("amount").value_name("AMOUNT"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a movement")
                .arg(user_flag())
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("balances")
                .about("Outstanding position per employee")
                .arg(user_flag())
                .args(json_flags()),
        )
}

fn report_cmd() -> Command {
    Command::new("report").about("Read-only summaries").subcommand(
        Command::new("summary")
            .about("Income, expense and tax totals")
            .arg(user_flag())
            .arg(Arg::new("month").long("month").value_name("YYYY-MM"))
            .args(json_flags()),
    )
}

fn export_cmd() -> Command {
    Command::new("export")
        .about("Back up a user's ledger to a file")
        .subcommand(
            Command::new("transactions")
                .about("Export transactions")
                .arg(user_flag())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .required(true)
                        .value_name("csv|json"),
                )
                .arg(Arg::new("out").long("out").required(true).value_name("FILE")),
        )
        .subcommand(
            Command::new("debts")
                .about("Export debts")
                .arg(user_flag())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .required(true)
                        .value_name("csv|json"),
                )
                .arg(Arg::new("out").long("out").required(true).value_name("FILE")),
        )
}

fn user_flag() -> Arg {
    Arg::new("user")
        .long("user")
        .value_name("NAME")
        .required(true)
        .help("User whose ledger to operate on")
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("Record id")
}

fn json_flags() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    ]
}
