// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("tally")
        .about("Tally: personal finance ledger, stock portfolio, and AI advisor")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("user")
                .about("Manage the signed-in identity")
                .subcommand(
                    Command::new("sign-in")
                        .about("Sign in as a user")
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(Command::new("sign-out").about("Sign out"))
                .subcommand(Command::new("whoami").about("Show the signed-in user")),
        )
        .subcommand(
            Command::new("account")
                .about("Manage bank accounts")
                .subcommand(
                    Command::new("add")
                        .about("Add an account")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("Checking|Savings|Credit|Investment|Cash"),
                        )
                        .arg(Arg::new("currency").long("currency").required(true))
                        .arg(Arg::new("balance").long("balance").default_value("0"))
                        .arg(Arg::new("color").long("color").default_value("")),
                )
                .subcommand(json_flags(Command::new("list").about("List accounts")))
                .subcommand(
                    Command::new("set")
                        .about("Update account fields")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("currency").long("currency"))
                        .arg(Arg::new("balance").long("balance"))
                        .arg(Arg::new("color").long("color")),
                )
                .subcommand(
                    Command::new("rm").about("Remove an account").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Manage transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction (adjusts the account balance atomically)")
                        .arg(
                            Arg::new("account")
                                .long("account")
                                .required(true)
                                .value_parser(value_parser!(i64))
                                .help("Account id"),
                        )
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("income|expense|transfer"),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .required(true)
                                .help("YYYY-MM-DD"),
                        )
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction (reverses its balance contribution)")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions")
                        .arg(Arg::new("month").long("month").help("YYYY-MM filter"))
                        .arg(
                            Arg::new("account")
                                .long("account")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("stock")
                .about("Manage stock holdings")
                .subcommand(
                    Command::new("add")
                        .about("Add a holding")
                        .arg(Arg::new("symbol").long("symbol").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("quantity").long("quantity").required(true))
                        .arg(Arg::new("avg-cost").long("avg-cost").required(true))
                        .arg(Arg::new("price").long("price").default_value("0"))
                        .arg(Arg::new("currency").long("currency").required(true))
                        .arg(Arg::new("sector").long("sector")),
                )
                .subcommand(
                    Command::new("rm").about("Remove a holding").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(json_flags(Command::new("list").about("List holdings")))
                .subcommand(
                    Command::new("refresh")
                        .about("Refresh current prices via the price service"),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Derived views over the ledger")
                .subcommand(json_flags(
                    Command::new("summary")
                        .about("Income/expense for one month plus recent transactions")
                        .arg(Arg::new("month").long("month").help("YYYY-MM, default: current")),
                ))
                .subcommand(json_flags(
                    Command::new("trend").about("Income/expense per month, ascending"),
                ))
                .subcommand(json_flags(
                    Command::new("categories")
                        .about("Per-category totals for one transaction type")
                        .arg(Arg::new("type").long("type").default_value("expense")),
                ))
                .subcommand(json_flags(
                    Command::new("net-worth")
                        .about("Account balances plus holdings valued in the base currency"),
                )),
        )
        .subcommand(
            Command::new("fx")
                .about("Fixed conversion rates for valuing holdings")
                .subcommand(
                    Command::new("set-base")
                        .about("Set the base currency")
                        .arg(Arg::new("currency").required(true)),
                )
                .subcommand(
                    Command::new("set-rate")
                        .about("Set a per-currency rate into the base currency")
                        .arg(Arg::new("currency").long("currency").required(true))
                        .arg(Arg::new("rate").long("rate").required(true)),
                )
                .subcommand(Command::new("list").about("Show the configured table")),
        )
        .subcommand(
            Command::new("advisor")
                .about("AI advisor")
                .subcommand(
                    Command::new("set-key")
                        .about("Store the Gemini API key")
                        .arg(Arg::new("key").required(true)),
                )
                .subcommand(Command::new("advice").about("Generate financial advice")),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("transactions")
                        .about("Export transactions")
                        .arg(Arg::new("format").long("format").default_value("csv"))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check the books for inconsistencies"))
}
