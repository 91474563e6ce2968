use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use umapi_cli::cli::args::{Cli, Commands};
use umapi_cli::cli::commands;
use umapi_cli::config::Settings;
use umapi_cli::logging::{self, Verbosity};
use umapi_cli::umapi::UmapiConnection;

fn main() {
    if let Err(e) = run() {
        if std::env::var("UMAPI_DEBUG").as_deref() == Ok("1") {
            eprintln!("{}: {:?}", "error".red().bold(), e);
        } else {
            eprintln!("{}: {:#}", "error".red().bold(), e);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_occurrences(cli.verbose);
    logging::init(verbosity);

    if let Commands::Completions { shell } = cli.command {
        print!("{}", commands::completions(shell));
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref()).context("could not load settings")?;
    let mut conn = UmapiConnection::connect(settings, cli.test_mode)
        .context("could not set up the API connection")?;

    let output = match cli.command {
        Commands::UserRead(args) => commands::user_read(&mut conn, &args)?,
        Commands::UserReadAll(args) => commands::user_read_all(&mut conn, &args)?,
        Commands::GroupRead(args) => commands::group_read(&mut conn, &args)?,
        Commands::GroupReadAll(args) => commands::group_read_all(&mut conn, &args)?,
        Commands::UserCreate(args) => commands::user_create(&mut conn, args, verbosity)?,
        Commands::UserCreateBulk(args) => commands::user_create_bulk(&mut conn, &args, verbosity)?,
        Commands::UserUpdate(args) => commands::user_update(&mut conn, args, verbosity)?,
        Commands::UserUpdateBulk(args) => commands::user_update_bulk(&mut conn, &args, verbosity)?,
        Commands::UserDelete(args) => commands::user_delete(&mut conn, &args, verbosity)?,
        Commands::UserDeleteBulk(args) => commands::user_delete_bulk(&mut conn, &args, verbosity)?,
        Commands::GroupCreate(args) => commands::group_create(&mut conn, args, verbosity)?,
        Commands::GroupCreateBulk(args) => commands::group_create_bulk(&mut conn, &args, verbosity)?,
        Commands::GroupUpdate(args) => commands::group_update(&mut conn, args, verbosity)?,
        Commands::GroupUpdateBulk(args) => commands::group_update_bulk(&mut conn, &args, verbosity)?,
        Commands::GroupDelete(args) => commands::group_delete(&mut conn, &args, verbosity)?,
        Commands::GroupDeleteBulk(args) => commands::group_delete_bulk(&mut conn, &args, verbosity)?,
        Commands::Completions { .. } => String::new(),
    };

    if !output.is_empty() {
        println!("{}", output.trim_end());
    }
    Ok(())
}
