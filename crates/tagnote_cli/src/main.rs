//! Command-line front end for the tagnote core.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the notebook.
//! - Map command outcomes to stable exit codes.

mod commands;

use commands::{execute, parse_args, usage, CliError, Command};
use log::{error, info};
use std::io::Write;
use std::path::Path;
use tagnote_core::{init_logging, load_config, Notebook};

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    std::process::exit(run(&args));
}

fn run(args: &[String]) -> i32 {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let invocation = match parse_args(args) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("{}", usage());
            return EXIT_USAGE;
        }
    };

    match invocation.command {
        Command::Help => {
            let _ = writeln!(out, "{}", usage());
            return EXIT_OK;
        }
        Command::Version => {
            let _ = writeln!(out, "tagnote {}", tagnote_core::core_version());
            return EXIT_OK;
        }
        _ => {}
    }

    let mut config = match load_config(invocation.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return EXIT_FAILURE;
        }
    };
    if let Some(db) = invocation.db {
        config.db_path = db;
    }
    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    if let Err(err) = ensure_parent_dir(&config.db_path) {
        eprintln!("error: {err}");
        return EXIT_FAILURE;
    }
    let mut notebook = match Notebook::open_sqlite(&config.db_path) {
        Ok(notebook) => notebook,
        Err(err) => {
            error!("event=cli_open module=cli status=error error={err}");
            eprintln!("error: {err}");
            return EXIT_FAILURE;
        }
    };
    for recovered in notebook.load_errors() {
        eprintln!("warning: {recovered}; starting from an empty collection");
    }

    match execute(&mut notebook, &invocation.command, &mut out) {
        Ok(()) => {
            info!("event=cli_command module=cli status=ok");
            EXIT_OK
        }
        Err(CliError::Io(err)) => {
            eprintln!("error: {err}");
            EXIT_FAILURE
        }
        Err(CliError::Notebook(err)) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            EXIT_FAILURE
        }
    }
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
