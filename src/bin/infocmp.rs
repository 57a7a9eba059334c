// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Print a terminfo entry in the same format as `infocmp -1`

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use terminfo_reader::{Listing, locate};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Print terminfo entries like infocmp -1")]
struct Args {
    /// Terminal name
    #[arg(env = "TERM")]
    term: String,

    /// Include extended capabilities
    #[arg(short = 'x')]
    extended: bool,

    /// Use long capability names
    #[arg(short = 'L')]
    long_names: bool,

    /// Look up the terminal in this directory only
    #[arg(short = 'A', value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Log level, overridden by `RUST_LOG`
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let terminfo = match &args.directory {
        Some(dir) => locate::open(dir, &args.term),
        None => locate::load(&args.term),
    }
    .with_context(|| format!("Cannot load terminfo entry for {}", args.term))?;
    debug!(term = %args.term, file = ?terminfo.file, "loaded");

    let listing = Listing {
        long_names: args.long_names,
        extended: args.extended,
    };
    print!("{}", listing.render(&terminfo));

    Ok(())
}
