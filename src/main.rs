//! MT Index command line front-end
//!
//! Loads the configured language model and phrase table, then reads
//! sentences from stdin and prints, for each, its language model score and
//! the translation options of the whole line.

use std::io::{self, BufRead, Write};

use clap::{Arg, ArgAction, Command};
use mt_index::core::{load_config_or_default, Config};
use mt_index::{Result, Session};
use tracing::{error, info};

fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("mt-index")
        .version(mt_index::VERSION)
        .about("Load an ARPA language model and a phrase table, then query them from stdin.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("lm")
                .long("lm")
                .value_name("FILE")
                .help("ARPA language model"),
        )
        .arg(
            Arg::new("phrase-table")
                .long("phrase-table")
                .value_name("FILE")
                .help("Phrase table (src ||| tgt ||| ... ||| scores)"),
        )
        .arg(
            Arg::new("gapped")
                .long("gapped")
                .action(ArgAction::SetTrue)
                .help("Phrase table contains gapped source phrases"),
        )
        .arg(
            Arg::new("packed-keys")
                .long("packed-keys")
                .action(ArgAction::SetTrue)
                .help("Store source phrases bit-packed"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .get_matches();

    // Logging comes first so configuration problems are reported through it
    let bootstrap_level = matches.get_one::<String>("log-level").map_or("info", String::as_str);
    let logging = mt_index::init_logging(bootstrap_level);

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mut config = load_config_or_default(config_path).inspect_err(|e| error!("{}", e))?;
    apply_cli_overrides(&mut config, &matches);
    config.validate().inspect_err(|e| error!("{}", e))?;
    match config_path {
        Some(path) => info!("Loaded configuration from: {}", path),
        None => info!("No config file specified, using defaults"),
    }
    if let Some(logging) = &logging {
        logging.set_level(&config.logging.level)?;
    }

    let session = Session::load(&config)?;
    info!("Ready; reading sentences from stdin");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let line = line?;
        writeln!(out, "{}", session.process_line(&line))?;
    }
    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &clap::ArgMatches) {
    if let Some(path) = matches.get_one::<String>("lm") {
        config.lm.path = Some(path.into());
    }
    if let Some(path) = matches.get_one::<String>("phrase-table") {
        config.phrase_table.path = Some(path.into());
    }
    if matches.get_flag("gapped") {
        config.phrase_table.gapped = true;
    }
    if matches.get_flag("packed-keys") {
        config.phrase_table.packed_keys = true;
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }
}
