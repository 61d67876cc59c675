//! Command-line interface for nsreveal
//! This binary derives namespace tokens, locates them in text, and rewrites HTML documents.
//!
//! Usage:
//!   nsreveal derive `<name>`...                         - Print the token for each name
//!   nsreveal scan `<path>`                              - List token occurrences in a text file
//!   nsreveal rewrite `<path>` [--mode `<mode>`] [--namespace `<name>`]... [--names-file `<file>`]
//!                     [--config `<file>`]                - Rewrite tokens in an HTML document
//!
//! `rewrite` reads `nsreveal.toml` from the working directory when present; `--config` is
//! layered on top of it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use nsreveal_config::{LoadError, Loader, PROJECT_CONFIG};
use nsreveal_engine::reveal::dom::DocumentHost;
use nsreveal_engine::reveal::html::{parse_html, serialize_children};
use nsreveal_engine::reveal::ids::derive;
use nsreveal_engine::reveal::scanner::scan;
use nsreveal_engine::{Engine, RevealError, Settings};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration error: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Reveal(#[from] RevealError),
}

fn main() {
    init_tracing();

    let matches = Command::new("nsreveal")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reveal the namespace names behind opaque tokens")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("derive")
                .about("Print the token each namespace name derives to")
                .arg(
                    Arg::new("names")
                        .help("Namespace names")
                        .required(true)
                        .num_args(1..),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("List token occurrences in a plain-text file")
                .arg(
                    Arg::new("path")
                        .help("Path to the text file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("rewrite")
                .about("Rewrite tokens in an HTML document and print the result")
                .arg(
                    Arg::new("path")
                        .help("Path to the HTML file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .short('m')
                        .help("Rewrite mode (translate or annotate)")
                        .value_parser(["translate", "annotate"]),
                )
                .arg(
                    Arg::new("namespace")
                        .long("namespace")
                        .short('n')
                        .help("Known namespace name (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("names-file")
                        .long("names-file")
                        .help("File with one namespace name per line"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("TOML configuration layered over the defaults and ./nsreveal.toml"),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("derive", sub)) => {
            handle_derive_command(sub);
            Ok(())
        }
        Some(("scan", sub)) => handle_scan_command(sub),
        Some(("rewrite", sub)) => handle_rewrite_command(sub),
        _ => unreachable!("clap requires a subcommand"),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `NSREVEAL_LOG`, then `RUST_LOG`, then `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("NSREVEAL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Handle the derive command
fn handle_derive_command(matches: &ArgMatches) {
    for name in matches.get_many::<String>("names").into_iter().flatten() {
        println!("{}\t{}", derive(name), name);
    }
}

/// Handle the scan command
fn handle_scan_command(matches: &ArgMatches) -> Result<(), CliError> {
    let path = required_path(matches, "path");
    let text = read_file(&path)?;
    for span in scan(&text) {
        println!("{}..{}\t{}", span.start(), span.end(), span.token);
    }
    Ok(())
}

/// Handle the rewrite command
fn handle_rewrite_command(matches: &ArgMatches) -> Result<(), CliError> {
    let mut loader = Loader::new().with_optional_file(PROJECT_CONFIG);
    if let Some(config) = matches.get_one::<String>("config") {
        loader = loader.with_file(config);
    }
    if let Some(mode) = matches.get_one::<String>("mode") {
        loader = loader.set_override("engine.mode", mode.as_str())?;
    }
    let config = loader.build()?;

    let mut names = config.engine.namespaces.clone();
    names.extend(
        matches
            .get_many::<String>("namespace")
            .into_iter()
            .flatten()
            .cloned(),
    );
    if let Some(file) = matches.get_one::<String>("names-file") {
        let listing = read_file(Path::new(file))?;
        names.extend(listing.lines().map(str::to_string));
    }

    let settings = Arc::new(Settings::new(&names, config.engine.mode));
    debug!(
        names = settings.load().mapping.len(),
        mode = %config.engine.mode,
        "settings loaded"
    );

    let path = required_path(matches, "path");
    let source = read_file(&path)?;
    let dom = parse_html(&source);
    let host = DocumentHost::new(dom.document.clone());

    let mut engine = Engine::new(settings, config.policy()).with_limits(config.limits());
    let report = engine.run(&host);
    debug!(
        scanned = report.scanned,
        rewritten = report.rewritten,
        "document rewritten"
    );

    print!("{}", serialize_children(host.document())?);
    Ok(())
}

fn required_path(matches: &ArgMatches, id: &str) -> PathBuf {
    matches
        .get_one::<String>(id)
        .map(PathBuf::from)
        .expect("clap enforces required arguments")
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
