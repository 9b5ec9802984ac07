use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use plc_st_ast_lib::batch::{parse_batch, BatchResult, SourceItem};
use plc_st_ast_lib::error::Error;
use plc_st_ast_lib::parser::SourceParser;
use plc_st_ast_lib::settings::{parse_settings_from_text, Settings};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Parse IEC 61131-3 Structured Text and print it back formatted",
    long_about = "Parse IEC 61131-3 Structured Text and print it back formatted.\n\
                 Every file is parsed on its own; a failing file is reported and the\n\
                 others are still processed.\n\
                 \n\
                 Example usage:\n\
                 plc_st_ast main.st                 # Print formatted source\n\
                 plc_st_ast *.st --json             # Print the syntax trees as JSON\n\
                 plc_st_ast *.st --debug            # Keep successful files when one fails\n\
                 plc_st_ast main.st -vv             # Debug logging"
)]
struct Cli {
    /// Structured Text files to parse
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Keep the results of successful files even if another file failed
    #[arg(long)]
    debug: bool,

    /// Print the syntax tree as JSON instead of formatted source
    #[arg(long)]
    json: bool,

    /// Settings JSON file
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings, Error> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings_from_text(&text)
}

fn report_failures(result: &BatchResult) {
    for (entry, err) in result.failures() {
        eprintln!(
            "{} {} [{}]",
            "error:".red().bold(),
            entry.filename.bold(),
            err.kind().yellow()
        );
        eprintln!("  {err}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = match load_settings(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::from(2);
        }
    };
    settings.keep_partial |= cli.debug;
    let keep_partial = settings.keep_partial;

    let mut items = Vec::with_capacity(cli.files.len());
    let mut unreadable = Vec::new();
    for path in &cli.files {
        let filename = path.display().to_string();
        match fs::read_to_string(path) {
            Ok(text) => items.push(SourceItem::new(filename.clone(), filename, text)),
            Err(source) => unreadable.push((
                filename,
                Error::Io {
                    path: path.clone(),
                    source,
                },
            )),
        }
    }

    let parser = SourceParser::new(settings);
    let mut result = parse_batch(&parser, items);
    for (filename, err) in unreadable {
        result.push_failure(filename.clone(), filename, err);
    }
    report_failures(&result);
    let failed = !result.success;

    if let Some(sources) = result.into_sources(keep_partial) {
        for (name, code) in sources {
            if cli.json {
                match serde_json::to_string_pretty(&code) {
                    Ok(json) => println!("{json}"),
                    Err(err) => eprintln!("{} {name}: {err}", "error:".red().bold()),
                }
            } else {
                if cli.files.len() > 1 {
                    println!("{}", format!("(* {name} *)").dimmed());
                }
                println!("{code}");
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
