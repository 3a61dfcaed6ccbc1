use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};

use pbmt_cli::commands::{config_ops, decode_ops};
use pbmt_cli::trace_init::init_tracing;

#[derive(Parser)]
#[command(name = "pbmttool", about = "Phrase-based decoder diagnostics")]
struct Cli {
    /// Write JSON trace logs into this directory (needs the `trace` feature)
    #[arg(long, global = true, env = "PBMT_TRACE_DIR")]
    trace_dir: Option<String>,

    /// Also log per-hypothesis events (overridden by `PBMT_LOG`)
    #[arg(long, global = true)]
    trace_verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the embedded default settings TOML
    SettingsExport,
    /// Validate a settings TOML file
    SettingsValidate {
        /// Settings file to check
        file: String,
    },
    /// List every rule grounded in a sentence, by source span
    Rules {
        /// Rule table (`src ||| tgt ||| scores [||| alignment]`)
        table: String,
        /// Source sentence tokens
        #[arg(required = true)]
        sentence: Vec<String>,
        /// Settings file (defaults to the embedded settings)
        #[arg(long)]
        config: Option<String>,
    },
    /// Greedily build one derivation and print it
    Trace {
        /// Rule table (`src ||| tgt ||| scores [||| alignment]`)
        table: String,
        /// Source sentence tokens
        #[arg(required = true)]
        sentence: Vec<String>,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Show the segmentation
        #[arg(short, long)]
        verbose: bool,
        /// Delete unknown non-ASCII, non-numeric tokens instead of copying them
        #[arg(long)]
        drop_unknown: bool,
        /// Settings file (defaults to the embedded settings)
        #[arg(long)]
        config: Option<String>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::SettingsExport => "settings-export",
            Command::SettingsValidate { .. } => "settings-validate",
            Command::Rules { .. } => "rules",
            Command::Trace { .. } => "trace",
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let _trace = cli.trace_dir.as_deref().map(|dir| {
        init_tracing(Path::new(dir), cli.command.name(), cli.trace_verbose).unwrap_or_else(|e| {
            eprintln!("Error: cannot write trace log in {dir}: {e}");
            process::exit(1);
        })
    });

    match cli.command {
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
        Command::Rules {
            table,
            sentence,
            config,
        } => decode_ops::rules_cmd(&table, &sentence, config.as_deref()),
        Command::Trace {
            table,
            sentence,
            json,
            verbose,
            drop_unknown,
            config,
        } => decode_ops::trace_cmd(
            &table,
            &sentence,
            json,
            verbose,
            drop_unknown,
            config.as_deref(),
        ),
    }
}
