mod config;
mod harness;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use codespan_reporting::term::termcolor::ColorChoice;
use log::LevelFilter;

use hvsc::Hvsc;
use stil::{ParseOptions, PreambleFields};

use crate::harness::{Harness, StilView, Test};

#[derive(Parser)]
#[command(name = "hvsc", version, about = "HVSC metadata test driver")]
struct Cli {
    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    /// More log output (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// HVSC root directory (overrides HVSC_ROOT and the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file to read `hvsc_root` from
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Test Songlengths.md5 support
    Sldb(SidArgs),

    /// Test STIL.txt support and dump the entry
    Stil(StilArgs),

    /// Test BUGlist.txt support
    Bugs(SidArgs),

    /// Test PSID/RSID header decoding
    Psid(SidArgs),

    /// Run every test
    All(StilArgs),
}

#[derive(clap::Args)]
struct SidArgs {
    /// SID file, absolute or relative to the HVSC root
    sid: PathBuf,
}

#[derive(clap::Args)]
struct StilArgs {
    /// SID file, absolute or relative to the HVSC root
    sid: PathBuf,

    /// Dump only this tune
    #[arg(long)]
    tune: Option<u32>,

    /// Dump the raw entry text before parsing
    #[arg(long)]
    raw: bool,

    /// Drop the first field before a tune marker, like older parsers
    #[arg(long)]
    legacy_preamble: bool,
}

impl StilArgs {
    fn view(&self) -> StilView {
        let preamble_fields = if self.legacy_preamble {
            PreambleFields::Drop
        } else {
            PreambleFields::Retain
        };
        StilView {
            tune: self.tune,
            raw: self.raw,
            options: ParseOptions { preamble_fields },
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let (tests, sid, view) = match &cli.command {
        Command::Sldb(args) => (vec![Test::Sldb], &args.sid, StilView::default()),
        Command::Stil(args) => (vec![Test::Stil], &args.sid, args.view()),
        Command::Bugs(args) => (vec![Test::Bugs], &args.sid, StilView::default()),
        Command::Psid(args) => (vec![Test::Psid], &args.sid, StilView::default()),
        Command::All(args) => (Test::ALL.to_vec(), &args.sid, args.view()),
    };

    let hvsc = if tests.iter().any(|t| t.needs_root()) {
        Some(open_collection(&cli))
    } else {
        None
    };

    let harness = Harness {
        hvsc,
        color_choice,
        view,
    };

    let mut failed = 0;
    for &test in &tests {
        if tests.len() > 1 {
            println!("\n== {} ==", test.name());
        }
        if harness.run(test, sid) {
            println!("<<OK>>");
        } else {
            println!("<<Fail>>");
            failed += 1;
        }
    }

    if failed > 0 {
        process::exit(1);
    }
}

fn open_collection(cli: &Cli) -> Hvsc {
    let root = match config::resolve_root(
        cli.root.as_deref(),
        std::env::var_os(config::ROOT_ENV),
        cli.config.as_deref(),
    ) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };

    match Hvsc::new(root) {
        Ok(hvsc) => {
            log::info!("HVSC root: {}", hvsc.root().display());
            hvsc
        }
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
