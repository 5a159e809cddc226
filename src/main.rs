use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use log::{debug, LevelFilter};

use object_tracker::cli::{handle_config, handle_init, handle_run, RunArgs};
use object_tracker::config::{TrackerPaths, TrackerSettings};

#[derive(Parser)]
#[command(
    name = "object-tracker",
    version,
    about = "Record and replay attribute changes",
    long_about = "object-tracker applies a script of attribute assignments to a \
                  tracked object and prints the resulting change log: what \
                  changed, from what, to what, and from where."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a mutation script and print the change log
    Run(RunArgs),

    /// Write default settings to the config directory
    Init {
        /// Overwrite existing settings
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration and paths
    Config,
}

fn init_logging(verbose: u8) {
    // RUST_LOG env var takes precedence, otherwise use the -v count
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        });
    }

    builder
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = TrackerPaths::new()?;
    debug!("Using config directory {}", paths.base_dir().display());

    // Init must not read the settings file; it is the way to replace a broken one
    match cli.command {
        Some(Commands::Run(args)) => {
            let settings = TrackerSettings::load_or_default(&paths.settings_file())?;
            handle_run(args, &settings)?;
        }
        Some(Commands::Init { force }) => {
            handle_init(&paths, force)?;
        }
        Some(Commands::Config) => {
            let settings = TrackerSettings::load_or_default(&paths.settings_file())?;
            handle_config(&paths, &settings)?;
        }
        None => {
            println!("object-tracker - Record and replay attribute changes");
            println!();
            println!("Run 'object-tracker --help' for usage information.");
            println!("Run 'object-tracker run <SCRIPT>' to replay a mutation script.");
        }
    }

    Ok(())
}
