//! Command-line entry point.

use clap::{Parser, Subcommand};
use pitchboard_app::{AppResult, list, load_config, parse_pitch, render, rescale, save};
use pitchboard_core::pitch::PitchSpec;
use pitchboard_core::storage::FileStorage;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "pitchboard", about = "Render, rescale and save tactical pitch diagrams")]
struct Cli {
    /// Editor config file (defaults to <config dir>/pitchboard/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a diagram document to PNG.
    Render {
        input: PathBuf,
        output: PathBuf,
        /// Pitch layout as `<type>[:<orientation>]`.
        #[arg(long, default_value = "full", value_parser = parse_pitch)]
        pitch: PitchSpec,
        /// Device pixels per canvas unit; the config value when omitted.
        #[arg(long)]
        pixel_ratio: Option<f64>,
    },
    /// Move a diagram from one pitch layout to another.
    Rescale {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_parser = parse_pitch)]
        from: PitchSpec,
        #[arg(long, value_parser = parse_pitch)]
        to: PitchSpec,
    },
    /// Store a diagram and its preview image.
    Save {
        input: PathBuf,
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "full", value_parser = parse_pitch)]
        pitch: PitchSpec,
        /// Storage directory (defaults to the user data directory).
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// List stored diagrams.
    List {
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

fn open_store(dir: Option<&Path>) -> AppResult<FileStorage> {
    Ok(match dir {
        Some(dir) => FileStorage::new(dir.to_path_buf())?,
        None => FileStorage::default_location()?,
    })
}

fn run(cli: Cli) -> AppResult<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Render {
            input,
            output,
            pitch,
            pixel_ratio,
        } => {
            let outcome = render(&input, &output, pitch, pixel_ratio, config)?;
            println!("{} ({outcome:?})", output.display());
        }
        Command::Rescale {
            input,
            output,
            from,
            to,
        } => {
            let moved = rescale(&input, &output, from, to, config)?;
            println!("{moved} objects moved from {from} to {to}");
        }
        Command::Save {
            input,
            id,
            pitch,
            store,
        } => {
            let store = open_store(store.as_deref())?;
            let url = save(&input, &store, &id, pitch, config)?;
            println!("{id}: {url}");
        }
        Command::List { store } => {
            let store = open_store(store.as_deref())?;
            for (id, preview) in list(&store)? {
                println!("{id}\t{}", preview.as_deref().unwrap_or("-"));
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Pitchboard");

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
