#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for the hacking and shelter minigames.

mod hacking;
mod shelter;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use minigames_core::{Bounds, WELCOME_BANNER};
use minigames_world::CutPolicy;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Minigames - seeded, headless simulations of both games
#[derive(Parser, Debug)]
#[command(name = "minigames")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log filter applied when `RUST_LOG` is not set
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play an AI-versus-AI node-capture match
    Hacking {
        /// Seed of the world and both opponents
        #[arg(short, long, default_value_t = minigames_world::DEFAULT_SEED)]
        seed: u64,

        /// Simulated seconds before the match is abandoned
        #[arg(long, default_value_t = 180)]
        seconds: u64,

        /// Fixed frame step in milliseconds
        #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
        dt_ms: u64,

        /// Arena width in world units
        #[arg(long, default_value_t = 1_600.0)]
        width: f32,

        /// Arena height in world units
        #[arg(long, default_value_t = 1_000.0)]
        height: f32,

        /// Allow each side to cut the other's connections
        #[arg(long)]
        cut_any: bool,
    },

    /// Run the shelter through a number of days
    Shelter {
        /// Seed of the site layout and the waves
        #[arg(short, long, default_value_t = minigames_shelter::DEFAULT_SEED)]
        seed: u64,

        /// Days to simulate
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,

        /// Fixed frame step in milliseconds
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
        dt_ms: u64,

        /// Directory holding the save slots; nothing is saved without it
        #[arg(long)]
        save_dir: Option<PathBuf>,

        /// Slot written at the end of the run
        #[arg(long, default_value = "1")]
        slot: String,

        /// Resume from the slot before simulating
        #[arg(long, requires = "save_dir")]
        resume: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log))
        .with_context(|| format!("invalid log filter `{}`", args.log))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("{WELCOME_BANNER}");

    match args.command {
        Commands::Hacking {
            seed,
            seconds,
            dt_ms,
            width,
            height,
            cut_any,
        } => {
            let summary = hacking::run(&hacking::HackingOptions {
                seed,
                duration: Duration::from_secs(seconds),
                dt: Duration::from_millis(dt_ms),
                bounds: Bounds::new(width, height),
                cut_policy: if cut_any {
                    CutPolicy::AnyConnection
                } else {
                    CutPolicy::OwnConnections
                },
            });
            println!("{summary}");
        }
        Commands::Shelter {
            seed,
            days,
            dt_ms,
            save_dir,
            slot,
            resume,
        } => {
            let summary = shelter::run(&shelter::ShelterOptions {
                seed,
                days,
                dt: Duration::from_millis(dt_ms),
                save_dir,
                slot,
                resume,
            })
            .context("shelter run failed")?;
            println!("{summary}");
        }
    }

    Ok(())
}
