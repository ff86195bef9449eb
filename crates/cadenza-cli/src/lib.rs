//! # Cadenza CLI
//!
//! Command-line interface for the Cadenza audio runtime.
//!
//! ## Commands
//! - `probe` - Resolve sound names to files
//! - `decode` - Decode sounds on the headless device
//! - `ambient` - Drive ambient slots and print the slot table

use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use cadenza_audio::{AudioConfig, AudioSystem};
use cadenza_platform::HeadlessBackend;
use clap::{Parser, Subcommand};

/// Cadenza audio runtime CLI
#[derive(Parser)]
#[command(name = "cadenza")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON audio configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve sound names to files
    Probe {
        /// Sound directory
        root: PathBuf,

        /// Sound names, without extension
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Decode sounds and report their PCM layout
    Decode {
        /// Sound directory
        root: PathBuf,

        /// Sound names, without extension
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Assign ambient sounds to slots
    Ambient {
        /// Sound directory
        root: PathBuf,

        /// Assignments as slot=sound, applied in order
        #[arg(required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,

        /// Start each assigned sound
        #[arg(long)]
        autoplay: bool,
    },
}

/// Parse a `slot=sound` pair. The sound may be empty.
fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((slot, sound)) if !slot.is_empty() => Ok((slot.to_string(), sound.to_string())),
        _ => Err(format!("expected slot=sound, got '{}'", arg)),
    }
}

fn load_config(path: Option<&Path>) -> Result<AudioConfig> {
    match path {
        Some(path) => AudioConfig::load(path)
            .with_context(|| format!("Failed to load audio config {}", path.display())),
        None => Ok(AudioConfig::default()),
    }
}

fn headless_system(config: AudioConfig, root: &Path) -> AudioSystem {
    let backend = Rc::new(HeadlessBackend::new());
    AudioSystem::new(backend, config.with_sound_path(root))
}

/// Run a command and return its report
pub fn run(cli: &Cli) -> Result<String> {
    let config = load_config(cli.config.as_deref())?;
    let mut out = String::new();

    match &cli.command {
        Commands::Probe { root, names } => {
            let system = headless_system(config, root);
            for name in names {
                match system.find_sound_file(name) {
                    Some((path, format)) => writeln!(out, "{}: {} ({})", name, path.display(), format)?,
                    None => writeln!(out, "{}: not found", name)?,
                }
            }
        }

        Commands::Decode { root, names } => {
            let mut system = headless_system(config, root);
            for name in names {
                match system.load_sound(name) {
                    Some(buffer) => writeln!(
                        out,
                        "{}: {:?}, {} Hz, {} bytes, {:.3}s",
                        name,
                        buffer.format(),
                        buffer.sample_rate(),
                        buffer.pcm_bytes().len(),
                        buffer.duration_secs()
                    )?,
                    None => writeln!(out, "{}: could not be loaded", name)?,
                }
            }
            log::info!(
                "Decoded {} sounds, {} bytes",
                system.cache().decode_count(),
                system.cache().decoded_bytes()
            );
        }

        Commands::Ambient {
            root,
            assignments,
            autoplay,
        } => {
            let mut system = headless_system(config, root);
            let mut slots: Vec<&str> = Vec::new();
            for (slot, sound) in assignments {
                system.set_ambient(slot, sound, *autoplay);
                if !slots.contains(&slot.as_str()) {
                    slots.push(slot);
                }
            }

            for slot in slots {
                let name = system.slot_sound_name(slot).unwrap_or_default();
                let playing = system
                    .ambient_in_slot(slot)
                    .is_some_and(|ambient| ambient.is_playing());
                let name = if name.is_empty() { "<placeholder>" } else { name };
                let state = if playing { "playing" } else { "stopped" };
                writeln!(out, "{}: {} ({})", slot, name, state)?;
            }
        }
    }

    Ok(out)
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let report = run(&cli)?;
    print!("{}", report);
    Ok(())
}
