//! CLI for rendering compositions to WAV
//!
//! Usage:
//!   fourier-synth render <input.txt> [-o output.wav] [--config render.toml] [--bits 16|32]
//!   fourier-synth demo [-o demo.wav]
//!   fourier-synth pitches "c e g - c5" --octave 4
//!   fourier-synth instruments

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use fourier_synth::pipeline::parse_composition;
use fourier_synth::pitch::parse_sequence;
use fourier_synth::wav::{write_wav, BitDepth};
use fourier_synth::{render_composition, RenderConfig};
use tracing_subscriber::EnvFilter;

const DEMO: &str = include_str!("../demos/progression.txt");

#[derive(Parser)]
#[command(name = "fourier-synth", about = "Additive synthesis of notes, chords and arpeggios")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a composition file to WAV
    Render {
        /// Composition file
        input: PathBuf,

        /// Output WAV path (defaults to <input>.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML render configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// PCM bit depth, overrides the configuration
        #[arg(short, long)]
        bits: Option<u16>,
    },
    /// Render the bundled demo progression
    Demo {
        #[arg(short, long, default_value = "demo.wav")]
        output: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the frequencies of a pitch sequence
    Pitches {
        /// Pitches such as "c e g - c5"
        sequence: String,

        /// Octave for pitches written without one
        #[arg(short, long, default_value_t = 4)]
        octave: i32,
    },
    /// List the available instruments
    Instruments {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<RenderConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    })
}

fn render_to_file(
    text: &str,
    config: &RenderConfig,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let composition = parse_composition(text)?;
    let cues: usize = composition.sections.iter().map(|s| s.cues.len()).sum();
    println!(
        "Parsed {} section(s), {} cue(s)",
        composition.sections.len(),
        cues
    );

    println!("Configuration:");
    println!("  Sample rate: {} Hz", config.sample_rate);
    println!("  Instrument: {}", config.instrument);
    println!("  Bit depth: {}", config.bit_depth);
    println!();

    let track = render_composition(&composition, config)?;
    let depth = BitDepth::from_bits(config.bit_depth)
        .ok_or_else(|| format!("unsupported bit depth {}", config.bit_depth))?;
    write_wav(output, &track, config.sample_rate, depth)?;

    println!(
        "✓ Generated {} ({:.2}s)",
        output.display(),
        track.duration(config.sample_rate)
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            config,
            bits,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(bits) = bits {
                config.bit_depth = bits;
                config.validate()?;
            }
            let output = output.unwrap_or_else(|| input.with_extension("wav"));
            let text = std::fs::read_to_string(&input)
                .map_err(|e| format!("Error reading {}: {}", input.display(), e))?;
            render_to_file(&text, &config, &output)?;
        }
        Commands::Demo { output, config } => {
            let config = load_config(config.as_deref())?;
            render_to_file(DEMO, &config, &output)?;
        }
        Commands::Pitches { sequence, octave } => {
            let pitches = parse_sequence(&sequence, octave)?;
            let line: Vec<String> = pitches
                .iter()
                .map(|p| format!("{}", p.frequency()))
                .collect();
            println!("{}", line.join(" "));
        }
        Commands::Instruments { config } => {
            let config = load_config(config.as_deref())?;
            let table = config.timbre_table()?;
            for name in table.names() {
                let profile = table.get(&name)?;
                println!("{:<10} {} harmonic(s)", name, profile.len());
            }
        }
    }

    Ok(())
}
