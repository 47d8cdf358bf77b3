use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use maitri_gateway::command::CommandGrammar;
use maitri_gateway::media::{AudioTrack, HostMediaBackend, MicrophoneTrack, samples_to_wav};
use maitri_gateway::voice::{UnsupportedRecognition, UnsupportedSynthesis};
use maitri_gateway::wellness::UnavailableModelRuntime;
use maitri_gateway::{Config, Daemon};

/// MAITRI - multimodal assistant gateway for an isolated operator
#[derive(Parser)]
#[command(name = "maitri", version, about)]
struct Cli {
    /// Path to a config file (defaults to ~/.maitri/config.toml)
    #[arg(short, long, env = "MAITRI_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,

        /// Write the captured audio to a WAV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a transcript against the command grammar
    Parse {
        /// Transcript to parse
        transcript: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,maitri_gateway=info",
        1 => "info,maitri_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration, output } => test_mic(duration, output).await,
            Command::Parse { transcript } => cmd_parse(&transcript),
        };
    }

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    tracing::debug!(?config, "loaded configuration");

    tracing::info!("starting maitri gateway");

    // Platform seams: this host ships microphone capture only; speech
    // engines and the landmark runtime are platform integrations injected
    // by embedders.
    let daemon = Daemon::new(
        config,
        Arc::new(UnsupportedRecognition),
        Arc::new(UnsupportedSynthesis),
        Arc::new(HostMediaBackend),
        Arc::new(UnavailableModelRuntime),
    );

    // Run until interrupted
    daemon.run().await?;

    Ok(())
}

/// Test microphone input
async fn test_mic(duration: u64, output: Option<PathBuf>) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let track = MicrophoneTrack::open()?;

    let sample_rate = track.sample_rate();
    println!("Sample rate: {sample_rate} Hz");
    println!("---");

    let mut recorded: Vec<f32> = Vec::new();

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = track.read_samples();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );

        recorded.extend_from_slice(&samples);
    }

    track.stop();

    if let Some(path) = output {
        let wav = samples_to_wav(&recorded, sample_rate)?;
        std::fs::write(&path, wav)?;
        println!("\nWrote {} samples to {}", recorded.len(), path.display());
    }

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Check a transcript against the command grammar
fn cmd_parse(transcript: &str) -> anyhow::Result<()> {
    let grammar = CommandGrammar::default();
    match grammar.parse(transcript) {
        Some(command) => println!("matched: {command}"),
        None => println!("no match (hotword is \"{}\")", grammar.hotword()),
    }
    Ok(())
}
