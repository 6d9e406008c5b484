mod config;
mod personalization;

use crate::config::Config;
use crate::personalization::Personalization;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use voice_agent_core::{AudioDevice, CaptureLoop, Console, Conversation, Output};
use voice_agent_native_utils::{DeviceSelection, NativeAudio};

#[derive(Parser)]
#[command(version, about = "Talk to a realtime assistant that can manage files and open URLs")]
struct Cli {
    /// Name of the microphone to use. Defaults to the host default.
    #[arg(long)]
    input_device: Option<String>,
    /// Name of the speaker to use. Defaults to the host default.
    #[arg(long)]
    output_device: Option<String>,
    /// Print the available audio devices and exit.
    #[arg(long)]
    list_devices: bool,
    /// Personalization file, overriding PERSONALIZATION_FILE.
    #[arg(long)]
    personalization: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if args.list_devices {
        println!("Input devices:");
        println!("{}", voice_agent_native_utils::device::get_available_inputs()?);
        println!("Output devices:");
        println!("{}", voice_agent_native_utils::device::get_available_outputs()?);
        return Ok(());
    }

    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    tracing::info!("Configuration loaded successfully. Starting voice agent...");

    let personalization_file = args
        .personalization
        .unwrap_or_else(|| config.personalization_file.clone());
    let personalization = Personalization::load(&personalization_file)
        .context("Failed to load personalization")?;

    // --- 3. Tools, audio and the session ---
    let tools = Arc::new(voice_agent_tools::registry(&config.scratch_pad_dir));
    tracing::info!("Registered tools: {}", tools.names().join(", "));

    let device: Arc<dyn AudioDevice> = Arc::new(
        NativeAudio::open(DeviceSelection {
            input: args.input_device,
            output: args.output_device,
        })
        .context("Failed to open audio devices")?,
    );

    let client = Arc::new(
        openai_realtime::connect_with_config(
            config.realtime(),
            &personalization.instructions(),
            tools.list(),
        )
        .await
        .context("Failed to connect to the realtime API")?,
    );
    tracing::info!("Session established");

    // --- 4. Run ---
    let (output_tx, mut output_rx) = mpsc::unbounded_channel::<Output>();
    let assistant = personalization.ai_assistant_name.clone();
    let printer = tokio::spawn(async move {
        let mut console = Console::new(&assistant, std::io::stdout());
        while let Some(output) = output_rx.recv().await {
            if let Err(e) = console.render(&output) {
                tracing::warn!("Failed to write output: {}", e);
            }
        }
    });

    let mut conversation =
        Conversation::new(client.clone(), device.clone(), tools).with_output(output_tx);
    conversation.start();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let capture = tokio::spawn(
        CaptureLoop::new(client.clone(), device.clone(), conversation.mode()).run(shutdown_rx),
    );

    let interrupt = {
        let client = client.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Interrupted, shutting down...");
                    client.close();
                }
                Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
            }
        })
    };

    let result = conversation.run().await;
    interrupt.abort();

    // --- 5. Shutdown ---
    let _ = shutdown_tx.send(true);
    device.stop_recording();
    match capture.await {
        Ok(Ok(chunks)) => tracing::info!("Capture loop finished after {} chunks", chunks),
        Ok(Err(e)) => tracing::warn!("Capture loop failed: {}", e),
        Err(e) => tracing::error!("Capture task panicked: {}", e),
    }
    device.close();
    client.close();

    drop(conversation);
    if printer.await.is_err() {
        tracing::error!("Output task panicked");
    }

    let stats = client.stats();
    tracing::info!(
        "Session stats: {} responses, {} tokens ({} input, {} output), {} audio chunks sent",
        stats.responses(),
        stats.total_tokens(),
        stats.input_tokens(),
        stats.output_tokens(),
        stats.audio_appends()
    );

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_connection_lost() => {
            tracing::info!("Session ended: {}", e);
            Ok(())
        }
        Err(e) => Err(e).context("Conversation failed"),
    }
}
