use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info};
use pixelclip::{
    utils::download_filename, Cli, HandleRegistry, MediaPayload, PixelationLevel,
    SessionController, SimulatedProcessor,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Validate CLI arguments
    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    // Set up logging level
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    info!("Starting PixelClip v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {}", cli.file_path.display());

    let file_name = cli.file_name();
    let mime = cli.guessed_mime();

    if cli.info_only {
        let level = PixelationLevel::new(cli.level)?;
        println!("Processing plan:");
        println!("  File: {}", cli.file_path.display());
        println!("  MIME type: {}", mime);
        println!("  Pixelation level: {}", level);
        println!("  Output: {}", download_filename(&file_name, level.get()));
        println!("  Note: processing is simulated; the clip is returned unchanged");
        return Ok(());
    }

    // Read the input file into a payload
    let bytes = std::fs::read(&cli.file_path)
        .with_context(|| format!("Failed to read {}", cli.file_path.display()))?;
    let payload = MediaPayload::new(bytes, mime);

    // Build the pipeline: registry, processor, session controller
    let registry = HandleRegistry::new();
    let mut processor = SimulatedProcessor::new();
    if let Some(key) = cli.api_key.as_deref() {
        info!("Backend API key supplied (unused by the simulation)");
        processor = processor.with_api_key(key);
    }
    let session = SessionController::new(Arc::new(processor), registry.clone());

    // Load the file into the session (rejects non-video MIME types)
    session.load_file(&file_name, payload)?;
    info!(
        "Session loaded, original handle: {}",
        session.original_url().unwrap_or_default()
    );

    // Run the simulated processing stage
    let level = PixelationLevel::new(cli.level)?;
    info!("Processing at level {} (simulated)...", level);
    session.process(level).await?;

    // Write the downloadable artifact
    let output_name = session
        .download_filename()
        .ok_or_else(|| anyhow!("No processed clip available"))?;
    let processed = session
        .processed_payload()
        .ok_or_else(|| anyhow!("No processed clip available"))?;

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("Failed to create {}", cli.output_dir.display()))?;
    let output_path = cli.output_dir.join(&output_name);
    std::fs::write(&output_path, processed.bytes())
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!("Wrote {}", output_path.display());

    // Cleanup
    session.teardown();
    info!("Session ended, {} handles live", registry.live_count());
    Ok(())
}
