use crate::{MAX_PIXELATION_LEVEL, MIN_PIXELATION_LEVEL};
use clap::Parser;
use std::path::PathBuf;

/// Upload a video, pick a pixelation level, and get a simulated pixelated clip
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the video file to process
    #[arg(required = true)]
    pub file_path: PathBuf,

    /// Pixelation level (2-50)
    #[arg(short, long, default_value_t = 10)]
    pub level: i64,

    /// Directory to write the processed clip into
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Show what would be produced without processing
    #[arg(long)]
    pub info_only: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Backend API key (passed through opaquely; the simulation ignores it)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl Cli {
    /// Validate command line arguments
    pub fn validate(&self) -> Result<(), String> {
        if !self.file_path.exists() {
            return Err(format!(
                "Video file does not exist: {}",
                self.file_path.display()
            ));
        }

        if !(MIN_PIXELATION_LEVEL as i64..=MAX_PIXELATION_LEVEL as i64).contains(&self.level) {
            return Err(format!(
                "Pixelation level must be between {} and {}",
                MIN_PIXELATION_LEVEL, MAX_PIXELATION_LEVEL
            ));
        }

        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(format!(
                "Output path is not a directory: {}",
                self.output_dir.display()
            ));
        }

        Ok(())
    }

    /// Name of the input file, for session bookkeeping and the download name
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("video.mp4")
            .to_string()
    }

    /// MIME type guessed from the file extension
    pub fn guessed_mime(&self) -> &'static str {
        let extension = self
            .file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        crate::utils::guess_mime(extension)
    }
}
