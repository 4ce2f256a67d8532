//! PixelClip - simulated video pixelation pipeline
//!
//! This crate provides the core data flow behind the PixelClip demo: a user
//! supplies a video file, picks a pixelation level, and receives a "processed"
//! clip for preview and download. The processing stage is an explicit
//! simulation that returns the payload unchanged after a level-scaled delay;
//! the `Processor` trait is the seam where a real backend would be plugged in.

pub mod cli;
pub mod codec;
pub mod handle;
pub mod processor;
pub mod session;

pub use cli::Cli;
pub use codec::{decode, encode, mime_category, MediaPayload};
pub use handle::{HandleRegistry, TransientHandle};
pub use processor::{
    PixelationLevel, ProcessRequest, ProcessResponse, Processor, SimulatedProcessor,
};
pub use session::{ProcessOutcome, SessionController, SessionState};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
pub const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");

/// Inclusive lower bound for the pixelation level slider and schema
pub const MIN_PIXELATION_LEVEL: u8 = 2;

/// Inclusive upper bound for the pixelation level slider and schema
pub const MAX_PIXELATION_LEVEL: u8 = 50;

/// Download filenames keep at most this many characters of the original stem
pub const FILENAME_STEM_LIMIT: usize = 15;

/// Error types used throughout the application
#[derive(thiserror::Error, Debug)]
pub enum PixelClipError {
    #[error("Invalid file type: '{0}' is not a video MIME type")]
    InvalidFileType(String),

    #[error("Invalid pixelation level {0}: must be an integer between {MIN_PIXELATION_LEVEL} and {MAX_PIXELATION_LEVEL}")]
    InvalidParameter(i64),

    #[error("Malformed data URI: {0}")]
    MalformedRepresentation(String),

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("No video loaded")]
    NoMedia,

    #[error("A processing request is already in flight")]
    Busy,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, PixelClipError>;

/// Utility functions
pub mod utils {
    use super::FILENAME_STEM_LIMIT;

    /// Build the download name for a processed clip:
    /// `pixelated_<stem>_p<level>.<ext>` with the stem capped at
    /// [`FILENAME_STEM_LIMIT`] characters.
    pub fn download_filename(original_name: &str, level: u8) -> String {
        let (stem, ext) = split_name(original_name);
        let stem: String = stem.chars().take(FILENAME_STEM_LIMIT).collect();
        format!("pixelated_{}_p{}.{}", stem, level, ext)
    }

    /// Split a filename into stem and extension, with the same fallbacks the
    /// original UI used (`video` / `mp4`).
    pub fn split_name(name: &str) -> (&str, &str) {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !ext.is_empty() => {
                (if stem.is_empty() { "video" } else { stem }, ext)
            }
            _ if !name.is_empty() => (name, "mp4"),
            _ => ("video", "mp4"),
        }
    }

    /// Guess a MIME type from a file extension. Unknown extensions map to
    /// `application/octet-stream`, which the session controller rejects.
    pub fn guess_mime(extension: &str) -> &'static str {
        match extension.to_ascii_lowercase().as_str() {
            "mp4" => "video/mp4",
            "m4v" => "video/x-m4v",
            "webm" => "video/webm",
            "mov" => "video/quicktime",
            "mkv" => "video/x-matroska",
            "avi" => "video/x-msvideo",
            "ogv" => "video/ogg",
            _ => "application/octet-stream",
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        codec::{decode, encode, mime_category, MediaPayload},
        handle::{HandleRegistry, TransientHandle},
        processor::{
            PixelationLevel, ProcessRequest, ProcessResponse, Processor, SimulatedProcessor,
        },
        session::{ProcessOutcome, SessionController, SessionState},
        utils::*,
        Cli, PixelClipError, Result,
    };
}
