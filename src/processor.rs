use crate::{PixelClipError, Result, MAX_PIXELATION_LEVEL, MIN_PIXELATION_LEVEL};
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A validated pixelation level in `[MIN_PIXELATION_LEVEL, MAX_PIXELATION_LEVEL]`.
///
/// Both the slider bounds and the request schema enforce the same range, so
/// a level that exists is always dispatchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PixelationLevel(u8);

impl PixelationLevel {
    /// Validate and wrap a level. Fails with `InvalidParameter` outside
    /// the inclusive range.
    pub fn new(level: i64) -> Result<Self> {
        if (MIN_PIXELATION_LEVEL as i64..=MAX_PIXELATION_LEVEL as i64).contains(&level) {
            Ok(Self(level as u8))
        } else {
            Err(PixelClipError::InvalidParameter(level))
        }
    }

    /// The raw level value
    pub fn get(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for PixelationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request shape at the processing boundary. Field names match the original
/// JSON schema so a replacement backend can consume the same wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    /// The video file as a data URI (`data:<mimetype>;base64,<encoded-data>`)
    pub video_data_uri: String,
    /// Pixelation level, an integer from 2 to 50
    pub pixelation_level: i64,
}

/// Response shape at the processing boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    /// The processed video as a data URI
    pub processed_video_data_uri: String,
}

/// The processing backend seam.
///
/// The canonical implementation is [`SimulatedProcessor`]; a real
/// transformation backend swaps the body and keeps the signature and error
/// taxonomy.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, request: ProcessRequest) -> Result<ProcessResponse>;
}

/// Simulated processing backend.
///
/// Validates the level, sleeps for a duration that grows with the level, and
/// returns the input URI unchanged. No pixelation, color change, or pixel-art
/// conversion takes place.
pub struct SimulatedProcessor {
    base_delay: Duration,
    per_level_delay: Duration,
    api_key: Option<String>,
}

impl SimulatedProcessor {
    /// Create a processor with the default latency curve (500ms + 50ms/level)
    pub fn new() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            per_level_delay: Duration::from_millis(50),
            api_key: None,
        }
    }

    /// Override the latency curve. `Duration::ZERO` for both disables the
    /// simulated delay entirely.
    pub fn with_latency(mut self, base: Duration, per_level: Duration) -> Self {
        self.base_delay = base;
        self.per_level_delay = per_level;
        self
    }

    /// Attach an opaque backend credential. The simulation never reads it;
    /// it is carried only so a real backend can be dropped in without a
    /// constructor change.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Whether a backend credential was supplied
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Simulated latency for a given level. Monotonically increasing.
    pub fn delay_for(&self, level: PixelationLevel) -> Duration {
        self.base_delay + self.per_level_delay * level.get() as u32
    }
}

impl Default for SimulatedProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Processor for SimulatedProcessor {
    async fn process(&self, request: ProcessRequest) -> Result<ProcessResponse> {
        let level = PixelationLevel::new(request.pixelation_level)?;

        info!(">>> simulating video processing at level {} <<<", level);
        debug!(
            "Simulated latency: {:?} (input URI {} chars)",
            self.delay_for(level),
            request.video_data_uri.len()
        );

        tokio::time::sleep(self.delay_for(level)).await;

        // The simulation returns the original URI as the processed one.
        Ok(ProcessResponse {
            processed_video_data_uri: request.video_data_uri,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> SimulatedProcessor {
        SimulatedProcessor::new().with_latency(Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn test_level_bounds() {
        assert!(PixelationLevel::new(1).is_err());
        assert!(PixelationLevel::new(51).is_err());
        assert_eq!(PixelationLevel::new(2).unwrap().get(), 2);
        assert_eq!(PixelationLevel::new(50).unwrap().get(), 50);
    }

    #[test]
    fn test_level_error_carries_value() {
        match PixelationLevel::new(51) {
            Err(PixelClipError::InvalidParameter(level)) => assert_eq!(level, 51),
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_delay_monotonic() {
        let processor = SimulatedProcessor::new();
        let low = processor.delay_for(PixelationLevel::new(2).unwrap());
        let mid = processor.delay_for(PixelationLevel::new(10).unwrap());
        let high = processor.delay_for(PixelationLevel::new(50).unwrap());
        assert!(low < mid);
        assert!(mid < high);
    }

    #[test]
    fn test_default_latency_curve() {
        let processor = SimulatedProcessor::new();
        let delay = processor.delay_for(PixelationLevel::new(10).unwrap());
        assert_eq!(delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_wire_format() {
        let request = ProcessRequest {
            video_data_uri: "data:video/mp4;base64,AAAA".to_string(),
            pixelation_level: 10,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("videoDataUri").is_some());
        assert!(json.get("pixelationLevel").is_some());

        let response = ProcessResponse {
            processed_video_data_uri: "data:video/mp4;base64,AAAA".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("processedVideoDataUri").is_some());
    }

    #[tokio::test]
    async fn test_simulation_returns_input_unchanged() {
        let processor = fast();
        let uri = "data:video/mp4;base64,aGVsbG8=".to_string();
        let response = processor
            .process(ProcessRequest {
                video_data_uri: uri.clone(),
                pixelation_level: 10,
            })
            .await
            .unwrap();
        assert_eq!(response.processed_video_data_uri, uri);
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_level() {
        let processor = fast();
        let request = ProcessRequest {
            video_data_uri: "data:video/mp4;base64,".to_string(),
            pixelation_level: 1,
        };
        assert!(matches!(
            processor.process(request).await,
            Err(PixelClipError::InvalidParameter(1))
        ));

        let request = ProcessRequest {
            video_data_uri: "data:video/mp4;base64,".to_string(),
            pixelation_level: 51,
        };
        assert!(matches!(
            processor.process(request).await,
            Err(PixelClipError::InvalidParameter(51))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_scales_with_level() {
        let processor = SimulatedProcessor::new();
        let request = ProcessRequest {
            video_data_uri: "data:video/mp4;base64,".to_string(),
            pixelation_level: 10,
        };

        let start = tokio::time::Instant::now();
        processor.process(request).await.unwrap();
        // 500ms base + 50ms * 10
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[test]
    fn test_api_key_is_opaque() {
        let processor = fast().with_api_key("sk-not-a-real-key");
        assert!(processor.has_api_key());
        assert!(!fast().has_api_key());
    }
}
