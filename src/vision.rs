//! Vision enrichment adapter: attaches AI-generated descriptions to
//! extracted images. The core only depends on the narrow `VisionAdapter`
//! contract; the provided client posts to the Anthropic Messages API
//! through a blocking HTTP call with a bounded timeout and at most one
//! retry on transient failure. Failures here are always soft.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use serde_json::{Value, json};
use std::time::Duration;

/// Images above this ceiling are compressed before upload (5 MB).
pub const MAX_IMAGE_SIZE_BYTES: usize = 5 * 1024 * 1024;

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const JPEG_QUALITY_STEPS: [u8; 4] = [85, 70, 50, 30];

const DEFAULT_PROMPT: &str = "Analyze this image and provide a detailed description. Include:\n\
1. What type of image this is (photo, chart, diagram, etc.)\n\
2. The main content and key elements\n\
3. Any text visible in the image\n\
4. If it's a chart/graph: the type, data trends, and key insights\n\
5. If it's a diagram: the structure and relationships shown\n\n\
Provide a clear, concise description suitable for accessibility purposes.";

const CHART_PROMPT: &str = "Analyze this chart and provide:\n\n\
1. **Chart Type**: What kind of visualization is this?\n\
2. **Title/Labels**: What is the chart titled? What are the axis labels?\n\
3. **Data Summary**: Summarize the key data points or values shown\n\
4. **Trends**: What trends or patterns are visible?\n\
5. **Key Insights**: What are the main takeaways from this chart?\n\n\
Be specific about any numbers, percentages, or values you can discern.";

const ACCESSIBILITY_PROMPT: &str = "Provide a concise accessibility description for this image \
suitable for alt-text. Keep it under 150 words, focus on the most important visual information.";

/// Result of one vision analysis call.
#[derive(Debug, Clone, Default)]
pub struct VisionAnalysis {
    pub success: bool,
    pub description: Option<String>,
    pub model: Option<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub error: Option<String>,
}

impl VisionAnalysis {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Narrow contract the pipeline consumes for image enrichment.
pub trait VisionAdapter {
    fn analyze(&self, image: &[u8], content_type: &str, prompt: Option<&str>) -> VisionAnalysis;

    /// Specialized analysis for charts and graphs.
    fn analyze_chart(&self, image: &[u8], content_type: &str) -> VisionAnalysis {
        self.analyze(image, content_type, Some(CHART_PROMPT))
    }

    /// Alt-text style description with a fixed fallback.
    fn describe_for_accessibility(&self, image: &[u8], content_type: &str) -> String {
        let result = self.analyze(image, content_type, Some(ACCESSIBILITY_PROMPT));
        if result.success {
            result.description.unwrap_or_else(|| "Image".to_owned())
        } else {
            "Image (description unavailable)".to_owned()
        }
    }
}

/// Anthropic Messages API client.
pub struct ClaudeVision {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    max_image_bytes: usize,
    client: reqwest::blocking::Client,
}

impl ClaudeVision {
    pub fn new(api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        Self::build(if key.is_empty() { None } else { Some(key) })
    }

    /// Read the API key from `ANTHROPIC_API_KEY`. A missing key yields a
    /// client whose calls fail softly without touching the network.
    pub fn from_env() -> Self {
        let key = std::env::var("ANTHROPIC_API_KEY").ok().filter(|key| !key.is_empty());
        if key.is_none() {
            log::warn!("no Anthropic API key configured; vision enrichment is disabled");
        }
        Self::build(key)
    }

    fn build(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_owned(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            max_image_bytes: MAX_IMAGE_SIZE_BYTES,
            client: reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn post_once(&self, api_key: &str, body: &Value) -> Result<VisionAnalysis, (bool, String)> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(body)
            .send()
            .map_err(|error| (error.is_timeout() || error.is_connect(), error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let transient = status.as_u16() == 429 || status.is_server_error();
            let detail = response.text().unwrap_or_default();
            return Err((transient, format!("vision API error ({status}): {detail}")));
        }

        let payload: Value = response
            .json()
            .map_err(|error| (false, format!("invalid vision API response: {error}")))?;
        let description = payload
            .pointer("/content/0/text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_owned();

        Ok(VisionAnalysis {
            success: true,
            description: Some(description),
            model: Some(self.model.clone()),
            input_tokens: payload
                .pointer("/usage/input_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            output_tokens: payload
                .pointer("/usage/output_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            error: None,
        })
    }
}

impl VisionAdapter for ClaudeVision {
    fn analyze(&self, image: &[u8], content_type: &str, prompt: Option<&str>) -> VisionAnalysis {
        let Some(api_key) = self.api_key.as_deref() else {
            return VisionAnalysis::failure("vision service not configured (missing API key)");
        };

        let (payload, media_type) = compress_if_needed(image, content_type, self.max_image_bytes);
        let body = json!({
            "model": self.model,
            "max_tokens": 1024,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": media_type,
                            "data": STANDARD.encode(&payload),
                        },
                    },
                    {"type": "text", "text": prompt.unwrap_or(DEFAULT_PROMPT)},
                ],
            }],
        });

        // At most one retry, and only on transient failures.
        let mut last_error = String::new();
        for attempt in 0..2 {
            match self.post_once(api_key, &body) {
                Ok(result) => return result,
                Err((transient, error)) => {
                    log::warn!("vision request attempt {} failed: {error}", attempt + 1);
                    last_error = error;
                    if !transient {
                        break;
                    }
                }
            }
        }
        VisionAnalysis::failure(last_error)
    }
}

/// Compress an oversized image: progressive JPEG quality reduction, then
/// dimensional downscaling if quality reduction alone is insufficient.
/// Compression failure is non-fatal and returns the original bytes.
fn compress_if_needed<'a>(
    image: &'a [u8],
    content_type: &'a str,
    ceiling: usize,
) -> (std::borrow::Cow<'a, [u8]>, &'a str) {
    use std::borrow::Cow;

    if image.len() <= ceiling {
        return (Cow::Borrowed(image), content_type);
    }

    log::info!("compressing image of {} bytes", image.len());
    match compress(image, ceiling) {
        Ok(compressed) => (Cow::Owned(compressed), "image/jpeg"),
        Err(error) => {
            log::warn!("image compression failed, sending original bytes: {error}");
            (Cow::Borrowed(image), content_type)
        }
    }
}

fn compress(image: &[u8], ceiling: usize) -> Result<Vec<u8>, String> {
    let decoded = image::load_from_memory(image)
        .map_err(|error| format!("failed to decode image: {error}"))?;
    let rgb = decoded.to_rgb8();

    for quality in JPEG_QUALITY_STEPS {
        let encoded = encode_jpeg(&rgb, quality)?;
        if encoded.len() <= ceiling {
            log::info!("compressed to {} bytes at quality {quality}", encoded.len());
            return Ok(encoded);
        }
    }

    let ratio = (ceiling as f64 / image.len() as f64).sqrt();
    let width = ((rgb.width() as f64 * ratio) as u32).max(1);
    let height = ((rgb.height() as f64 * ratio) as u32).max(1);
    let resized = image::DynamicImage::ImageRgb8(rgb)
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgb8();

    let encoded = encode_jpeg(&resized, 50)?;
    log::info!("resized and compressed to {} bytes", encoded.len());
    Ok(encoded)
}

fn encode_jpeg(image: &image::RgbImage, quality: u8) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    image
        .write_with_encoder(encoder)
        .map_err(|error| format!("failed to encode jpeg at quality {quality}: {error}"))?;
    Ok(buffer)
}
