//! Reading text and chart data out of images.

use crate::chat::ChatResponse;
use crate::config::ProviderConfig;
use crate::http::HttpClient;
use base64::Engine;
use slidekit_core::{Error, Result};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

/// Instruction given to the vision model for chart images.
pub const CHART_TABLE_PROMPT: &str =
    "Generate underlying data table of the table/chart/figure below:";

/// Extracts text from raw image bytes.
pub trait ImageTextExtractor {
    fn extract_text(&self, image: &[u8]) -> Result<String>;
}

impl<T: ImageTextExtractor + ?Sized> ImageTextExtractor for &T {
    fn extract_text(&self, image: &[u8]) -> Result<String> {
        (**self).extract_text(image)
    }
}

impl<T: ImageTextExtractor + ?Sized> ImageTextExtractor for Box<T> {
    fn extract_text(&self, image: &[u8]) -> Result<String> {
        (**self).extract_text(image)
    }
}

/// OCR through the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
    language: String,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: "eng".to_string(),
        }
    }
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable, e.g. an absolute path on Windows.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Tesseract language code, `eng` by default.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Check that the executable can be run.
    pub fn check_installed(&self) -> Result<()> {
        match Command::new(&self.command).arg("--version").output() {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(Error::DependencyMissing(format!(
                "'{} --version' exited with {}",
                self.command, output.status
            ))),
            Err(e) => Err(self.missing(e)),
        }
    }

    fn missing(&self, e: std::io::Error) -> Error {
        if e.kind() == ErrorKind::NotFound {
            Error::DependencyMissing(format!(
                "'{}' not found - install tesseract-ocr or pass its path",
                self.command
            ))
        } else {
            Error::DependencyMissing(format!("Failed to run '{}': {}", self.command, e))
        }
    }
}

impl ImageTextExtractor for TesseractOcr {
    fn extract_text(&self, image: &[u8]) -> Result<String> {
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.missing(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(image)?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Extraction {
                slide: 0,
                message: format!("tesseract failed: {}", stderr.trim()),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        log::debug!("OCR recognized {} chars from {} byte image", text.len(), image.len());
        Ok(text)
    }
}

/// Recovers a chart's data table from its image with a vision chat model.
#[derive(Debug, Clone)]
pub struct VisionChartExtractor {
    http: HttpClient,
    model: String,
    max_tokens: u32,
}

impl VisionChartExtractor {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
            model: config.vision_model.clone(),
            max_tokens: config.max_output_tokens,
        })
    }

    fn request_body(&self, image: &[u8]) -> serde_json::Value {
        let data_url = format!(
            "data:{};base64,{}",
            sniff_mime(image),
            base64::engine::general_purpose::STANDARD.encode(image)
        );
        serde_json::json!({
            "model": self.model,
            "temperature": 0.0,
            "max_tokens": self.max_tokens,
            "stream": false,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": CHART_TABLE_PROMPT},
                    {"type": "image_url", "image_url": {"url": data_url}},
                ],
            }],
        })
    }
}

impl ImageTextExtractor for VisionChartExtractor {
    fn extract_text(&self, image: &[u8]) -> Result<String> {
        let response: ChatResponse = self
            .http
            .post_json("chat/completions", &self.request_body(image))?;
        Ok(response.into_text()?.trim().to_string())
    }
}

/// Build the extractor for a configured engine name.
///
/// `chart_from_image` selects the vision chart reader regardless of the OCR
/// engine. The tesseract engine is checked up front so a missing install
/// surfaces before any slide is processed.
pub fn image_extractor(
    engine: &str,
    chart_from_image: bool,
    config: &ProviderConfig,
) -> Result<Box<dyn ImageTextExtractor>> {
    if chart_from_image {
        return Ok(Box::new(VisionChartExtractor::new(config)?));
    }

    match engine.to_ascii_lowercase().as_str() {
        "tesseract" => {
            let ocr = TesseractOcr::new();
            ocr.check_installed()?;
            Ok(Box::new(ocr))
        }
        other => Err(Error::DependencyMissing(format!(
            "Unknown OCR engine '{}'",
            other
        ))),
    }
}

/// MIME type from an image's magic bytes, PNG when unknown.
fn sniff_mime(image: &[u8]) -> &'static str {
    if image.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if image.starts_with(b"GIF8") {
        "image/gif"
    } else if image.starts_with(b"BM") {
        "image/bmp"
    } else if image.starts_with(&[0x49, 0x49, 0x2A, 0x00])
        || image.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        "image/tiff"
    } else {
        "image/png"
    }
}
