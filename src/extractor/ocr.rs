// file: src/extractor/ocr.rs
// description: tesseract-backed optical character recognition for rendered pages
// reference: https://tesseract-ocr.github.io/tessdoc/Command-Line-Usage.html

use crate::config::OcrConfig;
use crate::error::{PipelineError, Result};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::io::{Cursor, Write};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

const CONTRAST_BOOST: f32 = 50.0;
const UNSHARP_SIGMA: f32 = 1.0;
const UNSHARP_THRESHOLD: i32 = 1;

pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// Runs the `tesseract` binary, piping a PNG through stdin and reading text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: String,
    languages: String,
    engine_mode: u8,
    page_segmentation_mode: u8,
}

impl TesseractOcr {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            languages: config.languages.clone(),
            engine_mode: config.engine_mode,
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }

    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|e| PipelineError::Ocr(format!("Failed to run {}: {}", self.binary, e)))?;

        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };

        banner
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .ok_or_else(|| PipelineError::Ocr(format!("{} printed no version", self.binary)))
    }

    fn args(&self) -> Vec<String> {
        vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.languages.clone(),
            "--oem".to_string(),
            self.engine_mode.to_string(),
            "--psm".to_string(),
            self.page_segmentation_mode.to_string(),
        ]
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| PipelineError::Ocr(format!("Failed to encode page image: {}", e)))?;

        let mut child = Command::new(&self.binary)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PipelineError::Ocr(format!("Failed to start {}: {}", self.binary, e)))?;

        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(&png)
        {
            drop(stdin);
            // The child must be reaped before the failure is reported.
            if let Err(kill_err) = child.kill() {
                debug!("{} already exited: {}", self.binary, kill_err);
            }
            if let Err(wait_err) = child.wait() {
                warn!("Failed to reap {}: {}", self.binary, wait_err);
            }
            return Err(PipelineError::Ocr(format!("Failed to send page image: {}", e)));
        }

        let output = child
            .wait_with_output()
            .map_err(|e| PipelineError::Ocr(format!("{} did not finish: {}", self.binary, e)))?;

        if !output.status.success() {
            return Err(PipelineError::Ocr(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("OCR produced {} characters", text.chars().count());
        Ok(text)
    }
}

/// Grayscale, contrast boost, unsharp mask, then a 3x3 median denoise.
pub fn enhance(image: &DynamicImage) -> DynamicImage {
    let gray = DynamicImage::ImageLuma8(image.to_luma8())
        .adjust_contrast(CONTRAST_BOOST)
        .unsharpen(UNSHARP_SIGMA, UNSHARP_THRESHOLD)
        .to_luma8();

    DynamicImage::ImageLuma8(median_3x3(&gray))
}

/// Edge pixels use the clamped neighbourhood.
pub fn median_3x3(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut output = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return output;
    }

    let mut window = [0u8; 9];
    for y in 0..height {
        for x in 0..width {
            let mut n = 0;
            for dy in [-1i64, 0, 1] {
                for dx in [-1i64, 0, 1] {
                    let nx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                    let ny = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                    window[n] = image.get_pixel(nx, ny)[0];
                    n += 1;
                }
            }
            window.sort_unstable();
            output.put_pixel(x, y, Luma([window[4]]));
        }
    }

    output
}
