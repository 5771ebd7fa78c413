// SPDX-License-Identifier: MIT

//! OCR worker tick (C6).

use crate::error::OcrError;
use lt_adapters::{Recognizer, VectorDocument, VectorIndex};
use lt_storage::{NewOcrResult, OcrManager, ScreenshotManager, Store};
use md5::{Digest, Md5};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const MAX_WIDTH: u32 = 1920;
const MAX_HEIGHT: u32 = 1080;

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub batch_size: u32,
    pub confidence_threshold: f32,
    pub processing_delay: Duration,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            confidence_threshold: 0.5,
            processing_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OcrTickSummary {
    pub processed: u32,
    pub skipped_missing_file: u32,
    pub failed_recognition: u32,
}

pub struct OcrJob {
    store: Arc<Store>,
    recognizer: Arc<dyn Recognizer>,
    vector_index: Option<Arc<dyn VectorIndex>>,
    config: OcrConfig,
}

impl OcrJob {
    pub fn new(
        store: Arc<Store>,
        recognizer: Arc<dyn Recognizer>,
        vector_index: Option<Arc<dyn VectorIndex>>,
        config: OcrConfig,
    ) -> Self {
        Self { store, recognizer, vector_index, config }
    }

    pub async fn tick(&self) -> Result<OcrTickSummary, OcrError> {
        let screenshots =
            ScreenshotManager::new(&self.store).unprocessed_newest_first(self.config.batch_size)?;
        let mut summary = OcrTickSummary::default();

        for screenshot in screenshots {
            if !Path::new(&screenshot.file_path).exists() {
                summary.skipped_missing_file += 1;
                continue;
            }

            let image = match self.load_and_resize(&screenshot.file_path) {
                Ok(image) => image,
                Err(e) => {
                    tracing::warn!(screenshot_id = screenshot.id.get(), error = %e, "failed to load screenshot");
                    summary.failed_recognition += 1;
                    continue;
                }
            };

            let lines = match self.recognizer.recognize(&image).await {
                Ok(lines) => lines,
                Err(e) => {
                    tracing::warn!(screenshot_id = screenshot.id.get(), error = %e, "recognition failed");
                    summary.failed_recognition += 1;
                    tokio::time::sleep(self.config.processing_delay).await;
                    continue;
                }
            };

            let text_content: String = lines
                .iter()
                .filter(|line| line.confidence >= self.config.confidence_threshold)
                .map(|line| line.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");

            let text_hash = if text_content.is_empty() {
                None
            } else {
                let mut hasher = Md5::new();
                hasher.update(text_content.as_bytes());
                Some(format!("{:x}", hasher.finalize()))
            };

            OcrManager::new(&self.store).add(NewOcrResult {
                screenshot_id: screenshot.id,
                text_content: text_content.clone(),
                text_hash,
                confidence: lines.iter().map(|l| l.confidence).fold(0.0, f32::max),
                language: "en".to_string(),
                processing_time_ms: 0,
                created_at: screenshot.created_at,
            })?;

            if !text_content.is_empty() {
                if let Some(index) = &self.vector_index {
                    if let Err(e) = index
                        .upsert(VectorDocument { screenshot_id: screenshot.id.get(), text: text_content })
                        .await
                    {
                        tracing::warn!(screenshot_id = screenshot.id.get(), error = %e, "vector index upsert failed");
                    }
                }
            }

            summary.processed += 1;
            tokio::time::sleep(self.config.processing_delay).await;
        }

        Ok(summary)
    }

    fn load_and_resize(&self, path: &str) -> Result<image::RgbImage, OcrError> {
        let dynamic = image::open(path).map_err(|e| OcrError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        let rgb = dynamic.to_rgb8();
        if rgb.width() <= MAX_WIDTH && rgb.height() <= MAX_HEIGHT {
            return Ok(rgb);
        }
        let scale = f64::min(
            MAX_WIDTH as f64 / rgb.width() as f64,
            MAX_HEIGHT as f64 / rgb.height() as f64,
        );
        let new_width = (rgb.width() as f64 * scale).round().max(1.0) as u32;
        let new_height = (rgb.height() as f64 * scale).round().max(1.0) as u32;
        Ok(image::imageops::resize(
            &rgb,
            new_width,
            new_height,
            image::imageops::FilterType::Lanczos3,
        ))
    }
}

#[cfg(test)]
#[path = "ocr_job_tests.rs"]
mod tests;
