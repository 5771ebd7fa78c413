// SPDX-License-Identifier: MIT

//! Text recognition oracle (C6).

use async_trait::async_trait;
use image::RgbImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("recognizer unavailable")]
    Unavailable,
    #[error("recognition failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrLine {
    pub text: String,
    pub confidence: f32,
}

#[async_trait]
pub trait Recognizer: Send + Sync + 'static {
    async fn recognize(&self, image: &RgbImage) -> Result<Vec<OcrLine>, RecognizerError>;
}

/// Recognizer used when no OCR engine is configured. Every tick reports
/// `Unavailable`, which `OcrJob` treats as a transient failure and retries
/// on the next scheduled run rather than crashing the worker.
#[derive(Debug, Default)]
pub struct NullRecognizer;

#[async_trait]
impl Recognizer for NullRecognizer {
    async fn recognize(&self, _image: &RgbImage) -> Result<Vec<OcrLine>, RecognizerError> {
        Err(RecognizerError::Unavailable)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::{OcrLine, Recognizer, RecognizerError};
    use async_trait::async_trait;
    use image::RgbImage;
    use parking_lot::Mutex;

    /// Fake recognizer returning a fixed line set, or a configured failure.
    pub struct FakeRecognizer {
        lines: Vec<OcrLine>,
        fail: bool,
        calls: Mutex<u32>,
    }

    impl FakeRecognizer {
        pub fn returning(lines: Vec<OcrLine>) -> Self {
            Self { lines, fail: false, calls: Mutex::new(0) }
        }

        pub fn failing() -> Self {
            Self { lines: Vec::new(), fail: true, calls: Mutex::new(0) }
        }

        pub fn call_count(&self) -> u32 {
            *self.calls.lock()
        }
    }

    #[async_trait]
    impl Recognizer for FakeRecognizer {
        async fn recognize(&self, _image: &RgbImage) -> Result<Vec<OcrLine>, RecognizerError> {
            *self.calls.lock() += 1;
            if self.fail {
                return Err(RecognizerError::Unavailable);
            }
            Ok(self.lines.clone())
        }
    }
}
