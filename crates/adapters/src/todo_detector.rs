// SPDX-License-Identifier: MIT

//! Fire-and-forget todo detection oracle (C5 step 7 collaborator).

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TodoDetectError {
    #[error("detector unavailable")]
    Unavailable,
    #[error("detection failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedTodo {
    pub name: String,
    pub description: String,
}

#[async_trait]
pub trait TodoDetector: Send + Sync + 'static {
    async fn detect(
        &self,
        screenshot_text: &str,
        app_name: &str,
    ) -> Result<Vec<DetectedTodo>, TodoDetectError>;
}

/// Detector used when no LLM backend is configured. Always reports no
/// todos found, so forced-detection capture ticks are a no-op rather than
/// a hard failure.
#[derive(Debug, Default)]
pub struct NullTodoDetector;

#[async_trait]
impl TodoDetector for NullTodoDetector {
    async fn detect(
        &self,
        _screenshot_text: &str,
        _app_name: &str,
    ) -> Result<Vec<DetectedTodo>, TodoDetectError> {
        Ok(Vec::new())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::{DetectedTodo, TodoDetectError, TodoDetector};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Fake detector recording every call it receives and returning a fixed
    /// set of detections.
    pub struct FakeTodoDetector {
        detections: Vec<DetectedTodo>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeTodoDetector {
        pub fn returning(detections: Vec<DetectedTodo>) -> Self {
            Self { detections, calls: Mutex::new(Vec::new()) }
        }

        pub fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl TodoDetector for FakeTodoDetector {
        async fn detect(
            &self,
            screenshot_text: &str,
            app_name: &str,
        ) -> Result<Vec<DetectedTodo>, TodoDetectError> {
            self.calls
                .lock()
                .push((screenshot_text.to_string(), app_name.to_string()));
            Ok(self.detections.clone())
        }
    }
}
