// SPDX-License-Identifier: MIT

//! Best-effort text index over OCR results (C6 collaborator).
//!
//! Unavailability degrades the OCR tick silently — callers should treat
//! any `Err` here as a warning, never a reason to fail the tick.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("index unavailable")]
    Unavailable,
    #[error("upsert failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorDocument {
    pub screenshot_id: i64,
    pub text: String,
}

#[async_trait]
pub trait VectorIndex: Send + Sync + 'static {
    async fn upsert(&self, document: VectorDocument) -> Result<(), VectorError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::{VectorDocument, VectorError, VectorIndex};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Fake index recording every upsert it receives.
    #[derive(Default)]
    pub struct FakeVectorIndex {
        documents: Mutex<Vec<VectorDocument>>,
        fail: bool,
    }

    impl FakeVectorIndex {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self { documents: Mutex::new(Vec::new()), fail: true }
        }

        pub fn documents(&self) -> Vec<VectorDocument> {
            self.documents.lock().clone()
        }
    }

    #[async_trait]
    impl VectorIndex for FakeVectorIndex {
        async fn upsert(&self, document: VectorDocument) -> Result<(), VectorError> {
            if self.fail {
                return Err(VectorError::Unavailable);
            }
            self.documents.lock().push(document);
            Ok(())
        }
    }
}
