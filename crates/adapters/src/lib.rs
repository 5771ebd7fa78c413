// SPDX-License-Identifier: MIT

//! Trait seams for every external collaborator the background pipeline
//! talks to: OS window/screen introspection, and the LLM/OCR/vector oracles
//! that live outside this workspace.

#![cfg_attr(any(test, feature = "test-support"), allow(clippy::unwrap_used))]
#![cfg_attr(any(test, feature = "test-support"), allow(clippy::expect_used))]

pub mod ocr;
pub mod screen;
pub mod summary;
pub mod todo_detector;
pub mod vector;
pub mod window;

pub use ocr::{NullRecognizer, OcrLine, Recognizer, RecognizerError};
pub use screen::{ScreenError, ScreenFrame, ScreenGrabber, SystemScreenGrabber};
pub use summary::{ActivityEventView, ActivitySummary, NullSummaryOracle, SummaryError, SummaryOracle};
pub use todo_detector::{DetectedTodo, NullTodoDetector, TodoDetectError, TodoDetector};
pub use vector::{VectorDocument, VectorError, VectorIndex};
pub use window::{SystemWindowProbe, WindowError, WindowInfo, WindowProbe};
