// SPDX-License-Identifier: MIT

//! Screen/monitor capture (C5 step 3).

use async_trait::async_trait;
use image::RgbImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("capture timed out")]
    Timeout,
    #[error("no monitor with id {0}")]
    NoSuchScreen(u32),
    #[error("platform error: {0}")]
    Platform(String),
}

#[derive(Debug, Clone)]
pub struct ScreenFrame {
    pub screen_id: u32,
    pub image: RgbImage,
}

#[async_trait]
pub trait ScreenGrabber: Send + Sync + 'static {
    async fn capture(&self, screen_id: u32) -> Result<ScreenFrame, ScreenError>;
}

/// Production grabber backed by `xcap::Monitor::capture_image`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemScreenGrabber;

impl SystemScreenGrabber {
    pub fn new() -> Self {
        Self
    }

    fn capture_blocking(screen_id: u32) -> Result<ScreenFrame, ScreenError> {
        let monitors = xcap::Monitor::all().map_err(|e| ScreenError::Platform(e.to_string()))?;
        let monitor = monitors
            .into_iter()
            .find(|m| m.id().map(|id| id == screen_id).unwrap_or(false))
            .ok_or(ScreenError::NoSuchScreen(screen_id))?;

        let rgba = monitor
            .capture_image()
            .map_err(|e| ScreenError::Platform(e.to_string()))?;
        let image = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
        Ok(ScreenFrame { screen_id, image })
    }
}

#[async_trait]
impl ScreenGrabber for SystemScreenGrabber {
    async fn capture(&self, screen_id: u32) -> Result<ScreenFrame, ScreenError> {
        tokio::task::spawn_blocking(move || Self::capture_blocking(screen_id))
            .await
            .map_err(|e| ScreenError::Platform(e.to_string()))?
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::{ScreenError, ScreenFrame, ScreenGrabber};
    use async_trait::async_trait;
    use image::RgbImage;

    /// Fake grabber that always returns the same solid-color frame, or the
    /// configured error.
    pub struct FakeScreenGrabber {
        width: u32,
        height: u32,
        pixel: [u8; 3],
        fail: bool,
    }

    impl FakeScreenGrabber {
        pub fn solid(width: u32, height: u32, pixel: [u8; 3]) -> Self {
            Self { width, height, pixel, fail: false }
        }

        pub fn failing() -> Self {
            Self { width: 1, height: 1, pixel: [0, 0, 0], fail: true }
        }
    }

    #[async_trait]
    impl ScreenGrabber for FakeScreenGrabber {
        async fn capture(&self, screen_id: u32) -> Result<ScreenFrame, ScreenError> {
            if self.fail {
                return Err(ScreenError::Platform("fake failure".into()));
            }
            let image = RgbImage::from_fn(self.width, self.height, |_, _| {
                image::Rgb(self.pixel)
            });
            Ok(ScreenFrame { screen_id, image })
        }
    }
}
