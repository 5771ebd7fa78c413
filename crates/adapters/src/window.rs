// SPDX-License-Identifier: MIT

//! Active-window probe (C4).

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("probe timed out")]
    Timeout,
    #[error("platform error: {0}")]
    Platform(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub app_name: String,
    pub window_title: String,
    pub screen_id: Option<u32>,
}

impl WindowInfo {
    /// What a timed-out or platform-failed probe reports — never an error
    /// the capture tick has to unwind for.
    pub fn unknown() -> Self {
        Self {
            app_name: "unknown_app".to_string(),
            window_title: "unknown_window".to_string(),
            screen_id: None,
        }
    }
}

#[async_trait]
pub trait WindowProbe: Send + Sync + 'static {
    /// The focused window and the monitor it sits on. Never returns `Err`
    /// for an ordinary "no window" or "probe timed out" condition — those
    /// resolve to `WindowInfo::unknown()`, per the capture job's
    /// no-panics-per-tick contract.
    async fn active_window(&self, timeout: Duration) -> WindowInfo;
}

/// Production probe backed by `xcap`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemWindowProbe;

impl SystemWindowProbe {
    pub fn new() -> Self {
        Self
    }

    fn probe_blocking() -> Result<WindowInfo, WindowError> {
        let window = xcap::Window::all()
            .map_err(|e| WindowError::Platform(e.to_string()))?
            .into_iter()
            .find(|w| !w.is_minimized().unwrap_or(false))
            .ok_or_else(|| WindowError::Platform("no focused window".into()))?;

        let app_name = window.app_name().unwrap_or_else(|_| "unknown_app".into());
        let window_title = window.title().unwrap_or_else(|_| "unknown_window".into());
        let screen_id = resolve_screen_id(&window);

        Ok(WindowInfo { app_name, window_title, screen_id })
    }
}

#[async_trait]
impl WindowProbe for SystemWindowProbe {
    async fn active_window(&self, timeout: Duration) -> WindowInfo {
        let result = tokio::time::timeout(
            timeout,
            tokio::task::spawn_blocking(Self::probe_blocking),
        )
        .await;

        match result {
            Ok(Ok(Ok(info))) => info,
            Ok(Ok(Err(e))) => {
                tracing::warn!(error = %e, "window probe failed");
                WindowInfo::unknown()
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "window probe task panicked");
                WindowInfo::unknown()
            }
            Err(_) => {
                tracing::warn!("window probe timed out");
                WindowInfo::unknown()
            }
        }
    }
}

/// Point-in-rectangle against every monitor; defaults to the primary monitor
/// (id 1) on ambiguity or enumeration failure.
fn resolve_screen_id(window: &xcap::Window) -> Option<u32> {
    let (x, y) = match (window.x(), window.y()) {
        (Ok(x), Ok(y)) => (x, y),
        _ => return Some(1),
    };
    let monitors = xcap::Monitor::all().ok()?;
    for monitor in &monitors {
        let (mx, my, mw, mh) = match (monitor.x(), monitor.y(), monitor.width(), monitor.height())
        {
            (Ok(mx), Ok(my), Ok(mw), Ok(mh)) => (mx, my, mw as i32, mh as i32),
            _ => continue,
        };
        if x >= mx && x < mx + mw && y >= my && y < my + mh {
            return monitor.id().ok();
        }
    }
    Some(1)
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::{WindowInfo, WindowProbe};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Fake window probe returning a fixed, queued sequence of `WindowInfo`.
    pub struct FakeWindowProbe {
        queue: Mutex<Vec<WindowInfo>>,
        default: WindowInfo,
    }

    impl FakeWindowProbe {
        pub fn new(default: WindowInfo) -> Self {
            Self { queue: Mutex::new(Vec::new()), default }
        }

        pub fn push(&self, info: WindowInfo) {
            self.queue.lock().insert(0, info);
        }
    }

    #[async_trait]
    impl WindowProbe for FakeWindowProbe {
        async fn active_window(&self, _timeout: Duration) -> WindowInfo {
            self.queue.lock().pop().unwrap_or_else(|| self.default.clone())
        }
    }
}
