// SPDX-License-Identifier: MIT

//! Screenshot capture tick (C5) and event lifetime tracking (C7
//! orchestration).

use crate::blacklist::{self, BlacklistConfig, BlacklistReason};
use crate::error::CaptureError;
use crate::phash::{self, PHash};
use chrono::Utc;
use lt_adapters::{ScreenGrabber, TodoDetector, WindowProbe};
use lt_core::Clock;
use lt_storage::{EventManager, NewScreenshot, ScreenshotManager, Store};
use md5::{Digest, Md5};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub screenshots_dir: PathBuf,
    pub screen_ids: Vec<u32>,
    pub hash_threshold: u32,
    pub file_io_timeout: Duration,
    pub window_probe_timeout: Duration,
    pub blacklist: BlacklistConfig,
    pub todo_whitelist_apps: Vec<String>,
    pub auto_todo_detection_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Captured { screenshot_id: i64 },
    Skipped(BlacklistReason),
    /// The probed window's screen isn't in `CaptureConfig::screen_ids`
    /// (including an unresolvable `screen_id`).
    ScreenNotConfigured,
    Duplicate,
    Failed(String),
}

pub struct CaptureJob {
    store: Arc<Store>,
    window_probe: Arc<dyn WindowProbe>,
    screen_grabber: Arc<dyn ScreenGrabber>,
    todo_detector: Arc<dyn TodoDetector>,
    clock: Arc<dyn Clock>,
    config: CaptureConfig,
    last_hash: Mutex<HashMap<u32, PHash>>,
}

impl CaptureJob {
    pub fn new(
        store: Arc<Store>,
        window_probe: Arc<dyn WindowProbe>,
        screen_grabber: Arc<dyn ScreenGrabber>,
        todo_detector: Arc<dyn TodoDetector>,
        clock: Arc<dyn Clock>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            store,
            window_probe,
            screen_grabber,
            todo_detector,
            clock,
            config,
            last_hash: Mutex::new(HashMap::new()),
        }
    }

    /// One tick: probe the active window exactly once, then capture the
    /// single screen it sits on (if that screen is configured).
    pub async fn tick(&self) -> CaptureOutcome {
        self.tick_with_todo_override(false).await
    }

    /// Like `tick`, but forces the todo-detection fire-and-forget
    /// regardless of the app whitelist — `todo_recorder_job`'s tick.
    pub async fn tick_forcing_todo_detection(&self) -> CaptureOutcome {
        self.tick_with_todo_override(true).await
    }

    async fn tick_with_todo_override(&self, force_todo_detection: bool) -> CaptureOutcome {
        match self.tick_inner(force_todo_detection).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "capture tick failed");
                CaptureOutcome::Failed(e.to_string())
            }
        }
    }

    async fn tick_inner(&self, force_todo_detection: bool) -> Result<CaptureOutcome, CaptureError> {
        let now = self.clock.now_utc();
        let window_info = self
            .window_probe
            .active_window(self.config.window_probe_timeout)
            .await;

        if let Some(reason) = blacklist::check(
            &window_info.app_name,
            &window_info.window_title,
            &self.config.blacklist,
        ) {
            EventManager::new(&self.store).close_active_event(now)?;
            return Ok(CaptureOutcome::Skipped(reason));
        }

        let screen_id = match window_info.screen_id {
            Some(id) if self.config.screen_ids.contains(&id) => id,
            _ => {
                EventManager::new(&self.store).close_active_event(now)?;
                return Ok(CaptureOutcome::ScreenNotConfigured);
            }
        };

        let event_id =
            EventManager::new(&self.store).get_or_create_event(
                &window_info.app_name,
                &window_info.window_title,
                now,
            )?;

        let frame = tokio::time::timeout(
            self.config.file_io_timeout,
            self.screen_grabber.capture(screen_id),
        )
        .await
        .map_err(|_| CaptureError::Encode("screen capture timed out".into()))??;

        let hash = phash::compute(&frame.image);
        {
            let mut last_hash = self.last_hash.lock();
            if let Some(&previous) = last_hash.get(&screen_id) {
                if previous.hamming_distance(hash) <= self.config.hash_threshold {
                    return Ok(CaptureOutcome::Duplicate);
                }
            }
            last_hash.insert(screen_id, hash);
        }

        let file_name = format!("screen_{}_{}.png", screen_id, now.format("%Y%m%d_%H%M%S%3f"));
        let file_path = self.config.screenshots_dir.join(&file_name);
        let mut png_bytes = Vec::new();
        {
            use image::ImageEncoder;
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(
                    frame.image.as_raw(),
                    frame.image.width(),
                    frame.image.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| CaptureError::Encode(e.to_string()))?;
        }
        std::fs::write(&file_path, &png_bytes)?;

        let mut hasher = Md5::new();
        hasher.update(&png_bytes);
        let file_hash = format!("{:x}", hasher.finalize());

        let screenshot_id = ScreenshotManager::new(&self.store).add(NewScreenshot {
            file_path: file_path.display().to_string(),
            file_hash,
            width: frame.image.width(),
            height: frame.image.height(),
            screen_id,
            app_name: window_info.app_name.clone(),
            window_title: window_info.window_title.clone(),
            created_at: now,
        })?;
        ScreenshotManager::new(&self.store).attach_to_event(screenshot_id, event_id)?;

        let whitelisted = self
            .config
            .todo_whitelist_apps
            .iter()
            .any(|app| app.eq_ignore_ascii_case(&window_info.app_name));
        if self.config.auto_todo_detection_enabled && (force_todo_detection || whitelisted) {
            let detector = self.todo_detector.clone();
            let app_name = window_info.app_name.clone();
            tokio::spawn(async move {
                if let Err(e) = detector.detect("", &app_name).await {
                    tracing::warn!(error = %e, "todo detection fire-and-forget failed");
                }
            });
        }

        Ok(CaptureOutcome::Captured { screenshot_id: screenshot_id.get() })
    }

    /// Best-effort import of `*.png` files already on disk with no
    /// matching `screenshots` row (e.g. after an unclean shutdown).
    pub fn startup_sweep(&self) -> Result<u32, CaptureError> {
        let manager = ScreenshotManager::new(&self.store);
        let mut imported = 0;
        let entries = match std::fs::read_dir(&self.config.screenshots_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("png") {
                continue;
            }
            let path_str = path.display().to_string();
            if manager.get_by_path(&path_str)?.is_some() {
                continue;
            }
            let dimensions = image::image_dimensions(&path).unwrap_or((0, 0));
            let created_at = entry
                .metadata()
                .and_then(|m| m.created())
                .map(chrono::DateTime::<Utc>::from)
                .unwrap_or_else(|_| self.clock.now_utc());

            manager.add(NewScreenshot {
                file_path: path_str,
                file_hash: String::new(),
                width: dimensions.0,
                height: dimensions.1,
                screen_id: 0,
                app_name: "unknown".to_string(),
                window_title: "unknown".to_string(),
                created_at,
            })?;
            imported += 1;
        }
        Ok(imported)
    }
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
