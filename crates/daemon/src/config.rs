// SPDX-License-Identifier: MIT

//! Config store (C2): a `serde_yaml`-backed, hot-reloadable snapshot.
//!
//! `config/default_config.yaml` ships with the binary (embedded at compile
//! time) and is written to the data dir on first run. `config/config.yaml`
//! holds user overrides and is deep-merged onto the default at the
//! mapping-key level, recursively. Readers take an `Arc` clone of the
//! current snapshot under a `parking_lot::RwLock`, so a reload can never
//! tear a read mid-tick.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::{error, warn};

use crate::error::ConfigError;

const DEFAULT_CONFIG_YAML: &str = include_str!("../assets/default_config.yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Llm,
    Jobs,
    Server,
    All,
}

pub type ChangeHandler = Arc<dyn Fn(ChangeType, &Value, &Value) + Send + Sync>;

pub struct ConfigPaths {
    pub default_path: PathBuf,
    pub user_path: PathBuf,
}

impl ConfigPaths {
    pub fn under_config_dir(config_dir: impl AsRef<Path>) -> Self {
        let config_dir = config_dir.as_ref();
        Self {
            default_path: config_dir.join("default_config.yaml"),
            user_path: config_dir.join("config.yaml"),
        }
    }
}

/// Hot-reloadable YAML config. Cheap to clone (just bumps the internal
/// `Arc`); `reload` is the only thing that ever replaces the snapshot.
pub struct Config {
    paths: ConfigPaths,
    snapshot: RwLock<Arc<Value>>,
    handlers: Mutex<Vec<(ChangeType, ChangeHandler)>>,
}

impl Config {
    /// Write the embedded default config if `default_config.yaml` is
    /// missing, then load (or create, from the default) `config.yaml`.
    pub fn load(paths: ConfigPaths) -> Result<Self, ConfigError> {
        if let Some(parent) = paths.default_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !paths.default_path.exists() {
            std::fs::write(&paths.default_path, DEFAULT_CONFIG_YAML)?;
        }
        if !paths.user_path.exists() {
            std::fs::copy(&paths.default_path, &paths.user_path)?;
        }

        let merged = read_merged(&paths.default_path, &paths.user_path)?;
        Ok(Self {
            paths,
            snapshot: RwLock::new(Arc::new(merged)),
            handlers: Mutex::new(Vec::new()),
        })
    }

    /// Dotted-path lookup (`"jobs.recorder.params.hash_threshold"`).
    /// No silent default: an absent key is `ConfigError::MissingKey`.
    pub fn get(&self, path: &str) -> Result<Value, ConfigError> {
        let snapshot = self.snapshot.read().clone();
        let mut current = &*snapshot;
        let mut visited = String::new();
        for segment in path.split('.') {
            let mapping = current
                .as_mapping()
                .ok_or_else(|| ConfigError::MissingKey(path.to_string()))?;
            current = mapping
                .get(Value::String(segment.to_string()))
                .ok_or_else(|| ConfigError::MissingKey(path.to_string()))?;
            if !visited.is_empty() {
                visited.push('.');
            }
            visited.push_str(segment);
        }
        Ok(current.clone())
    }

    /// Like [`get`](Self::get), deserialized into `T`.
    pub fn get_typed<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        let value = self.get(path)?;
        serde_yaml::from_value(value).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// The whole merged tree, deserialized into `T`. Used at startup to
    /// build the typed app config the composition root wires workers from.
    pub fn whole<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let snapshot = self.snapshot.read().clone();
        serde_yaml::from_value((*snapshot).clone()).map_err(|source| ConfigError::Parse {
            path: "<root>".to_string(),
            source,
        })
    }

    /// Set a dotted key against the user layer and apply it to the live
    /// snapshot immediately; only written to `config.yaml` when `persist`
    /// is true. An unpersisted override survives until the next disk-backed
    /// [`reload`](Self::reload) (e.g. a watcher-triggered one) re-derives
    /// the snapshot from the files alone.
    pub fn set(&self, path: &str, value: Value, persist: bool) -> Result<(), ConfigError> {
        let mut user: Value = read_yaml_file(&self.paths.user_path)?;
        set_path(&mut user, path, value);

        if persist {
            let text = serde_yaml::to_string(&user).map_err(|source| ConfigError::Parse {
                path: self.paths.user_path.display().to_string(),
                source,
            })?;
            std::fs::write(&self.paths.user_path, text)?;
        }

        let mut merged = read_yaml_file(&self.paths.default_path)?;
        deep_merge(&mut merged, user);
        self.apply_new_snapshot(merged)
    }

    /// Re-read both files, deep-merge, and apply the result as the new
    /// snapshot. A YAML parse failure leaves the previous snapshot live and
    /// returns `ConfigError::Parse`.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let merged = read_merged(&self.paths.default_path, &self.paths.user_path)?;
        self.apply_new_snapshot(merged)
    }

    /// Diff `merged` against the current snapshot at section granularity
    /// (`jobs`, `llm`, `server`), replace the snapshot, then call every
    /// registered handler whose `ChangeType` changed plus every
    /// `ChangeType::All` handler. A panicking handler is caught and logged
    /// so it can't stop the remaining handlers from running.
    fn apply_new_snapshot(&self, merged: Value) -> Result<(), ConfigError> {
        let old = self.snapshot.read().clone();
        let changed = diff_sections(&old, &merged);

        *self.snapshot.write() = Arc::new(merged.clone());

        let handlers = self.handlers.lock();
        for change_type in changed {
            for (registered, handler) in handlers.iter() {
                if *registered != change_type && *registered != ChangeType::All {
                    continue;
                }
                let handler = handler.clone();
                let old = old.clone();
                let merged = merged.clone();
                let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    handler(change_type, &old, &merged);
                }));
                if result.is_err() {
                    error!(?change_type, "config change handler panicked, continuing");
                }
            }
        }
        Ok(())
    }

    pub fn register_handler(&self, change_type: ChangeType, handler: ChangeHandler) {
        self.handlers.lock().push((change_type, handler));
    }

    /// Watch `config.yaml` for writes and call [`reload`](Self::reload) on
    /// each one. Errors are logged and never propagated — a broken watcher
    /// should not take the daemon down.
    pub fn watch(self: &Arc<Self>) -> notify::Result<notify::RecommendedWatcher> {
        let this = Arc::clone(self);
        let user_path = this.paths.user_path.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else { return };
            if !matches!(event.kind, notify::EventKind::Modify(_)) {
                return;
            }
            if !event.paths.iter().any(|p| p == &user_path) {
                return;
            }
            if let Err(e) = this.reload() {
                warn!(error = %e, "config reload failed, keeping previous snapshot");
            }
        })?;
        use notify::Watcher;
        let watch_dir = self.paths.user_path.parent().unwrap_or(&self.paths.user_path);
        watcher.watch(watch_dir, notify::RecursiveMode::NonRecursive)?;
        Ok(watcher)
    }
}

fn read_yaml_file(path: &Path) -> Result<Value, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn read_merged(default_path: &Path, user_path: &Path) -> Result<Value, ConfigError> {
    let default = read_yaml_file(default_path)?;
    let user = read_yaml_file(user_path)?;
    let mut merged = default;
    deep_merge(&mut merged, user);
    Ok(merged)
}

/// Recursively overlay `overlay` onto `base`: mapping keys merge key by
/// key, any other value (scalar, sequence) replaces the base value wholesale.
fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key.clone()) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn set_path(root: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, ancestors)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for segment in ancestors {
        if !current.is_mapping() {
            *current = Value::Mapping(Default::default());
        }
        let Value::Mapping(map) = current else { unreachable!("just assigned a mapping") };
        let key = Value::String(segment.to_string());
        if map.get(key.clone()).is_none() {
            map.insert(key.clone(), Value::Mapping(Default::default()));
        }
        let Some(next) = map.get_mut(key.clone()) else { unreachable!("just inserted") };
        current = next;
    }

    if !current.is_mapping() {
        *current = Value::Mapping(Default::default());
    }
    if let Value::Mapping(map) = current {
        map.insert(Value::String((*last).to_string()), value);
    }
}

/// Which top-level sections differ between two snapshots, mapped onto the
/// coarse [`ChangeType`] buckets the rest of the daemon cares about.
fn diff_sections(old: &Value, new: &Value) -> Vec<ChangeType> {
    let mut changed = Vec::new();
    for (section, change_type) in [
        ("llm", ChangeType::Llm),
        ("jobs", ChangeType::Jobs),
        ("server", ChangeType::Server),
    ] {
        let key = Value::String(section.to_string());
        let old_section = old.as_mapping().and_then(|m| m.get(key.clone()));
        let new_section = new.as_mapping().and_then(|m| m.get(key.clone()));
        if old_section != new_section {
            changed.push(change_type);
        }
    }
    if !changed.is_empty() {
        changed.push(ChangeType::All);
    }
    changed
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
