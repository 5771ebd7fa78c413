// SPDX-License-Identifier: MIT

//! Screen-recording blacklist (C5 self-exclusion + user-configured entries).

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Friendly display name -> raw process/app names a platform may report.
/// Best-effort, never authoritative: only used to widen blacklist matching.
static APP_NAME_ALIASES: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| {
        HashMap::from([
            ("VS Code", ["Code.exe", "code", "Visual Studio Code", "Electron"].as_slice()),
            ("Terminal", ["Terminal.app", "iTerm2", "gnome-terminal", "WindowsTerminal"].as_slice()),
            ("Chrome", ["Google Chrome", "chrome.exe", "chrome"].as_slice()),
            ("Slack", ["Slack.exe", "slack"].as_slice()),
        ])
    });

static LOCALHOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)localhost:\d+").expect("static regex is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlacklistReason {
    SelfPattern(String),
    LocalhostPort,
    ConfiguredEntry(String),
}

#[derive(Debug, Clone, Default)]
pub struct BlacklistConfig {
    /// Patterns identifying the daemon's own UI, matched against app name
    /// or window title.
    pub self_patterns: Vec<String>,
    /// User-configured blacklist entries (enabled ones only).
    pub entries: Vec<String>,
}

/// Expand an app name to every alias a platform might report it as,
/// including itself.
fn expand_aliases(app_name: &str) -> Vec<&str> {
    let mut names = vec![app_name];
    for (friendly, raw_names) in APP_NAME_ALIASES.iter() {
        if friendly.eq_ignore_ascii_case(app_name) || raw_names.iter().any(|n| n.eq_ignore_ascii_case(app_name)) {
            names.push(friendly);
            names.extend(raw_names.iter().copied());
        }
    }
    names
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Whether the active window should be excluded from capture, and why.
pub fn check(app_name: &str, window_title: &str, config: &BlacklistConfig) -> Option<BlacklistReason> {
    for pattern in &config.self_patterns {
        if contains_ci(app_name, pattern) || contains_ci(window_title, pattern) {
            return Some(BlacklistReason::SelfPattern(pattern.clone()));
        }
    }

    if LOCALHOST_RE.is_match(window_title) {
        return Some(BlacklistReason::LocalhostPort);
    }

    let aliases = expand_aliases(app_name);
    for entry in &config.entries {
        if aliases.iter().any(|name| contains_ci(name, entry)) || contains_ci(window_title, entry) {
            return Some(BlacklistReason::ConfiguredEntry(entry.clone()));
        }
    }

    None
}

#[cfg(test)]
#[path = "blacklist_tests.rs"]
mod tests;
