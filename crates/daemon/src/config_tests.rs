use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn write_paths(dir: &std::path::Path, default_yaml: &str, user_yaml: &str) -> ConfigPaths {
    let paths = ConfigPaths::under_config_dir(dir);
    std::fs::write(&paths.default_path, default_yaml).unwrap();
    std::fs::write(&paths.user_path, user_yaml).unwrap();
    paths
}

#[test]
fn get_reads_a_dotted_path_from_the_merged_tree() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_paths(
        dir.path(),
        "jobs:\n  ocr:\n    enabled: true\n    interval: 10\n",
        "jobs:\n  ocr:\n    interval: 20\n",
    );
    let config = Config::load(paths).unwrap();

    assert_eq!(config.get("jobs.ocr.interval").unwrap(), Value::from(20));
    assert_eq!(config.get("jobs.ocr.enabled").unwrap(), Value::from(true));
}

#[test]
fn get_on_a_missing_key_is_an_error_not_a_default() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_paths(dir.path(), "jobs:\n  ocr:\n    enabled: true\n", "jobs: {}\n");
    let config = Config::load(paths).unwrap();

    assert!(matches!(
        config.get("jobs.ocr.confidence_threshold"),
        Err(ConfigError::MissingKey(_))
    ));
}

#[test]
fn set_persists_to_the_user_file_and_is_visible_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_paths(dir.path(), "jobs:\n  ocr:\n    interval: 10\n", "jobs: {}\n");
    let user_path = paths.user_path.clone();
    let config = Config::load(paths).unwrap();

    config.set("jobs.ocr.interval", Value::from(42), true).unwrap();
    assert_eq!(config.get("jobs.ocr.interval").unwrap(), Value::from(42));

    let persisted = std::fs::read_to_string(&user_path).unwrap();
    assert!(persisted.contains("interval: 42"));
}

#[test]
fn reload_leaves_the_old_snapshot_live_on_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_paths(dir.path(), "jobs:\n  ocr:\n    interval: 10\n", "jobs:\n  ocr:\n    interval: 10\n");
    let user_path = paths.user_path.clone();
    let config = Config::load(paths).unwrap();

    std::fs::write(&user_path, "not: valid: yaml: [").unwrap();
    let result = config.reload();

    assert!(matches!(result, Err(ConfigError::Parse { .. })));
    assert_eq!(config.get("jobs.ocr.interval").unwrap(), Value::from(10));
}

#[test]
fn reload_only_invokes_handlers_for_changed_sections() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_paths(
        dir.path(),
        "jobs:\n  ocr:\n    interval: 10\nserver:\n  port: 8840\n",
        "jobs:\n  ocr:\n    interval: 10\nserver:\n  port: 8840\n",
    );
    let user_path = paths.user_path.clone();
    let config = Config::load(paths).unwrap();

    let jobs_calls = Arc::new(AtomicUsize::new(0));
    let server_calls = Arc::new(AtomicUsize::new(0));
    let jobs_calls_inner = jobs_calls.clone();
    let server_calls_inner = server_calls.clone();

    config.register_handler(
        ChangeType::Jobs,
        Arc::new(move |_, _, _| {
            jobs_calls_inner.fetch_add(1, Ordering::SeqCst);
        }),
    );
    config.register_handler(
        ChangeType::Server,
        Arc::new(move |_, _, _| {
            server_calls_inner.fetch_add(1, Ordering::SeqCst);
        }),
    );

    std::fs::write(&user_path, "jobs:\n  ocr:\n    interval: 99\nserver:\n  port: 8840\n").unwrap();
    config.reload().unwrap();

    assert_eq!(jobs_calls.load(Ordering::SeqCst), 1);
    assert_eq!(server_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn a_panicking_handler_does_not_stop_the_remaining_handlers() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_paths(dir.path(), "jobs:\n  ocr:\n    interval: 10\n", "jobs:\n  ocr:\n    interval: 10\n");
    let user_path = paths.user_path.clone();
    let config = Config::load(paths).unwrap();

    let survived = Arc::new(AtomicUsize::new(0));
    let survived_inner = survived.clone();

    config.register_handler(ChangeType::Jobs, Arc::new(|_, _, _| panic!("boom")));
    config.register_handler(
        ChangeType::Jobs,
        Arc::new(move |_, _, _| {
            survived_inner.fetch_add(1, Ordering::SeqCst);
        }),
    );

    std::fs::write(&user_path, "jobs:\n  ocr:\n    interval: 11\n").unwrap();
    config.reload().unwrap();

    assert_eq!(survived.load(Ordering::SeqCst), 1);
}
