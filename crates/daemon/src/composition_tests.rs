use super::*;
use crate::config::ConfigPaths;

#[test]
fn build_creates_the_data_layout_and_installs_every_job() {
    let dir = tempfile::tempdir().unwrap();
    let composition = Composition::build(dir.path().to_path_buf()).unwrap();

    assert!(dir.path().join("data").join("lifetrace.db").exists());
    assert!(dir.path().join("data").join("screenshots").exists());
    assert_eq!(composition.scheduler.get_all_jobs().unwrap().len(), 6);
    assert!(composition.job_manager.current_config().recorder.enabled);
}

#[test]
fn build_with_overrides_applies_before_workers_are_constructed() {
    let dir = tempfile::tempdir().unwrap();
    let composition = Composition::build_with_overrides(
        dir.path().to_path_buf(),
        &[
            ("jobs.recorder.interval", serde_yaml::Value::from(42)),
            ("server.port", serde_yaml::Value::from(9000_u16)),
        ],
    )
    .unwrap();

    assert_eq!(composition.server_port, 9000);
    assert_eq!(composition.job_manager.current_config().recorder.interval, Duration::from_secs(42));
}

#[test]
fn reloading_the_user_config_reconciles_the_job_manager() {
    let dir = tempfile::tempdir().unwrap();
    let composition = Composition::build(dir.path().to_path_buf()).unwrap();
    assert!(!composition.job_manager.current_config().todo_recorder.enabled);

    let paths = ConfigPaths::under_config_dir(dir.path().join("config"));
    let mut user: serde_yaml::Value = serde_yaml::from_str(&std::fs::read_to_string(&paths.user_path).unwrap()).unwrap();
    user["jobs"]["todo_recorder"]["enabled"] = serde_yaml::Value::from(true);
    std::fs::write(&paths.user_path, serde_yaml::to_string(&user).unwrap()).unwrap();

    composition.config.reload().unwrap();

    assert!(composition.job_manager.current_config().todo_recorder.enabled);
}
