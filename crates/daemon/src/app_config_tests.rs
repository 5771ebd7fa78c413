use super::*;

const DEFAULT_CONFIG_YAML: &str = include_str!("../assets/default_config.yaml");

fn parsed() -> AppConfig {
    serde_yaml::from_str(DEFAULT_CONFIG_YAML).unwrap()
}

#[test]
fn the_shipped_default_config_deserializes() {
    let app = parsed();
    assert_eq!(app.base_dir, "data");
    assert_eq!(app.server.port, 8840);
    assert!(app.jobs.recorder.enabled);
    assert!(!app.jobs.todo_recorder.enabled);
}

#[test]
fn screens_all_parses_as_the_all_variant() {
    let app = parsed();
    assert!(matches!(app.jobs.recorder.params.screens, ScreensSpec::All(ref s) if s == "all"));
}

#[test]
fn screens_accepts_an_explicit_id_list() {
    let yaml = DEFAULT_CONFIG_YAML.replace("screens: all", "screens: [0, 1]");
    let app: AppConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(matches!(app.jobs.recorder.params.screens, ScreensSpec::Ids(ref ids) if ids == &[0, 1]));
}

#[test]
fn jobs_config_carries_every_toggle_and_links_the_auto_todo_flag() {
    let app = parsed();
    let jobs = jobs_config(&app.jobs);

    assert!(jobs.recorder.enabled);
    assert_eq!(jobs.recorder.interval, Duration::from_secs(5));
    assert_eq!(jobs.clean_data.max_screenshots, Some(10_000));
    assert_eq!(jobs.clean_data.max_days, Some(30));
    assert!(!jobs.auto_todo_detection_enabled);
    assert!(!jobs.deadline_reminder_enabled);
}
