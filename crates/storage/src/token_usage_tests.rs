use super::*;
use chrono::TimeZone;

fn t(mins: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(mins)
}

fn entry(created_at: DateTime<Utc>, feature_type: &str) -> NewTokenUsage {
    NewTokenUsage {
        model: "gpt-test".into(),
        input_tokens: 100,
        output_tokens: 50,
        endpoint: "chat".into(),
        feature_type: feature_type.into(),
        created_at,
        input_cost: 0.01,
        output_cost: 0.02,
    }
}

#[test]
fn append_fills_in_derived_totals() {
    let store = Store::open_in_memory().unwrap();
    let mgr = TokenUsageManager::new(&store);
    mgr.append(entry(t(0), "activity_summary")).unwrap();

    let totals = mgr.window_totals(t(0), None).unwrap();
    assert_eq!(totals.calls, 1);
    assert_eq!(totals.input_tokens, 100);
    assert_eq!(totals.output_tokens, 50);
    assert_eq!(totals.total_tokens, 150);
    assert!((totals.total_cost - 0.03).abs() < 1e-9);
}

#[test]
fn window_totals_excludes_entries_before_since() {
    let store = Store::open_in_memory().unwrap();
    let mgr = TokenUsageManager::new(&store);
    mgr.append(entry(t(0), "activity_summary")).unwrap();
    mgr.append(entry(t(10), "activity_summary")).unwrap();

    let totals = mgr.window_totals(t(5), None).unwrap();
    assert_eq!(totals.calls, 1);
}

#[test]
fn window_totals_can_narrow_by_feature_type() {
    let store = Store::open_in_memory().unwrap();
    let mgr = TokenUsageManager::new(&store);
    mgr.append(entry(t(0), "activity_summary")).unwrap();
    mgr.append(entry(t(0), "todo_detection")).unwrap();

    let totals = mgr.window_totals(t(0), Some("todo_detection")).unwrap();
    assert_eq!(totals.calls, 1);
}
