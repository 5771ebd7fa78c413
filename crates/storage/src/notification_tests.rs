use super::*;
use crate::todo::{ItemType, NewTodo, TodoManager, TodoStatus};
use chrono::TimeZone;

fn t(mins: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(mins)
}

fn seed_todo(store: &Store) -> TodoId {
    TodoManager::new(store)
        .create(NewTodo {
            name: "write report".into(),
            description: "".into(),
            status: TodoStatus::Active,
            due: Some(t(60)),
            start_time: None,
            deadline: None,
            dtstart: None,
            item_type: ItemType::VTodo,
            reminder_offsets: vec![15],
            user_notes: "".into(),
            priority: 0,
            tags: vec![],
        })
        .unwrap()
}

#[test]
fn add_is_idempotent_for_the_same_reminder_instant() {
    let store = Store::open_in_memory().unwrap();
    let todo_id = seed_todo(&store);
    let mgr = NotificationManager::new(&store);

    let make = || NewNotification {
        todo_id,
        title: "write report".into(),
        content: "due soon".into(),
        created_at: t(0),
        schedule_time: t(60),
        reminder_at: t(45),
        reminder_offset_minutes: 15,
    };

    let id1 = mgr.add(make()).unwrap();
    let id2 = mgr.add(make()).unwrap();
    assert_eq!(id1, id2);
    assert_eq!(mgr.list_for_todo(todo_id).unwrap().len(), 1);
}

#[test]
fn dismiss_flips_is_dismissed() {
    let store = Store::open_in_memory().unwrap();
    let todo_id = seed_todo(&store);
    let mgr = NotificationManager::new(&store);
    let id = mgr
        .add(NewNotification {
            todo_id,
            title: "t".into(),
            content: "c".into(),
            created_at: t(0),
            schedule_time: t(60),
            reminder_at: t(45),
            reminder_offset_minutes: 15,
        })
        .unwrap();

    assert!(!mgr.is_dismissed(&id).unwrap());
    mgr.dismiss(&id).unwrap();
    assert!(mgr.is_dismissed(&id).unwrap());
}

#[test]
fn remove_for_todo_clears_all_its_notifications() {
    let store = Store::open_in_memory().unwrap();
    let todo_id = seed_todo(&store);
    let mgr = NotificationManager::new(&store);
    mgr.add(NewNotification {
        todo_id,
        title: "t".into(),
        content: "c".into(),
        created_at: t(0),
        schedule_time: t(60),
        reminder_at: t(45),
        reminder_offset_minutes: 15,
    })
    .unwrap();

    mgr.remove_for_todo(todo_id).unwrap();
    assert!(mgr.list_for_todo(todo_id).unwrap().is_empty());
}
