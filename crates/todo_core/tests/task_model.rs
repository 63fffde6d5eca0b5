use todo_core::{Task, TaskDraft};

#[test]
fn task_serialization_uses_expected_wire_fields() {
    let task = Task {
        id: 3,
        name: "Milk".to_string(),
        detail: "2 liters".to_string(),
        is_checked: true,
    };

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["name"], "Milk");
    assert_eq!(json["detail"], "2 liters");
    assert_eq!(json["is_checked"], true);

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn draft_ignores_checked_flag_in_input() {
    let draft: TaskDraft =
        serde_json::from_str(r#"{"name":"Bread","detail":"1 loaf","is_checked":true}"#).unwrap();
    assert_eq!(draft, TaskDraft::new("Bread", "1 loaf"));

    let json = serde_json::to_value(&draft).unwrap();
    assert!(json.get("is_checked").is_none());
}

#[test]
fn into_task_keeps_draft_fields() {
    let task = TaskDraft::new("Bread", "1 loaf").into_task(9);
    assert_eq!(task.id, 9);
    assert_eq!(task.name, "Bread");
    assert_eq!(task.detail, "1 loaf");
    assert!(!task.is_checked);
}
