use super::*;
use serde_json::json;

#[test]
fn test_group_deserialization_ignores_unknown_fields() {
    let group: Group = serde_json::from_value(json!({
        "id": 3,
        "name": "Backend",
        "path": "backend",
        "full_path": "acme/backend",
        "web_url": "https://gitlab.example.com/groups/acme/backend",
        "visibility": "private",
        "parent_id": 1
    }))
    .expect("Failed to deserialize Group");

    assert_eq!(group.id, 3);
    assert_eq!(group.full_path, "acme/backend");
    assert_eq!(
        group.web_url,
        "https://gitlab.example.com/groups/acme/backend"
    );
}

#[test]
fn test_project_namespace_path() {
    let project: Project = serde_json::from_value(json!({
        "id": 42,
        "name": "ledger",
        "path_with_namespace": "acme/backend/payments/ledger",
        "namespace": {
            "id": 7,
            "name": "payments",
            "path": "payments",
            "full_path": "acme/backend/payments",
            "kind": "group"
        }
    }))
    .expect("Failed to deserialize Project");

    assert_eq!(project.namespace_path(), "acme/backend/payments");
}

#[test]
fn test_page_has_next_uses_total_pages() {
    let page = Page {
        items: vec![1, 2],
        current_page: 1,
        total_pages: Some(3),
        next_page: Some(2),
    };
    assert!(page.has_next());

    let page = Page {
        items: vec![3],
        current_page: 3,
        total_pages: Some(3),
        next_page: None,
    };
    assert!(!page.has_next());
}

#[test]
fn test_page_has_next_falls_back_to_next_page_header() {
    let page = Page {
        items: vec!["a"],
        current_page: 4,
        total_pages: None,
        next_page: Some(5),
    };
    assert!(page.has_next());

    let page: Page<&str> = Page {
        items: vec![],
        current_page: 5,
        total_pages: None,
        next_page: None,
    };
    assert!(!page.has_next());
}

#[test]
fn test_page_last() {
    let page = Page::last(vec![1], 1);
    assert!(!page.has_next());
    assert_eq!(page.total_pages, Some(1));
}
