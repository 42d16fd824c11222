use church_cms::{
    models::{DashboardSection, Section},
    session::Session,
};
use serde_json::json;

// --- Session wire format ---

#[test]
fn test_session_reads_camel_case_church_id() {
    let session: Session = serde_json::from_value(json!({ "churchId": "abc123" })).unwrap();

    assert_eq!(session.church_id.as_deref(), Some("abc123"));
    assert_eq!(session.tenant(), Some("abc123"));
    assert!(session.user.is_none());
}

#[test]
fn test_empty_church_id_is_not_a_tenant() {
    let session: Session = serde_json::from_value(json!({ "churchId": "" })).unwrap();

    assert_eq!(session.church_id.as_deref(), Some(""));
    assert_eq!(session.tenant(), None);
}

#[test]
fn test_null_body_is_no_session() {
    let session: Option<Session> = serde_json::from_str("null").unwrap();

    assert!(session.is_none());
}

#[test]
fn test_session_round_trips_provider_json() {
    let provider_json = json!({
        "user": { "id": "u1", "name": "Grace", "image": "https://example.org/a.png" },
        "churchId": "abc123",
        "role": "admin",
        "accessToken": "opaque",
        "expires": "2030-01-01T00:00:00Z"
    });

    let session: Session = serde_json::from_value(provider_json.clone()).unwrap();

    assert_eq!(session.extra["role"], "admin");
    assert_eq!(
        session.user.as_ref().unwrap().extra["image"],
        "https://example.org/a.png"
    );
    assert_eq!(serde_json::to_value(&session).unwrap(), provider_json);
}

#[test]
fn test_minimal_session_round_trips() {
    let provider_json = json!({ "churchId": "abc123" });

    let session: Session = serde_json::from_value(provider_json.clone()).unwrap();

    assert_eq!(serde_json::to_value(&session).unwrap(), provider_json);
}

#[test]
fn test_session_serializes_church_id_in_camel_case() {
    let session = Session {
        church_id: Some("abc123".to_string()),
        ..Session::default()
    };

    let value = serde_json::to_value(&session).unwrap();

    assert_eq!(value["churchId"], "abc123");
    assert!(value.get("church_id").is_none());
}

// --- Dashboard sections ---

#[test]
fn test_dashboard_section_shape() {
    let page = DashboardSection::new(Section::Website, "abc123");

    let value = serde_json::to_value(&page).unwrap();

    assert_eq!(value["section"], "website");
    assert_eq!(value["title"], "Website");
    assert_eq!(value["churchId"], "abc123");
}
