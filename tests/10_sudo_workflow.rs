mod common;

use chrono::{Duration, Utc};
use serde_json::json;

use cosmos_client::config::SudoConfig;
use cosmos_client::notify::Notifier;
use cosmos_client::sudo::{
    Identity, Role, SessionHandle, SessionRole, SudoWorkflow, WorkflowError, WorkflowState,
    INVALID_PASSWORD_MESSAGE,
};
use cosmos_client::transport::Transport;

use common::{client, recording_notifier, ScriptedTransport};

fn workflow<T: Transport>(
    transport: std::sync::Arc<T>,
    notifier: Notifier,
    identity: Identity,
) -> SudoWorkflow<T> {
    SudoWorkflow::new(
        client(transport, notifier),
        SudoConfig::default(),
        identity,
        SessionHandle::new(),
    )
}

fn eligible() -> Identity {
    Identity::new(Role::Admin, Role::User)
}

#[tokio::test]
async fn correct_password_elevates_session() {
    let transport = ScriptedTransport::new().reply(200, r#"{"status":"OK"}"#);
    let (notifier, seen) = recording_notifier();
    let mut flow = workflow(transport.clone(), notifier, eligible());

    assert!(flow.is_offered());
    flow.open().unwrap();
    assert_eq!(flow.state(), WorkflowState::Open);
    flow.set_password("hunter2").unwrap();

    let before = Utc::now();
    assert_eq!(flow.submit().await, Ok(WorkflowState::Elevated));

    assert!(!flow.is_loading());
    assert_eq!(flow.password(), "");
    assert_eq!(flow.field_error(), None);
    assert!(seen.lock().unwrap().is_empty());

    let session = flow.session().snapshot();
    assert!(session.active);
    assert_eq!(session.role, SessionRole::Elevated);
    let expires = session.expires_at.unwrap();
    assert!(expires >= before + Duration::hours(2));
    assert!(expires <= Utc::now() + Duration::hours(2));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/cosmos/api/sudo");
    assert_eq!(requests[0].body, Some(json!({ "password": "hunter2" })));
}

#[tokio::test]
async fn wrong_password_shows_fixed_message() {
    let transport = ScriptedTransport::new().reply(401, r#"{"message":"bad creds"}"#);
    let (notifier, seen) = recording_notifier();
    let mut flow = workflow(transport, notifier, eligible());

    flow.open().unwrap();
    flow.set_password("wrong").unwrap();
    assert_eq!(flow.submit().await, Ok(WorkflowState::Denied));

    assert_eq!(flow.field_error(), Some(INVALID_PASSWORD_MESSAGE));
    assert_eq!(flow.field_error(), Some("Invalid password"));
    assert!(!flow.is_loading());
    assert_eq!(flow.state(), WorkflowState::Denied);
    assert!(!flow.session().snapshot().active);
    // server text never reaches the user for this endpoint by default
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn denied_then_retry_succeeds() {
    let transport = ScriptedTransport::new()
        .reply(401, r#"{"message":"bad creds"}"#)
        .reply(200, "{}");
    let (notifier, _) = recording_notifier();
    let mut flow = workflow(transport.clone(), notifier, eligible());

    flow.open().unwrap();
    flow.set_password("wrong").unwrap();
    flow.submit().await.unwrap();

    flow.set_password("hunter2").unwrap();
    assert_eq!(flow.submit().await, Ok(WorkflowState::Elevated));
    assert_eq!(flow.field_error(), None);
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn notification_can_be_enabled_for_rejections() {
    let transport = ScriptedTransport::new().reply(401, r#"{"message":"bad creds"}"#);
    let (notifier, seen) = recording_notifier();
    let config = SudoConfig {
        notify_on_failure: true,
        ..SudoConfig::default()
    };
    let mut flow = SudoWorkflow::new(client(transport, notifier), config, eligible(), SessionHandle::new());

    flow.open().unwrap();
    flow.set_password("wrong").unwrap();
    flow.submit().await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["bad creds".to_string()]);
    assert_eq!(flow.field_error(), Some(INVALID_PASSWORD_MESSAGE));
}

#[tokio::test]
async fn ineligible_user_cannot_open() {
    for identity in [
        Identity::new(Role::User, Role::User),
        Identity::new(Role::User, Role::Guest),
        Identity::new(Role::Admin, Role::Admin),
    ] {
        let transport = ScriptedTransport::new();
        let (notifier, _) = recording_notifier();
        let mut flow = workflow(transport.clone(), notifier, identity);

        assert!(!flow.is_offered());
        assert_eq!(flow.open(), Err(WorkflowError::NotEligible));
        assert_eq!(flow.state(), WorkflowState::Closed);
        assert!(flow.submit().await.is_err());
        assert!(transport.requests().is_empty());
    }
}

#[tokio::test]
async fn cancel_before_submit_makes_no_call() {
    let transport = ScriptedTransport::new();
    let (notifier, _) = recording_notifier();
    let mut flow = workflow(transport.clone(), notifier, eligible());

    flow.open().unwrap();
    flow.set_password("half typed").unwrap();
    flow.cancel().unwrap();

    assert_eq!(flow.state(), WorkflowState::Closed);
    assert_eq!(flow.password(), "");
    assert!(transport.requests().is_empty());
    assert!(!flow.session().snapshot().active);
    assert_eq!(flow.session().snapshot().expires_at, None);
}

#[tokio::test]
async fn cancel_after_denial_clears_error() {
    let transport = ScriptedTransport::new().reply(403, "forbidden");
    let (notifier, _) = recording_notifier();
    let mut flow = workflow(transport, notifier, eligible());

    flow.open().unwrap();
    flow.set_password("wrong").unwrap();
    flow.submit().await.unwrap();
    flow.cancel().unwrap();

    assert_eq!(flow.state(), WorkflowState::Closed);
    assert_eq!(flow.field_error(), None);
}
