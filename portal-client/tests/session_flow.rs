mod support;

use std::time::Duration;

use common_auth::{FileTokenStore, MemoryTokenStore, Role, TokenDecoder, TokenStore};
use httpmock::prelude::*;
use portal_client::{ApiClient, SessionContext, SessionError, SessionState, ACCESS_TOKEN_HEADER};
use serde_json::json;
use support::{expired_token, issue_token, Harness, TokenFields};
use tempfile::tempdir;

#[test]
fn login_round_trip_matches_decode() {
    let harness = Harness::start();
    let token = issue_token(&TokenFields {
        id: 21,
        role: "EDITOR",
        sector: Some("Sistemas"),
        profile_incomplete: false,
    });

    let identity = harness.session.login(&token).expect("login succeeds");

    assert_eq!(identity, TokenDecoder::default().decode(&token).expect("decode"));
    assert_eq!(harness.session.identity(), Some(identity));
    assert_eq!(harness.session.token().as_deref(), Some(token.as_str()));
    assert_eq!(harness.persisted().as_deref(), Some(token.as_str()));
    assert_eq!(harness.session.client().token().as_deref(), Some(token.as_str()));
    assert_eq!(harness.metrics.transition_count("login"), 1);
}

#[test]
fn bootstrap_with_valid_viewer_token_starts_authenticated() {
    let token = issue_token(&TokenFields {
        role: "VIEWER",
        profile_incomplete: false,
        ..TokenFields::default()
    });
    let harness = Harness::with_persisted(&token);

    let identity = harness.session.identity().expect("session restored");
    assert_eq!(identity.role, Role::Viewer);
    assert!(!identity.profile_incomplete);
    assert_eq!(harness.session.client().token().as_deref(), Some(token.as_str()));
    assert_eq!(harness.metrics.transition_count("restore"), 1);
}

#[test]
fn bootstrap_with_corrupted_token_clears_storage() {
    let harness = Harness::with_persisted("definitely.not.a-token");

    assert_eq!(harness.session.state(), SessionState::Unauthenticated);
    assert_eq!(harness.persisted(), None);
    assert_eq!(harness.session.client().token(), None);
    assert_eq!(harness.metrics.decode_failure_count(), 1);
}

#[test]
fn bootstrap_with_expired_token_behaves_as_logged_out() {
    let harness = Harness::with_persisted(&expired_token());

    assert!(!harness.session.is_authenticated());
    assert_eq!(harness.persisted(), None);
}

#[test]
fn login_with_undecodable_token_ends_unauthenticated() {
    let harness = Harness::start();
    let good = issue_token(&TokenFields::default());
    harness.session.login(&good).expect("first login");

    let err = harness
        .session
        .login("garbage")
        .expect_err("undecodable token rejected");

    assert!(matches!(err, SessionError::InvalidToken(_)));
    assert_eq!(err.to_string(), "please log in");
    assert_eq!(harness.session.state(), SessionState::Unauthenticated);
    assert_eq!(harness.persisted(), None);
    assert_eq!(harness.session.client().token(), None);
}

#[test]
fn malformed_tokens_never_leave_a_session_behind() {
    let harness = Harness::start();
    for candidate in ["", " ", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.e30.sig", "ey.ey.ey", "\u{feff}"] {
        assert!(harness.session.login(candidate).is_err(), "accepted {candidate:?}");
        assert!(!harness.session.is_authenticated());
        assert_eq!(harness.persisted(), None);
    }
}

#[test]
fn logout_is_idempotent() {
    let harness = Harness::start();
    harness
        .session
        .login(&issue_token(&TokenFields::default()))
        .expect("login");

    harness.session.logout();
    let after_first = harness.session.state();
    harness.session.logout();

    assert_eq!(harness.session.state(), after_first);
    assert_eq!(after_first, SessionState::Unauthenticated);
    assert_eq!(harness.persisted(), None);
    assert_eq!(harness.metrics.transition_count("logout"), 1);
}

#[test]
fn logout_without_session_records_no_transition() {
    let harness = Harness::start();
    harness.session.logout();
    assert!(!harness.session.is_authenticated());
    assert_eq!(harness.persisted(), None);
    assert_eq!(harness.metrics.transition_count("logout"), 0);
}

#[test]
fn logout_erases_token_the_context_never_adopted() {
    let token = issue_token(&TokenFields::default());
    let store = MemoryTokenStore::with_token(&token);
    let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(1)).expect("client");
    let session = SessionContext::builder(client)
        .with_store(store.clone())
        .build();
    assert!(!session.is_authenticated());

    session.logout();
    assert_eq!(store.read(), None);

    let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(1)).expect("client");
    let restarted = SessionContext::builder(client)
        .with_store(store.clone())
        .bootstrap();
    assert!(!restarted.is_authenticated());
}

#[test]
fn file_store_session_survives_restart() {
    let dir = tempdir().expect("tempdir");
    let token = issue_token(&TokenFields {
        id: 8,
        role: "SUPERUSER",
        ..TokenFields::default()
    });

    {
        let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(1)).expect("client");
        let session = SessionContext::builder(client)
            .with_store(FileTokenStore::new(dir.path()))
            .build();
        session.login(&token).expect("login");
    }

    let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(1)).expect("client");
    let session = SessionContext::builder(client)
        .with_store(FileTokenStore::new(dir.path()))
        .bootstrap();
    assert_eq!(session.identity().map(|identity| identity.id), Some(8));

    session.logout();
    assert_eq!(FileTokenStore::new(dir.path()).read(), None);
}

#[tokio::test]
async fn refresh_adopts_completed_profile_before_returning() {
    let harness = Harness::start();
    let incomplete = issue_token(&TokenFields {
        id: 4,
        profile_incomplete: true,
        ..TokenFields::default()
    });
    let complete = issue_token(&TokenFields {
        id: 4,
        sector: Some("Aereos"),
        profile_incomplete: false,
        ..TokenFields::default()
    });
    harness.session.login(&incomplete).expect("login");

    let refresh = harness.server.mock(|when, then| {
        when.method(POST)
            .path("/login/refresh-token")
            .header(ACCESS_TOKEN_HEADER, incomplete.as_str());
        then.status(200).json_body(json!({ "token": complete.as_str() }));
    });

    let identity = harness.session.refresh().await.expect("refresh succeeds");

    refresh.assert();
    assert!(!identity.profile_incomplete);
    assert_eq!(identity.sector.as_deref(), Some("Aereos"));
    assert_eq!(harness.session.token().as_deref(), Some(complete.as_str()));
    assert_eq!(harness.persisted().as_deref(), Some(complete.as_str()));
}

#[tokio::test]
async fn refresh_without_session_is_rejected_locally() {
    let harness = Harness::start();
    let refresh = harness.server.mock(|when, then| {
        when.path("/login/refresh-token");
        then.status(200);
    });

    let err = harness.session.refresh().await.expect_err("no session");
    assert!(matches!(err, SessionError::NotAuthenticated));
    assert_eq!(refresh.hits(), 0);
}

#[tokio::test]
async fn refresh_finishing_after_logout_does_not_resurrect_session() {
    let harness = Harness::start();
    let token = issue_token(&TokenFields::default());
    let refreshed = issue_token(&TokenFields {
        id: 2,
        ..TokenFields::default()
    });
    harness.session.login(&token).expect("login");

    harness.server.mock(|when, then| {
        when.method(POST).path("/login/refresh-token");
        then.status(200)
            .delay(Duration::from_millis(300))
            .json_body(json!({ "token": refreshed }));
    });

    let session = harness.session.clone();
    let (result, _) = tokio::join!(harness.session.refresh(), async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.logout();
    });

    assert!(matches!(result, Err(SessionError::Superseded)));
    assert!(!harness.session.is_authenticated());
    assert_eq!(harness.persisted(), None);
}
