mod common;

use axum::http::StatusCode;
use common::{
    ADMIN_PASSWORD, ADMIN_USERNAME, USER_PASSWORD, USER_USERNAME, body_text, location,
    session_cookie, spawn_app, spawn_app_with, test_config,
};
use poseidon::api::gate::{AccessRule, GateDecision, GateOutcome};
use poseidon::domain::Role;
use poseidon::services::AccountInput;
use std::time::Duration;

#[tokio::test]
async fn test_public_pages() {
    let app = spawn_app().await;

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("name=\"username\""));
}

#[tokio::test]
async fn test_unauthenticated_requests_redirect_to_login() {
    let app = spawn_app().await;

    for uri in ["/bidList/list", "/user/list", "/metrics", "/logout", "/nowhere"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), Some("/login"), "{uri}");
    }
}

#[tokio::test]
async fn test_admin_login_lands_on_bid_list() {
    let app = spawn_app().await;

    let response = app
        .post_form(
            "/login",
            &format!(
                "username={ADMIN_USERNAME}&password={}",
                urlencoding::encode(ADMIN_PASSWORD)
            ),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/bidList/list"));
    let cookie = session_cookie(&response).unwrap();

    let response = app.get("/bidList/list", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/user/list", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(USER_USERNAME));
}

#[tokio::test]
async fn test_failed_logins_look_the_same() {
    let app = spawn_app().await;

    let wrong_password = app
        .post_form("/login", "username=admin&password=Wrong123%21", None)
        .await;
    assert_eq!(wrong_password.status(), StatusCode::OK);
    assert!(session_cookie(&wrong_password).is_none());
    let wrong_password = body_text(wrong_password).await;

    let unknown_user = app
        .post_form("/login", "username=ghost&password=Wrong123%21", None)
        .await;
    assert_eq!(unknown_user.status(), StatusCode::OK);
    assert!(session_cookie(&unknown_user).is_none());
    let unknown_user = body_text(unknown_user).await;

    assert!(wrong_password.contains("Invalid username or password."));
    assert!(unknown_user.contains("Invalid username or password."));
    assert!(wrong_password.contains("value=\"admin\""));
    assert_eq!(
        wrong_password.replace("value=\"admin\"", ""),
        unknown_user.replace("value=\"ghost\"", "")
    );
}

#[tokio::test]
async fn test_non_admin_denied_user_area() {
    let app = spawn_app().await;
    let cookie = app.login_user().await;

    for uri in ["/user", "/user/list", "/user/add", "/user/update/1", "/user/delete/1"] {
        let response = app.get(uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
        assert!(
            body_text(response)
                .await
                .contains("You are not authorized to access this page.")
        );
    }

    let response = app
        .post_form("/user/validate", "username=x&fullname=x&password=Passw0rd%21&role=ADMIN", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.state.user_service().list().await.unwrap().len(), 2);

    let response = app.get("/bidList/list", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_username_path_is_not_admin_only() {
    let app = spawn_app().await;
    let cookie = app.login_user().await;

    let response = app.get("/username", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_replaces_session_id() {
    let app = spawn_app().await;
    let first = app.login_user().await;

    let response = app
        .post_form(
            "/login",
            &format!(
                "username={ADMIN_USERNAME}&password={}",
                urlencoding::encode(ADMIN_PASSWORD)
            ),
            Some(&first),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let second = session_cookie(&response).unwrap();
    assert_ne!(first, second);

    let response = app.get("/user/list", Some(&second)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/bidList/list", Some(&first)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app.post_form("/logout", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login?logout"));

    let response = app.get("/login?logout", None).await;
    assert!(body_text(response).await.contains("You have been logged out."));

    let response = app.get("/bidList/list", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_metrics_notice_when_disabled() {
    let app = spawn_app().await;
    let cookie = app.login_user().await;

    let response = app.get("/metrics", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Metrics not enabled"));
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = spawn_app().await;
    let response = app.get("/login", None).await;

    assert_eq!(
        response.headers().get("x-frame-options").unwrap(),
        "DENY"
    );
    assert!(response.headers().contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_login_with_reserved_form_characters() {
    let app = spawn_app().await;
    app.state
        .user_service()
        .create(AccountInput {
            username: "desk+ops=1&co".to_string(),
            fullname: "Desk Ops".to_string(),
            role: Role::User,
            password: Some(USER_PASSWORD.to_string()),
        })
        .await
        .unwrap();

    let cookie = app.login("desk+ops=1&co", USER_PASSWORD).await;
    let response = app.get("/", Some(&cookie)).await;
    assert!(body_text(response).await.contains("desk+ops=1&amp;co"));
}

#[tokio::test]
async fn test_admin_home_redirects_to_bid_list() {
    let app = spawn_app().await;

    let response = app.get("/admin/home", None).await;
    assert_eq!(location(&response), Some("/login"));

    let cookie = app.login_user().await;
    let response = app.get("/admin/home", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/bidList/list"));
}

#[tokio::test]
async fn test_inactive_session_expires() {
    let mut config = test_config();
    config.server.session_inactivity_minutes = 0;
    let app = spawn_app_with(config).await;

    let cookie = app.login_user().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let response = app.get("/bidList/list", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_gate_decision_attached_to_response() {
    let app = spawn_app().await;
    let decision = |response: &axum::http::Response<axum::body::Body>| {
        response.extensions().get::<GateDecision>().copied()
    };

    let response = app.get("/login", None).await;
    assert_eq!(
        decision(&response),
        Some(GateDecision {
            rule: AccessRule::Public,
            outcome: GateOutcome::Allowed
        })
    );

    let response = app.get("/bidList/list", None).await;
    assert_eq!(
        decision(&response),
        Some(GateDecision {
            rule: AccessRule::Authenticated,
            outcome: GateOutcome::LoginRequired
        })
    );

    let cookie = app.login_user().await;
    let response = app.get("/user/list", Some(&cookie)).await;
    assert_eq!(
        decision(&response),
        Some(GateDecision {
            rule: AccessRule::Admin,
            outcome: GateOutcome::Denied
        })
    );
}
