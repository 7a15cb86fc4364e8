mod common;

use anyhow::Result;

use erp_auth_client::client::Navigator;
use erp_auth_client::config::Environment;
use erp_auth_client::routing::LOGIN_ROUTE;
use erp_auth_client::session::SessionStore;

#[tokio::test]
async fn verify_persists_token_and_profile_together() -> Result<()> {
    let stack = common::dev_stack();
    stack
        .transport
        .push_ok(200, common::verify_response("site_supervisor", "tok-77"));

    let session = stack.auth.verify_code("user@example.com", "123456").await?;
    assert_eq!(session.access_token, "tok-77");
    assert_eq!(session.user.role, "site_supervisor");

    let stored = stack.store.read().expect("session must be persisted");
    assert!(!stored.access_token.is_empty());
    assert_eq!(stored.access_token, "tok-77");
    assert_eq!(stored.user.role, "site_supervisor");
    Ok(())
}

#[tokio::test]
async fn failed_verify_persists_nothing() -> Result<()> {
    let stack = common::dev_stack();
    stack
        .transport
        .push_ok(401, serde_json::json!({ "error": "expired" }));

    assert!(stack.auth.verify_code("user@example.com", "123456").await.is_err());
    assert!(stack.store.read().is_none());
    assert!(stack.store.token().is_none());
    Ok(())
}

#[tokio::test]
async fn logout_clears_locally_even_when_network_fails() -> Result<()> {
    let stack = common::stack(Environment::Development, "/dashboard/accounts");
    stack
        .transport
        .push_ok(200, common::verify_response("accounts", "tok-88"));
    stack.auth.verify_code("user@example.com", "123456").await?;
    assert!(stack.auth.is_authenticated());

    stack.transport.push_network_err("connection refused");
    stack.auth.logout().await;

    assert!(!stack.auth.is_authenticated());
    assert!(stack.store.read().is_none());
    assert_eq!(stack.navigator.current_route(), LOGIN_ROUTE);
    Ok(())
}

#[tokio::test]
async fn logout_clears_locally_on_backend_rejection() -> Result<()> {
    let stack = common::stack(Environment::Development, "/dashboard/design");
    stack
        .transport
        .push_ok(200, common::verify_response("design", "tok-99"));
    stack.auth.verify_code("user@example.com", "123456").await?;

    stack
        .transport
        .push_ok(500, serde_json::json!({ "error": "boom" }));
    stack.auth.logout().await;

    assert!(!stack.auth.is_authenticated());
    assert_eq!(stack.navigator.current_route(), LOGIN_ROUTE);
    Ok(())
}

#[tokio::test]
async fn current_user_refreshes_profile_next_to_existing_token() -> Result<()> {
    let stack = common::dev_stack();
    stack
        .transport
        .push_ok(200, common::verify_response("estimation", "tok-11"));
    stack.auth.verify_code("user@example.com", "123456").await?;

    // Backend role changed since login; the refresh overwrites the cache.
    stack.transport.push_ok(200, common::self_response("accounts"));
    let user = stack.auth.current_user().await?;
    assert_eq!(user.role, "accounts");

    let stored = stack.store.read().unwrap();
    assert_eq!(stored.access_token, "tok-11", "token must survive the refresh");
    assert_eq!(stored.user.role, "accounts");
    Ok(())
}

#[tokio::test]
async fn cached_reads_degrade_gracefully_without_session() -> Result<()> {
    let stack = common::dev_stack();

    assert!(!stack.auth.is_authenticated());
    assert_eq!(stack.auth.role(), None);
    assert!(stack.auth.permissions().is_empty());
    assert!(!stack.auth.has_permission("purchase.read"));
    assert!(!stack.auth.has_role("procurement"));
    assert!(!stack.auth.has_any_role(&["procurement", "design"]));
    assert_eq!(stack.transport.request_count(), 0, "pure reads never call the network");
    Ok(())
}

#[tokio::test]
async fn cached_reads_reflect_stored_profile() -> Result<()> {
    let stack = common::dev_stack();
    stack
        .transport
        .push_ok(200, common::verify_response("procurement", "tok-22"));
    stack.auth.verify_code("user@example.com", "123456").await?;

    assert_eq!(stack.auth.role().as_deref(), Some("procurement"));
    assert!(stack.auth.has_permission("purchase.read"));
    assert!(!stack.auth.has_permission("payroll.approve"));
    assert!(stack.auth.has_role("procurement"));
    assert!(stack.auth.has_any_role(&["design", "procurement"]));
    Ok(())
}

#[tokio::test]
async fn otp_echo_is_redacted_in_production() -> Result<()> {
    let stack = common::stack(Environment::Production, LOGIN_ROUTE);
    stack
        .transport
        .push_ok(200, common::login_response("user@example.com"));

    let issued = stack.auth.request_code("user@example.com", None).await?;
    assert_eq!(issued.otp, None, "production must never surface the code");

    let dev = common::dev_stack();
    dev.transport
        .push_ok(200, common::login_response("user@example.com"));
    let issued = dev.auth.request_code("user@example.com", None).await?;
    assert_eq!(issued.otp.as_deref(), Some("123456"));
    Ok(())
}
