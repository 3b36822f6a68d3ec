use std::sync::Arc;

use anyhow::Result;
use gym_cli::api::ApiClient;
use gym_cli::config::Config;
use gym_cli::guard::{GuardOutcome, RouteGuard, ADMIN_FORBIDDEN, ADMIN_REQUIRED};
use gym_cli::models::User;
use gym_cli::notify::MemoryNotifier;
use gym_cli::routes::Route;
use gym_cli::session::{Session, SessionStore, ADMIN_DATA_KEY, AUTH_COOKIE, AUTH_KEY};
use gym_cli::storage::Storage;
use mockito::Server;

fn setup(base_url: &str) -> Result<(RouteGuard, Arc<SessionStore>, Arc<MemoryNotifier>)> {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();

    let session = Arc::new(SessionStore::new(Storage::temporary()?, &config.session));
    let notices = Arc::new(MemoryNotifier::default());
    let api = Arc::new(ApiClient::new(&config, session.clone(), notices.clone())?);

    Ok((RouteGuard::new(api), session, notices))
}

const MEMBER: &str = r#"{"_id":"u1","name":"Asha","email":"asha@example.com","role":0}"#;
const ADMIN: &str = r#"{"_id":"a1","name":"Root","email":"root@example.com","role":1}"#;

fn user(json: &str) -> User {
    serde_json::from_str(json).unwrap()
}

#[tokio::test]
async fn test_unauthenticated_user_is_sent_to_login() -> Result<()> {
    let (guard, _, notices) = setup("http://127.0.0.1:9")?;

    for route in [
        Route::Exercises,
        Route::MyFeedbacks,
        Route::AdminDashboard,
        Route::EditPlan { id: "p1".into() },
    ] {
        let outcome = guard.check(&route).await?;
        assert_eq!(
            outcome,
            GuardOutcome::Redirect(Route::Login {
                return_to: Some(route.path())
            })
        );
    }

    assert!(notices.toasts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_member_on_admin_route_is_redirected() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/auth/user-auth")
        .match_header("authorization", "Bearer tok-m")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"success":true,"user":{MEMBER}}}"#))
        .create_async()
        .await;

    let (guard, session, notices) = setup(&server.url())?;
    session.set_auth(Session::new(Some(user(MEMBER)), "tok-m"), true)?;

    let outcome = guard.check(&Route::AdminPlans).await?;

    mock.assert_async().await;
    assert!(matches!(outcome, GuardOutcome::Redirect(Route::Login { .. })));
    assert_eq!(notices.errors(), vec![ADMIN_REQUIRED.to_string()]);
    assert!(session.token()?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_verified_admin_renders_admin_route() -> Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/auth/user-auth")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"success":true,"ok":true,"user":{ADMIN}}}"#))
        .create_async()
        .await;

    let (guard, session, notices) = setup(&server.url())?;
    session.set_auth(Session::new(Some(user(ADMIN)), "tok-a"), true)?;

    let outcome = guard.check(&Route::AdminDashboard).await?;

    let GuardOutcome::Render(verified) = outcome else {
        panic!("expected the dashboard to render");
    };
    assert!(verified.is_admin());
    assert_eq!(verified.token, "tok-a");
    assert!(session.storage().get_item(ADMIN_DATA_KEY)?.is_some());
    assert!(session.storage().get_item(AUTH_KEY)?.is_none());
    assert!(notices.toasts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_member_renders_user_route() -> Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/auth/user-auth")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"success":true,"user":{MEMBER}}}"#))
        .create_async()
        .await;

    let (guard, session, _) = setup(&server.url())?;
    session.set_auth(Session::new(Some(user(MEMBER)), "tok-m"), true)?;

    let outcome = guard.check(&Route::Favorites).await?;
    assert!(matches!(outcome, GuardOutcome::Render(ref s) if s.user.as_ref().unwrap().id == "u1"));
    Ok(())
}

#[tokio::test]
async fn test_rejected_token_clears_session() -> Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/auth/user-auth")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":false}"#)
        .create_async()
        .await;

    let (guard, session, notices) = setup(&server.url())?;
    session.set_auth(Session::new(Some(user(MEMBER)), "tok-old"), true)?;

    let outcome = guard.check(&Route::Plans).await?;

    assert!(matches!(outcome, GuardOutcome::Redirect(Route::Login { .. })));
    assert_eq!(notices.errors(), vec!["Authentication failed".to_string()]);
    assert!(session.storage().get_item(AUTH_KEY)?.is_none());
    assert!(session.cookie_token()?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_forbidden_admin_check_uses_permission_message() -> Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/auth/user-auth")
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Forbidden"}"#)
        .create_async()
        .await;

    let (guard, session, notices) = setup(&server.url())?;
    session.set_auth(Session::new(Some(user(ADMIN)), "tok-a"), true)?;

    guard.check(&Route::Subscribers).await?;
    assert_eq!(notices.errors(), vec![ADMIN_FORBIDDEN.to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_local_storage_token_reissues_cookie() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/auth/user-auth")
        .match_header("authorization", "Bearer tok-m")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"success":true,"user":{MEMBER}}}"#))
        .create_async()
        .await;

    let (guard, session, _) = setup(&server.url())?;
    session.set_auth(Session::new(Some(user(MEMBER)), "tok-m"), true)?;
    session.storage().remove_cookie(AUTH_COOKIE)?;
    assert!(session.cookie_token()?.is_none());

    let outcome = guard.check(&Route::MyFeedbacks).await?;

    mock.assert_async().await;
    assert!(matches!(outcome, GuardOutcome::Render(_)));
    assert_eq!(session.cookie_token()?.as_deref(), Some("tok-m"));
    Ok(())
}

#[tokio::test]
async fn test_navigation_during_verification_supersedes_check() -> Result<()> {
    let mut server = Server::new_async().await;
    let (guard, session, notices) = setup(&server.url())?;
    let guard = Arc::new(guard);
    session.set_auth(Session::new(Some(user(MEMBER)), "tok-m"), true)?;
    let before = session.current();

    // The user moves on while the token is still being verified
    let navigator = guard.clone();
    let mock = server
        .mock("GET", "/api/v1/auth/user-auth")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |_| {
            navigator.navigate(&Route::Plans);
            format!(r#"{{"success":true,"user":{ADMIN}}}"#).into_bytes()
        })
        .create_async()
        .await;

    let outcome = guard.check(&Route::Favorites).await?;

    mock.assert_async().await;
    assert_eq!(outcome, GuardOutcome::Superseded);
    assert_eq!(session.current(), before);
    assert!(session.storage().get_item(ADMIN_DATA_KEY)?.is_none());
    assert!(notices.toasts().is_empty());
    Ok(())
}
