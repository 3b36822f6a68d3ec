use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use gym_cli::config::ExerciseDbConfig;
use gym_cli::exercise::{ExerciseDbClient, ExerciseError, RetryConfig, LIMITED_DATA};
use gym_cli::notify::MemoryNotifier;
use mockito::Server;
use tokio_util::sync::CancellationToken;

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_delay_ms: 1,
        max_delay_ms: 5,
        backoff_factor: 2.0,
    }
}

fn client(base_url: &str, api_key: &str) -> Result<(ExerciseDbClient, Arc<MemoryNotifier>)> {
    let config = ExerciseDbConfig {
        base_url: base_url.to_string(),
        api_key: api_key.to_string(),
        ..Default::default()
    };
    let notices = Arc::new(MemoryNotifier::default());
    let client = ExerciseDbClient::new(&config, Duration::from_secs(5), notices.clone())?
        .with_retry(fast_retry());
    Ok((client, notices))
}

#[tokio::test]
async fn test_list_sends_rapidapi_headers_and_normalizes() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/exercises/bodyPart/chest")
        .match_header("x-rapidapi-key", "secret")
        .match_header("x-rapidapi-host", "exercisedb.p.rapidapi.com")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":"0025","name":"barbell bench press","bodyPart":"chest","target":"pectorals"}]"#)
        .create_async()
        .await;

    let (client, notices) = client(&server.url(), "secret")?;
    let exercises = client.list("chest", &CancellationToken::new()).await?;

    mock.assert_async().await;
    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0].target, "pectorals");
    assert_eq!(exercises[0].equipment, "N/A");
    assert!(notices.toasts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_null_fields_do_not_fail_the_listing() -> Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/exercises/bodyPart/chest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"id":"0025","name":"barbell bench press","bodyPart":"chest","target":null},
                {"id":"0047","name":"push-up","bodyPart":null,"equipment":"body weight"}]"#,
        )
        .create_async()
        .await;

    let (client, notices) = client(&server.url(), "secret")?;
    let exercises = client.list("chest", &CancellationToken::new()).await?;

    assert_eq!(exercises.len(), 2);
    assert_eq!(exercises[0].target, "N/A");
    assert_eq!(exercises[1].body_part, "N/A");
    assert_eq!(exercises[1].equipment, "body weight");
    assert!(notices.toasts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_listing_retries_then_toasts_once() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/exercises")
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let (client, notices) = client(&server.url(), "secret")?;
    let err = client.list("all", &CancellationToken::new()).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, ExerciseError::Status { status: 500, .. }));
    assert_eq!(notices.errors(), vec![LIMITED_DATA.to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_missing_api_key_fails_without_request() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/exercises/bodyPartList")
        .expect(0)
        .create_async()
        .await;

    let (client, _) = client(&server.url(), "")?;
    let err = client.body_parts(&CancellationToken::new()).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, ExerciseError::MissingApiKey));
    Ok(())
}

#[tokio::test]
async fn test_cancelled_listing_is_silent() -> Result<()> {
    let server = Server::new_async().await;
    let (client, notices) = client(&server.url(), "secret")?;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = client.list("all", &cancel).await.unwrap_err();

    assert!(matches!(err, ExerciseError::Cancelled));
    assert!(notices.toasts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_detail_falls_back_to_slug() -> Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/exercises/exercise/dumbbell-fly")
        .with_status(404)
        .create_async()
        .await;

    let (client, _) = client(&server.url(), "secret")?;
    let exercise = client.detail_or_fallback("dumbbell-fly").await;

    assert_eq!(exercise.id, "dumbbell-fly");
    assert_eq!(exercise.name, "Dumbbell Fly");
    assert_eq!(exercise.target, "N/A");
    Ok(())
}
