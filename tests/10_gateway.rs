mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crm_gateway::config::AppConfig;

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let server = common::TestServer::spawn(common::test_config()).await?;
    let res = reqwest::get(server.url("/")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "CRM Gateway");
    Ok(())
}

#[tokio::test]
async fn health_without_database_is_still_live() -> Result<()> {
    let server = common::TestServer::spawn(common::test_config()).await?;
    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "not_configured");
    Ok(())
}

#[tokio::test]
async fn unknown_routes_carry_their_path() -> Result<()> {
    let server = common::TestServer::spawn(common::test_config()).await?;
    let res = reqwest::get(server.url("/api/v1/nope")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({ "success": false, "error": "Not Found", "path": "/api/v1/nope" }));
    Ok(())
}

#[tokio::test]
async fn records_without_any_database_are_not_found() -> Result<()> {
    let server = common::TestServer::spawn(common::test_config()).await?;
    let res = reqwest::get(server.url("/api/v1/warranties")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["success"], false);
    Ok(())
}

#[tokio::test]
async fn refs_are_hidden_in_production() -> Result<()> {
    let mut config = AppConfig::production();
    config.database.default_url = Some("postgres://unused@127.0.0.1:9/unused".into());
    let server = common::TestServer::spawn(config).await?;

    let res = reqwest::get(server.url("/api/v1/client-followup-notes?ref=acme")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["error"], "Not Found");
    Ok(())
}

#[tokio::test]
async fn malformed_refs_are_rejected_before_connecting() -> Result<()> {
    let server = common::TestServer::spawn(common::test_config()).await?;
    let res = reqwest::get(server.url("/api/v1/warranties?ref=acme%3Bdrop")).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert!(body["field_errors"]["ref"].is_string(), "unexpected body: {}", body);
    Ok(())
}

#[tokio::test]
async fn booking_requires_calendar_and_start() -> Result<()> {
    let server = common::TestServer::spawn(common::test_config()).await?;
    let res = reqwest::Client::new()
        .post(server.url("/api/v1/calendar/event"))
        .json(&json!({ "summary": "Visit" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert!(body["field_errors"]["calendarId"].is_string());
    assert!(body["field_errors"]["startDateTime"].is_string());
    Ok(())
}

#[tokio::test]
async fn calendar_without_credentials_is_an_upstream_error() -> Result<()> {
    let server = common::TestServer::spawn(common::test_config()).await?;
    let res = reqwest::get(server.url("/api/v1/calendar/list")).await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = res.json::<Value>().await?;
    assert!(body["message"].as_str().unwrap_or_default().contains("CALENDAR_ACCESS_TOKEN"));
    Ok(())
}

#[tokio::test]
async fn invalid_json_gets_the_error_envelope() -> Result<()> {
    let server = common::TestServer::spawn(common::test_config()).await?;
    let res = reqwest::Client::new()
        .post(server.url("/api/v1/calendar/event"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Bad Request");
    Ok(())
}
