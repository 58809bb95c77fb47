mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

async fn seeded() -> Result<common::TestServer> {
    let server = common::TestServer::spawn().await?;
    for (name, age) in [("ana", 31), ("bo", 25), ("cy", 40), ("di", 19), ("ed", 52)] {
        server.create("people", json!({ "name": name, "age": age })).await?;
    }
    Ok(server)
}

fn names(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|r| r["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn list_without_params_returns_first_page() -> Result<()> {
    let server = seeded().await?;

    let (status, body) = server.list("people", &[]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["ana", "bo", "cy", "di", "ed"]);

    Ok(())
}

#[tokio::test]
async fn query_filters_documents() -> Result<()> {
    let server = seeded().await?;

    let (status, body) = server.list("people", &[("query", r#"{"age":{"$gte":30}}"#)]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["ana", "cy", "ed"]);

    Ok(())
}

#[tokio::test]
async fn query_by_hex_id_matches_stored_object_id() -> Result<()> {
    let server = seeded().await?;
    let created = server.create("people", json!({ "name": "fay" })).await?;
    let id = created["_id"].as_str().unwrap_or_default().to_string();

    let query = format!(r#"{{"_id":"{}"}}"#, id);
    let (status, body) = server.list("people", &[("query", &query)]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["fay"]);

    Ok(())
}

#[tokio::test]
async fn fields_include_and_exclude() -> Result<()> {
    let server = seeded().await?;

    let (_, body) = server.list("people", &[("fields", "name"), ("limit", "1")]).await?;
    let row = body[0].as_object().cloned().unwrap_or_default();
    let keys: Vec<&str> = row.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["_id", "name"]);

    let (_, body) = server.list("people", &[("fields", "-age,-_id"), ("limit", "1")]).await?;
    assert_eq!(body, json!([{ "name": "ana" }]));

    Ok(())
}

#[tokio::test]
async fn page_and_limit_window_results() -> Result<()> {
    let server = seeded().await?;

    let (_, body) = server.list("people", &[("page", "2"), ("limit", "2")]).await?;
    assert_eq!(names(&body), vec!["cy", "di"]);

    let (_, body) = server.list("people", &[("page", "3"), ("limit", "2")]).await?;
    assert_eq!(names(&body), vec!["ed"]);

    let (_, body) = server.list("people", &[("page", "9"), ("limit", "2")]).await?;
    assert_eq!(body, json!([]));

    Ok(())
}

#[tokio::test]
async fn bad_page_values_fall_back_to_defaults() -> Result<()> {
    let server = seeded().await?;

    let (status, body) = server.list("people", &[("page", "zero"), ("limit", "-4")]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body).len(), 5);

    Ok(())
}

#[tokio::test]
async fn malformed_query_is_bad_request() -> Result<()> {
    let server = seeded().await?;

    let (status, body) = server.list("people", &[("query", "{not json")]).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_FILTER");

    let (status, _) = server.list("people", &[("query", "[1,2]")]).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn fields_id_only_returns_just_ids() -> Result<()> {
    let server = seeded().await?;

    let (status, body) = server.list("people", &[("fields", "_id"), ("limit", "2")]).await?;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 2);
    for row in rows {
        let keys: Vec<String> = row.as_object().map(|o| o.keys().cloned().collect()).unwrap_or_default();
        assert_eq!(keys, vec!["_id".to_string()]);
    }

    Ok(())
}

#[tokio::test]
async fn undecodable_query_string_uses_error_shape() -> Result<()> {
    let server = seeded().await?;

    let (status, body) = server.list("people", &[("page", "1"), ("page", "2")]).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    Ok(())
}
