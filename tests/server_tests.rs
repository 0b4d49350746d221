//! Integration tests for the formshive HTTP API server.
//!
//! These tests use axum-test to make requests against the router without
//! starting a real server, with a stub standing in for the remote API.

#![cfg(feature = "server")]

mod common;

use axum::http::StatusCode;
use common::{ENDPOINT, INCOMPLETE_FORM_ID, MISSING_FORM_ID, READY_FORM_ID, TOKEN, TestApp};
use formshive::{Framework, Settings};
use serde_json::{Value, json};

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("ok");

    Ok(())
}

// =============================================================================
// Form CRUD Tests
// =============================================================================

#[tokio::test]
async fn test_save_and_get_form() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.save_contact("Contact").await;

    let response = app.server.get(&format!("/api/v1/forms/{}", id)).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["name"], "Contact");
    assert_eq!(body["form_id"], READY_FORM_ID);
    assert_eq!(body["type"], "create");
    assert_eq!(body["framework"], "bootstrap");
    assert_eq!(body["status"], "active");
    assert_eq!(body["form_data"]["submit_text"], "Send");
    assert_eq!(body["form_data"]["fields"][1]["options"][1]["label"], "Support");

    Ok(())
}

#[tokio::test]
async fn test_unsupported_framework_is_coerced() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app
        .save_form(json!({
            "name": "Contact",
            "form_id": READY_FORM_ID,
            "type": "embed",
            "framework": "tailwind",
        }))
        .await;

    let body: Value = app.server.get(&format!("/api/v1/forms/{}", id)).await.json();
    assert_eq!(body["framework"], "formshive");

    Ok(())
}

#[tokio::test]
async fn test_form_data_as_json_string() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let form_data = json!({ "fields": [{ "type": "email", "name": "email" }] }).to_string();
    let id = app
        .save_form(json!({
            "name": "Newsletter",
            "form_id": READY_FORM_ID,
            "type": "create",
            "form_data": form_data,
        }))
        .await;

    let body: Value = app.server.get(&format!("/api/v1/forms/{}", id)).await.json();
    assert_eq!(body["form_data"]["fields"][0]["type"], "email");

    Ok(())
}

#[tokio::test]
async fn test_validation_errors_are_aggregated() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app
        .server
        .post("/api/v1/forms")
        .json(&json!({ "name": "", "form_id": "", "type": "embed" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(
        body["error"]["details"]["messages"],
        json!(["Form name is required", "Form ID is required"])
    );

    Ok(())
}

#[tokio::test]
async fn test_invalid_fields_are_reported_by_position() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app
        .server
        .post("/api/v1/forms")
        .json(&json!({
            "name": "Broken",
            "form_id": READY_FORM_ID,
            "type": "create",
            "form_data": { "fields": [
                { "type": "text", "name": "ok" },
                { "type": "color", "name": "" }
            ] }
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["details"]["messages"],
        json!(["Field 2: type 'color' is not supported", "Field 2: name is required"])
    );

    Ok(())
}

#[tokio::test]
async fn test_update_form() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.save_embed("Contact", READY_FORM_ID).await;

    // Warm the cache before updating.
    app.server.get(&format!("/api/v1/forms/{}", id)).await.assert_status_ok();

    let saved = app
        .save_form(json!({
            "id": id,
            "name": "Contact (EU)",
            "form_id": READY_FORM_ID,
            "type": "embed",
            "framework": "bulma",
        }))
        .await;
    assert_eq!(saved, id);

    let body: Value = app.server.get(&format!("/api/v1/forms/{}", id)).await.json();
    assert_eq!(body["name"], "Contact (EU)");
    assert_eq!(body["framework"], "bulma");

    Ok(())
}

#[tokio::test]
async fn test_update_missing_form() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app
        .server
        .post("/api/v1/forms")
        .json(&json!({
            "id": 42,
            "name": "Ghost",
            "form_id": READY_FORM_ID,
            "type": "embed",
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "FORM_NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn test_delete_form() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.save_embed("Contact", READY_FORM_ID).await;

    app.server
        .delete(&format!("/api/v1/forms/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get(&format!("/api/v1/forms/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .delete(&format!("/api/v1/forms/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_ids_are_not_reused_after_delete() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let first = app.save_embed("First", READY_FORM_ID).await;
    app.server
        .delete(&format!("/api/v1/forms/{}", first))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let second = app.save_embed("Second", READY_FORM_ID).await;
    assert!(second > first);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_form() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.save_contact("Contact").await;

    let response = app
        .server
        .post(&format!("/api/v1/forms/{}/duplicate", id))
        .await;
    response.assert_status_ok();
    let new_id = response.json::<Value>()["new_form_id"].as_u64().unwrap();
    assert_ne!(new_id, id);

    let original: Value = app.server.get(&format!("/api/v1/forms/{}", id)).await.json();
    let copy: Value = app.server.get(&format!("/api/v1/forms/{}", new_id)).await.json();
    assert_eq!(copy["name"], "Contact (Copy)");
    assert_eq!(copy["form_id"], original["form_id"]);
    assert_eq!(copy["type"], original["type"]);
    assert_eq!(copy["framework"], original["framework"]);
    assert_eq!(copy["form_data"], original["form_data"]);

    app.server
        .post("/api/v1/forms/999/duplicate")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_list_and_status_filter() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let first = app.save_embed("First", READY_FORM_ID).await;
    let second = app.save_contact("Second").await;

    app.server
        .put(&format!("/api/v1/forms/{}/status", first))
        .json(&json!({ "status": "inactive" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let active: Vec<Value> = app.server.get("/api/v1/forms").await.json();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], second);

    let inactive: Vec<Value> = app
        .server
        .get("/api/v1/forms")
        .add_query_param("status", "inactive")
        .await
        .json();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0]["id"], first);

    let all: Vec<Value> = app
        .server
        .get("/api/v1/forms")
        .add_query_param("status", "all")
        .await
        .json();
    let ids: Vec<u64> = all.iter().filter_map(|f| f["id"].as_u64()).collect();
    assert_eq!(ids, vec![second, first]);

    app.server
        .get("/api/v1/forms")
        .add_query_param("status", "archived")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_invalid_status_change() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.save_embed("Contact", READY_FORM_ID).await;

    let response = app
        .server
        .put(&format!("/api/v1/forms/{}/status", id))
        .json(&json!({ "status": "paused" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "INVALID_STATUS");

    Ok(())
}

#[tokio::test]
async fn test_stats_follow_writes() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let empty: Value = app.server.get("/api/v1/stats").await.json();
    assert_eq!(empty, json!({ "total": 0, "active": 0, "embed_count": 0, "create_count": 0 }));

    let embed = app.save_embed("Embed", READY_FORM_ID).await;
    app.save_contact("Create").await;
    app.server
        .put(&format!("/api/v1/forms/{}/status", embed))
        .json(&json!({ "status": "inactive" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stats: Value = app.server.get("/api/v1/stats").await.json();
    assert_eq!(stats, json!({ "total": 2, "active": 1, "embed_count": 1, "create_count": 1 }));

    Ok(())
}

// =============================================================================
// Auth Tests
// =============================================================================

#[tokio::test]
async fn test_write_routes_require_token() -> anyhow::Result<()> {
    let app = TestApp::with_auth()?;
    let body = json!({ "name": "Contact", "form_id": READY_FORM_ID, "type": "embed" });

    let response = app.server.post("/api/v1/forms").json(&body).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"]["code"], "UNAUTHORIZED");

    app.server
        .post("/api/v1/forms")
        .authorization_bearer("wrong")
        .json(&body)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/api/v1/forms")
        .authorization_bearer(TOKEN)
        .json(&body)
        .await;
    response.assert_status_ok();
    let id = response.json::<Value>()["form_id"].as_u64().unwrap();

    // Reads stay public.
    app.server
        .get(&format!("/api/v1/forms/{}", id))
        .await
        .assert_status_ok();
    app.server
        .get("/render")
        .add_query_param("id", id)
        .await
        .assert_status_ok();

    Ok(())
}

// =============================================================================
// Remote Form Tests
// =============================================================================

#[tokio::test]
async fn test_validate_url() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app
        .server
        .post("/api/v1/validate-url")
        .json(&json!({ "url": format!("https://api.formshive.com/v1/digest/{}", READY_FORM_ID) }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "form_id": READY_FORM_ID }));
    assert_eq!(
        app.api.requests(),
        vec![format!("{}/forms/{}/html?iframe=false", ENDPOINT, READY_FORM_ID)]
    );

    Ok(())
}

#[tokio::test]
async fn test_validate_url_errors() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let cases = [
        ("https://example.com/other/path".to_string(), StatusCode::BAD_REQUEST, "INVALID_FORM_URL"),
        (
            format!("https://api.formshive.com/v1/digest/{}", MISSING_FORM_ID),
            StatusCode::NOT_FOUND,
            "REMOTE_FORM_NOT_FOUND",
        ),
        (
            format!("https://api.formshive.com/v1/digest/{}", INCOMPLETE_FORM_ID),
            StatusCode::UNPROCESSABLE_ENTITY,
            "REMOTE_FORM_INCOMPLETE",
        ),
    ];

    for (url, status, code) in cases {
        let response = app
            .server
            .post("/api/v1/validate-url")
            .json(&json!({ "url": url }))
            .await;
        response.assert_status(status);
        assert_eq!(response.json::<Value>()["error"]["code"], code);
    }

    Ok(())
}

// =============================================================================
// Render Tests
// =============================================================================

#[tokio::test]
async fn test_render_created_form() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.save_contact("Contact").await;

    let response = app.server.get("/render").add_query_param("id", id).await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains(r#"class="formshive-created-form""#));
    assert!(html.contains(&format!(r#"action="{}/forms/{}/submit""#, ENDPOINT, READY_FORM_ID)));
    assert!(html.contains(r#"<option value="">Pick one</option><option value="sales">Sales</option><option value="support">Support</option>"#));
    assert!(html.contains(">Send</button>"));
    assert!(app.api.requests().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_render_with_blank_attributes() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.save_contact("Contact").await;

    let response = app
        .server
        .get("/render")
        .add_query_param("id", "")
        .add_query_param("form_id", READY_FORM_ID)
        .add_query_param("framework", "")
        .await;
    response.assert_status_ok();
    assert!(response.text().contains(r#"class="formshive-created-form""#));

    let html = app
        .server
        .get("/render")
        .add_query_param("id", "")
        .add_query_param("form_id", "")
        .add_query_param("framework", "")
        .await
        .text();
    assert_eq!(html, r#"<div class="formshive-error">Form not found.</div>"#);

    Ok(())
}

#[tokio::test]
async fn test_render_embed_is_cached() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.save_embed("Contact", READY_FORM_ID).await;

    for _ in 0..2 {
        let response = app
            .server
            .get("/render")
            .add_query_param("form_id", READY_FORM_ID)
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("<form>ready</form>"));
    }
    assert_eq!(
        app.api.requests(),
        vec![format!(
            "{}/forms/{}/html?iframe=false&css_framework=bootstrap",
            ENDPOINT, READY_FORM_ID
        )]
    );

    let bulma = app
        .server
        .get("/render")
        .add_query_param("form_id", READY_FORM_ID)
        .add_query_param("framework", "bulma")
        .await
        .text();
    assert!(bulma.contains(r#"data-framework="bulma""#));
    assert_eq!(app.api.requests().len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_cache_invalidation() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.save_embed("Contact", READY_FORM_ID).await;

    app.server.get("/render").add_query_param("id", id).await.assert_status_ok();
    assert_eq!(app.api.requests().len(), 1);

    let response = app
        .server
        .post("/api/v1/cache/invalidate")
        .json(&json!({ "form_id": READY_FORM_ID }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "removed": 1 }));

    app.server.get("/render").add_query_param("id", id).await.assert_status_ok();
    assert_eq!(app.api.requests().len(), 2);

    let response = app
        .server
        .post("/api/v1/cache/invalidate")
        .json(&json!({}))
        .await;
    assert_eq!(response.json::<Value>(), json!({ "removed": 1 }));

    Ok(())
}

#[tokio::test]
async fn test_render_error_fragments() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let missing_remote = app.save_embed("Gone", MISSING_FORM_ID).await;
    let empty = app
        .save_form(json!({ "name": "Empty", "form_id": READY_FORM_ID, "type": "create" }))
        .await;

    let cases = [
        (missing_remote.to_string(), "Unable to load form."),
        (empty.to_string(), "No form fields configured."),
        ("999".to_string(), "Form not found."),
    ];
    for (id, message) in cases {
        let html = app.server.get("/render").add_query_param("id", &id).await.text();
        assert_eq!(html, format!(r#"<div class="formshive-error">{}</div>"#, message));
    }

    let html = app.server.get("/render").await.text();
    assert_eq!(html, r#"<div class="formshive-error">Form not found.</div>"#);

    Ok(())
}

#[tokio::test]
async fn test_reload_settings() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.save_contact("Contact").await;

    app.state.reload_settings(
        Settings::default()
            .with_endpoint("https://forms.example.org/v2/")
            .with_default_framework(Framework::Bulma),
    );
    assert_eq!(app.state.settings().default_framework, Framework::Bulma);

    let html = app.server.get("/render").add_query_param("id", id).await.text();
    assert!(html.contains(&format!(
        r#"action="https://forms.example.org/v2/forms/{}/submit""#,
        READY_FORM_ID
    )));

    let new_id = app
        .save_form(json!({ "name": "Later", "form_id": READY_FORM_ID, "type": "embed" }))
        .await;
    let body: Value = app.server.get(&format!("/api/v1/forms/{}", new_id)).await.json();
    assert_eq!(body["framework"], "bulma");

    Ok(())
}
