mod common;

use axum::http::StatusCode;
use common::{Session, TestApp};
use serde_json::{json, Value};

async fn new_task(app: &TestApp, session: &Session, title: &str) -> anyhow::Result<Value> {
    let customer_id = app.create_customer(session, "Ada").await?;
    let reply = app
        .post(
            "/api/v1/task/task/create",
            &session.token,
            json!({
                "title": title,
                "dueDate": "2026-11-01T09:00:00Z",
                "assignedTo": session.user_id,
                "customerId": customer_id
            }),
        )
        .await?;
    anyhow::ensure!(reply.status == StatusCode::CREATED, "task create failed: {}", reply.body);
    Ok(reply.body["task"].clone())
}

#[tokio::test]
async fn creates_and_fetches_task() -> anyhow::Result<()> {
    let app = TestApp::new();
    let session = app.session("acme", "sales").await?;
    let task = new_task(&app, &session, "Send proposal").await?;
    assert_eq!(task["status"], "pending");
    assert_eq!(task["tenantId"], session.tenant_id.as_str());

    let id = task["id"].as_str().unwrap();
    let fetched = app.get(&format!("/api/v1/task/task/get/{}", id), &session.token).await?;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.message(), "Task retrieved successfully");
    assert_eq!(fetched.body["task"]["title"], "Send proposal");
    assert_eq!(fetched.body["task"]["dueDate"], task["dueDate"]);

    let list = app.get("/api/v1/task/task/get", &session.token).await?;
    assert_eq!(list.body["total"], 1);
    Ok(())
}

#[tokio::test]
async fn create_requires_due_date() -> anyhow::Result<()> {
    let app = TestApp::new();
    let session = app.session("acme", "sales").await?;
    let customer_id = app.create_customer(&session, "Ada").await?;

    let reply = app
        .post(
            "/api/v1/task/task/create",
            &session.token,
            json!({"title": "Call", "assignedTo": session.user_id, "customerId": customer_id}),
        )
        .await?;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["fieldErrors"]["dueDate"].is_string());
    Ok(())
}

#[tokio::test]
async fn update_validates_status() -> anyhow::Result<()> {
    let app = TestApp::new();
    let session = app.session("acme", "sales").await?;
    let task = new_task(&app, &session, "Send proposal").await?;
    let uri = format!("/api/v1/task/task/update/{}", task["id"].as_str().unwrap());

    let invalid = app.put(&uri, &session.token, json!({"status": "archived"})).await?;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let done = app.put(&uri, &session.token, json!({"status": "completed"})).await?;
    assert_eq!(done.status, StatusCode::OK);
    assert_eq!(done.message(), "Task updated successfully");
    assert_eq!(done.body["task"]["status"], "completed");
    assert_eq!(done.body["task"]["title"], "Send proposal");
    Ok(())
}

#[tokio::test]
async fn deletes_task_once() -> anyhow::Result<()> {
    let app = TestApp::new();
    let session = app.session("acme", "sales").await?;
    let task = new_task(&app, &session, "Send proposal").await?;
    let id = task["id"].as_str().unwrap();

    let uri = format!("/api/v1/task/task/delete/{}", id);
    let first = app.delete(&uri, &session.token).await?;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.message(), "Task deleted successfully");

    let second = app.delete(&uri, &session.token).await?;
    assert_eq!(second.status, StatusCode::NOT_FOUND);

    let fetched = app.get(&format!("/api/v1/task/task/get/{}", id), &session.token).await?;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
    assert_eq!(fetched.message(), "Task not found");
    Ok(())
}
