mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn tenants_never_see_each_others_records() -> anyhow::Result<()> {
    let app = TestApp::new();
    let acme = app.session("acme", "admin").await?;
    let globex = app.session("globex", "admin").await?;
    let customer_id = app.create_customer(&acme, "Ada").await?;

    let list = app.get("/api/v1/customer/", &globex.token).await?;
    assert_eq!(list.body["total"], 0);

    let users = app.get("/api/v1/users/", &globex.token).await?;
    assert_eq!(users.body["total"], 1);

    let update = app
        .put(&format!("/api/v1/customer/update/{}", customer_id), &globex.token, json!({"name": "Mallory"}))
        .await?;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let delete = app.delete(&format!("/api/v1/customer/delete/{}", customer_id), &globex.token).await?;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let own = app.get("/api/v1/customer/", &acme.token).await?;
    assert_eq!(own.body["total"], 1);
    assert_eq!(own.body["data"][0]["name"], "Ada");
    Ok(())
}

#[tokio::test]
async fn foreign_tasks_are_not_found() -> anyhow::Result<()> {
    let app = TestApp::new();
    let acme = app.session("acme", "sales").await?;
    let globex = app.session("globex", "sales").await?;
    let customer_id = app.create_customer(&acme, "Ada").await?;

    let created = app
        .post(
            "/api/v1/task/task/create",
            &acme.token,
            json!({
                "title": "Follow up",
                "dueDate": "2026-11-01T09:00:00Z",
                "assignedTo": acme.user_id,
                "customerId": customer_id
            }),
        )
        .await?;
    let task_id = created.body["task"]["id"].as_str().unwrap().to_string();

    let get = app.get(&format!("/api/v1/task/task/get/{}", task_id), &globex.token).await?;
    assert_eq!(get.status, StatusCode::NOT_FOUND);

    let update = app
        .put(&format!("/api/v1/task/task/update/{}", task_id), &globex.token, json!({"status": "completed"}))
        .await?;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let mine = app.get(&format!("/api/v1/task/task/get/{}", task_id), &acme.token).await?;
    assert_eq!(mine.body["task"]["status"], "pending");
    Ok(())
}

#[tokio::test]
async fn body_tenant_id_is_ignored() -> anyhow::Result<()> {
    let app = TestApp::new();
    let acme = app.session("acme", "sales").await?;
    let globex = app.session("globex", "sales").await?;

    let reply = app
        .post(
            "/api/v1/customer/add",
            &acme.token,
            json!({
                "tenantId": globex.tenant_id,
                "id": Uuid::new_v4(),
                "name": "Ada",
                "email": "ada@client.io",
                "phone": "555-0100",
                "company": "Initech"
            }),
        )
        .await?;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["customer"]["tenantId"], acme.tenant_id.as_str());

    let theirs = app.get("/api/v1/customer/", &globex.token).await?;
    assert_eq!(theirs.body["total"], 0);
    Ok(())
}

#[tokio::test]
async fn references_cannot_cross_tenants() -> anyhow::Result<()> {
    let app = TestApp::new();
    let acme = app.session("acme", "sales").await?;
    let globex = app.session("globex", "sales").await?;
    let foreign_customer = app.create_customer(&globex, "Hank").await?;

    let reply = app
        .post(
            "/api/v1/lead/leads/create",
            &acme.token,
            json!({"customerId": foreign_customer, "assignedTo": acme.user_id}),
        )
        .await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["fieldErrors"]["customerId"].is_string());

    let leads = app.get("/api/v1/lead/leads/get", &globex.token).await?;
    assert_eq!(leads.body["total"], 0);
    Ok(())
}

#[tokio::test]
async fn admin_cannot_touch_users_of_another_tenant() -> anyhow::Result<()> {
    let app = TestApp::new();
    let acme = app.session("acme", "admin").await?;
    let globex = app.session("globex", "sales").await?;

    let reply = app
        .put(&format!("/api/v1/users/status/{}", globex.user_id), &acme.token, json!({"status": "suspended"}))
        .await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    app.login("sales@globex.io").await?;
    Ok(())
}

#[tokio::test]
async fn foreign_leads_cannot_be_updated_or_deleted() -> anyhow::Result<()> {
    let app = TestApp::new();
    let acme = app.session("acme", "sales").await?;
    let globex = app.session("globex", "sales").await?;
    let customer_id = app.create_customer(&acme, "Ada").await?;

    let created = app
        .post(
            "/api/v1/lead/leads/create",
            &acme.token,
            json!({"customerId": customer_id, "assignedTo": acme.user_id, "notes": ["first call"]}),
        )
        .await?;
    let lead_id = created.body["lead"]["id"].as_str().unwrap().to_string();

    let update = app
        .put(
            &format!("/api/v1/lead/leads/update/{}", lead_id),
            &globex.token,
            json!({"status": "lost", "notes": []}),
        )
        .await?;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let delete = app.delete(&format!("/api/v1/lead/leads/delete/{}", lead_id), &globex.token).await?;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let theirs = app.get("/api/v1/lead/leads/get", &globex.token).await?;
    assert_eq!(theirs.body["total"], 0);

    let mine = app.get("/api/v1/lead/leads/get", &acme.token).await?;
    assert_eq!(mine.body["total"], 1);
    assert_eq!(mine.body["data"][0]["status"], "new");
    assert_eq!(mine.body["data"][0]["notes"], json!(["first call"]));
    Ok(())
}

#[tokio::test]
async fn foreign_tasks_cannot_be_deleted() -> anyhow::Result<()> {
    let app = TestApp::new();
    let acme = app.session("acme", "sales").await?;
    let globex = app.session("globex", "sales").await?;
    let customer_id = app.create_customer(&acme, "Ada").await?;

    let created = app
        .post(
            "/api/v1/task/task/create",
            &acme.token,
            json!({
                "title": "Follow up",
                "dueDate": "2026-11-01T09:00:00Z",
                "assignedTo": acme.user_id,
                "customerId": customer_id
            }),
        )
        .await?;
    let task_id = created.body["task"]["id"].as_str().unwrap().to_string();

    let delete = app.delete(&format!("/api/v1/task/task/delete/{}", task_id), &globex.token).await?;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);
    assert_eq!(delete.message(), "Task not found");

    let mine = app.get(&format!("/api/v1/task/task/get/{}", task_id), &acme.token).await?;
    assert_eq!(mine.status, StatusCode::OK);
    Ok(())
}
