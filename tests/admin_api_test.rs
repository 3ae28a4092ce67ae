//! Admin content API: projects, clients, messages, settings, stats, uploads.

mod common;

use common::TestServer;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

#[tokio::test]
async fn test_content_routes_require_session() {
    let server = TestServer::start().await;
    let anonymous = server.client();

    for path in [
        "/api/admin/projects",
        "/api/admin/clients",
        "/api/admin/messages",
        "/api/admin/settings",
        "/api/admin/stats",
    ] {
        let response = anonymous.get(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), 401, "{path} should be protected");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Token bulunamadı");
    }

    let response = anonymous
        .post(server.url("/api/admin/projects"))
        .json(&json!({ "title": "Sneaky" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    assert!(!server.data_dir().join("projects.json").exists());
}

#[tokio::test]
async fn test_project_crud() {
    let server = TestServer::start().await;
    let client = server.admin_client().await;

    let response = client
        .get(server.url("/api/admin/projects"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["cache-control"],
        "no-cache, no-store, must-revalidate"
    );
    let list: Vec<Value> = response.json().await.unwrap();
    assert!(list.is_empty());

    let response = client
        .post(server.url("/api/admin/projects"))
        .json(&json!({
            "title": "Kurumsal Site",
            "status": "Devam Ediyor",
            "budget": "25000",
            "technologies": ["Next.js", "Tailwind"],
            "customField": "kept"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["id"], "1");
    assert!(created["createdAt"].is_string());
    assert_eq!(created["customField"], "kept");

    let response = client
        .put(server.url("/api/admin/projects/1"))
        .json(&json!({ "status": "Tamamlandı", "id": "99" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["id"], "1");
    assert_eq!(updated["status"], "Tamamlandı");
    assert_eq!(updated["title"], "Kurumsal Site");

    let response = client
        .put(server.url("/api/admin/projects/42"))
        .json(&json!({ "status": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = client
        .delete(server.url("/api/admin/projects/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let response = client
        .delete(server.url("/api/admin/projects/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // On-disk shape
    let raw = std::fs::read_to_string(server.data_dir().join("projects.json")).unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc, json!({ "projects": [] }));
}

#[tokio::test]
async fn test_client_crud() {
    let server = TestServer::start().await;
    let client = server.admin_client().await;

    let response = client
        .post(server.url("/api/admin/clients"))
        .json(&json!({ "name": "Acme", "status": "Aktif", "totalRevenue": 999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["totalProjects"], 0);
    assert_eq!(created["totalRevenue"], 0.0);

    let response = client
        .put(server.url(&format!("/api/admin/clients/{}", created["id"].as_str().unwrap())))
        .json(&json!({ "phone": "+90 555 000 00 00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["phone"], "+90 555 000 00 00");
    assert_eq!(updated["name"], "Acme");

    let list: Vec<Value> = client
        .get(server.url("/api/admin/clients"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn test_messages_and_reply() {
    let server = TestServer::start().await;
    let client = server.admin_client().await;

    let response = client
        .post(server.url("/api/admin/messages"))
        .json(&json!({
            "clientName": "Mehmet",
            "clientEmail": "mehmet@example.com",
            "subject": "Destek",
            "message": "Sitemiz açılmıyor",
            "status": "replied"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["status"], "new");
    let id = created["id"].as_str().unwrap().to_string();

    let response = client
        .patch(server.url(&format!("/api/admin/messages/{id}")))
        .json(&json!({ "priority": "high" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let patched: Value = response.json().await.unwrap();
    assert_eq!(patched["priority"], "high");
    assert!(patched["updatedAt"].is_string());

    let response = client
        .post(server.url(&format!("/api/admin/messages/{id}/reply")))
        .json(&json!({ "reply": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = client
        .post(server.url(&format!("/api/admin/messages/{id}/reply")))
        .json(&json!({ "reply": "Kontrol ediyoruz." }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let replied: Value = response.json().await.unwrap();
    assert_eq!(replied["status"], "replied");
    assert_eq!(replied["reply"], "Kontrol ediyoruz.");
    assert!(replied["repliedAt"].is_string());

    let response = client
        .post(server.url("/api/admin/messages/404/reply"))
        .json(&json!({ "reply": "?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = client
        .get(server.url("/api/admin/messages"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["pragma"], "no-cache");
    let list: Vec<Value> = response.json().await.unwrap();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn test_settings_merge() {
    let server = TestServer::start().await;
    let client = server.admin_client().await;

    let empty: Value = client
        .get(server.url("/api/admin/settings"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(empty, json!({}));

    client
        .put(server.url("/api/admin/settings"))
        .json(&json!({ "siteName": "Vien", "phone": "123" }))
        .send()
        .await
        .unwrap();
    let merged: Value = client
        .put(server.url("/api/admin/settings"))
        .json(&json!({ "siteName": "Vien Digital" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(merged, json!({ "siteName": "Vien Digital", "phone": "123" }));

    let response = client
        .put(server.url("/api/admin/settings"))
        .json(&json!(["not", "an", "object"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_stats() {
    let server = TestServer::start().await;
    let client = server.admin_client().await;

    for (status, budget) in [("Tamamlandı", json!(10000)), ("Devam Ediyor", json!("20000"))] {
        client
            .post(server.url("/api/admin/projects"))
            .json(&json!({ "title": "P", "status": status, "budget": budget }))
            .send()
            .await
            .unwrap();
    }
    for status in ["Aktif", "Pasif"] {
        client
            .post(server.url("/api/admin/clients"))
            .json(&json!({ "name": "C", "status": status }))
            .send()
            .await
            .unwrap();
    }

    let stats: Value = client
        .get(server.url("/api/admin/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["totalProjects"], 2);
    assert_eq!(stats["completedProjects"], 1);
    assert_eq!(stats["totalClients"], 2);
    assert_eq!(stats["activeClients"], 1);
    assert_eq!(stats["totalRevenue"], 30000.0);
    assert_eq!(stats["averageProjectValue"], 15000.0);
}

fn image_form(name: &str, mime: &str, bytes: Vec<u8>, kind: Option<&str>) -> Form {
    let part = Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str(mime)
        .unwrap();
    let form = Form::new().part("file", part);
    match kind {
        Some(kind) => form.text("type", kind.to_string()),
        None => form,
    }
}

#[tokio::test]
async fn test_upload_image() {
    let server = TestServer::start().await;
    let client = server.admin_client().await;

    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    let response = client
        .post(server.url("/api/admin/upload"))
        .multipart(image_form("logo.png", "image/png", png.clone(), None))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    let file_name = body["fileName"].as_str().unwrap().to_string();
    assert!(file_name.starts_with("project-"));
    assert!(file_name.ends_with(".png"));
    assert_eq!(body["url"], format!("/uploads/{file_name}"));

    let stored = std::fs::read(server.public_dir().join("uploads").join(&file_name)).unwrap();
    assert_eq!(stored, png);

    // Served back as a static file
    let served = client
        .get(server.url(&format!("/uploads/{file_name}")))
        .send()
        .await
        .unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(served.bytes().await.unwrap().to_vec(), png);
}

#[tokio::test]
async fn test_upload_favicon_accepts_ico() {
    let server = TestServer::start().await;
    let client = server.admin_client().await;

    let response = client
        .post(server.url("/api/admin/upload"))
        .multipart(image_form("favicon.ico", "image/x-icon", vec![0, 0, 1, 0], None))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Sadece JPEG, PNG, WebP ve ICO dosyaları kabul edilir"
    );

    let response = client
        .post(server.url("/api/admin/upload"))
        .multipart(image_form(
            "favicon.ico",
            "image/x-icon",
            vec![0, 0, 1, 0],
            Some("favicon"),
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["fileName"].as_str().unwrap().starts_with("favicon-"));
}

#[tokio::test]
async fn test_upload_rejects_oversize_and_missing_file() {
    let server = TestServer::start().await;
    let client = server.admin_client().await;

    let big = vec![0u8; 5 * 1024 * 1024 + 1];
    let response = client
        .post(server.url("/api/admin/upload"))
        .multipart(image_form("huge.jpg", "image/jpeg", big, None))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Dosya boyutu 5MB'dan küçük olmalıdır");

    let response = client
        .post(server.url("/api/admin/upload"))
        .multipart(Form::new().text("type", "project"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Dosya bulunamadı");
}
