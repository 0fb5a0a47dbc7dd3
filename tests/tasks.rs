#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::{rt, test, web, App, HttpServer};
use serde_json::json;
use std::net::TcpListener;
use tasktracker::models::Task;

use common::{cleanup_user, register_user, test_pool};

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let pool = test_pool().await;

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let server_pool = pool.clone();
    let server_handle = rt::spawn(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(server_pool.clone()))
                .service(tasktracker::routes::health::health)
                .service(
                    web::scope("/api")
                        .wrap(tasktracker::auth::AuthMiddleware)
                        .configure(tasktracker::routes::config),
                )
        })
        .bind(("127.0.0.1", port))
        .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
        .run()
        .await
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let base = format!("http://127.0.0.1:{}", port);

    let resp = client
        .post(format!("{}/api/tasks", base))
        .json(&json!({ "title": "Unauthorized Task", "description": "" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{}/api/users/me", base))
        .bearer_auth("not.a.valid.token")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    server_handle.abort();
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let pool = test_pool().await;
    let email = "crud_user@example.com";
    cleanup_user(&pool, email).await;

    let app = test_app!(pool).await;
    let user = register_user(&app, email, "crud_user", "PasswordCrud123!")
        .await
        .expect("Failed to register test user for CRUD flow");

    // 1. Create
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(user.bearer())
        .set_json(&json!({
            "title": "CRUD Task 1 Original",
            "description": "Initial description"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Task = test::read_body_json(resp).await;
    assert_eq!(created.title, "CRUD Task 1 Original");
    assert_eq!(created.description, "Initial description");
    assert!(!created.completed);
    assert_eq!(created.author_id, user.id);
    let task_id_1 = created.id;

    // 2. Get by id
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id_1))
        .append_header(user.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Task = test::read_body_json(resp).await;
    assert_eq!(fetched, created);

    // 3. Replace
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_id_1))
        .append_header(user.bearer())
        .set_json(&json!({
            "title": "CRUD Task 1 Updated",
            "description": "Updated description",
            "completed": true
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Task = test::read_body_json(resp).await;
    assert_eq!(updated.id, task_id_1);
    assert_eq!(updated.title, "CRUD Task 1 Updated");
    assert!(updated.completed);
    assert_eq!(updated.created_at, created.created_at);

    // 4. A second task, then list
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(user.bearer())
        .set_json(&json!({ "title": "CRUD Task 2", "description": "buy milk" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let task_id_2 = test::read_body_json::<Task, _>(resp).await.id;

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(user.bearer())
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, task_id_2, "newest task should come first");
    assert_eq!(tasks[1].id, task_id_1);

    // 5. Filters
    let req = test::TestRequest::get()
        .uri("/api/tasks?completed=true")
        .append_header(user.bearer())
        .to_request();
    let done: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, task_id_1);

    let req = test::TestRequest::get()
        .uri("/api/tasks?search=MILK")
        .append_header(user.bearer())
        .to_request();
    let found: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, task_id_2);

    // 6. Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task_id_1))
        .append_header(user.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id_1))
        .append_header(user.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup_user(&pool, email).await;
}

#[actix_rt::test]
async fn test_task_title_is_bounded() {
    let pool = test_pool().await;
    let email = "bounded_title@example.com";
    cleanup_user(&pool, email).await;

    let app = test_app!(pool).await;
    let user = register_user(&app, email, "bounded_title", "Password123!")
        .await
        .expect("Failed to register test user");

    for (title, expected) in [
        (String::new(), StatusCode::UNPROCESSABLE_ENTITY),
        ("t".repeat(51), StatusCode::UNPROCESSABLE_ENTITY),
        ("t".repeat(50), StatusCode::CREATED),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .append_header(user.bearer())
            .set_json(&json!({ "title": title, "description": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "title of {} chars", title.len());
    }

    cleanup_user(&pool, email).await;
}

#[actix_rt::test]
async fn test_task_ownership_and_authorization() {
    let pool = test_pool().await;
    let email_a = "owner_user_a@example.com";
    let email_b = "other_user_b@example.com";
    cleanup_user(&pool, email_a).await;
    cleanup_user(&pool, email_b).await;

    let app = test_app!(pool).await;
    let user_a = register_user(&app, email_a, "owner_user_a", "PasswordOwnerA123!")
        .await
        .expect("Failed to register User A");
    let user_b = register_user(&app, email_b, "other_user_b", "PasswordOtherB123!")
        .await
        .expect("Failed to register User B");

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(user_a.bearer())
        .set_json(&json!({ "title": "User A's Task", "description": "private" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let task_a: Task = test::read_body_json(resp).await;

    // B does not see it in their list.
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(user_b.bearer())
        .to_request();
    let tasks_for_b: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(!tasks_for_b.iter().any(|t| t.id == task_a.id));

    // Nor can B read, replace or delete it.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_a.id))
        .append_header(user_b.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_a.id))
        .append_header(user_b.bearer())
        .set_json(&json!({ "title": "Attempted Update by B", "description": "" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task_a.id))
        .append_header(user_b.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    // A's task is untouched.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_a.id))
        .append_header(user_a.bearer())
        .to_request();
    let still_there: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(still_there.title, "User A's Task");

    cleanup_user(&pool, email_a).await;
    cleanup_user(&pool, email_b).await;
}

#[actix_rt::test]
async fn test_search_matches_wildcards_literally() {
    let pool = test_pool().await;
    let email = "literal_search@example.com";
    cleanup_user(&pool, email).await;

    let app = test_app!(pool).await;
    let user = register_user(&app, email, "literal_search", "Password123!")
        .await
        .expect("Failed to register test user");

    for title in ["500 items", "50% off", "axb", "a_b"] {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .append_header(user.bearer())
            .set_json(&json!({ "title": title, "description": "" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    for (query, expected) in [("50%25", "50% off"), ("a_b", "a_b")] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/tasks?search={}", query))
            .append_header(user.bearer())
            .to_request();
        let found: Vec<Task> = test::call_and_read_body_json(&app, req).await;
        let titles: Vec<&str> = found.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec![expected], "search={}", query);
    }

    cleanup_user(&pool, email).await;
}
