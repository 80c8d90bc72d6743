mod common;

use actix_web::{test, web, App};
use chirpy_server::configure;
use serde_json::{json, Value};
use tempfile::TempDir;

#[actix_web::test]
async fn test_create_chirp() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure)
    ).await;
    let token = common::sign_up(&state, "a@b.com");

    let unauthenticated = test::TestRequest::post()
        .uri("/api/chirps")
        .set_json(json!({"body": "hello"}))
        .send_request(&app)
        .await;
    assert_eq!(unauthenticated.status(), 401);

    let created = test::TestRequest::post()
        .uri("/api/chirps")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({"body": "I hear Kerfuffle is great"}))
        .send_request(&app)
        .await;
    assert_eq!(created.status(), 201);
    let body: Value = test::read_body_json(created).await;
    assert_eq!(body, json!({"id": 1, "body": "I hear **** is great", "author_id": 1}));

    let fetched = test::TestRequest::get().uri("/api/chirps/1").send_request(&app).await;
    assert_eq!(fetched.status(), 200);
    let fetched_body: Value = test::read_body_json(fetched).await;
    assert_eq!(fetched_body["body"], "I hear **** is great");
}

#[actix_web::test]
async fn test_chirp_too_long() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure)
    ).await;
    let token = common::sign_up(&state, "a@b.com");

    let response = test::TestRequest::post()
        .uri("/api/chirps")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({"body": "x".repeat(141)}))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 400);

    let listed = test::TestRequest::get().uri("/api/chirps").send_request(&app).await;
    let chirps: Value = test::read_body_json(listed).await;
    assert_eq!(chirps, json!([]));
}

#[actix_web::test]
async fn test_get_missing_or_malformed_id() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure)
    ).await;

    let missing = test::TestRequest::get().uri("/api/chirps/42").send_request(&app).await;
    assert_eq!(missing.status(), 404);

    let malformed = test::TestRequest::get().uri("/api/chirps/abc").send_request(&app).await;
    assert_eq!(malformed.status(), 400);
}

#[actix_web::test]
async fn test_delete_chirp_ownership() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure)
    ).await;
    let author = common::sign_up(&state, "author@b.com");
    let stranger = common::sign_up(&state, "stranger@b.com");

    test::TestRequest::post()
        .uri("/api/chirps")
        .insert_header(("Authorization", format!("Bearer {}", author)))
        .set_json(json!({"body": "mine"}))
        .send_request(&app)
        .await;

    let forbidden = test::TestRequest::delete()
        .uri("/api/chirps/1")
        .insert_header(("Authorization", format!("Bearer {}", stranger)))
        .send_request(&app)
        .await;
    assert_eq!(forbidden.status(), 403);

    let deleted = test::TestRequest::delete()
        .uri("/api/chirps/1")
        .insert_header(("Authorization", format!("Bearer {}", author)))
        .send_request(&app)
        .await;
    assert_eq!(deleted.status(), 200);

    let gone = test::TestRequest::get().uri("/api/chirps/1").send_request(&app).await;
    assert_eq!(gone.status(), 404);

    let again = test::TestRequest::delete()
        .uri("/api/chirps/1")
        .insert_header(("Authorization", format!("Bearer {}", author)))
        .send_request(&app)
        .await;
    assert_eq!(again.status(), 404);
}

#[actix_web::test]
async fn test_list_chirps_filter_and_sort() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure)
    ).await;
    let first = common::sign_up(&state, "first@b.com");
    let second = common::sign_up(&state, "second@b.com");

    for (token, body) in [(&first, "one"), (&second, "two"), (&first, "three")] {
        let response = test::TestRequest::post()
            .uri("/api/chirps")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"body": body}))
            .send_request(&app)
            .await;
        assert_eq!(response.status(), 201);
    }

    let all = test::TestRequest::get().uri("/api/chirps").send_request(&app).await;
    let all: Vec<Value> = test::read_body_json(all).await;
    assert_eq!(all.len(), 3);

    let by_author = test::TestRequest::get()
        .uri("/api/chirps?author_id=1&sort=desc")
        .send_request(&app)
        .await;
    let by_author: Vec<Value> = test::read_body_json(by_author).await;
    let bodies: Vec<&str> = by_author.iter().map(|c| c["body"].as_str().unwrap()).collect();
    assert_eq!(bodies, vec!["three", "one"]);
}
