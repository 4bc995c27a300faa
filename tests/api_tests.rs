use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bizdir::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = bizdir::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    bizdir::api::router(state).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bagel_shop() -> Value {
    json!({
        "name": "Bagel Barn",
        "category": "Bakery",
        "address": "5 Hudson St",
        "city": "New York",
        "state": "NY",
        "zipcode": "10013",
        "latitude": 40.7195,
        "longitude": -74.0089,
        "image_urls": ["https://img.example/bagel.jpg"],
        "keywords": ["bagels", "coffee"]
    })
}

#[tokio::test]
async fn test_health_live() {
    let app = spawn_app().await;

    let (status, body) = send(&app, get("/api/system/health/live")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "alive");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/system/health/live"))
        .await
        .unwrap();

    let request_id = response.headers().get("x-request-id").unwrap();
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_system_status() {
    let app = spawn_app().await;

    let (status, body) = send(&app, get("/api/system/status")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cache_backend"], "memory");
    assert_eq!(body["data"]["cache_enabled"], true);
    assert_eq!(body["data"]["search_radius_miles"], 50.0);
}

#[tokio::test]
async fn test_register_search_and_view_business() {
    let app = spawn_app().await;

    let (status, body) = send(&app, post_json("/api/businesses", &bagel_shop())).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["is_verified"], false);

    let (status, body) = send(&app, get("/api/search?q=bagel&lat=40.7128&lng=-74.0060")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["results"][0]["id"], id);
    assert!(body["data"]["results"][0]["distance"].as_f64().unwrap() < 1.0);
    assert_eq!(body["data"]["matching_keywords"], json!(["bagels"]));

    let (status, body) = send(&app, get(&format!("/api/businesses/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Bagel Barn");
    assert_eq!(body["data"]["keywords"], json!(["bagels", "coffee"]));

    let (status, body) = send(&app, get(&format!("/api/businesses/{id}/stats"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_views"], 1);
}

#[tokio::test]
async fn test_register_business_rejects_bad_coordinates() {
    let app = spawn_app().await;

    let mut business = bagel_shop();
    business["latitude"] = json!(123.0);

    let (status, body) = send(&app, post_json("/api/businesses", &business)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_search_rejects_out_of_range_latitude() {
    let app = spawn_app().await;

    let (status, body) = send(&app, get("/api/search?q=pizza&lat=95&lng=-74.0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_missing_business_is_404() {
    let app = spawn_app().await;

    let (status, body) = send(&app, get("/api/businesses/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, get("/api/businesses/0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = spawn_app().await;
    let user = json!({ "name": "Sam", "email": "Sam@Example.com" });

    let (status, body) = send(&app, post_json("/api/users", &user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "sam@example.com");

    let user = json!({ "name": "Sam Again", "email": "sam@example.com" });
    let (status, _) = send(&app, post_json("/api/users", &user)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let user = json!({ "name": "Nobody", "email": "not-an-email" });
    let (status, _) = send(&app, post_json("/api/users", &user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_review_moderation_flow() {
    let app = spawn_app().await;

    let (_, body) = send(&app, post_json("/api/businesses", &bagel_shop())).await;
    let business_id = body["data"]["id"].as_i64().unwrap();
    let user = json!({ "name": "Lee", "email": "lee@example.com" });
    let (_, body) = send(&app, post_json("/api/users", &user)).await;
    let user_id = body["data"]["id"].as_i64().unwrap();

    let review = json!({
        "business_id": business_id,
        "user_id": user_id,
        "content": "Best everything bagel in town",
        "aspects": [
            { "aspect": "food", "rating": 5 },
            { "aspect": "price", "rating": 3 }
        ]
    });
    let (status, body) = send(&app, post_json("/api/reviews", &review)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating"], 4);
    assert_eq!(body["data"]["is_verified"], false);
    let review_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = send(&app, get("/api/admin/reviews?verified=false")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        post_json(
            &format!("/api/admin/reviews/{review_id}"),
            &json!({ "decision": "approve" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/api/admin/reviews?verified=false")).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, get(&format!("/api/businesses/{business_id}"))).await;
    assert_eq!(body["data"]["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["rating"], 4.0);
}

#[tokio::test]
async fn test_review_for_unknown_user_is_404() {
    let app = spawn_app().await;

    let (_, body) = send(&app, post_json("/api/businesses", &bagel_shop())).await;
    let business_id = body["data"]["id"].as_i64().unwrap();

    let review = json!({
        "business_id": business_id,
        "user_id": 42,
        "content": "Hmm",
        "aspects": [{ "aspect": "food", "rating": 2 }]
    });
    let (status, _) = send(&app, post_json("/api/reviews", &review)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_top_items_after_searches() {
    let app = spawn_app().await;

    for _ in 0..2 {
        send(&app, get("/api/search?q=ramen&lat=40.7&lng=-74.0")).await;
    }
    send(&app, get("/api/search?q=sushi&lat=40.7&lng=-74.0")).await;

    let (status, body) = send(&app, get("/api/admin/analytics/top-items")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["item"], "ramen");
    assert_eq!(body["data"][0]["count"], 2);
}

#[tokio::test]
async fn test_search_without_coordinates_is_json_400() {
    let app = spawn_app().await;

    for uri in [
        "/api/search?q=pizza&lng=-74.0",
        "/api/search?q=pizza&lat=40.7",
        "/api/search?q=pizza&lat=north&lng=-74.0",
        "/api/search/category?category=Bakery&lat=40.7",
    ] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_admin_notifications_count_today() {
    let app = spawn_app().await;

    let (_, body) = send(&app, get("/api/admin/notifications")).await;
    assert_eq!(body["data"]["businesses_created"], 0);

    let (_, body) = send(&app, post_json("/api/businesses", &bagel_shop())).await;
    let business_id = body["data"]["id"].as_i64().unwrap();
    let user = json!({ "name": "Kai", "email": "kai@example.com" });
    let (_, body) = send(&app, post_json("/api/users", &user)).await;
    let user_id = body["data"]["id"].as_i64().unwrap();
    let review = json!({
        "business_id": business_id,
        "user_id": user_id,
        "content": "Chewy and fresh",
        "aspects": [{ "aspect": "food", "rating": 5 }]
    });
    send(&app, post_json("/api/reviews", &review)).await;

    let (status, body) = send(&app, get("/api/admin/notifications")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["businesses_created"], 1);
    assert_eq!(body["data"]["users_registered"], 1);
    assert_eq!(body["data"]["reviews_received"], 1);
}

#[tokio::test]
async fn test_page_content_save_and_read() {
    let app = spawn_app().await;

    let (status, _) = send(&app, get("/api/page-content?key=about")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/api/page-content")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let page = json!({ "key": "about", "text": "Family run since 1990" });
    let (status, body) = send(&app, post_json("/api/admin/page-content", &page)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "Family run since 1990");

    let (_, body) = send(&app, get("/api/page-content?key=about")).await;
    assert_eq!(body["data"]["text"], "Family run since 1990");

    let page = json!({ "key": "about", "text": "Now with two locations" });
    send(&app, post_json("/api/admin/page-content", &page)).await;
    let (_, body) = send(&app, get("/api/page-content?key=about")).await;
    assert_eq!(body["data"]["text"], "Now with two locations");

    let (status, _) = send(
        &app,
        post_json("/api/admin/page-content", &json!({ "key": "about" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json("/api/admin/page-content", &json!({ "key": " ", "text": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_profile_edit() {
    let app = spawn_app().await;

    let ida = json!({ "name": "Ida", "email": "ida@example.com" });
    let (_, body) = send(&app, post_json("/api/users", &ida)).await;
    let id = body["data"]["id"].as_i64().unwrap();
    let max = json!({ "name": "Max", "email": "max@example.com" });
    send(&app, post_json("/api/users", &max)).await;

    let (_, body) = send(&app, get("/api/admin/users")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let edit = json!({ "name": "Ida B.", "occupation": "Chef", "phone": "  " });
    let (status, body) = send(&app, put_json(&format!("/api/users/{id}"), &edit)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ida B.");
    assert_eq!(body["data"]["occupation"], "Chef");
    assert_eq!(body["data"]["phone"], Value::Null);
    assert_eq!(body["data"]["email"], "ida@example.com");

    let (_, body) = send(&app, get("/api/admin/users")).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["name"].as_str())
        .collect();
    assert!(names.contains(&"Ida B."));

    let taken = json!({ "email": "MAX@example.com" });
    let (status, _) = send(&app, put_json(&format!("/api/users/{id}"), &taken)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, put_json("/api/users/999", &edit)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
