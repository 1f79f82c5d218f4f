use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use search_core::{DocumentStatus, SearchIndex};
use serde_json::Value;
use server::{build_app, ServerConfig};
use tower::ServiceExt;

const TOKEN: &str = "secret";

fn tiny_app() -> Router {
    let mut index = SearchIndex::with_stop_words_text("and in the").unwrap();
    index.add_document(100, "white cat new ring", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
    index.add_document(101, "fluffy cat fluffy tail", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
    index.add_document(102, "good dog big eyes", DocumentStatus::Banned, &[1, 2, 3]).unwrap();
    index.add_document(103, "tail fluffy cat", DocumentStatus::Actual, &[5]).unwrap();
    build_app(index, ServerConfig { admin_token: Some(TOKEN.into()), cors_allow_origin: vec![] })
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn admin(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-ADMIN-TOKEN", TOKEN)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn ids(results: &Value) -> Vec<u64> {
    results.as_array().unwrap().iter().map(|d| d["id"].as_u64().unwrap()).collect()
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let (status, json) = call(tiny_app(), get("/search?q=fluffy%20cat")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json["results"]), vec![101, 103, 100]);
}

#[tokio::test]
async fn search_by_status_and_bad_query() {
    let (status, json) = call(tiny_app(), get("/search?q=dog&status=BANNED")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json["results"]), vec![102]);

    let (status, json) = call(tiny_app(), get("/search?q=dog&status=banned")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json["results"]), vec![102]);

    let (status, _) = call(tiny_app(), get("/search?q=dog&status=gone")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(tiny_app(), get("/search?q=--dog")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn match_and_doc_endpoints() {
    let (status, json) = call(tiny_app(), get("/match?q=cat%20tail%20ring&id=101")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["words"], serde_json::json!(["cat", "tail"]));
    assert_eq!(json["highlighted"], "fluffy <em>cat</em> fluffy <em>tail</em>");

    let (status, json) = call(tiny_app(), get("/doc/101")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["frequencies"]["fluffy"].as_f64().unwrap(), 0.5);
    assert_eq!(json["status"], "ACTUAL");

    let (status, _) = call(tiny_app(), get("/doc/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_keeps_query_order() {
    let req = |joined: bool| {
        Request::post("/batch")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "queries": ["ring", "tail -white"], "joined": joined }).to_string(),
            ))
            .unwrap()
    };
    let (status, json) = call(tiny_app(), req(false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json[0]), vec![100]);
    assert_eq!(ids(&json[1]), vec![103, 101]);

    let (_, json) = call(tiny_app(), req(true)).await;
    assert_eq!(ids(&json), vec![100, 103, 101]);
}

#[tokio::test]
async fn batch_with_bad_query_fails() {
    let req = Request::post("/batch")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::json!({ "queries": ["ring", "-"] }).to_string()))
        .unwrap();
    let (status, _) = call(tiny_app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mutations_require_token() {
    let app = tiny_app();
    let req = Request::post("/dedupe").body(Body::empty()).unwrap();
    let (status, _) = call(app.clone(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = call(app.clone(), admin("POST", "/dedupe", Value::Null)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([103]));

    let doc = serde_json::json!({ "id": 7, "text": "lonely ring", "ratings": [4] });
    let (status, _) = call(app.clone(), admin("POST", "/documents", doc.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(app.clone(), admin("POST", "/documents", doc)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(app.clone(), admin("DELETE", "/documents/100", Value::Null)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, json) = call(app, get("/search?q=ring")).await;
    assert_eq!(ids(&json["results"]), vec![7]);
}
