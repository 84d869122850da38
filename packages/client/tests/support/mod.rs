//! Local axum server shared by the integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, Multipart};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Redirect};
use axum::routing::{any, get, post};
use axum::Json;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;

/// Starts the server and returns its base URL, ending in `/`.
pub async fn spawn_server() -> String {
    let app = Router::new()
        .route("/echo", any(echo))
        .route("/upload", post(upload))
        .route("/set-cookie", get(set_cookie))
        .route("/cookies", get(cookies))
        .route("/redirect/see-other", any(|| async { Redirect::to("/echo") }))
        .route("/redirect/temporary", any(|| async { Redirect::temporary("/echo") }))
        .route("/redirect/loop", get(redirect_loop))
        .route("/gzip", get(gzip))
        .route("/slow", get(slow))
        .route("/peer", get(peer));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("test server");
    });
    format!("http://{addr}/")
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let headers: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_owned(),
                Value::String(value.to_str().unwrap_or_default().to_owned()),
            )
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn upload(headers: HeaderMap, mut multipart: Multipart) -> Json<Value> {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field.text().await.unwrap_or_default();
        parts.push(json!({
            "name": name,
            "file_name": file_name,
            "content_type": content_type,
            "data": data,
        }));
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    Json(json!({ "content_type": content_type, "parts": parts }))
}

async fn set_cookie() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, "session=abc; Path=/")],
        "cookie set",
    )
}

async fn cookies(headers: HeaderMap) -> String {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

async fn redirect_loop() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/redirect/loop")])
}

async fn gzip() -> impl IntoResponse {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(b"compressed hello")
        .expect("gzip write");
    let body = encoder.finish().expect("gzip finish");
    ([(header::CONTENT_ENCODING, "gzip")], body)
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "too late"
}

async fn peer(ConnectInfo(addr): ConnectInfo<SocketAddr>) -> String {
    addr.to_string()
}
