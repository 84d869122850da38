//! Walks through the builder against a local axum server.

use std::io::Write;

use axum::Router;
use axum::extract::Multipart;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use courier::{Client, Options};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Serialize, Deserialize, Debug)]
struct NewUser {
    username: String,
    permissions: Vec<String>,
}

async fn create_user(Json(user): Json<NewUser>) -> Json<Value> {
    Json(json!({ "created": user.username, "permissions": user.permissions.len() }))
}

async fn upload(mut multipart: Multipart) -> Json<Value> {
    let mut names = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        names.push(field.name().unwrap_or_default().to_owned());
    }
    Json(json!({ "parts": names }))
}

async fn login() -> impl IntoResponse {
    ([(header::SET_COOKIE, "session=demo; Path=/")], "logged in")
}

async fn profile(headers: HeaderMap) -> String {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none");
    format!("cookie: {cookie}")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let app = Router::new()
        .route("/users", post(create_user))
        .route("/upload", post(upload))
        .route("/login", get(login))
        .route("/profile", get(profile));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server stopped: {e}");
        }
    });

    let client = Client::new(
        Options::new()
            .base_uri(format!("http://{addr}/"))
            .cookies(true),
    );

    let created = courier::with_client(&client)
        .debug()
        .json(&NewUser {
            username: "ann".into(),
            permissions: vec!["read".into(), "write".into()],
        })
        .post("users")
        .await?;
    println!("{} {}", created.status(), created.text());

    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "quarterly numbers")?;
    let uploaded = courier::with_client(&client)
        .file("report", file.path())
        .field("title", "Q3")
        .post("upload")
        .await?;
    println!("{}", uploaded.text());

    courier::with_client(&client).get("login").await?;
    let profile = courier::with_client(&client).get("profile").await?;
    println!("{}", profile.text());
    println!("jar: {:?}", client.cookies());

    match courier::with_client(&Client::default()).get("relative").await {
        Ok(_) => println!("unexpected success"),
        Err(errors) => println!("errors: {errors}"),
    }

    println!("{:?}", client.stats());
    Ok(())
}
