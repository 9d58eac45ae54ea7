use super::*;
use axum::{http::StatusCode, routing::get, Json, Router};
use shared::domain::{NewUser, UserId};
use tokio::net::TcpListener;

fn sample_users() -> Vec<UserRecord> {
    vec![NewUser {
        name: "Leanne Graham".into(),
        email: "Sincere@april.biz".into(),
        ..NewUser::default()
    }
    .into_record(UserId(1))]
}

async fn spawn_users_server(app: Router) -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/users"))
}

#[tokio::test]
async fn fetches_user_array_from_endpoint() {
    let app = Router::new().route("/users", get(|| async { Json(sample_users()) }));
    let endpoint = spawn_users_server(app).await.expect("server");
    let source = HttpUserSource::new(&endpoint, DEFAULT_REQUEST_TIMEOUT).expect("source");

    let users = source.fetch_users().await.expect("fetch");
    assert_eq!(users, sample_users());
}

#[tokio::test]
async fn non_success_status_is_a_fetch_failure() {
    let app = Router::new().route(
        "/users",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance") }),
    );
    let endpoint = spawn_users_server(app).await.expect("server");
    let source = HttpUserSource::new(&endpoint, DEFAULT_REQUEST_TIMEOUT).expect("source");

    let err = source.fetch_users().await.expect_err("status");
    assert!(matches!(err, FetchError::Status { status: 503 }));
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let app = Router::new().route("/users", get(|| async { "[{\"id\": \"one\"}" }));
    let endpoint = spawn_users_server(app).await.expect("server");
    let source = HttpUserSource::new(&endpoint, DEFAULT_REQUEST_TIMEOUT).expect("source");

    let err = source.fetch_users().await.expect_err("decode");
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let source =
        HttpUserSource::new(&format!("http://{addr}/users"), DEFAULT_REQUEST_TIMEOUT).expect("source");
    let err = source.fetch_users().await.expect_err("transport");
    assert!(matches!(err, FetchError::Transport(_)));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let app = Router::new().route(
        "/users",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(sample_users())
        }),
    );
    let endpoint = spawn_users_server(app).await.expect("server");
    let source = HttpUserSource::new(&endpoint, Duration::from_millis(100)).expect("source");

    let err = source.fetch_users().await.expect_err("timeout");
    assert!(matches!(err, FetchError::Transport(_)));
}

#[test]
fn rejects_invalid_endpoint() {
    assert!(HttpUserSource::new("not a url", DEFAULT_REQUEST_TIMEOUT).is_err());
}

#[tokio::test]
async fn missing_source_is_unavailable() {
    let err = MissingUserSource.fetch_users().await.expect_err("offline");
    assert!(matches!(err, FetchError::Unavailable));
}
