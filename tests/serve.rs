use room_token::config::IssuerConfig;
use room_token::{serve, ServeError};

#[tokio::test]
async fn serve_stops_on_shutdown() {
    let config = IssuerConfig::from_lookup(|name| match name {
        "ROOM_TOKEN_BIND" => Some("127.0.0.1:0".to_string()),
        _ => None,
    })
    .expect("config");

    let result = serve(config, async {}).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn serve_reports_bind_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener");
    let taken = listener.local_addr().expect("addr").to_string();

    let config = IssuerConfig::from_lookup(move |name| match name {
        "ROOM_TOKEN_BIND" => Some(taken.clone()),
        _ => None,
    })
    .expect("config");

    let result = serve(config, async {}).await;
    assert!(matches!(result, Err(ServeError::Bind { .. })));
}
