use robotrader::routes::health::{health_check, welcome};

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.status, "ok");
}

#[tokio::test]
async fn root_route_greets_clients() {
    let response = welcome().await;
    assert_eq!(response.0.message, "Welcome to RoboTrader API");
}
