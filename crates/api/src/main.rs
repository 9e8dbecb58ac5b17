use authgate_api::config::ApiConfig;

#[tokio::main]
async fn main() {
    authgate_observability::init();

    let config = ApiConfig::from_env();
    let app = authgate_api::app::build_app(&config);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
