use std::net::SocketAddr;

use clap::Parser;
use tracing::{error, info};
use xsrf_guard::cli::{Args, build_config, init_logging, load_password};
use xsrf_guard::{create_app, init_cleanup};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(password) = load_password(args.password_file.as_deref()) else {
        std::process::exit(1);
    };

    let config = build_config(&args, password);
    init_cleanup(&config.sessions).await;

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let app = create_app(&config);

    match listener.local_addr() {
        Ok(local_addr) => info!(
            address = %local_addr,
            username = %config.credentials.username(),
            trust_proxy = config.trust_proxy,
            "Listening"
        ),
        Err(e) => error!(error = %e, "Failed to read local address"),
    }

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    if let Err(e) = axum::serve(listener, make_service).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
