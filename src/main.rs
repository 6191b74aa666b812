use clap::Parser;
use tracing::{error, info};
use virtualsns::cli::{
    Args, build_config, handle_seed, init_logging, load_jwt_secret, open_database,
    validate_cors_origin,
};
use virtualsns::run_server;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    // Missing or weak secret is fatal before anything is served.
    let Some(jwt_secret) = load_jwt_secret(args.jwt_secret_file.as_deref()) else {
        std::process::exit(1);
    };

    let cors_origin = match args.cors_origin.as_deref() {
        Some(origin) => match validate_cors_origin(origin) {
            Some(origin) => Some(origin),
            None => std::process::exit(1),
        },
        None => None,
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    if args.seed {
        handle_seed(&db, args.mode).await;
    }

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let config = build_config(
        db,
        jwt_secret,
        args.mode,
        cors_origin,
        args.auth_rate_limit,
        args.behind_proxy,
    );

    match listener.local_addr() {
        Ok(local_addr) => info!(address = %local_addr, mode = ?args.mode, "Listening"),
        Err(_) => info!(address = %addr, mode = ?args.mode, "Listening"),
    }

    if let Err(e) = run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
