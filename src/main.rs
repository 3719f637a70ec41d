use std::net::SocketAddr;
use std::sync::Arc;
use streamweaver::{api, ChainDataSource, Config, JsonRpcDataSource, Scheduler, SystemClock};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let datasource: Arc<dyn ChainDataSource> = Arc::new(
        JsonRpcDataSource::new(config.rpc_url.clone(), config.streaming_contract)
            .with_retry_budget(config.rpc_retry_budget),
    );
    let mut scheduler = Scheduler::new(datasource, Arc::new(SystemClock), config.session.clone());

    if let Some(address) = config.watch_address {
        if let Err(e) = scheduler.connect(address).await {
            eprintln!("Failed to connect {}: {}", address, e);
            std::process::exit(1);
        }
    }

    let app = api::create_router(api::AppState::new(scheduler));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Server listening on {} (contract {})",
        addr,
        config.streaming_contract
    );

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
