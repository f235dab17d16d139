use bookshelf_gateway::books::BookService;
use bookshelf_gateway::config::Args;
use bookshelf_gateway::middleware::{
    BearerAuth, KeyExtractor, PeerIp, RateLimitState, RealIp, Timeouts,
};
use bookshelf_gateway::rate_limit::RateLimiter;
use bookshelf_gateway::repository::InMemoryBookRepository;
use bookshelf_gateway::router;
use bookshelf_gateway::state::{AppState, TokenIssuer};
use chrono::TimeDelta;
use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_logging(filter: &str, json: bool) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

// this is main async function with tokio
#[tokio::main]
async fn main() -> std::io::Result<()> {
    // parse cli arguments
    let args = Args::parse();
    init_logging(&args.log_filter, args.log_json);

    if args.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set, using the built-in development secret");
    }

    let limiter = Arc::new(RateLimiter::with_system_clock(args.rate_limit));
    let extractor: Arc<dyn KeyExtractor> = if args.trust_proxy_headers {
        Arc::new(RealIp)
    } else {
        Arc::new(PeerIp)
    };
    let limits = RateLimitState::new(Arc::clone(&limiter), extractor);
    let bearer = BearerAuth::new(args.jwt_secret.as_str());

    // creating shared state
    let state = Arc::new(AppState {
        books: BookService::new(Arc::new(InMemoryBookRepository::new())),
        token_issuer: TokenIssuer {
            secret: args.jwt_secret.clone(),
            ttl: TimeDelta::seconds(i64::from(args.jwt_ttl)),
            username: args.auth_username.clone(),
            password: args.auth_password.clone(),
        },
    });

    let timeouts = Timeouts::from_secs(args.read_timeout, args.write_timeout);
    let app = router(state, limits, bearer, timeouts);

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    tracing::info!(
        address = %args.addr,
        rate_limit = limiter.limit(),
        trust_proxy_headers = args.trust_proxy_headers,
        read_timeout_secs = args.read_timeout,
        write_timeout_secs = args.write_timeout,
        "server listening"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
}
