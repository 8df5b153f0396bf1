use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use interpret_api::config::ServerConfig;
use interpret_api::router::build_app_router;
use interpret_api::state::AppState;
use interpret_events::{CertificateNotifier, EmailConfig, EmailDelivery, EventBus, Mailer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let db_timeout = Duration::from_secs(config.db_timeout_secs);
    let pool = interpret_db::create_pool(&config.database_url, db_timeout)
        .await
        .expect("Failed to connect to database");
    tracing::info!(timeout_secs = config.db_timeout_secs, "Database connection pool created");

    interpret_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    interpret_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus + certificate notifier ---
    let event_bus = Arc::new(EventBus::default());

    let mailer: Option<Arc<dyn Mailer>> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(smtp_host = %email_config.smtp_host, "SMTP delivery enabled");
            Some(Arc::new(EmailDelivery::new(email_config)))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, lifecycle emails are disabled");
            None
        }
    };
    let notifier = CertificateNotifier::new(pool.clone(), mailer, config.public_base_url.clone());
    let notifier_handle = tokio::spawn(notifier.run(event_bus.subscribe()));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    // The router (and its state clone of the bus) is gone; dropping the last
    // sender closes the channel and lets the notifier drain.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), notifier_handle).await;
    tracing::info!("Graceful shutdown complete");
}

/// `LOG_FORMAT=json` switches to JSON lines for log shipping.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "interpret_api=debug,interpret_events=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
