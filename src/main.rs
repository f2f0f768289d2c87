use std::sync::Arc;

use odin_backend::config::{init_db, Config};
use odin_backend::modules::auth::crud::{SqlUserDirectory, SqlVerificationStore};
use odin_backend::services::jwt::JwtService;
use odin_backend::services::mailer::{HttpMailer, LogMailer, Mailer};
use odin_backend::services::session::SessionManager;
use odin_backend::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "odin_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load environment configuration");

    let db = init_db(&config.database_url)
        .await
        .expect("Failed to connect to MySQL");
    tracing::info!("Connected to MySQL");

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run migrations");

    let mailer: Arc<dyn Mailer> = match config.mail {
        Some(mail_config) => Arc::new(HttpMailer::new(reqwest::Client::new(), mail_config)),
        None => {
            tracing::warn!("MAIL_API_URL not set, verification codes will be logged");
            Arc::new(LogMailer)
        }
    };

    let sessions = SessionManager::new(
        Arc::new(SqlUserDirectory::new(db.clone())),
        Arc::new(SqlVerificationStore::new(db)),
        JwtService::new(config.auth),
    );

    let app = odin_backend::create_app(AppState { sessions, mailer }).await;

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind 0.0.0.0:3000");
    tracing::info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.expect("Server error");
}
