//! # Jam Session Binary
//!
//! The entry point that assembles the application from the plugin crates
//! selected at compile time.

use std::env;
use std::path::PathBuf;

use actix_web::{web, App, HttpServer};
use jam_api::handlers::AppState;
use jam_api::middleware;

#[cfg(feature = "store-sqlite")]
use jam_store_sqlite::SqliteStore;

#[cfg(feature = "blob-local")]
use jam_blob_local::LocalBlobStore;

#[cfg(feature = "auth-simple")]
use jam_auth_simple::SimpleIdentityProvider;

struct Config {
    bind: String,
    database_url: String,
    media_root: PathBuf,
    media_url_prefix: String,
    auth_secret: String,
}

impl Config {
    fn from_env() -> Self {
        let var = |key: &str, default: &str| env::var(key).unwrap_or_else(|_| default.to_string());
        let auth_secret = env::var("JAM_AUTH_SECRET").unwrap_or_else(|_| {
            log::warn!("JAM_AUTH_SECRET not set; using an insecure development secret");
            "dev-secret-change-me".to_string()
        });
        Self {
            bind: var("JAM_BIND", "127.0.0.1:8080"),
            database_url: var("JAM_DATABASE_URL", "sqlite:jam_session.db"),
            media_root: PathBuf::from(var("JAM_MEDIA_ROOT", "./data/uploads")),
            media_url_prefix: var("JAM_MEDIA_URL_PREFIX", "/media"),
            auth_secret,
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();

    // 1. Database implementation
    #[cfg(feature = "store-sqlite")]
    let store = SqliteStore::new(&config.database_url)
        .await
        .expect("Failed to init SQLite document store");

    // 2. Blob storage implementation
    #[cfg(feature = "blob-local")]
    let blobs = LocalBlobStore::new(
        config.media_root.clone(),
        config.media_url_prefix.clone(),
    );

    // 3. Identity implementation
    #[cfg(feature = "auth-simple")]
    let auth = SimpleIdentityProvider::new(&config.auth_secret);

    // 4. Wrap in AppState (dynamic dispatch keeps the plugin set swappable)
    let state = web::Data::new(AppState {
        store: Box::new(store),
        blobs: Box::new(blobs),
        auth: Box::new(auth),
    });

    std::fs::create_dir_all(&config.media_root)?;
    log::info!("Jam Session starting on http://{}", config.bind);

    let media_root = config.media_root.clone();
    let media_url_prefix = config.media_url_prefix.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::request_logger())
            .wrap(middleware::cors_policy())
            .configure(jam_api::configure_routes)
            .service(actix_files::Files::new(&media_url_prefix, &media_root))
    })
    .bind(&config.bind)?
    .run()
    .await
}
