use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod config;
mod controllers;
mod db;
mod error;
mod identity;
mod models;
mod services;

use config::Config;
use db::memory::{InMemoryAuditRepository, InMemoryNotesRepository};
use db::sqlite::{SqliteAuditRepository, SqliteNotesRepository};
use db::{AuditRepository, Database, NotesRepository};
use identity::{IdentityProvider, SystemIdentity};
use services::{AuditService, NotesService};

pub struct AppState {
    pub config: Config,
    pub notes: Arc<NotesService>,
    pub audit: Arc<AuditService>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;
    log::info!("notes-backend v{}", env!("CARGO_PKG_VERSION"));

    if config.api_key.is_none() {
        log::warn!("API_KEY is not set - all mutating endpoints will be rejected");
    }

    let identity: Arc<dyn IdentityProvider> = Arc::new(SystemIdentity);

    if let Err(e) = config::initialize_database_dir(&config.database_url) {
        log::warn!("Failed to create database directory: {}", e);
    }

    log::info!("Initializing database at {}", config.database_url);
    let (notes_repo, audit_repo): (Arc<dyn NotesRepository>, Arc<dyn AuditRepository>) =
        match Database::new(&config.database_url) {
            Ok(db) => {
                let db = Arc::new(db);
                (
                    Arc::new(SqliteNotesRepository::new(db.clone())),
                    Arc::new(SqliteAuditRepository::new(db, identity.clone())),
                )
            }
            Err(e) => {
                log::warn!(
                    "Failed to open database ({}), falling back to in-memory stores - data will not survive a restart",
                    e
                );
                (
                    Arc::new(InMemoryNotesRepository::new()),
                    Arc::new(InMemoryAuditRepository::new(identity.clone())),
                )
            }
        };

    let audit = Arc::new(AuditService::new(audit_repo));
    let notes = Arc::new(NotesService::new(notes_repo, audit.clone(), identity));

    log::info!("Starting HTTP server on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(AppState {
                config: config.clone(),
                notes: notes.clone(),
                audit: audit.clone(),
            }))
            .configure(controllers::notes::config)
            .configure(controllers::audit::config)
            .configure(controllers::health::config_routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
