use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self,
    middleware::{from_fn, Logger},
    web, App, HttpServer,
};
use std::sync::{Arc, LazyLock};
use tracing_subscriber::EnvFilter;

use crate::{
    configs::{connect_database, RedisCache},
    middlewares::{authentication, authorization},
    modules::{
        access::service::AccessService,
        account::{
            repository_pg::{AccountRepositoryPg, AppointmentRepositoryPg},
            schema::Role,
        },
        conversation::{repository_pg::ConversationRepositoryPg, service::ConversationService},
        message::{repository_pg::MessageRepositoryPg, service::MessageService},
        session::{repository_pg::SessionRepositoryPg, service::SessionService},
        websocket::{handler::websocket_handler, server::ConsultServer},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    log::info!("Environment variables loaded from .env file");

    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let redis_pool =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let account_repo = Arc::new(AccountRepositoryPg::new(db_pool.clone()));
    let appointment_repo = Arc::new(AppointmentRepositoryPg::new(db_pool.clone()));
    let session_repo = Arc::new(SessionRepositoryPg::new(db_pool.clone()));
    let conversation_repo = Arc::new(ConversationRepositoryPg::new(db_pool.clone()));
    let message_repo = Arc::new(MessageRepositoryPg::new(db_pool.clone()));

    let ws_server = Arc::new(ConsultServer::new().start());

    let access_service = AccessService::with_dependencies(
        account_repo.clone(),
        appointment_repo.clone(),
        Arc::new(redis_pool.clone()),
    );
    let session_service = SessionService::with_dependencies(
        session_repo.clone(),
        account_repo.clone(),
        ws_server.clone(),
    );
    let conversation_service = ConversationService::with_dependencies(
        conversation_repo.clone(),
        message_repo.clone(),
        appointment_repo.clone(),
    );
    let message_service = MessageService::with_dependencies(
        message_repo.clone(),
        conversation_repo.clone(),
        appointment_repo.clone(),
        ws_server.clone(),
    );

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(access_service.clone()))
            .app_data(web::Data::new(session_service.clone()))
            .app_data(web::Data::new(conversation_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .app_data(web::Data::new((*ws_server).clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            .route("/ws", web::get().to(websocket_handler))
            .service(
                web::scope("/api").service(
                    web::scope("")
                        .wrap(from_fn(authorization(vec![Role::Patient, Role::Doctor])))
                        .wrap(from_fn(authentication))
                        .configure(modules::session::route::configure)
                        .configure(modules::conversation::route::configure),
                ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
