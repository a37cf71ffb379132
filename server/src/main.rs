use actix_cors::Cors;
use actix_web::middleware::Condition;
use actix_web::{App, HttpServer};

use drawing_server::config::ServerConfig;
use drawing_server::handlers::configure_handlers;
use drawing_server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = ServerConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let srv_tx = spawn_server();
    let address = config.server_address();
    let cors_permissive = config.cors_permissive;
    let static_dir = config.static_dir.clone();

    log::info!("Server is running on {}", address);
    HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(cors_permissive, Cors::permissive()))
            .data(srv_tx.clone())
            .data(config.clone())
            .configure(|cfg| configure_handlers(cfg, &static_dir))
    })
    .bind(address)?
    .run()
    .await
}
