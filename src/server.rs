use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use crate::backend::Backend;
use crate::config::ServeConfig;
use crate::handlers;
use crate::models::UploadLimits;

/// Register the API routes. Expects `Backend` and `UploadLimits` app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(handlers::index)))
        .service(web::resource("/predict").route(web::post().to(handlers::predict)));
}

pub async fn run(config: &ServeConfig, backend: Backend) -> std::io::Result<()> {
    let backend = web::Data::new(backend);
    let limits = web::Data::new(UploadLimits {
        max_bytes: config.max_upload_bytes,
    });

    let mut server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(backend.clone())
            .app_data(limits.clone())
            .configure(configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    info!("Server running at http://{}:{}", config.host, config.port);
    server
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
