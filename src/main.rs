mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;
#[cfg(test)]
mod test_support;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = config::Config::from_env().context("Invalid configuration")?;

    log::info!("🚀 Starting Checkin Trigger...");
    log::info!(
        "📌 Watching {}",
        services::checkin_service::CHECKIN_TRIGGER_PATH
    );

    // Inicialização única do cliente do banco, antes de registrar o endpoint
    let store = database::connect(&config)
        .await
        .context("Failed to initialize document store")?;

    let trigger = web::Data::new(
        api::events::CheckinTrigger::new(store).context("Invalid trigger path template")?,
    );

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);

    HttpServer::new(move || {
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(trigger.clone())
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .wrap(middleware::RequestMetrics)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            // Eventos do Firestore (Eventarc entrega na raiz do serviço)
            .route("/", web::post().to(api::events::receive_event))
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Metrics
            .route("/metrics", web::get().to(api::metrics::get_metrics))
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
