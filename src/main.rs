use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use reqwest::Client;

use linkhub_be::config::Config;
use linkhub_be::handlers;
use linkhub_be::rate_limit::RateLimiter;
use linkhub_be::services::identity::SupabaseIdentity;
use linkhub_be::services::mailer::{Mailer, ResendMailer};
use linkhub_be::services::store::SupabaseStore;
use linkhub_be::AppState;

fn mask_key(k: &str) -> String {
    if k.len() <= 8 { "[REDACTED]".to_string() }
    else { format!("{}***{}", &k[..4], &k[k.len()-4..]) }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Supabase URL: {}", config.supabase_url);
    info!("Supabase Key: {}", mask_key(&config.supabase_service_role_key));

    let client = Client::builder()
        .user_agent("linkhub-be/0.1")
        .build()
        .expect("failed to build http client");

    let identity = SupabaseIdentity::new(
        client.clone(),
        &config.supabase_url,
        &config.supabase_anon_key,
        &config.supabase_service_role_key,
    );
    let store = SupabaseStore::new(
        client.clone(),
        &config.supabase_url,
        &config.supabase_service_role_key,
    );
    let mailer: Option<Arc<dyn Mailer>> = match (&config.resend_api_key, &config.resend_from_email)
    {
        (Some(api_key), Some(from)) => {
            Some(Arc::new(ResendMailer::new(client.clone(), api_key, from)))
        }
        _ => {
            info!("Resend not configured; mail endpoints will refuse to send");
            None
        }
    };

    let state = web::Data::new(AppState {
        identity: Arc::new(identity),
        store: Arc::new(store),
        mailer,
        rate_limits: Arc::new(RateLimiter::default()),
        app_url: config.app_url.clone(),
    });

    let allowed_origins = config.allowed_origins.clone();
    let bind_address = format!("0.0.0.0:{}", config.port);
    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                "authorization",
                "content-type",
                "accept",
                "x-requested-with",
            ])
            .supports_credentials()
            .max_age(3600);

        for origin in allowed_origins.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(handlers::json_config())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
