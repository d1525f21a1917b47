use tracing::info;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use travel_profiles_api::auth::TokenVerifier;
use travel_profiles_api::configuration::get_static_configuration;
use travel_profiles_api::{ensure_indexes, get_database_connection, run, AppState};

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer =
        BunyanFormattingLayer::new(String::from("travel-profiles-api"), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber).expect("failed to install subscriber");

    let configuration = get_static_configuration().expect("failed to load configs");
    let token_verifier = TokenVerifier::from_base64_pem(&configuration.auth.access_token_public_key)
        .expect("failed to load the access token public key");
    let database = get_database_connection(configuration.database)
        .await
        .expect("failed to connect to mongodb");
    ensure_indexes(&database)
        .await
        .expect("failed to create indexes");

    let address = format!("0.0.0.0:{}", configuration.application_port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("failed to bind the application port");

    info!("Starting server at {}...", address);

    run(
        listener,
        AppState {
            database,
            token_verifier,
        },
    )
    .await
    .expect("server error")
}
