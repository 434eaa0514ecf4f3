use tracing_subscriber::EnvFilter;

use salonbook::config::AppConfig;
use salonbook::db;
use salonbook::handlers;
use salonbook::services::identity::fixed::FixedCodeProvider;
use salonbook::services::identity::twilio::TwilioVerifyProvider;
use salonbook::services::identity::OtpProvider;
use salonbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;

    let conn = db::init_db(&config.database_url)?;
    if config.seed_demo_data {
        db::seed::seed_demo_catalog(&conn)?;
    }

    let otp: Box<dyn OtpProvider> = match config.otp_provider.as_str() {
        "twilio" => {
            anyhow::ensure!(
                !config.twilio_account_sid.is_empty()
                    && !config.twilio_auth_token.is_empty()
                    && !config.twilio_verify_service_sid.is_empty(),
                "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_VERIFY_SERVICE_SID must be set when OTP_PROVIDER=twilio"
            );
            tracing::info!("using Twilio Verify OTP provider");
            Box::new(TwilioVerifyProvider::new(
                config.twilio_account_sid.clone(),
                config.twilio_auth_token.clone(),
                config.twilio_verify_service_sid.clone(),
                config.collaborator_timeout(),
            )?)
        }
        _ => {
            tracing::warn!("using fixed-code OTP provider; do not use in production");
            Box::new(FixedCodeProvider::new(config.dev_otp_code.clone()))
        }
    };

    if config.session_secret == "changeme" {
        tracing::warn!("SESSION_SECRET is the default value; set it before deploying");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config, conn, otp);
    let app = handlers::router(state);

    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
