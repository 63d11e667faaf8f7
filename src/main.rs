use anyhow::Context;
use elstudio::{
    build_app, build_notifier,
    cli::{
        admin::{create_admin, AdminOutcome},
        output::Output,
        Cli, Commands,
    },
    db::DatabaseProvider,
    utils::toml_config::LogFormat,
    AppState, DatabaseClient, ElStudioConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config = ElStudioConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    init_tracing(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::CreateAdmin {
            email,
            password,
            first_name,
            last_name,
        } => {
            let db = open_store(&config).await?;
            match create_admin(db.as_ref(), &email, &password, &first_name, &last_name).await {
                Ok(AdminOutcome::Created(id)) => {
                    output.success(&format!("super_admin {} created (id {})", email, id));
                    Ok(())
                }
                Ok(AdminOutcome::Promoted(id)) => {
                    output.warning(&format!(
                        "{} already exists (id {}), super_admin role granted",
                        email, id
                    ));
                    Ok(())
                }
                Err(e) => {
                    output.error(&e.to_string());
                    Err(e.into())
                }
            }
        }
        Commands::Config { validate } => {
            config
                .auth_settings()
                .context("Auth settings could not be resolved")?;
            if !validate {
                print_config(&output, &config);
            }
            output.success("configuration is valid");
            Ok(())
        }
    }
}

fn init_tracing(config: &ElStudioConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "elstudio={level},elstudio_server={level},tower_http={level}",
            level = config.server.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn open_store(config: &ElStudioConfig) -> anyhow::Result<Arc<dyn DatabaseClient>> {
    let provider = DatabaseProvider::from_config(&config.database);
    tracing::info!(url = %config.database.url, "opening credential store");

    provider
        .create_client()
        .await
        .context("Failed to open the credential store")
}

async fn serve(config: ElStudioConfig) -> anyhow::Result<()> {
    let db = open_store(&config).await?;

    if let Some(seed) = &config.organization {
        if db.get_organization().await?.is_none() {
            db.create_organization(seed).await?;
            tracing::info!("organization record created from configuration");
        }
    }

    let notifier = build_notifier(&config, db.clone());
    let addr = config.bind_address();
    let state = AppState::new(config, db, notifier)?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "ElStudio server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn print_config(output: &Output, config: &ElStudioConfig) {
    output.banner();
    output.header("Server");
    output.kv("address", &config.bind_address());
    output.kv("environment", &format!("{:?}", config.server.environment));
    output.kv("log_level", &config.server.log_level);
    output.header("Auth");
    output.kv("secret_key_env", &config.auth.secret_key_env);
    output.kv("algorithm", &config.auth.algorithm);
    output.kv(
        "access_token_minutes",
        &config.auth.access_token_minutes.to_string(),
    );
    output.kv(
        "reset_token_minutes",
        &config.auth.reset_token_minutes.to_string(),
    );
    output.header("Database");
    output.kv("url", &config.database.url);
    output.header("Mail");
    output.kv("enabled", &config.mail.enabled.to_string());
    output.kv("frontend_url", &config.mail.frontend_url);
    output.kv("cors origins", &config.cors.allowed_origins.join(", "));
}
