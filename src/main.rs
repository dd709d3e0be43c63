//! AyahVault Back binary entrypoint wiring the REST API, saved games and question backends.

use std::{env, net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ayahvault_back::{
    config::{AppConfig, QuestionsConfig, StorageConfig},
    dao::{
        kv_store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore},
        question_source::{MemoryQuestionSource, QuestionSource},
    },
    routes,
    state::{AppState, SharedState, verse::VerseCatalog},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let kv = open_store(&config.storage)?;
    let source = open_source(&config)?;
    let verses = load_verses(&config);

    let app_state = AppState::new(config, kv, source, verses);
    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    // Open trivia boards save themselves as they are dropped.
    app_state.teardown_all();
    Ok(())
}

/// Open the key/value store holding saved games.
fn open_store(storage: &StorageConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match storage {
        StorageConfig::Memory => {
            warn!("saved games kept in memory; they are lost on restart");
            Ok(Arc::new(MemoryKeyValueStore::new()))
        }
        StorageConfig::Files { dir } => {
            let store = FileKeyValueStore::open(dir.clone())
                .with_context(|| format!("opening save directory `{}`", dir.display()))?;
            info!(dir = %store.root().display(), "saved games stored on disk");
            Ok(Arc::new(store))
        }
    }
}

/// Select the question backend.
fn open_source(config: &AppConfig) -> anyhow::Result<Arc<dyn QuestionSource>> {
    match &config.questions {
        QuestionsConfig::Memory { seed } => Ok(Arc::new(memory_source(config, seed.as_deref()))),
        #[cfg(feature = "postgrest-source")]
        QuestionsConfig::Postgrest => {
            use ayahvault_back::dao::question_source::postgrest::{
                PostgrestConfig, PostgrestQuestionSource,
            };

            let postgrest = PostgrestConfig::from_env().context("configuring question source")?;
            info!(url = %postgrest.base_url, "using hosted question tables");
            let source =
                PostgrestQuestionSource::connect(postgrest).context("building question client")?;
            Ok(Arc::new(source))
        }
        #[cfg(not(feature = "postgrest-source"))]
        QuestionsConfig::Postgrest => {
            warn!("built without the postgrest-source feature; serving questions from memory");
            Ok(Arc::new(memory_source(config, None)))
        }
    }
}

/// In-memory tables, seeded when a readable seed file is configured.
fn memory_source(config: &AppConfig, seed: Option<&Path>) -> MemoryQuestionSource {
    let empty = || {
        MemoryQuestionSource::with_tables([config.quiz.table.clone(), config.trivia.table.clone()])
    };
    let Some(path) = seed else {
        return empty();
    };
    match MemoryQuestionSource::from_seed_file(path) {
        Ok(source) => {
            info!(seed = %path.display(), "question tables seeded");
            source
        }
        Err(err) => {
            warn!(
                seed = %path.display(),
                error = %err,
                "failed to seed question tables; starting empty"
            );
            empty()
        }
    }
}

/// Load the verse catalog; the picker reports "no verses" when it is missing.
fn load_verses(config: &AppConfig) -> VerseCatalog {
    match VerseCatalog::from_file(&config.verses) {
        Ok(catalog) => {
            info!(path = %config.verses.display(), verses = catalog.len(), "verse catalog loaded");
            catalog
        }
        Err(err) => {
            warn!(path = %config.verses.display(), error = %err, "verse catalog unavailable");
            VerseCatalog::default()
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
