use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use debrief::config::AppConfig;
use debrief::core::inference::openai::OpenAiProvider;
use debrief::core::intake::AutoAnalysisService;
use debrief::core::notify::Notifier;
use debrief::core::notify::mailer::{DisabledNotifier, HttpMailer};
use debrief::core::pipeline::{PipelineContext, PipelineSettings};
use debrief::core::store::AnalysisStore;
use debrief::interfaces::web::{self, AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("debrief failed to start: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    debrief::logging::init();

    let config = Arc::new(AppConfig::load()?);
    info!(
        "Starting debrief on {}:{} (data dir: {})",
        config.api_host,
        config.api_port,
        config.data_dir.display()
    );

    let store = Arc::new(AnalysisStore::new(&config.data_dir).await?);

    let api_key = config.openai_api_key.clone().context(
        "No AI provider key configured. Set DEBRIEF_OPENAI_API_KEY or add openai_api_key to config.toml",
    )?;
    let provider = Arc::new(OpenAiProvider::new(api_key, config.openai_model.clone()));

    let notifier: Arc<dyn Notifier> = match (&config.notify_endpoint, &config.notify_api_key) {
        (Some(endpoint), Some(key)) => Arc::new(HttpMailer::new(
            endpoint.clone(),
            key.clone(),
            config.notify_from.clone(),
        )),
        _ => {
            warn!("No notification relay configured; outcome notifications are disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let pipeline = Arc::new(PipelineContext {
        store: store.clone(),
        provider,
        notifier,
        settings: PipelineSettings {
            timeout_ms: config.analysis_timeout_ms,
            social_write_attempts: config.social_write_attempts,
            social_write_base_delay_ms: config.social_write_base_delay_ms,
            token_ttl_secs: config.token_ttl_secs,
        },
        token_secret: config.token_secret.clone(),
    });

    let state = AppState {
        store,
        intake: Arc::new(AutoAnalysisService::new(pipeline.clone())),
        pipeline,
        config,
    };

    web::serve(state).await
}
