use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{net::TcpListener, task::JoinHandle};

use crate::{
    ai::OpenAiClient,
    config::AppConfig,
    http::{self, AppState},
    infrastructure::{
        directories::ResolvedPaths, instance_guard::InstanceGuard, notifier::TwilioNotifier,
        shutdown::Shutdown,
    },
    store::{ensure_list_document, load_domain_lists, SubmissionStore},
    tasks::{SubmissionProcessor, Trigger, TriggerQueue, TriggerSource},
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct LinkGuardApp {
    _guard: InstanceGuard,
    listener: TcpListener,
    state: AppState,
    processor_handle: JoinHandle<()>,
    shutdown: Shutdown,
}

impl LinkGuardApp {
    pub async fn initialize(
        config: AppConfig,
        paths: ResolvedPaths,
        shutdown: Shutdown,
    ) -> Result<Self> {
        // Acquisition may sleep while a previous owner releases the lock.
        let data_dir = paths.data_dir.clone();
        let guard = tokio::task::spawn_blocking(move || InstanceGuard::acquire(&data_dir))
            .await
            .context("data directory lock task failed")??;

        let store = Arc::new(SubmissionStore::new(&paths.store_path));
        store.ensure_initialized().await?;
        ensure_list_document(&paths.whitelist_path).await?;
        ensure_list_document(&paths.blacklist_path).await?;
        let lists = Arc::new(load_domain_lists(&paths.whitelist_path, &paths.blacklist_path).await?);

        let http_client = Client::builder()
            .user_agent(format!("link-guard/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        if config.openai.api_key.is_none() {
            tracing::warn!(
                target: "classifier",
                "OPENAI_API_KEY not set; unlisted links will be reported as unknown"
            );
        }
        let assessor = Arc::new(OpenAiClient::new(http_client.clone(), config.openai.clone()));
        let notifier = Arc::new(TwilioNotifier::new(http_client, config.twilio.clone()));

        let queue = Arc::new(TriggerQueue::new());
        let processor = Arc::new(SubmissionProcessor::new(
            queue.clone(),
            store.clone(),
            lists,
            assessor,
            notifier,
        ));
        let processor_handle = processor.spawn(shutdown.subscribe());
        queue.push(Trigger::new(TriggerSource::Startup));

        let listener = TcpListener::bind(config.server.bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;

        Ok(Self {
            _guard: guard,
            listener,
            state: AppState::new(store, queue),
            processor_handle,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let LinkGuardApp {
            _guard,
            listener,
            state,
            mut processor_handle,
            shutdown,
        } = self;

        tracing::info!(
            target: "lifecycle",
            addr = %listener.local_addr()?,
            store = %state.store.path().display(),
            "link checker listening"
        );

        let served = axum::serve(listener, http::router(state))
            .with_graceful_shutdown(shutdown.subscribe().into_signal())
            .await;
        if let Err(err) = &served {
            tracing::error!(target: "http", error = %err, "http server stopped with an error");
        }

        shutdown.trigger();

        let processor_sleep = tokio::time::sleep(SHUTDOWN_TIMEOUT);
        tokio::pin!(processor_sleep);
        tokio::select! {
            res = &mut processor_handle => {
                if let Err(err) = res {
                    if err.is_panic() {
                        tracing::error!(target: "processor", "submission processor panicked");
                    }
                }
            }
            _ = &mut processor_sleep => {
                tracing::warn!(
                    target: "processor",
                    "submission processor did not stop within {:?}; aborting",
                    SHUTDOWN_TIMEOUT
                );
                processor_handle.abort();
            }
        }

        tracing::info!(target: "lifecycle", "link checker stopped");
        served.context("http server failed")
    }
}
