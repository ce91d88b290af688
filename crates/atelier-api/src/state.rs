use anyhow::Context;
use std::sync::Arc;

use atelier_chat::{ChatOrchestrator, ChatSession, TitleGenerator};
use atelier_context::{ThreadContext, TitleSource};
use atelier_image::{BflClient, PollinationsImageClient};
use atelier_llm::{ClientFactory, PollinationsConfig};
use atelier_persist::{StoreBuilder, ThreadStore};

use crate::config::Config;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ThreadStore>,
    pub threads: Arc<ThreadContext>,
    pub chat: ChatOrchestrator,
    pub titles: TitleGenerator,
    pub session: Arc<ChatSession>,
    pub images: Arc<PollinationsImageClient>,
    pub bfl: Arc<BflClient>,
}

impl AppState {
    /// Build clients, open the configured store and load the thread cache
    pub async fn initialize(config: Config) -> anyhow::Result<Self> {
        let mut store = StoreBuilder::new()
            .backend(config.store.backend)
            .path(&config.store.path)
            .database(&config.store.mongodb_database);
        if let Some(uri) = &config.mongodb_uri {
            store = store.mongodb_uri(uri);
        }
        let store = store.build().await.context("failed to open thread store")?;

        Self::with_store(config, store).await
    }

    pub async fn with_store(config: Config, store: Arc<dyn ThreadStore>) -> anyhow::Result<Self> {
        let mut llm = PollinationsConfig::new().with_base_url(&config.llm.base_url);
        if let Some(token) = &config.pollinations_api_token {
            llm = llm.with_token(token);
        }
        let llm_client = ClientFactory::create_chat_client(llm)?;

        let chat = ChatOrchestrator::new(llm_client.clone());
        let titles = TitleGenerator::new(llm_client);

        let title_source: Arc<dyn TitleSource> = Arc::new(titles.clone());
        let threads = Arc::new(
            ThreadContext::load(store.clone(), Some(title_source))
                .await
                .context("failed to load threads")?,
        );
        let session = Arc::new(ChatSession::new(threads.clone(), chat.clone(), titles.clone()));

        let images = PollinationsImageClient::new(config.pollinations_api_token.clone())?
            .with_base_url(&config.image.pollinations_base_url);
        let bfl = BflClient::new(config.bfl_api_key.clone())?
            .with_base_url(&config.image.bfl_base_url)
            .with_poll_config(config.image.poll_config());

        tracing::info!(
            store = store.backend(),
            threads = threads.threads().await.len(),
            "Application state ready"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            threads,
            chat,
            titles,
            session,
            images: Arc::new(images),
            bfl: Arc::new(bfl),
        })
    }
}
