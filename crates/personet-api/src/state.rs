//! Application state wiring all services together.
//!
//! AppState holds the concrete chat service used by the REST API. The
//! service is generic over persona/topic/transcript traits, but AppState
//! pins it to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use personet_core::chat::ChatService;
use personet_core::generation::box_provider::BoxGenerationProvider;
use personet_infra::config::{default_data_dir, load_global_config};
use personet_infra::filesystem::FsPersonaSource;
use personet_infra::llm::OpenAiProvider;
use personet_infra::sqlite::{DatabasePool, SqliteTopicStore, SqliteTranscriptStore};
use personet_types::config::GlobalConfig;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteChatService =
    ChatService<FsPersonaSource, SqliteTopicStore, SqliteTranscriptStore>;

/// Shared application state for REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to the
    /// database, wire the chat service.
    ///
    /// Requires `OPENAI_API_KEY` in the environment.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = default_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        let db_url = match &config.database_url {
            Some(url) => url.clone(),
            None => format!(
                "sqlite://{}?mode=rwc",
                data_dir.join("personet.db").display()
            ),
        };
        let db_pool = DatabasePool::new(&db_url).await?;

        let api_key = std::env::var("OPENAI_API_KEY")
            .map(SecretString::from)
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
        let provider = BoxGenerationProvider::new(OpenAiProvider::new(api_key));

        let chat_service = ChatService::new(
            FsPersonaSource::new(&data_dir),
            SqliteTopicStore::new(db_pool.clone()),
            SqliteTranscriptStore::new(db_pool.clone()),
            provider,
            config.clone(),
        );

        Ok(Self {
            chat_service: Arc::new(chat_service),
            config,
            data_dir,
            db_pool,
        })
    }
}
