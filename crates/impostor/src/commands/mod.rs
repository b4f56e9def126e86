pub mod compact;
pub mod history;
pub mod init;
pub mod session;
pub mod version;

use impostor_compress::{ContextManager, HttpSummarizer, SqliteStore};
use impostor_core::CompressorConfig;
use impostor_telemetry::Paths;
use std::future::Future;
use std::sync::Arc;

/// Data directory, config and store shared by session commands
pub struct Workspace {
    pub paths: Paths,
    pub config: CompressorConfig,
    pub store: Arc<SqliteStore>,
}

impl Workspace {
    pub fn open() -> anyhow::Result<Self> {
        Self::at(Paths::new()?)
    }

    pub fn at(paths: Paths) -> anyhow::Result<Self> {
        let config = CompressorConfig::load(&paths.config_file())?;
        let store = Arc::new(SqliteStore::open(&paths.database())?);
        Ok(Self {
            paths,
            config,
            store,
        })
    }

    pub fn manager(&self) -> ContextManager<SqliteStore, HttpSummarizer> {
        ContextManager::new(
            self.store.clone(),
            HttpSummarizer::from_env(),
            self.config.clone(),
        )
        .with_records(self.paths.compactions_file())
    }
}

/// Drive one async call to completion from the synchronous CLI
pub fn block_on<F: Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}
