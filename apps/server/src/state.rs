//! Shared application state

use std::sync::Arc;

use crate::{
    config::Config,
    db::Datastore,
    resources::ResourceRegistry,
    search::SearchIndex,
    startup::{load_seed_data, rebuild_search_index, SeedData},
    Result,
};

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub datastore: Datastore,
    pub search_index: Arc<SearchIndex>,
    pub registry: Arc<ResourceRegistry>,
}

impl AppState {
    /// Build state over a fresh in-memory store, loading `rest.seed_file` if set.
    pub async fn new(config: Config) -> Result<Self> {
        let datastore = Datastore::in_memory();
        if let Some(path) = &config.rest.seed_file {
            let seed = SeedData::from_file(path).await?;
            load_seed_data(&datastore, seed, &config.rest.system_user).await?;
        }
        Self::new_with_datastore(config, datastore).await
    }

    /// Build state over an existing datastore and index its contents.
    pub async fn new_with_datastore(config: Config, datastore: Datastore) -> Result<Self> {
        let search_index = Arc::new(SearchIndex::new());
        let registry = Arc::new(ResourceRegistry::standard(
            &datastore,
            search_index.clone(),
            &config.rest,
        ));

        rebuild_search_index(&registry).await?;

        Ok(Self {
            config: Arc::new(config),
            datastore,
            search_index,
            registry,
        })
    }
}
