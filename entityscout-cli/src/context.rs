use entityscout::config::{ConfigLoader, EntityScoutConfig};
use entityscout::entity_processing::EntityProcessor;
use std::path::Path;

pub struct EntityScoutCliContext {
    pub config: EntityScoutConfig,
    pub processor: EntityProcessor,
}

impl EntityScoutCliContext {
    pub fn new(config_path: Option<&Path>, enrich: bool) -> entityscout::Result<Self> {
        let mut config = load_config(config_path)?;
        if !enrich {
            config.enrichment.enabled = false;
        }

        let processor = entityscout::init(config.clone())?;
        Ok(Self { config, processor })
    }
}

/// Defaults, then the given file (or the default locations), then environment.
pub fn load_config(path: Option<&Path>) -> entityscout::Result<EntityScoutConfig> {
    let mut loader = ConfigLoader::new();
    match path {
        Some(path) => {
            loader.load_file(path)?;
        }
        None => {
            loader.load_default_files();
        }
    }
    Ok(loader.load_env().extract()?)
}
