use mangashelf_core::{Config, ImageProxy, MangaCatalog};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: MangaCatalog,
    proxy: ImageProxy,
}

impl AppState {
    pub fn new(config: Config, catalog: MangaCatalog, proxy: ImageProxy) -> Self {
        Self {
            config,
            catalog,
            proxy,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &MangaCatalog {
        &self.catalog
    }

    pub fn proxy(&self) -> &ImageProxy {
        &self.proxy
    }
}
