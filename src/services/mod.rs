use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::conf::ConfTable;
use crate::config::Config;
use crate::host::Host;
use crate::module::ModuleRegistry;

mod command_handler;
mod events;
mod runtime;


pub struct Services {
    /// Replaced wholesale on REHASH.
    config: RwLock<Arc<Config>>,
    /// File REHASH reloads from; `None` disables REHASH.
    config_path: Option<PathBuf>,
    conf: ConfTable,
    registry: ModuleRegistry,
    host: Host,
}

impl Services {
    pub fn new(config: Config, conf: ConfTable, registry: ModuleRegistry, host: Host) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
            config_path: None,
            conf,
            registry,
            host,
        }
    }

    /// Set the file REHASH reloads the configuration from.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config.read().unwrap())
    }

    /// Nick the given service replies from.
    fn service_nick(&self, service: &str) -> String {
        if service.eq_ignore_ascii_case("operserv") {
            self.config().server.operserv_nick.clone()
        } else {
            service.to_string()
        }
    }
}
