mod connavg;

use crate::conf::ConfTable;
use crate::config::Config;
use crate::module::ModuleRegistry;

/// Load every enabled module, then read their conf items from `config`.
pub fn build_registry(config: &Config, conf: &ConfTable, now: i64) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();

    if config.is_module_enabled("connavg") {
        registry.register(Box::new(connavg::ConnAvgModule::new(
            conf,
            config.connavg.reset,
            now,
        )));
    }

    conf.apply(config);
    registry
}
