use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::message::Privilege;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub operators: HashMap<String, OperatorConfig>,
    #[serde(default)]
    pub modules: HashMap<String, ModuleConfig>,
    #[serde(default)]
    pub connavg: ConnAvgConfig,
    /// Service blocks (`[operserv]`, ...) holding items registered at runtime
    /// through the conf table.
    #[serde(flatten)]
    pub blocks: HashMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    #[serde(default = "default_operserv_nick")]
    pub operserv_nick: String,
}

fn default_operserv_nick() -> String {
    "OperServ".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OperatorConfig {
    #[serde(default)]
    pub privileges: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModuleConfig {
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct ConnAvgConfig {
    #[serde(default)]
    pub reset: ResetStrategy,
}

/// How the connection-rate window is closed.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResetStrategy {
    /// A 60 second host timer resets the window regardless of traffic.
    #[default]
    Timer,
    /// The window is checked on the next connection or status query.
    Lazy,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn is_module_enabled(&self, name: &str) -> bool {
        self.modules
            .get(name)
            .map(|m| m.enabled)
            .unwrap_or(false)
    }

    /// Privileges granted to an operator account. Unknown accounts get none.
    pub fn privileges_for(&self, account: &str) -> Vec<Privilege> {
        let Some(oper) = self.operators.get(account) else {
            return Vec::new();
        };
        oper.privileges
            .iter()
            .filter_map(|name| {
                let privilege = Privilege::from_str(name);
                if privilege.is_none() {
                    log::warn!("Unknown privilege {:?} for operator {}", name, account);
                }
                privilege
            })
            .collect()
    }

    /// Raw value of `key` inside the service block `block`, if present.
    pub fn block_value(&self, block: &str, key: &str) -> Option<&toml::Value> {
        self.blocks.get(block).and_then(|b| b.get(key))
    }
}
