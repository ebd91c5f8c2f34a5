use std::time::Duration;

use async_trait::async_trait;

use crate::conf::ConfTable;
use crate::host::Host;
use crate::message::{CommandContext, HostEvent, Privilege};

#[async_trait]
pub trait Module: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// Service the commands are bound to, e.g. `operserv`.
    fn service(&self) -> &str;
    fn commands(&self) -> &[&str];
    /// Privilege required to run any of this module's commands.
    fn privilege(&self) -> Option<Privilege>;

    /// Interval for `handle_timer`, if the module wants a recurring timer.
    fn timer_interval(&self) -> Option<Duration> {
        None
    }

    /// Returns the reply lines for the invoking session.
    async fn handle_command(
        &self,
        command: &str,
        args: &str,
        ctx: &CommandContext,
        host: &Host,
    ) -> Result<Option<Vec<String>>, Box<dyn std::error::Error + Send + Sync>>;

    async fn handle_event(
        &self,
        _event: &HostEvent,
        _host: &Host,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    async fn handle_timer(&self, _host: &Host) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    /// Release anything registered with the host at load time.
    fn unload(&self, _conf: &ConfTable) {}
}

pub struct ModuleRegistry {
    modules: Vec<Box<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    pub fn register(&mut self, module: Box<dyn Module>) {
        log::info!(
            "Registered module: {} ({} on {})",
            module.name(),
            module.commands().join(", "),
            module.service()
        );
        self.modules.push(module);
    }

    /// Command names are matched case-insensitively, as IRC services do.
    pub fn find_by_command(&self, service: &str, command: &str) -> Option<&dyn Module> {
        self.modules
            .iter()
            .find(|m| {
                m.service().eq_ignore_ascii_case(service)
                    && m.commands().iter().any(|c| c.eq_ignore_ascii_case(command))
            })
            .map(|m| m.as_ref())
    }

    pub fn for_service<'a>(&'a self, service: &'a str) -> impl Iterator<Item = &'a dyn Module> + 'a {
        self.modules
            .iter()
            .filter(move |m| m.service().eq_ignore_ascii_case(service))
            .map(|m| m.as_ref())
    }

    pub fn all(&self) -> &[Box<dyn Module>] {
        &self.modules
    }

    pub fn unload_all(&mut self, conf: &ConfTable) {
        for module in self.modules.drain(..) {
            module.unload(conf);
            log::info!("Unloaded module: {}", module.name());
        }
    }
}
