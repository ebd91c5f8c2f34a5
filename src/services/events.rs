use crate::message::HostEvent;

use super::*;

impl Services {
    pub(super) async fn handle_host_event(&self, event: HostEvent) {
        match event {
            HostEvent::Command {
                session,
                service,
                command,
                args,
            } => {
                self.dispatch_command(session, &service, &command, &args).await;
            }
            HostEvent::BurstStart => {
                log::info!("Burst started, ignoring new connections until it ends");
                self.host.set_bursting(true);
                self.dispatch_event_to_modules(&HostEvent::BurstStart).await;
            }
            HostEvent::BurstEnd => {
                log::info!("Burst ended");
                self.host.set_bursting(false);
                self.dispatch_event_to_modules(&HostEvent::BurstEnd).await;
            }
            event @ HostEvent::UserAdd(_) => {
                self.dispatch_event_to_modules(&event).await;
            }
        }
    }

    /// Hand a hook event to every loaded module.
    pub(super) async fn dispatch_event_to_modules(&self, event: &HostEvent) {
        for module in self.registry.all() {
            if let Err(e) = module.handle_event(event, &self.host).await {
                log::error!("Module {} event error: {}", module.name(), e);
            }
        }
    }

    pub(super) async fn dispatch_timer(&self, index: usize) {
        let Some(module) = self.registry.all().get(index) else {
            return;
        };
        if let Err(e) = module.handle_timer(&self.host).await {
            log::error!("Module {} timer error: {}", module.name(), e);
        }
    }
}
