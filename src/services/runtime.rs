use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::{StreamExt, StreamMap};

use crate::message::HostEvent;

use super::*;

impl Services {
    /// Process host events until the sender side closes, then unload every
    /// module.
    pub async fn run(
        mut self,
        mut events: UnboundedReceiver<HostEvent>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut timers = self.module_timers();
        log::info!(
            "Entering event loop with {} module timer(s)...",
            timers.len()
        );

        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(event) => self.handle_host_event(event).await,
                        None => {
                            log::info!("Event channel closed, shutting down");
                            break;
                        }
                    }
                }
                Some((index, _)) = timers.next() => {
                    self.dispatch_timer(index).await;
                }
            }
        }

        self.registry.unload_all(&self.conf);
        Ok(())
    }

    /// One interval stream per module that asked for a timer, keyed by the
    /// module's registry index. The first tick is one full period out.
    fn module_timers(&self) -> StreamMap<usize, IntervalStream> {
        let mut timers = StreamMap::new();
        for (index, module) in self.registry.all().iter().enumerate() {
            if let Some(period) = module.timer_interval() {
                let start = tokio::time::Instant::now() + period;
                let interval = tokio::time::interval_at(start, period);
                timers.insert(index, IntervalStream::new(interval));
                log::info!(
                    "Module {} timer every {}s",
                    module.name(),
                    period.as_secs()
                );
            }
        }
        timers
    }
}
