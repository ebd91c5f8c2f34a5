use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::conf::{ConfTable, UintHandle};
use crate::config::ResetStrategy;
use crate::host::{CommandLog, Host};
use crate::message::{CommandContext, HostEvent, Privilege, User};
use crate::module::Module;
use crate::util::time_ago;

/// Length of a counting window, in seconds.
pub const WINDOW_SECS: i64 = 60;
/// Alerts repeat every this many connections past the threshold.
const ALERT_STEP: u32 = 5;

pub const SAFE_CONNECTIONS_BLOCK: &str = "operserv";
pub const SAFE_CONNECTIONS_KEY: &str = "safe_connections";
pub const SAFE_CONNECTIONS_DEFAULT: u32 = 5;

/// Connection counters for the current window plus the all-time peak.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorState {
    pub connections: u32,
    pub peak_connections: u32,
    pub peak_time: Option<i64>,
    pub alert_time: Option<i64>,
    pub window_start: i64,
}

impl MonitorState {
    pub fn new(now: i64) -> Self {
        Self {
            connections: 0,
            peak_connections: 0,
            peak_time: None,
            alert_time: None,
            window_start: now,
        }
    }

    /// Count one qualifying connection. Returns the warning to broadcast when
    /// the count lands on an alert point above `safe`.
    pub fn record_connection(&mut self, now: i64, safe: u32) -> Option<String> {
        self.connections = self.connections.saturating_add(1);

        let mut warning = None;
        if self.connections > safe && self.connections % ALERT_STEP == 0 {
            warning = Some(format!(
                "WARNING! Connections in the last minute was {}, which is above the maximum safe connections of {} per minute!",
                self.connections, safe
            ));
            self.alert_time = Some(now);
        }

        if self.connections > self.peak_connections {
            self.peak_connections = self.connections;
            self.peak_time = Some(now);
        }

        warning
    }

    pub fn reset_window(&mut self, now: i64) {
        self.connections = 0;
        self.window_start = now;
    }

    pub fn window_expired(&self, now: i64) -> bool {
        now > self.window_start + WINDOW_SECS
    }

    pub fn report(&self, now: i64, safe: u32) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);
        lines.push(format!("Connections in the last minute: {}", self.connections));
        if let Some(peak_time) = self.peak_time {
            lines.push(format!(
                "Peak connections: {} (Reached {} ago)",
                self.peak_connections,
                time_ago(peak_time, now)
            ));
        }
        lines.push(format!("Configuration alert level: {}", safe));
        match self.alert_time {
            Some(alert_time) => lines.push(format!(
                "Alert peak last broken: {} ago",
                time_ago(alert_time, now)
            )),
            None => lines.push("Alert peak last broken: never".to_string()),
        }
        lines
    }
}

pub struct ConnAvgModule {
    state: Mutex<MonitorState>,
    safe_connections: UintHandle,
    strategy: ResetStrategy,
}

impl ConnAvgModule {
    /// Registers `operserv::safe_connections`; the item lives until `unload`.
    pub fn new(conf: &ConfTable, strategy: ResetStrategy, now: i64) -> Self {
        let safe_connections = conf.add_uint(
            SAFE_CONNECTIONS_BLOCK,
            SAFE_CONNECTIONS_KEY,
            1,
            i32::MAX as u32,
            SAFE_CONNECTIONS_DEFAULT,
        );
        Self {
            state: Mutex::new(MonitorState::new(now)),
            safe_connections,
            strategy,
        }
    }

    pub fn on_connection(&self, user: Option<&User>, host: &Host) {
        // Killed before the hook ran.
        let Some(user) = user else {
            return;
        };
        if user.internal {
            return;
        }
        // Netjoin bursts replay every existing client.
        if host.is_bursting() {
            return;
        }

        let now = host.now();
        let warning = {
            let mut state = self.state.lock().unwrap();
            let warning = state.record_connection(now, self.safe_connections.get());
            if self.strategy == ResetStrategy::Lazy && state.window_expired(now) {
                state.reset_window(now);
            }
            warning
        };

        if let Some(text) = warning {
            log::warn!("Connection rate alert after {}", user.nick);
            host.wallops(&text);
        }
    }

    pub fn reset_window(&self, host: &Host) {
        let mut state = self.state.lock().unwrap();
        log::debug!(
            "Closing connection window: {} connection(s) since {}",
            state.connections,
            state.window_start
        );
        state.reset_window(host.now());
    }

    pub fn report_status(&self, host: &Host) -> Vec<String> {
        let now = host.now();
        let mut state = self.state.lock().unwrap();
        if self.strategy == ResetStrategy::Lazy && state.window_expired(now) {
            state.reset_window(now);
        }
        state.report(now, self.safe_connections.get())
    }

    #[cfg(test)]
    fn snapshot(&self) -> MonitorState {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait]
impl Module for ConnAvgModule {
    fn name(&self) -> &str {
        "connavg"
    }

    fn description(&self) -> &str {
        "Monitors the network for unusual connection fluctuations."
    }

    fn service(&self) -> &str {
        "operserv"
    }

    fn commands(&self) -> &[&str] {
        &["CONNAVG"]
    }

    fn privilege(&self) -> Option<Privilege> {
        Some(Privilege::ServerAuspex)
    }

    fn timer_interval(&self) -> Option<Duration> {
        match self.strategy {
            ResetStrategy::Timer => Some(Duration::from_secs(WINDOW_SECS as u64)),
            ResetStrategy::Lazy => None,
        }
    }

    async fn handle_command(
        &self,
        _command: &str,
        _args: &str,
        ctx: &CommandContext,
        host: &Host,
    ) -> Result<Option<Vec<String>>, Box<dyn std::error::Error + Send + Sync>> {
        let lines = self.report_status(host);
        host.logcommand(&ctx.session, CommandLog::Get, "CONNAVG");
        Ok(Some(lines))
    }

    async fn handle_event(
        &self,
        event: &HostEvent,
        host: &Host,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let HostEvent::UserAdd(user) = event {
            self.on_connection(user.as_ref(), host);
        }
        Ok(())
    }

    async fn handle_timer(&self, host: &Host) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.reset_window(host);
        Ok(())
    }

    fn unload(&self, conf: &ConfTable) {
        conf.remove(SAFE_CONNECTIONS_BLOCK, SAFE_CONNECTIONS_KEY);
    }
}
