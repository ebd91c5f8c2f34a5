use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::message::Session;

/// Wall-clock source, in unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Outbound side of the network link.
pub trait Network: Send + Sync {
    /// Best-effort operator-visible broadcast.
    fn wallops(&self, text: &str);
    /// Private reply from `service` to `target`.
    fn notice(&self, service: &str, target: &str, text: &str);
}

/// Writes broadcasts and notices to stdout for the console driver.
pub struct ConsoleNetwork;

impl Network for ConsoleNetwork {
    fn wallops(&self, text: &str) {
        log::warn!(target: "wallops", "{}", text);
        println!("[wallops] {}", text);
    }

    fn notice(&self, service: &str, target: &str, text: &str) {
        log::debug!("NOTICE {} -> {}: {}", service, target, text);
        println!("-{}- {}", service, text);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandLog {
    /// Read-only query.
    Get,
    /// Configuration change.
    Admin,
    /// Privilege check failed.
    Denied,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub session: Session,
    pub level: CommandLog,
    pub text: String,
}

pub trait AuditLog: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// Sends audit entries to the `audit` log target.
pub struct LogAudit;

impl AuditLog for LogAudit {
    fn record(&self, entry: &AuditEntry) {
        let who = entry.session.account.as_deref().unwrap_or("*");
        log::info!(
            target: "audit",
            "{} ({}) {:?}: {}",
            entry.session.nick,
            who,
            entry.level,
            entry.text
        );
    }
}

/// Host daemon state and collaborators handed to every module callback.
pub struct Host {
    clock: Arc<dyn Clock>,
    network: Arc<dyn Network>,
    audit: Arc<dyn AuditLog>,
    bursting: AtomicBool,
}

impl Host {
    pub fn new(clock: Arc<dyn Clock>, network: Arc<dyn Network>, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            clock,
            network,
            audit,
            bursting: AtomicBool::new(false),
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// True while a linked server is sending its initial state burst.
    pub fn is_bursting(&self) -> bool {
        self.bursting.load(Ordering::Relaxed)
    }

    pub fn set_bursting(&self, bursting: bool) {
        self.bursting.store(bursting, Ordering::Relaxed);
    }

    pub fn wallops(&self, text: &str) {
        self.network.wallops(text);
    }

    pub fn notice(&self, service: &str, target: &str, text: &str) {
        self.network.notice(service, target, text);
    }

    pub fn logcommand(&self, session: &Session, level: CommandLog, text: &str) {
        self.audit.record(&AuditEntry {
            session: session.clone(),
            level,
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
pub mod testing {
    //! Recording doubles for the host collaborators.

    use std::sync::atomic::AtomicI64;
    use std::sync::Mutex;

    use super::*;

    pub struct FakeClock(AtomicI64);

    impl FakeClock {
        pub fn new(now: i64) -> Self {
            Self(AtomicI64::new(now))
        }

        pub fn set(&self, now: i64) {
            self.0.store(now, Ordering::Relaxed);
        }

        pub fn advance(&self, secs: i64) {
            self.0.fetch_add(secs, Ordering::Relaxed);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> i64 {
            self.0.load(Ordering::Relaxed)
        }
    }

    #[derive(Default)]
    pub struct RecordingNetwork {
        pub wallops: Mutex<Vec<String>>,
        pub notices: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingNetwork {
        pub fn sent_wallops(&self) -> Vec<String> {
            self.wallops.lock().unwrap().clone()
        }

        pub fn notice_texts(&self) -> Vec<String> {
            self.notices
                .lock()
                .unwrap()
                .iter()
                .map(|(_, _, text)| text.clone())
                .collect()
        }
    }

    impl Network for RecordingNetwork {
        fn wallops(&self, text: &str) {
            self.wallops.lock().unwrap().push(text.to_string());
        }

        fn notice(&self, service: &str, target: &str, text: &str) {
            self.notices
                .lock()
                .unwrap()
                .push((service.to_string(), target.to_string(), text.to_string()));
        }
    }

    #[derive(Default)]
    pub struct RecordingAudit(pub Mutex<Vec<AuditEntry>>);

    impl RecordingAudit {
        pub fn entries(&self) -> Vec<AuditEntry> {
            self.0.lock().unwrap().clone()
        }
    }

    impl AuditLog for RecordingAudit {
        fn record(&self, entry: &AuditEntry) {
            self.0.lock().unwrap().push(entry.clone());
        }
    }

    pub struct TestHost {
        pub clock: Arc<FakeClock>,
        pub network: Arc<RecordingNetwork>,
        pub audit: Arc<RecordingAudit>,
        pub host: Host,
    }

    pub fn test_host(now: i64) -> TestHost {
        let clock = Arc::new(FakeClock::new(now));
        let network = Arc::new(RecordingNetwork::default());
        let audit = Arc::new(RecordingAudit::default());
        let host = Host::new(clock.clone(), network.clone(), audit.clone());
        TestHost {
            clock,
            network,
            audit,
            host,
        }
    }
}
