use std::fmt;

/// Operator privileges a command can be gated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Privilege {
    /// May view server-wide state.
    ServerAuspex,
    /// May reconfigure services.
    Admin,
}

impl Privilege {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "server:auspex" => Some(Privilege::ServerAuspex),
            "general:admin" => Some(Privilege::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::ServerAuspex => "server:auspex",
            Privilege::Admin => "general:admin",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client introduced to the network.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub nick: String,
    /// Set for service pseudo-clients.
    pub internal: bool,
}

impl User {
    pub fn client(nick: &str) -> Self {
        Self {
            nick: nick.to_string(),
            internal: false,
        }
    }

    pub fn service(nick: &str) -> Self {
        Self {
            nick: nick.to_string(),
            internal: true,
        }
    }
}

/// The operator session a command arrived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub nick: String,
    pub account: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CommandContext {
    pub session: Session,
    pub service: String,
    pub privileges: Vec<Privilege>,
}

impl CommandContext {
    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        self.privileges.contains(&privilege)
    }
}

#[derive(Debug, Clone)]
pub enum HostEvent {
    /// A user was introduced. `None` when it was killed before the hook ran.
    UserAdd(Option<User>),
    BurstStart,
    BurstEnd,
    Command {
        session: Session,
        service: String,
        command: String,
        args: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_from_str() {
        assert_eq!(Privilege::from_str("server:auspex"), Some(Privilege::ServerAuspex));
        assert_eq!(Privilege::from_str("SERVER:AUSPEX"), Some(Privilege::ServerAuspex));
        assert_eq!(Privilege::from_str("general:admin"), Some(Privilege::Admin));
        assert_eq!(Privilege::from_str("chan:admin"), None);
    }

    #[test]
    fn test_privilege_display_round_trips_name() {
        assert_eq!(Privilege::ServerAuspex.to_string(), "server:auspex");
        assert_eq!(Privilege::Admin.to_string(), "general:admin");
    }

    #[test]
    fn test_has_privilege() {
        let ctx = CommandContext {
            session: Session {
                nick: "alice".to_string(),
                account: Some("alice".to_string()),
            },
            service: "operserv".to_string(),
            privileges: vec![Privilege::ServerAuspex],
        };
        assert!(ctx.has_privilege(Privilege::ServerAuspex));
        assert!(!ctx.has_privilege(Privilege::Admin));
    }

    #[test]
    fn test_user_constructors() {
        assert!(!User::client("bob").internal);
        assert!(User::service("NickServ").internal);
    }
}
