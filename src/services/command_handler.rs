use crate::config::Config;
use crate::host::CommandLog;
use crate::message::{CommandContext, Privilege, Session};

use super::*;

impl Services {
    pub(super) async fn dispatch_command(
        &self,
        session: Session,
        service: &str,
        command: &str,
        args: &str,
    ) {
        let privileges = session
            .account
            .as_deref()
            .map(|account| self.config().privileges_for(account))
            .unwrap_or_default();
        let ctx = CommandContext {
            session,
            service: service.to_string(),
            privileges,
        };

        if command.eq_ignore_ascii_case("HELP") {
            let help_text = self.generate_help_text(service);
            self.reply(&ctx, &help_text);
            return;
        }

        if command.eq_ignore_ascii_case("REHASH") && service.eq_ignore_ascii_case("operserv") {
            let lines = if ctx.has_privilege(Privilege::Admin) {
                self.rehash(&ctx)
            } else {
                self.deny(&ctx, Privilege::Admin, "REHASH")
            };
            self.reply(&ctx, &lines);
            return;
        }

        let module = match self.registry.find_by_command(service, command) {
            Some(m) => m,
            None => {
                self.reply(
                    &ctx,
                    &["Invalid command. Use HELP for a command listing.".to_string()],
                );
                return;
            }
        };

        if let Some(required) = module.privilege() {
            if !ctx.has_privilege(required) {
                let lines = self.deny(&ctx, required, &command.to_uppercase());
                self.reply(&ctx, &lines);
                return;
            }
        }

        match module.handle_command(command, args, &ctx, &self.host).await {
            Ok(Some(lines)) => self.reply(&ctx, &lines),
            Ok(None) => {}
            Err(e) => {
                log::error!("Module {} error: {}", module.name(), e);
            }
        }
    }

    fn reply(&self, ctx: &CommandContext, lines: &[String]) {
        let from = self.service_nick(&ctx.service);
        for line in lines {
            self.host.notice(&from, &ctx.session.nick, line);
        }
    }

    fn deny(&self, ctx: &CommandContext, required: Privilege, command: &str) -> Vec<String> {
        log::warn!(
            "{} denied {}: missing {}",
            ctx.session.nick,
            command,
            required
        );
        self.host
            .logcommand(&ctx.session, CommandLog::Denied, command);
        vec![format!("You do not have {} privilege.", required)]
    }

    /// Reload the configuration file and re-apply every live conf item. On
    /// failure the running configuration is kept.
    fn rehash(&self, ctx: &CommandContext) -> Vec<String> {
        let Some(path) = &self.config_path else {
            return vec!["No configuration file to reload.".to_string()];
        };

        match Config::load(path) {
            Ok(config) => {
                self.conf.apply(&config);
                *self.config.write().unwrap() = Arc::new(config);
                log::info!("Configuration reloaded from {}", path.display());
                self.host.logcommand(&ctx.session, CommandLog::Admin, "REHASH");
                vec!["Configuration reloaded.".to_string()]
            }
            Err(e) => {
                log::error!("REHASH of {} failed: {}", path.display(), e);
                vec![format!("REHASH failed: {}", e)]
            }
        }
    }

    pub(super) fn generate_help_text(&self, service: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for module in self.registry.for_service(service) {
            for cmd in module.commands() {
                lines.push(format!("{} - {}", cmd, module.description()));
            }
        }
        if service.eq_ignore_ascii_case("operserv") {
            lines.push("REHASH - Reloads the configuration file.".to_string());
        }
        if lines.is_empty() {
            vec!["No commands available.".to_string()]
        } else {
            lines.insert(0, format!("Commands available on {}:", self.service_nick(service)));
            lines
        }
    }
}
