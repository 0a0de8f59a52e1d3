//! `/addadmin`, `/removeadmin` and `/listadmins`.

use tracing::{error, info};

use super::Dialogue;
use crate::config::parse_user_id;
use crate::event::{Inbound, Reply, Sender};

impl Dialogue {
    async fn deny_admin_command(&self, sender: &Sender) -> Option<Vec<Reply>> {
        if self.auth.is_authorized(sender.id).await {
            None
        } else {
            info!(user_id = sender.id, "Admin command denied");
            Some(vec![self.reply(sender, "permission_denied_admin_command", &[])])
        }
    }

    fn reply(&self, sender: &Sender, key: &str, params: &[(&str, &str)]) -> Reply {
        Reply::text(self.t(sender, key, params)).quoting()
    }

    /// `/addadmin <id>` or `/addadmin` in reply to the new admin's message.
    pub async fn add_admin(&self, inbound: &Inbound, arg: &str) -> Vec<Reply> {
        let sender = &inbound.sender;
        if let Some(denied) = self.deny_admin_command(sender).await {
            return denied;
        }
        let Some(target) = resolve_target(inbound, arg) else {
            return vec![self.reply(sender, "add_admin_usage", &[])];
        };
        let id = target.to_string();
        let params = [("user_id", id.as_str())];

        if self.auth.is_authorized(target).await {
            return vec![self.reply(sender, "add_admin_already_admin", &params)];
        }

        let key = if self.auth.add(target, sender.id).await {
            "add_admin_success"
        } else {
            "add_admin_failed"
        };
        vec![self.reply(sender, key, &params)]
    }

    /// `/removeadmin <id>` or `/removeadmin` in reply to the admin's message.
    pub async fn remove_admin(&self, inbound: &Inbound, arg: &str) -> Vec<Reply> {
        let sender = &inbound.sender;
        if let Some(denied) = self.deny_admin_command(sender).await {
            return denied;
        }
        let Some(target) = resolve_target(inbound, arg) else {
            return vec![self.reply(sender, "remove_admin_usage", &[])];
        };
        if self.auth.is_super_admin(target) {
            return vec![self.reply(sender, "remove_admin_cannot_remove_super", &[])];
        }

        let id = target.to_string();
        let params = [("user_id", id.as_str())];
        if !self.auth.is_authorized(target).await {
            return vec![self.reply(sender, "remove_admin_not_admin", &params)];
        }

        let key = if self.auth.remove(target).await {
            "remove_admin_success"
        } else {
            "remove_admin_failed"
        };
        vec![self.reply(sender, key, &params)]
    }

    /// `/listadmins`: the super admin first, then the stored roster.
    pub async fn list_admins(&self, sender: &Sender) -> Vec<Reply> {
        if let Some(denied) = self.deny_admin_command(sender).await {
            return denied;
        }

        let roster = match self.admins.list().await {
            Ok(roster) => roster,
            Err(e) => {
                error!(error = %e, "Failed to read admin roster");
                return vec![self.reply(sender, "list_admins_failed", &[])];
            }
        };

        let super_admin = self.auth.super_admin();
        let mut lines = Vec::new();
        if let Some(id) = super_admin {
            lines.push(format!(
                "— ID: {}{}",
                id,
                self.t(sender, "list_admins_super_admin_indicator", &[])
            ));
        }
        for record in roster.iter().filter(|r| Some(r.user_id) != super_admin) {
            let user_id = record.user_id.to_string();
            let added_by = record.added_by.to_string();
            let added_at = record.added_at.format("%Y-%m-%d %H:%M").to_string();
            lines.push(self.t(
                sender,
                "list_admins_entry",
                &[
                    ("user_id", user_id.as_str()),
                    ("added_by", added_by.as_str()),
                    ("added_at", added_at.as_str()),
                ],
            ));
        }

        if lines.is_empty() {
            return vec![self.reply(sender, "list_admins_empty", &[])];
        }

        let text = format!("{}\n{}", self.t(sender, "list_admins_title", &[]), lines.join("\n"));
        vec![Reply::text(text).quoting()]
    }
}

/// A numeric argument, else the sender of the replied-to message.
fn resolve_target(inbound: &Inbound, arg: &str) -> Option<i64> {
    parse_user_id(arg).or_else(|| inbound.reply_to.as_ref().map(|s| s.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Chat;

    fn inbound(reply_to: Option<i64>) -> Inbound {
        let mut inbound = Inbound::text(Sender::new(1, "Root"), Chat::private(1), "/addadmin");
        inbound.reply_to = reply_to.map(|id| Sender::new(id, "Target"));
        inbound
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target(&inbound(None), "42"), Some(42));
        assert_eq!(resolve_target(&inbound(Some(7)), "42"), Some(42));
        assert_eq!(resolve_target(&inbound(Some(7)), ""), Some(7));
        assert_eq!(resolve_target(&inbound(Some(7)), "bob"), Some(7));
        assert_eq!(resolve_target(&inbound(None), "bob"), None);
        assert_eq!(resolve_target(&inbound(None), ""), None);
    }
}
