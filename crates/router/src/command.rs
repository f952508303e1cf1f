//! Command registration and trigger matching (C7).
//!
//! Ported from `signal_client/services/command_service.py::CommandService`:
//! case-folds unless the command is case-sensitive, tries each trigger in
//! registration order, literal triggers match by prefix, regex triggers
//! match anywhere in the text. Whitelisting is deferred to dispatch.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

use crate::middleware::DispatchContext;

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &mut DispatchContext) -> crate::Result<()>;
}

#[derive(Clone)]
pub enum Trigger {
    Literal(String),
    Regex(Regex),
}

impl Trigger {
    fn matches(&self, text: &str) -> bool {
        match self {
            Trigger::Literal(prefix) => text.starts_with(prefix.as_str()),
            Trigger::Regex(re) => re.is_match(text),
        }
    }
}

pub struct Command {
    pub name: String,
    pub triggers: Vec<Trigger>,
    pub case_sensitive: bool,
    pub whitelist: HashSet<String>,
    pub handler: Arc<dyn CommandHandler>,
}

impl Command {
    #[must_use]
    pub fn new(name: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.into(),
            triggers: Vec::new(),
            case_sensitive: false,
            whitelist: HashSet::new(),
            handler,
        }
    }

    #[must_use]
    pub fn with_literal_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.triggers.push(Trigger::Literal(trigger.into()));
        self
    }

    #[must_use]
    pub fn with_regex_trigger(mut self, trigger: Regex) -> Self {
        self.triggers.push(Trigger::Regex(trigger));
        self
    }

    #[must_use]
    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }

    #[must_use]
    pub fn with_whitelist(mut self, whitelist: HashSet<String>) -> Self {
        self.whitelist = whitelist;
        self
    }

    /// Whether `source` is permitted to invoke this command. An empty
    /// whitelist means unrestricted.
    #[must_use]
    pub fn is_allowed(&self, source: &str) -> bool {
        self.whitelist.is_empty() || self.whitelist.contains(source)
    }

    fn matches(&self, text: &str) -> Option<&Trigger> {
        let folded;
        let candidate: &str = if self.case_sensitive {
            text
        } else {
            folded = text.to_lowercase();
            &folded
        };
        self.triggers.iter().find(|trigger| match trigger {
            Trigger::Literal(prefix) => {
                let prefix = if self.case_sensitive {
                    prefix.clone()
                } else {
                    prefix.to_lowercase()
                };
                candidate.starts_with(prefix.as_str())
            }
            Trigger::Regex(_) => trigger.matches(candidate),
        })
    }
}

/// A matched command plus the trigger literal/pattern that fired, for
/// structured logging and DLQ metadata.
pub struct Matched<'a> {
    pub command: &'a Command,
    pub trigger: String,
}

/// Holds an ordered list of commands and matches inbound text against
/// them.
#[derive(Default)]
pub struct CommandRouter {
    commands: Vec<Arc<Command>>,
}

impl CommandRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `command` unless an object-identical command is already
    /// registered.
    pub fn register(&mut self, command: Arc<Command>) {
        if self.commands.iter().any(|c| Arc::ptr_eq(c, &command)) {
            return;
        }
        self.commands.push(command);
    }

    /// Find the first command (in registration order) whose trigger
    /// matches `text`. Whitelisting is **not** evaluated here.
    #[must_use]
    pub fn match_text(&self, text: &str) -> Option<Matched<'_>> {
        if text.is_empty() {
            return None;
        }
        self.commands.iter().find_map(|command| {
            command.matches(text).map(|trigger| Matched {
                command,
                trigger: trigger_label(trigger),
            })
        })
    }
}

fn trigger_label(trigger: &Trigger) -> String {
    match trigger {
        Trigger::Literal(prefix) => prefix.clone(),
        Trigger::Regex(re) => re.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::DispatchContext;
    use signalrt_protocol::{Message, MessageKind};
    use uuid::Uuid;

    struct NoopHandler;

    #[async_trait]
    impl CommandHandler for NoopHandler {
        async fn handle(&self, _ctx: &mut DispatchContext) -> crate::Result<()> {
            Ok(())
        }
    }

    fn sample_message(text: &str) -> Message {
        Message {
            id: Uuid::nil(),
            source: "+1".into(),
            destination: None,
            timestamp: 1,
            kind: MessageKind::Data,
            text: Some(text.into()),
            group: None,
            mentions: vec![],
            attachments: vec![],
            quote: None,
            reaction: None,
            edit_target: None,
            delete_target: None,
            view_once: false,
            raw: String::new(),
        }
    }

    #[test]
    fn literal_trigger_matches_prefix_only() {
        let cmd = Command::new("ping", Arc::new(NoopHandler)).with_literal_trigger("!ping");
        assert!(cmd.matches("!ping").is_some());
        assert!(cmd.matches("!pinging").is_some());
        assert!(cmd.matches("say !ping").is_none());
    }

    #[test]
    fn regex_trigger_matches_anywhere() {
        let cmd = Command::new("ping", Arc::new(NoopHandler))
            .with_regex_trigger(Regex::new(r"ping\d+").unwrap());
        assert!(cmd.matches("say ping42 now").is_some());
    }

    #[test]
    fn case_folding_applies_unless_case_sensitive() {
        let cmd = Command::new("ping", Arc::new(NoopHandler)).with_literal_trigger("!PING");
        assert!(cmd.matches("!ping").is_some());

        let strict = Command::new("ping", Arc::new(NoopHandler))
            .with_literal_trigger("!PING")
            .case_sensitive(true);
        assert!(strict.matches("!ping").is_none());
    }

    #[test]
    fn empty_text_never_matches() {
        let mut router = CommandRouter::new();
        router.register(Arc::new(
            Command::new("ping", Arc::new(NoopHandler)).with_literal_trigger(""),
        ));
        assert!(router.match_text("").is_none());
    }

    #[test]
    fn first_registered_match_wins() {
        let mut router = CommandRouter::new();
        router.register(Arc::new(
            Command::new("a", Arc::new(NoopHandler)).with_literal_trigger("!hi"),
        ));
        router.register(Arc::new(
            Command::new("b", Arc::new(NoopHandler)).with_literal_trigger("!hi"),
        ));
        let matched = router.match_text("!hi there").unwrap();
        assert_eq!(matched.command.name, "a");
    }

    #[test]
    fn duplicate_registration_by_identity_is_ignored() {
        let mut router = CommandRouter::new();
        let cmd = Arc::new(Command::new("a", Arc::new(NoopHandler)).with_literal_trigger("!hi"));
        router.register(cmd.clone());
        router.register(cmd);
        assert_eq!(router.commands.len(), 1);
    }

    #[test]
    fn whitelist_empty_allows_anyone() {
        let cmd = Command::new("a", Arc::new(NoopHandler));
        assert!(cmd.is_allowed("+anyone"));
    }

    #[test]
    fn whitelist_blocks_non_members() {
        let cmd = Command::new("a", Arc::new(NoopHandler))
            .with_whitelist(["+admin".to_string()].into_iter().collect());
        assert!(!cmd.is_allowed("+user"));
        assert!(cmd.is_allowed("+admin"));
    }

    #[test]
    fn sample_message_has_expected_text() {
        assert_eq!(sample_message("hi").text.as_deref(), Some("hi"));
    }
}
