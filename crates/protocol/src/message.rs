//! The parsed, immutable message domain type.
//!
//! Field set ported from `signal_client/adapters/api/schemas/message.py`
//! (the richer of the two schemas carried by the original source — see
//! `DESIGN.md` for why it was chosen over the flatter `domain/message.py`
//! variant).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Data,
    Sync,
    Edit,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttachmentPointer {
    pub id: String,
    pub content_type: Option<String>,
    pub filename: Option<String>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub author: String,
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPointer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    pub target_author: String,
    pub target_timestamp: i64,
}

/// An immutable, fully-parsed chat event.
///
/// `(source, timestamp)` uniquely identifies a message on the wire; `id`
/// is assigned fresh at parse time and must never be used for dedup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub source: String,
    pub destination: Option<String>,
    pub timestamp: i64,
    pub kind: MessageKind,
    pub text: Option<String>,
    pub group: Option<GroupInfo>,
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPointer>,
    pub quote: Option<Quote>,
    pub reaction: Option<Reaction>,
    pub edit_target: Option<i64>,
    pub delete_target: Option<i64>,
    #[serde(default)]
    pub view_once: bool,
    /// The original frame, retained so a dead-lettered message can be
    /// replayed without re-fetching it from the gateway.
    pub raw: String,
}

impl Message {
    /// The shard/routing key: the group id for group messages, else the
    /// source.
    #[must_use]
    pub fn recipient(&self) -> &str {
        match &self.group {
            Some(group) => &group.id,
            None => &self.source,
        }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.group.is_some()
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        !self.is_group()
    }

    /// True when this message originated from the bot's own linked
    /// devices (a `Sync` echo) or its canonicalized source matches
    /// `own_number`.
    #[must_use]
    pub fn is_self(&self, own_number: &str) -> bool {
        self.kind == MessageKind::Sync
            || signalrt_common::ids::normalize_number(&self.source)
                == signalrt_common::ids::normalize_number(own_number)
    }

    /// The chat this message logically belongs to from the bot's point of
    /// view: the group id for groups, else the counterpart number for a
    /// 1:1 chat (handling the case where a sync echo carries the bot's
    /// own number as `source`).
    #[must_use]
    pub fn target_chat(&self, own_number: &str) -> String {
        if self.is_group() {
            return self.recipient().to_string();
        }
        if self.is_self(own_number) {
            let own_norm = signalrt_common::ids::normalize_number(own_number);
            return self
                .destination
                .as_deref()
                .map(signalrt_common::ids::normalize_number)
                .filter(|d| d != &own_norm)
                .unwrap_or(own_norm);
        }
        signalrt_common::ids::normalize_number(&self.source)
    }

    #[must_use]
    pub fn is_reply_to(&self, number: &str) -> bool {
        self.quote.as_ref().is_some_and(|quote| {
            signalrt_common::ids::normalize_number(&quote.author)
                == signalrt_common::ids::normalize_number(number)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(kind: MessageKind) -> Message {
        Message {
            id: Uuid::nil(),
            source: "+15550001".into(),
            destination: None,
            timestamp: 1,
            kind,
            text: None,
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
    fn recipient_is_source_for_private_chat() {
        assert_eq!(base(MessageKind::Data).recipient(), "+15550001");
    }

    #[test]
    fn recipient_is_group_id_when_present() {
        let mut msg = base(MessageKind::Data);
        msg.group = Some(GroupInfo { id: "group-abc".into() });
        assert_eq!(msg.recipient(), "group-abc");
    }

    #[test]
    fn sync_message_is_always_self() {
        let msg = base(MessageKind::Sync);
        assert!(msg.is_self("+19998887777"));
    }

    #[test]
    fn reply_to_matches_normalized_quote_author() {
        let mut msg = base(MessageKind::Data);
        msg.quote = Some(Quote {
            id: 1,
            author: "15551112222".into(),
            text: None,
            attachments: vec![],
        });
        assert!(msg.is_reply_to("+15551112222"));
    }
}
