//! Classification and parsing of raw gateway envelope JSON into [`Message`].
//!
//! Mirrors `signal_client/infrastructure/websocket_client.py::_classify_envelope`
//! and the schema validation in `adapters/api/schemas/message.py`: a
//! `dataMessage` is inspected for `remoteDelete`, `reaction`, then
//! `editTimestamp` (in that precedence order) before falling back to a
//! plain `Data` message; a `syncMessage.sentMessage` is unwrapped as a
//! `Sync` message with the envelope's own fields replaced by the nested
//! ones; anything else yields `Unsupported`.
//!
//! `source`/`destination` are run through
//! `signalrt_common::ids::normalize_number` here, at parse time — the
//! dedup checkpoint and the shard/lock recipient key are both derived
//! from these fields downstream, so a bare digit string and its `+`
//! prefixed form must canonicalize to the same value before either
//! comparison happens, not just when `Message`'s own helper methods
//! compare two identities.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::message::{AttachmentPointer, GroupInfo, Message, MessageKind, Quote, Reaction};

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid envelope JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("envelope missing required field `{0}`")]
    MissingField(&'static str),

    #[error("envelope is not a recognized message type")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Deserialize)]
struct RawEnvelope {
    source: Option<String>,
    #[serde(rename = "sourceNumber")]
    source_number: Option<String>,
    #[serde(rename = "sourceUuid")]
    source_uuid: Option<String>,
    timestamp: Option<i64>,
    #[serde(rename = "dataMessage")]
    data_message: Option<RawDataMessage>,
    #[serde(rename = "syncMessage")]
    sync_message: Option<RawSyncMessage>,
}

#[derive(Deserialize, Default)]
struct RawDataMessage {
    message: Option<String>,
    timestamp: Option<i64>,
    #[serde(rename = "groupInfo")]
    group_info: Option<RawGroupInfo>,
    #[serde(default)]
    mentions: Vec<RawMention>,
    #[serde(default)]
    attachments: Vec<RawAttachment>,
    quote: Option<RawQuote>,
    reaction: Option<RawReaction>,
    #[serde(rename = "editTimestamp")]
    edit_timestamp: Option<i64>,
    #[serde(rename = "remoteDelete")]
    remote_delete: Option<RawRemoteDelete>,
    #[serde(rename = "viewOnce", default)]
    view_once: bool,
}

#[derive(Deserialize)]
struct RawSyncMessage {
    #[serde(rename = "sentMessage")]
    sent_message: Option<RawSentMessage>,
}

#[derive(Deserialize)]
struct RawSentMessage {
    destination: Option<String>,
    timestamp: Option<i64>,
    message: Option<String>,
    #[serde(rename = "groupInfo")]
    group_info: Option<RawGroupInfo>,
    #[serde(default)]
    mentions: Vec<RawMention>,
    #[serde(default)]
    attachments: Vec<RawAttachment>,
}

#[derive(Deserialize)]
struct RawGroupInfo {
    #[serde(rename = "groupId")]
    group_id: String,
}

#[derive(Deserialize)]
struct RawMention {
    number: Option<String>,
    uuid: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawAttachment {
    id: Option<String>,
    #[serde(rename = "contentType")]
    content_type: Option<String>,
    filename: Option<String>,
    size: Option<i64>,
}

#[derive(Deserialize)]
struct RawQuote {
    id: i64,
    author: Option<String>,
    text: Option<String>,
    #[serde(default)]
    attachments: Vec<RawAttachment>,
}

#[derive(Deserialize)]
struct RawReaction {
    emoji: String,
    #[serde(rename = "targetAuthor")]
    target_author: Option<String>,
    #[serde(rename = "targetSentTimestamp")]
    target_sent_timestamp: i64,
}

#[derive(Deserialize)]
struct RawRemoteDelete {
    timestamp: i64,
}

impl From<RawAttachment> for AttachmentPointer {
    fn from(raw: RawAttachment) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            content_type: raw.content_type,
            filename: raw.filename,
            size: raw.size,
        }
    }
}

fn mentions_to_strings(mentions: Vec<RawMention>) -> Vec<String> {
    mentions
        .into_iter()
        .filter_map(|m| m.number.or(m.uuid))
        .collect()
}

/// Best-effort source-identity extraction: prefers the E.164 number,
/// falls back to the account UUID.
fn source_identity(source: Option<String>, number: Option<String>, uuid: Option<String>) -> Option<String> {
    number.or(source).or(uuid)
}

/// Parse a raw envelope frame into a [`Message`].
///
/// # Errors
/// Returns [`Error::InvalidJson`] if `raw` is not valid JSON,
/// [`Error::MissingField`] if a required field is absent from a
/// recognized envelope shape, and [`Error::Unsupported`] if the envelope
/// matches neither `dataMessage` nor `syncMessage.sentMessage`.
pub fn parse(raw: &str) -> Result<Message> {
    let envelope: RawEnvelope = serde_json::from_str(raw)?;

    if let Some(data) = envelope.data_message {
        let source = source_identity(envelope.source, envelope.source_number, envelope.source_uuid)
            .map(|s| signalrt_common::ids::normalize_number(&s))
            .ok_or(Error::MissingField("source"))?;
        let timestamp = data
            .timestamp
            .or(envelope.timestamp)
            .ok_or(Error::MissingField("timestamp"))?;

        let kind = if data.remote_delete.is_some() {
            MessageKind::Delete
        } else if data.reaction.is_some() {
            MessageKind::Data
        } else if data.edit_timestamp.is_some() {
            MessageKind::Edit
        } else {
            MessageKind::Data
        };

        return Ok(Message {
            id: Uuid::new_v4(),
            source,
            destination: None,
            timestamp,
            kind,
            text: data.message,
            group: data.group_info.map(|g| GroupInfo { id: g.group_id }),
            mentions: mentions_to_strings(data.mentions),
            attachments: data.attachments.into_iter().map(Into::into).collect(),
            quote: data.quote.map(|q| Quote {
                id: q.id,
                author: q.author.unwrap_or_default(),
                text: q.text,
                attachments: q.attachments.into_iter().map(Into::into).collect(),
            }),
            reaction: data.reaction.map(|r| Reaction {
                emoji: r.emoji,
                target_author: r.target_author.unwrap_or_default(),
                target_timestamp: r.target_sent_timestamp,
            }),
            edit_target: data.edit_timestamp,
            delete_target: data.remote_delete.map(|d| d.timestamp),
            view_once: data.view_once,
            raw: raw.to_string(),
        });
    }

    if let Some(sync) = envelope.sync_message {
        let sent = sync.sent_message.ok_or(Error::Unsupported)?;
        let source = source_identity(envelope.source, envelope.source_number, envelope.source_uuid)
            .map(|s| signalrt_common::ids::normalize_number(&s))
            .ok_or(Error::MissingField("source"))?;
        let timestamp = sent
            .timestamp
            .or(envelope.timestamp)
            .ok_or(Error::MissingField("timestamp"))?;

        return Ok(Message {
            id: Uuid::new_v4(),
            source,
            destination: sent.destination.map(|d| signalrt_common::ids::normalize_number(&d)),
            timestamp,
            kind: MessageKind::Sync,
            text: sent.message,
            group: sent.group_info.map(|g| GroupInfo { id: g.group_id }),
            mentions: mentions_to_strings(sent.mentions),
            attachments: sent.attachments.into_iter().map(Into::into).collect(),
            quote: None,
            reaction: None,
            edit_target: None,
            delete_target: None,
            view_once: false,
            raw: raw.to_string(),
        });
    }

    Err(Error::Unsupported)
}

/// Extract a recipient hint from a raw frame without fully parsing it,
/// used by the listener to log/shard-route frames that fail [`parse`].
#[must_use]
pub fn recipient_from_raw(raw: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw).ok()?;
    if let Some(group_id) = value
        .pointer("/dataMessage/groupInfo/groupId")
        .or_else(|| value.pointer("/syncMessage/sentMessage/groupInfo/groupId"))
        .and_then(Value::as_str)
    {
        return Some(group_id.to_string());
    }
    value
        .get("sourceNumber")
        .or_else(|| value.get("source"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_data_message() {
        let raw = r#"{
            "source": "+15550001",
            "timestamp": 1000,
            "dataMessage": {"message": "hi", "timestamp": 1000}
        }"#;
        let msg = parse(raw).unwrap();
        assert_eq!(msg.kind, MessageKind::Data);
        assert_eq!(msg.text.as_deref(), Some("hi"));
        assert_eq!(msg.source, "+15550001");
    }

    #[test]
    fn bare_digit_source_is_canonicalized_to_plus_prefixed() {
        let raw = r#"{
            "source": "15550001",
            "timestamp": 1000,
            "dataMessage": {"message": "hi", "timestamp": 1000}
        }"#;
        let msg = parse(raw).unwrap();
        assert_eq!(msg.source, "+15550001");
    }

    #[test]
    fn parses_group_message() {
        let raw = r#"{
            "source": "+15550001",
            "timestamp": 1000,
            "dataMessage": {
                "message": "hi group",
                "timestamp": 1000,
                "groupInfo": {"groupId": "grp-1"}
            }
        }"#;
        let msg = parse(raw).unwrap();
        assert!(msg.is_group());
        assert_eq!(msg.recipient(), "grp-1");
    }

    #[test]
    fn remote_delete_takes_precedence_over_edit() {
        let raw = r#"{
            "source": "+15550001",
            "timestamp": 1000,
            "dataMessage": {
                "timestamp": 1000,
                "remoteDelete": {"timestamp": 900},
                "editTimestamp": 900
            }
        }"#;
        let msg = parse(raw).unwrap();
        assert_eq!(msg.kind, MessageKind::Delete);
        assert_eq!(msg.delete_target, Some(900));
    }

    #[test]
    fn reaction_takes_precedence_over_edit() {
        let raw = r#"{
            "source": "+15550001",
            "timestamp": 1000,
            "dataMessage": {
                "timestamp": 1000,
                "reaction": {"emoji": "👍", "targetAuthor": "+15550002", "targetSentTimestamp": 900},
                "editTimestamp": 900
            }
        }"#;
        let msg = parse(raw).unwrap();
        assert_eq!(msg.kind, MessageKind::Data);
        assert!(msg.reaction.is_some());
    }

    #[test]
    fn parses_sync_sent_message() {
        let raw = r#"{
            "source": "+19998887777",
            "timestamp": 1000,
            "syncMessage": {
                "sentMessage": {
                    "destination": "+15550001",
                    "timestamp": 1000,
                    "message": "from another device"
                }
            }
        }"#;
        let msg = parse(raw).unwrap();
        assert_eq!(msg.kind, MessageKind::Sync);
        assert_eq!(msg.destination.as_deref(), Some("+15550001"));
    }

    #[test]
    fn sync_destination_is_canonicalized_to_plus_prefixed() {
        let raw = r#"{
            "source": "+19998887777",
            "timestamp": 1000,
            "syncMessage": {
                "sentMessage": {
                    "destination": "15550001",
                    "timestamp": 1000,
                    "message": "from another device"
                }
            }
        }"#;
        let msg = parse(raw).unwrap();
        assert_eq!(msg.destination.as_deref(), Some("+15550001"));
    }

    #[test]
    fn unsupported_envelope_shape_errors() {
        let raw = r#"{"source": "+15550001", "timestamp": 1000, "receiptMessage": {}}"#;
        assert!(matches!(parse(raw), Err(Error::Unsupported)));
    }

    #[test]
    fn invalid_json_errors() {
        assert!(matches!(parse("not json"), Err(Error::InvalidJson(_))));
    }

    #[test]
    fn recipient_from_raw_finds_group_id_without_full_parse() {
        let raw = r#"{"dataMessage": {"groupInfo": {"groupId": "grp-9"}}}"#;
        assert_eq!(recipient_from_raw(raw).as_deref(), Some("grp-9"));
    }
}
