use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{
    chat::record::Message,
    foundation::error::{ChatreelError, ChatreelResult},
};

/// Reserved first filename segment marking a multi-party conversation.
pub const GROUP_MARKER: &str = "group";

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
/// Canonical identity of a conversation: a two-party pair, or a named group.
pub enum ParticipantKey {
    /// Two characters chatting; `a` and `b` keep source order.
    Pair {
        /// First participant identifier.
        a: String,
        /// Second participant identifier.
        b: String,
    },
    /// A multi-party conversation. Its name never joins the character roster.
    Group {
        /// Group identifier.
        name: String,
    },
}

impl ParticipantKey {
    /// Derive a key from an export file name.
    ///
    /// Names are underscore-separated with a trailing batch segment, e.g.
    /// `alice_bob_0.json` or `group_lounge_1.json`: the final segment is
    /// dropped and the first two remaining segments identify the parties. The
    /// reserved first segment [`GROUP_MARKER`] denotes a group conversation.
    pub fn from_source_name(name: &str) -> ChatreelResult<Self> {
        let segments: Vec<&str> = name.split('_').collect();
        // The last segment holds the batch index (and extension); at least
        // two identifying segments must remain once it is dropped.
        if segments.len() < 3 {
            return Err(ChatreelError::malformed_record(format!(
                "source name '{name}' does not follow <a>_<b>_<batch> form"
            )));
        }
        let (a, b) = (segments[0], segments[1]);
        if a == GROUP_MARKER {
            Ok(Self::Group {
                name: b.to_string(),
            })
        } else {
            Ok(Self::Pair {
                a: a.to_string(),
                b: b.to_string(),
            })
        }
    }

    /// Stable string form used to group batches from multiple files.
    pub fn as_key_string(&self) -> String {
        match self {
            Self::Pair { a, b } => format!("{a}_{b}"),
            Self::Group { name } => format!("{GROUP_MARKER}_{name}"),
        }
    }

    /// Whether this key denotes a multi-party conversation.
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }

    /// Participant identifiers that belong on the per-character roster.
    /// Empty for group conversations.
    pub fn roster_names(&self) -> Vec<&str> {
        match self {
            Self::Pair { a, b } => vec![a.as_str(), b.as_str()],
            Self::Group { .. } => vec![],
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// The full ordered message history between two parties or a group.
///
/// `start_time` / `end_time` are derived from `messages` and recomputed on
/// every merge; they are never set directly. A conversation is only ever
/// constructed non-empty (see [`assemble`]).
pub struct Conversation {
    /// Conversation identity.
    pub key: ParticipantKey,
    /// Messages in non-decreasing timestamp order.
    pub messages: Vec<Message>,
    /// Timestamp of the earliest message.
    pub start_time: DateTime<Utc>,
    /// Timestamp of the latest message.
    pub end_time: DateTime<Utc>,
}

impl Conversation {
    /// Append a batch of messages, re-sort, and re-derive the time bounds.
    ///
    /// Sorting is stable: messages with equal timestamps keep their arrival
    /// order, so discrepancies in source ordering never reorder ties.
    pub fn merge_batch(&mut self, batch: Vec<Message>) {
        self.messages.extend(batch);
        self.messages.sort_by_key(|m| m.timestamp);
        if let (Some(first), Some(last)) = (self.messages.first(), self.messages.last()) {
            self.start_time = first.timestamp;
            self.end_time = last.timestamp;
        }
    }

    /// Total wall-clock span of the conversation in seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }

    /// Check the assembly invariants: at least one message, timestamps
    /// non-decreasing, bounds matching the first/last message.
    pub fn validate(&self) -> ChatreelResult<()> {
        let (Some(first), Some(last)) = (self.messages.first(), self.messages.last()) else {
            return Err(ChatreelError::empty_conversation(self.key.as_key_string()));
        };
        if !self
            .messages
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
        {
            return Err(ChatreelError::malformed_record(format!(
                "conversation '{}' messages are not in timestamp order",
                self.key.as_key_string()
            )));
        }
        if self.start_time != first.timestamp || self.end_time != last.timestamp {
            return Err(ChatreelError::malformed_record(format!(
                "conversation '{}' time bounds do not match its messages",
                self.key.as_key_string()
            )));
        }
        Ok(())
    }
}

/// Assemble one conversation from merged message batches.
///
/// Batches are appended in order, stably sorted by timestamp, and the time
/// bounds derived from the result. Fails with
/// [`ChatreelError::EmptyConversation`] when no messages remain.
pub fn assemble(key: ParticipantKey, batches: Vec<Vec<Message>>) -> ChatreelResult<Conversation> {
    let mut messages: Vec<Message> = batches.into_iter().flatten().collect();
    if messages.is_empty() {
        return Err(ChatreelError::empty_conversation(key.as_key_string()));
    }
    messages.sort_by_key(|m| m.timestamp);

    let start_time = messages[0].timestamp;
    let end_time = messages[messages.len() - 1].timestamp;
    Ok(Conversation {
        key,
        messages,
        start_time,
        end_time,
    })
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
/// Mapping from raw sender identifiers to resolved character names.
///
/// Resolution is supplied by an external interactive step; a partial or empty
/// map is legal and falls back to the raw identifier.
pub struct NameMap {
    names: BTreeMap<String, String>,
}

impl NameMap {
    /// Empty map; every lookup falls back to the raw sender.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the character name for a raw sender.
    pub fn insert(&mut self, sender: impl Into<String>, character: impl Into<String>) {
        self.names.insert(sender.into(), character.into());
    }

    /// Resolve a raw sender to its display name, falling back to the sender
    /// itself when no mapping exists.
    pub fn resolve<'a>(&'a self, sender: &'a str) -> &'a str {
        self.names.get(sender).map(String::as_str).unwrap_or(sender)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chat/conversation.rs"]
mod tests;
