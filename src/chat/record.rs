use chrono::{DateTime, Utc};

use crate::foundation::error::{ChatreelError, ChatreelResult};

#[derive(Clone, Debug, Default, serde::Deserialize)]
/// One raw record as found in an exported chat file.
///
/// Exports carry a pile of transport fields (`author`, `channel_id`, `tts`,
/// `mentions`, ...) that are irrelevant downstream; serde drops everything not
/// named here, so they never propagate past this type.
pub struct RawRecord {
    /// Raw sender identifier.
    #[serde(default, alias = "userName")]
    pub user_name: Option<String>,
    /// Message body.
    #[serde(default)]
    pub content: Option<String>,
    /// Timestamp string in RFC 3339 form.
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One normalized chat utterance.
pub struct Message {
    /// Raw sender identifier from the export.
    pub sender: String,
    /// Resolved character name, if one has been assigned externally.
    pub display_name: Option<String>,
    /// Body content.
    pub text: String,
    /// Absolute send time.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Label to render for this message: the resolved character name when one
    /// exists, the raw sender otherwise.
    pub fn speaker(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.sender)
    }
}

/// Normalize one raw record into a [`Message`].
///
/// Pure transform. Fails with [`ChatreelError::MalformedRecord`] when the
/// timestamp is missing/unparseable or when both sender and text are absent.
/// An empty body with a present sender is legal.
pub fn normalize(raw: &RawRecord) -> ChatreelResult<Message> {
    let sender = raw.user_name.as_deref().unwrap_or("");
    let text = raw.content.as_deref().unwrap_or("");
    if sender.is_empty() && text.is_empty() {
        return Err(ChatreelError::malformed_record(
            "record has neither sender nor text",
        ));
    }

    let ts = raw
        .timestamp
        .as_deref()
        .ok_or_else(|| ChatreelError::malformed_record("record has no timestamp"))?;
    let timestamp = DateTime::parse_from_rfc3339(ts)
        .map_err(|e| ChatreelError::malformed_record(format!("unparseable timestamp '{ts}': {e}")))?
        .with_timezone(&Utc);

    Ok(Message {
        sender: sender.to_string(),
        display_name: None,
        text: text.to_string(),
        timestamp,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/chat/record.rs"]
mod tests;
