use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
    chat::conversation::{Conversation, ParticipantKey, assemble},
    chat::record::{Message, RawRecord, normalize},
    foundation::error::ChatreelResult,
};

#[derive(Clone, Debug, Default)]
/// Everything loaded from a chat-export directory.
pub struct ChatSet {
    /// Assembled conversations keyed by their stable key string.
    pub conversations: BTreeMap<String, Conversation>,
    /// Ordered de-duplicated character names taken from non-group file names.
    pub roster: Vec<String>,
    /// Ordered de-duplicated raw sender identifiers seen in records. Input to
    /// the external sender -> character resolution step.
    pub senders: Vec<String>,
}

impl ChatSet {
    /// Earliest start and latest end across all conversations, if any.
    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.conversations.values().map(|c| c.start_time).min()?;
        let end = self.conversations.values().map(|c| c.end_time).max()?;
        Some((start, end))
    }
}

/// Load every `*.json` chat export under `dir` into a [`ChatSet`].
///
/// A file whose name does not follow the `<a>_<b>_<batch>.json` convention,
/// a file that is not a JSON array, or an individual record that fails to
/// normalize is logged and skipped; none of these abort the batch. IO errors
/// on the directory itself do.
#[tracing::instrument]
pub fn load_chat_dir(dir: &Path) -> ChatreelResult<ChatSet> {
    let mut batches: BTreeMap<String, (ParticipantKey, Vec<Vec<Message>>)> = BTreeMap::new();
    let mut roster: Vec<String> = Vec::new();
    let mut senders: Vec<String> = Vec::new();

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading chat directory '{}'", dir.display()))?;
    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing '{}'", dir.display()))?;
        let file_name = entry.file_name();
        if let Some(name) = file_name.to_str()
            && name.ends_with(".json")
        {
            names.push(name.to_string());
        }
    }
    // Directory iteration order is platform-dependent; sort so batch merge
    // order (and therefore tie-breaking) is deterministic.
    names.sort();

    for name in &names {
        let key = match ParticipantKey::from_source_name(name) {
            Ok(key) => key,
            Err(e) => {
                warn!(file = %name, error = %e, "skipping file with unrecognized name");
                continue;
            }
        };

        let raw = std::fs::read_to_string(dir.join(name))
            .with_context(|| format!("reading chat file '{name}'"))?;
        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(file = %name, error = %e, "skipping file that is not a JSON record array");
                continue;
            }
        };

        let mut batch = Vec::with_capacity(values.len());
        for value in values {
            let record: RawRecord = match serde_json::from_value(value) {
                Ok(record) => record,
                Err(e) => {
                    warn!(file = %name, error = %e, "skipping undecodable record");
                    continue;
                }
            };
            match normalize(&record) {
                Ok(message) => {
                    push_unique(&mut senders, &message.sender);
                    batch.push(message);
                }
                Err(e) => warn!(file = %name, error = %e, "skipping malformed record"),
            }
        }

        for participant in key.roster_names() {
            push_unique(&mut roster, participant);
        }
        batches
            .entry(key.as_key_string())
            .or_insert_with(|| (key, Vec::new()))
            .1
            .push(batch);
    }

    let mut conversations = BTreeMap::new();
    for (key_string, (key, key_batches)) in batches {
        match assemble(key, key_batches) {
            Ok(conversation) => {
                conversations.insert(key_string, conversation);
            }
            // Conversation-scoped: every record in this key's files was
            // malformed. Siblings still load.
            Err(e) => warn!(key = %key_string, error = %e, "omitting conversation"),
        }
    }

    let set = ChatSet {
        conversations,
        roster,
        senders,
    };
    if let Some((start, end)) = set.bounds() {
        debug!(
            conversations = set.conversations.len(),
            span_secs = (end - start).num_milliseconds() as f64 / 1000.0,
            "loaded chat directory"
        );
    }
    Ok(set)
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if value.is_empty() {
        return;
    }
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}
