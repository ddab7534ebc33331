use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::warn;

use crate::{
    animation::keyframes::{KeyframeDescriptor, emit},
    chat::conversation::{Conversation, NameMap, ParticipantKey},
    chat::loader::ChatSet,
    foundation::error::{ChatreelError, ChatreelResult},
    layout::engine::{LayoutConfig, SlotId, layout},
};

#[derive(Clone, Debug, serde::Serialize)]
/// One slot's keyframes, labelled for rendering.
pub struct LabelledSlot {
    /// Slot identity (message ordinal within the conversation).
    pub slot: SlotId,
    /// Display label: resolved character name, or raw sender as fallback.
    pub speaker: String,
    /// Message body.
    pub text: String,
    /// Keyframes in chronological order.
    pub keyframes: Vec<KeyframeDescriptor>,
}

#[derive(Clone, Debug, serde::Serialize)]
/// Renderer-facing bundle for one conversation: labelled slot timelines plus
/// the bounding metadata a renderer needs to size its own timeline.
pub struct ConversationTimeline {
    /// Conversation identity.
    pub key: ParticipantKey,
    /// Earliest message timestamp.
    pub start_time: DateTime<Utc>,
    /// Latest message timestamp.
    pub end_time: DateTime<Utc>,
    /// Wall-clock span of the conversation in seconds.
    pub duration_secs: f64,
    /// Per-slot keyframe timelines, slots in first-seen order.
    pub slots: Vec<LabelledSlot>,
}

/// Outcome of laying out many conversations: the timelines that succeeded and
/// the keyed failures that were omitted.
#[derive(Debug, Default)]
pub struct LayoutRun {
    /// Successfully laid-out conversations.
    pub timelines: Vec<ConversationTimeline>,
    /// Conversations omitted from the run, with the error that sank each one.
    pub failures: Vec<(String, ChatreelError)>,
}

/// Lay out one conversation end to end: layout events, per-slot keyframes,
/// speaker labels (via `names`, falling back to raw senders), and the time
/// bounds a renderer needs to size its timeline.
pub fn layout_conversation(
    conversation: &Conversation,
    names: &NameMap,
    config: &LayoutConfig,
) -> ChatreelResult<ConversationTimeline> {
    let events = layout(conversation, config)?;
    let timelines = emit(&events)?;

    let mut slots = Vec::with_capacity(timelines.len());
    for timeline in timelines {
        let message = conversation
            .messages
            .get(timeline.slot.0 as usize)
            .ok_or_else(|| {
                ChatreelError::inconsistent_keyframe(format!(
                    "slot {} has no backing message",
                    timeline.slot.0
                ))
            })?;
        let speaker = message
            .display_name
            .clone()
            .unwrap_or_else(|| names.resolve(&message.sender).to_string());
        slots.push(LabelledSlot {
            slot: timeline.slot,
            speaker,
            text: message.text.clone(),
            keyframes: timeline.keyframes,
        });
    }

    Ok(ConversationTimeline {
        key: conversation.key.clone(),
        start_time: conversation.start_time,
        end_time: conversation.end_time,
        duration_secs: conversation.duration_secs(),
        slots,
    })
}

/// Lay out every conversation on independent rayon workers.
///
/// Conversations share no mutable state, so each is computed in isolation and
/// gathered at the end. A bad `config` fails the whole run up front (the same
/// config serves every conversation); a per-conversation failure is logged,
/// recorded in [`LayoutRun::failures`], and omitted without aborting
/// siblings.
#[tracing::instrument(skip(conversations, names, config))]
pub fn layout_all(
    conversations: &BTreeMap<String, Conversation>,
    names: &NameMap,
    config: &LayoutConfig,
    threads: Option<usize>,
) -> ChatreelResult<LayoutRun> {
    config.validate()?;
    let pool = build_thread_pool(threads)?;

    let results: Vec<(String, ChatreelResult<ConversationTimeline>)> = pool.install(|| {
        conversations
            .par_iter()
            .map(|(key, conversation)| {
                (key.clone(), layout_conversation(conversation, names, config))
            })
            .collect()
    });

    let mut run = LayoutRun::default();
    for (key, result) in results {
        match result {
            Ok(timeline) => run.timelines.push(timeline),
            Err(e) => {
                warn!(key = %key, error = %e, "conversation layout failed; omitting from run");
                run.failures.push((key, e));
            }
        }
    }
    Ok(run)
}

/// [`layout_all`] over a loaded [`ChatSet`].
pub fn layout_chat_set(
    set: &ChatSet,
    names: &NameMap,
    config: &LayoutConfig,
    threads: Option<usize>,
) -> ChatreelResult<LayoutRun> {
    layout_all(&set.conversations, names, config, threads)
}

fn build_thread_pool(threads: Option<usize>) -> ChatreelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ChatreelError::invalid_config(
            "layout threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ChatreelError::invalid_config(format!("failed to build thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
