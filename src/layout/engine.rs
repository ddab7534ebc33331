use crate::{
    chat::conversation::Conversation,
    foundation::error::{ChatreelError, ChatreelResult},
};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Identity of one on-screen slot: the ordinal of its message within the
/// conversation.
pub struct SlotId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Monotonic text-length -> block-height model.
///
/// Approximates the rendered height of a wrapped text block:
/// `ceil(len / chars_per_line) * line_height`, with a minimum of one line so
/// an empty body still occupies space.
pub struct HeightModel {
    /// Wrap width in characters per line.
    pub chars_per_line: u32,
    /// Vertical extent of one wrapped line.
    pub line_height: f64,
}

impl Default for HeightModel {
    fn default() -> Self {
        Self {
            chars_per_line: 40,
            line_height: 30.0,
        }
    }
}

impl HeightModel {
    /// Check the model parameters.
    pub fn validate(&self) -> ChatreelResult<()> {
        if self.chars_per_line == 0 {
            return Err(ChatreelError::invalid_config(
                "HeightModel chars_per_line must be > 0",
            ));
        }
        if !(self.line_height > 0.0) {
            return Err(ChatreelError::invalid_config(
                "HeightModel line_height must be > 0",
            ));
        }
        Ok(())
    }

    /// Estimated block height for a body of `text_len` characters.
    pub fn block_height(&self, text_len: usize) -> f64 {
        let lines = text_len.div_ceil(self.chars_per_line as usize).max(1);
        lines as f64 * self.line_height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// When to evict the oldest visible slots.
///
/// Height-based eviction is the canonical policy: it bounds the visible
/// region geometrically regardless of message length variance. Count-based
/// eviction is simpler but can overflow the viewport with long messages; it
/// is available as an explicitly configured alternate.
pub enum EvictionPolicy {
    /// Evict while the cumulative height of visible slots exceeds `limit`.
    ByCumulativeHeight {
        /// Maximum cumulative slot height allowed on screen at once.
        limit: f64,
    },
    /// Evict while more than `limit` slots are visible.
    ByCount {
        /// Maximum number of slots allowed on screen at once.
        limit: usize,
    },
}

impl EvictionPolicy {
    /// Check the policy limit.
    pub fn validate(&self) -> ChatreelResult<()> {
        match self {
            Self::ByCumulativeHeight { limit } => {
                if !(*limit > 0.0) {
                    return Err(ChatreelError::invalid_config(
                        "ByCumulativeHeight limit must be > 0",
                    ));
                }
            }
            Self::ByCount { limit } => {
                if *limit == 0 {
                    return Err(ChatreelError::invalid_config("ByCount limit must be > 0"));
                }
            }
        }
        Ok(())
    }

    fn exceeded(&self, total_height: f64, count: usize) -> bool {
        match self {
            Self::ByCumulativeHeight { limit } => total_height > *limit,
            Self::ByCount { limit } => count > *limit,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Layout engine configuration. All knobs are explicit; Y values live in an
/// opaque caller-supplied numeric space (pixels, normalized units, ...).
pub struct LayoutConfig {
    /// Where a new message starts (off-screen bottom).
    pub entry_y: f64,
    /// Where the topmost surviving slot rests.
    pub resting_top_y: f64,
    /// Where an evicted message is animated to (off-screen top).
    pub exit_y: f64,
    /// Vertical spacing added to every slot's computed height.
    pub slot_gap: f64,
    /// Factor converting elapsed-seconds-since-conversation-start into an
    /// animation delay, preserving perceived real-time pacing.
    pub time_scale: f64,
    /// Duration of each position transition (0 for instantaneous moves).
    pub transition_duration: f64,
    /// Eviction policy for the visible set.
    pub eviction: EvictionPolicy,
    /// Text-length -> height model.
    pub height: HeightModel,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            entry_y: 1200.0,
            resting_top_y: 200.0,
            exit_y: -10000.0,
            slot_gap: 40.0,
            time_scale: 3.875,
            transition_duration: 0.0,
            eviction: EvictionPolicy::ByCumulativeHeight { limit: 600.0 },
            height: HeightModel::default(),
        }
    }
}

impl LayoutConfig {
    /// Check every sub-model and scalar knob.
    pub fn validate(&self) -> ChatreelResult<()> {
        if !(self.time_scale >= 0.0) {
            return Err(ChatreelError::invalid_config("time_scale must be >= 0"));
        }
        if !(self.transition_duration >= 0.0) {
            return Err(ChatreelError::invalid_config(
                "transition_duration must be >= 0",
            ));
        }
        self.eviction.validate()?;
        self.height.validate()
    }
}

#[derive(Clone, Debug, PartialEq)]
/// One message currently on screen.
pub struct VisibleSlot {
    /// Slot identity (message ordinal).
    pub slot: SlotId,
    /// Computed vertical extent, slot gap included.
    pub height: f64,
    /// Last known vertical coordinate.
    pub current_y: f64,
    /// Set once the slot is marked for removal but not yet purged.
    pub pending_eviction: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One emitted position transition. Immutable once emitted; the ordered event
/// sequence for a conversation is the engine's complete output contract.
pub struct LayoutEvent {
    /// Slot this transition applies to.
    pub slot: SlotId,
    /// Vertical coordinate the slot moves from.
    pub from_y: f64,
    /// Vertical coordinate the slot moves to.
    pub to_y: f64,
    /// Delay from the start of playback before the transition begins.
    pub start_delay: f64,
    /// Transition duration.
    pub duration: f64,
}

#[derive(Clone, Debug, Default)]
/// Layout accumulation state threaded through [`LayoutState::step`], oldest
/// slot first. [`layout`] is a fold of this over the message sequence.
pub struct LayoutState {
    active: Vec<VisibleSlot>,
    next_slot: u64,
}

impl LayoutState {
    /// Fresh state with no visible slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots currently on screen, oldest first.
    pub fn active_slots(&self) -> &[VisibleSlot] {
        &self.active
    }

    /// Admit one message and append the resulting transitions to `out`.
    ///
    /// Creates the message's slot at `entry_y`, marks the oldest surviving
    /// slots for eviction while the policy is exceeded (never the last one:
    /// at least one message stays visible even when it alone exceeds the
    /// limit), restacks survivors from `resting_top_y`, emits an event for
    /// every slot whose target differs from its current position, and purges
    /// evicted slots once their exit event is out.
    pub fn step(
        &mut self,
        text_len: usize,
        enter_delay: f64,
        config: &LayoutConfig,
        out: &mut Vec<LayoutEvent>,
    ) {
        let slot = SlotId(self.next_slot);
        self.next_slot += 1;
        self.active.push(VisibleSlot {
            slot,
            height: config.height.block_height(text_len) + config.slot_gap,
            current_y: config.entry_y,
            pending_eviction: false,
        });

        // FIFO eviction over the surviving set.
        let mut total_height: f64 = self.active.iter().map(|s| s.height).sum();
        let mut survivors = self.active.len();
        while config.eviction.exceeded(total_height, survivors) && survivors > 1 {
            let Some(oldest) = self.active.iter_mut().find(|s| !s.pending_eviction) else {
                break;
            };
            oldest.pending_eviction = true;
            total_height -= oldest.height;
            survivors -= 1;
        }

        // Retarget every slot: survivors stack top-down from resting_top_y by
        // cumulative surviving height, evicted slots head for exit_y
        // regardless of where they were.
        let mut stacked = 0.0;
        for s in &mut self.active {
            let target_y = if s.pending_eviction {
                config.exit_y
            } else {
                let y = config.resting_top_y + stacked;
                stacked += s.height;
                y
            };
            if target_y != s.current_y {
                out.push(LayoutEvent {
                    slot: s.slot,
                    from_y: s.current_y,
                    to_y: target_y,
                    start_delay: enter_delay,
                    duration: config.transition_duration,
                });
                s.current_y = target_y;
            }
        }

        self.active.retain(|s| !s.pending_eviction);
    }
}

/// Compute the full transition sequence for one conversation.
///
/// Pure and deterministic: the same conversation and config always produce
/// the same event sequence. Fails with [`ChatreelError::InvalidConfig`] on a
/// bad config and with the conversation's own validation error on malformed
/// input. After the final message the remaining state is the held last frame;
/// no further events are emitted for it.
#[tracing::instrument(skip(conversation, config))]
pub fn layout(
    conversation: &Conversation,
    config: &LayoutConfig,
) -> ChatreelResult<Vec<LayoutEvent>> {
    config.validate()?;
    conversation.validate()?;

    let mut state = LayoutState::new();
    let mut events = Vec::new();
    for message in &conversation.messages {
        let elapsed_secs =
            (message.timestamp - conversation.start_time).num_milliseconds() as f64 / 1000.0;
        state.step(
            message.text.chars().count(),
            elapsed_secs * config.time_scale,
            config,
            &mut events,
        );
    }
    Ok(events)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
