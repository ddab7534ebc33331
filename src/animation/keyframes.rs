use std::collections::BTreeMap;

use crate::{
    foundation::error::{ChatreelError, ChatreelResult},
    layout::engine::{LayoutEvent, SlotId},
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One renderer-facing keyframe: animate from `from_y` to `to_y`, starting
/// `start_delay` into playback, over `duration`.
pub struct KeyframeDescriptor {
    /// Starting vertical coordinate.
    pub from_y: f64,
    /// Ending vertical coordinate.
    pub to_y: f64,
    /// Delay from the start of playback.
    pub start_delay: f64,
    /// Animation duration.
    pub duration: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// All keyframes for one slot, in chronological order.
pub struct SlotTimeline {
    /// Slot these keyframes animate.
    pub slot: SlotId,
    /// Keyframes ordered by `start_delay`.
    pub keyframes: Vec<KeyframeDescriptor>,
}

/// Reformat layout events into per-slot keyframe timelines.
///
/// Pure: groups events by slot (slots appear in first-seen order), preserving
/// the chronological order of `start_delay` within each slot. Fails with
/// [`ChatreelError::InconsistentKeyframe`] when a slot's motion contradicts
/// itself: a `start_delay` that regresses, or two events at the same delay
/// that fork from different positions. Same-delay events that chain (each
/// starting where the previous ended, as equal-timestamp messages produce)
/// are consistent.
pub fn emit(events: &[LayoutEvent]) -> ChatreelResult<Vec<SlotTimeline>> {
    let mut timelines: Vec<SlotTimeline> = Vec::new();
    let mut index: BTreeMap<SlotId, usize> = BTreeMap::new();

    for event in events {
        let idx = *index.entry(event.slot).or_insert_with(|| {
            timelines.push(SlotTimeline {
                slot: event.slot,
                keyframes: Vec::new(),
            });
            timelines.len() - 1
        });
        let timeline = &mut timelines[idx];

        if let Some(prev) = timeline.keyframes.last() {
            if event.start_delay < prev.start_delay {
                return Err(ChatreelError::inconsistent_keyframe(format!(
                    "slot {} start_delay regressed from {} to {}",
                    event.slot.0, prev.start_delay, event.start_delay
                )));
            }
            if event.start_delay == prev.start_delay && event.from_y != prev.to_y {
                return Err(ChatreelError::inconsistent_keyframe(format!(
                    "slot {} has two transitions at delay {} forking from y={} and y={}",
                    event.slot.0, event.start_delay, prev.to_y, event.from_y
                )));
            }
        }

        timeline.keyframes.push(KeyframeDescriptor {
            from_y: event.from_y,
            to_y: event.to_y,
            start_delay: event.start_delay,
            duration: event.duration,
        });
    }

    Ok(timelines)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframes.rs"]
mod tests;
