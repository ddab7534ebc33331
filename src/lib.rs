//! Chatreel turns exported chat logs into renderer-ready scroll animations.
//!
//! Given a directory of chat exports, chatreel normalizes records, assembles
//! per-pair conversations, computes when and where each message sits on
//! screen over playback, and emits the keyframes a rendering backend needs to
//! realize the motion.
//!
//! # Pipeline overview
//!
//! 1. **Normalize**: raw export record -> [`Message`] ([`normalize`])
//! 2. **Assemble**: messages grouped per participant key -> [`Conversation`]
//!    ([`assemble`], [`load_chat_dir`])
//! 3. **Layout**: time-ordered messages -> ordered [`LayoutEvent`]
//!    transitions ([`layout`])
//! 4. **Emit**: transitions -> per-slot [`KeyframeDescriptor`] timelines
//!    ([`emit`], [`layout_all`])
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: layout is a pure fold over the message
//!   sequence; the same conversation and config always yield the same events.
//! - **No IO in the engine**: file IO lives in the loader; layout and
//!   emission touch no external resources.
//! - **Conversation-scoped failures**: one conversation failing never aborts
//!   its siblings.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod chat;
mod foundation;
mod layout;
mod pipeline;

pub use animation::keyframes::{KeyframeDescriptor, SlotTimeline, emit};
pub use chat::conversation::{
    Conversation, GROUP_MARKER, NameMap, ParticipantKey, assemble,
};
pub use chat::loader::{ChatSet, load_chat_dir};
pub use chat::record::{Message, RawRecord, normalize};
pub use foundation::error::{ChatreelError, ChatreelResult};
pub use layout::engine::{
    EvictionPolicy, HeightModel, LayoutConfig, LayoutEvent, LayoutState, SlotId, VisibleSlot,
    layout,
};
pub use pipeline::{
    ConversationTimeline, LabelledSlot, LayoutRun, layout_all, layout_chat_set,
    layout_conversation,
};
