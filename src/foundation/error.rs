/// Convenience result type used across chatreel.
pub type ChatreelResult<T> = Result<T, ChatreelError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Errors are conversation-scoped: one conversation failing to normalize or
/// lay out never aborts its siblings (see [`crate::layout_all`]).
#[derive(thiserror::Error, Debug)]
pub enum ChatreelError {
    /// A raw record that cannot be normalized (unparseable timestamp, or
    /// neither sender nor text present). Recovered by skipping the record.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A registered conversation key ended up with zero messages.
    #[error("empty conversation: {0}")]
    EmptyConversation(String),

    /// Invalid layout configuration supplied by the caller.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Contradictory keyframes produced for one slot. Always fatal: it means
    /// the layout algorithm emitted inconsistent state.
    #[error("inconsistent keyframe: {0}")]
    InconsistentKeyframe(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChatreelError {
    /// Build a [`ChatreelError::MalformedRecord`] value.
    pub fn malformed_record(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    /// Build a [`ChatreelError::EmptyConversation`] value.
    pub fn empty_conversation(msg: impl Into<String>) -> Self {
        Self::EmptyConversation(msg.into())
    }

    /// Build a [`ChatreelError::InvalidConfig`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Build a [`ChatreelError::InconsistentKeyframe`] value.
    pub fn inconsistent_keyframe(msg: impl Into<String>) -> Self {
        Self::InconsistentKeyframe(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
