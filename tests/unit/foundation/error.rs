use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ChatreelError::malformed_record("x")
            .to_string()
            .contains("malformed record:")
    );
    assert!(
        ChatreelError::empty_conversation("x")
            .to_string()
            .contains("empty conversation:")
    );
    assert!(
        ChatreelError::invalid_config("x")
            .to_string()
            .contains("invalid config:")
    );
    assert!(
        ChatreelError::inconsistent_keyframe("x")
            .to_string()
            .contains("inconsistent keyframe:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ChatreelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
