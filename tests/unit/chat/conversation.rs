use super::*;
use chrono::DateTime;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn msg(text: &str, secs: i64) -> Message {
    Message {
        sender: "ana_u".to_string(),
        display_name: None,
        text: text.to_string(),
        timestamp: at(secs),
    }
}

fn pair() -> ParticipantKey {
    ParticipantKey::Pair {
        a: "ana".to_string(),
        b: "bo".to_string(),
    }
}

#[test]
fn key_from_pair_file_name() {
    let key = ParticipantKey::from_source_name("alice_bob_0.json").unwrap();
    assert_eq!(
        key,
        ParticipantKey::Pair {
            a: "alice".to_string(),
            b: "bob".to_string(),
        }
    );
    assert_eq!(key.as_key_string(), "alice_bob");
    assert!(!key.is_group());
    assert_eq!(key.roster_names(), vec!["alice", "bob"]);
}

#[test]
fn key_from_group_file_name() {
    let key = ParticipantKey::from_source_name("group_lounge_1.json").unwrap();
    assert_eq!(
        key,
        ParticipantKey::Group {
            name: "lounge".to_string(),
        }
    );
    assert_eq!(key.as_key_string(), "group_lounge");
    assert!(key.is_group());
    assert!(key.roster_names().is_empty());
}

#[test]
fn short_file_name_is_rejected() {
    let err = ParticipantKey::from_source_name("notes.json").unwrap_err();
    assert!(matches!(err, ChatreelError::MalformedRecord(_)));
}

#[test]
fn assemble_sorts_and_derives_bounds() {
    let conv = assemble(
        pair(),
        vec![vec![msg("late", 30), msg("early", 10)], vec![msg("mid", 20)]],
    )
    .unwrap();
    let texts: Vec<&str> = conv.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["early", "mid", "late"]);
    assert_eq!(conv.start_time, at(10));
    assert_eq!(conv.end_time, at(30));
    conv.validate().unwrap();
}

#[test]
fn assemble_keeps_arrival_order_on_ties() {
    let conv = assemble(
        pair(),
        vec![vec![msg("first", 10), msg("second", 10), msg("third", 10)]],
    )
    .unwrap();
    let texts: Vec<&str> = conv.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(conv.start_time, conv.end_time);
}

#[test]
fn assemble_with_no_messages_fails() {
    let err = assemble(pair(), vec![vec![], vec![]]).unwrap_err();
    let ChatreelError::EmptyConversation(key) = err else {
        panic!("expected EmptyConversation");
    };
    assert_eq!(key, "ana_bo");
}

#[test]
fn merge_batch_resorts_and_updates_bounds() {
    let mut conv = assemble(pair(), vec![vec![msg("b", 20)]]).unwrap();
    conv.merge_batch(vec![msg("a", 5), msg("c", 40)]);
    let texts: Vec<&str> = conv.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
    assert_eq!(conv.start_time, at(5));
    assert_eq!(conv.end_time, at(40));
    conv.validate().unwrap();
}

#[test]
fn validate_rejects_out_of_order_messages() {
    let conv = Conversation {
        key: pair(),
        messages: vec![msg("late", 30), msg("early", 10)],
        start_time: at(30),
        end_time: at(10),
    };
    let err = conv.validate().unwrap_err();
    assert!(matches!(err, ChatreelError::MalformedRecord(_)));
}

#[test]
fn duration_covers_the_full_span() {
    let conv = assemble(pair(), vec![vec![msg("a", 10), msg("b", 130)]]).unwrap();
    assert_eq!(conv.duration_secs(), 120.0);
}

#[test]
fn name_map_falls_back_to_raw_sender() {
    let mut names = NameMap::new();
    assert_eq!(names.resolve("ana_u"), "ana_u");
    names.insert("ana_u", "Ana");
    assert_eq!(names.resolve("ana_u"), "Ana");
    assert_eq!(names.resolve("someone_else"), "someone_else");
}
