use super::*;
use crate::chat::conversation::assemble;
use crate::chat::record::Message;
use crate::layout::engine::{EvictionPolicy, HeightModel};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn msg(sender: &str, text: &str, secs: i64) -> Message {
    Message {
        sender: sender.to_string(),
        display_name: None,
        text: text.to_string(),
        timestamp: at(secs),
    }
}

fn pair(a: &str, b: &str) -> ParticipantKey {
    ParticipantKey::Pair {
        a: a.to_string(),
        b: b.to_string(),
    }
}

fn test_config() -> LayoutConfig {
    LayoutConfig {
        entry_y: 1000.0,
        resting_top_y: 200.0,
        exit_y: -500.0,
        slot_gap: 40.0,
        time_scale: 1.0,
        transition_duration: 0.0,
        eviction: EvictionPolicy::ByCumulativeHeight { limit: 600.0 },
        height: HeightModel {
            chars_per_line: 40,
            line_height: 60.0,
        },
    }
}

#[test]
fn labels_speakers_with_fallback() {
    let conv = assemble(
        pair("ana", "bo"),
        vec![vec![msg("ana_u", "hi", 0), msg("bo_u", "hey", 60)]],
    )
    .unwrap();
    let mut names = NameMap::new();
    names.insert("ana_u", "Ana");

    let timeline = layout_conversation(&conv, &names, &test_config()).unwrap();
    assert_eq!(timeline.slots.len(), 2);
    assert_eq!(timeline.slots[0].speaker, "Ana");
    assert_eq!(timeline.slots[1].speaker, "bo_u"); // unmapped, raw fallback
    assert_eq!(timeline.start_time, at(0));
    assert_eq!(timeline.end_time, at(60));
    assert_eq!(timeline.duration_secs, 60.0);
}

#[test]
fn resolved_display_name_wins_over_map() {
    let mut resolved = msg("ana_u", "hi", 0);
    resolved.display_name = Some("Zed".to_string());
    let conv = assemble(pair("ana", "bo"), vec![vec![resolved]]).unwrap();
    let mut names = NameMap::new();
    names.insert("ana_u", "Ana");

    let timeline = layout_conversation(&conv, &names, &test_config()).unwrap();
    assert_eq!(timeline.slots[0].speaker, "Zed");
}

#[test]
fn one_failing_conversation_does_not_sink_the_run() {
    let good = assemble(pair("ana", "bo"), vec![vec![msg("ana_u", "hi", 0)]]).unwrap();
    // Hand-built conversation with broken ordering: fails validation inside
    // layout, scoped to its own key.
    let bad = Conversation {
        key: pair("cy", "dee"),
        messages: vec![msg("cy_u", "late", 30), msg("dee_u", "early", 10)],
        start_time: at(30),
        end_time: at(10),
    };

    let mut conversations = BTreeMap::new();
    conversations.insert("ana_bo".to_string(), good);
    conversations.insert("cy_dee".to_string(), bad);

    let run = layout_all(&conversations, &NameMap::new(), &test_config(), Some(2)).unwrap();
    assert_eq!(run.timelines.len(), 1);
    assert_eq!(run.timelines[0].key, pair("ana", "bo"));
    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].0, "cy_dee");
    assert!(matches!(
        run.failures[0].1,
        ChatreelError::MalformedRecord(_)
    ));
}

#[test]
fn zero_threads_is_invalid() {
    let err = layout_all(&BTreeMap::new(), &NameMap::new(), &test_config(), Some(0)).unwrap_err();
    assert!(matches!(err, ChatreelError::InvalidConfig(_)));
}

#[test]
fn bad_config_fails_the_whole_run() {
    let mut config = test_config();
    config.time_scale = -1.0;
    let err = layout_all(&BTreeMap::new(), &NameMap::new(), &config, None).unwrap_err();
    assert!(matches!(err, ChatreelError::InvalidConfig(_)));
}

#[test]
fn output_is_identical_across_thread_counts() {
    let mut conversations = BTreeMap::new();
    for (a, b) in [("ana", "bo"), ("cy", "dee"), ("eve", "fin")] {
        let messages = (0..12)
            .map(|i| msg(&format!("{a}_u"), &"m".repeat(1 + i * 7), i as i64))
            .collect();
        conversations.insert(
            format!("{a}_{b}"),
            assemble(pair(a, b), vec![messages]).unwrap(),
        );
    }
    let names = NameMap::new();
    let config = test_config();

    let single = layout_all(&conversations, &names, &config, Some(1)).unwrap();
    let multi = layout_all(&conversations, &names, &config, Some(4)).unwrap();
    assert_eq!(
        serde_json::to_value(&single.timelines).unwrap(),
        serde_json::to_value(&multi.timelines).unwrap()
    );
}
