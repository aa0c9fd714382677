use composer_core::{HistoryDirection, HistoryNavigator, HistorySource};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[test]
fn global_round_trip_returns_to_the_draft() {
    let mut nav = HistoryNavigator::new();
    nav.set_histories(strings(&["g1", "g2"]), Vec::new());

    assert_eq!(
        nav.navigate(HistoryDirection::Older, "my draft"),
        Some("g2".to_string())
    );
    assert_eq!(nav.active_source(), Some(HistorySource::Global));
    assert_eq!(
        nav.navigate(HistoryDirection::Older, "g2"),
        Some("g1".to_string())
    );
    assert_eq!(
        nav.navigate(HistoryDirection::Newer, "g1"),
        Some("g2".to_string())
    );
    assert_eq!(
        nav.navigate(HistoryDirection::Newer, "g2"),
        Some("my draft".to_string())
    );
    assert!(!nav.is_navigating());

    // Further newer moves are no-ops.
    assert_eq!(nav.navigate(HistoryDirection::Newer, "my draft"), None);
}

#[test]
fn local_history_wins_when_present() {
    let mut nav = HistoryNavigator::new();
    nav.set_histories(strings(&["g1"]), strings(&["l1", "l2"]));

    assert_eq!(
        nav.navigate(HistoryDirection::Older, ""),
        Some("l2".to_string())
    );
    assert_eq!(nav.active_source(), Some(HistorySource::Local));
    assert_eq!(
        nav.navigate(HistoryDirection::Older, ""),
        Some("l1".to_string())
    );
}

#[test]
fn older_past_the_oldest_stays_put() {
    let mut nav = HistoryNavigator::new();
    nav.set_histories(strings(&["only"]), Vec::new());

    assert_eq!(
        nav.navigate(HistoryDirection::Older, ""),
        Some("only".to_string())
    );
    assert_eq!(
        nav.navigate(HistoryDirection::Older, "only"),
        Some("only".to_string())
    );
    assert_eq!(
        nav.navigate(HistoryDirection::Older, "only"),
        Some("only".to_string())
    );
}

#[test]
fn typing_exits_recall_and_blocks_it_until_reset() {
    let mut nav = HistoryNavigator::new();
    nav.set_histories(strings(&["g1", "g2"]), Vec::new());
    nav.navigate(HistoryDirection::Older, "");

    nav.note_keystroke("g2!");
    assert!(!nav.is_navigating());
    assert_eq!(nav.navigate(HistoryDirection::Older, "g2!"), None);

    // Clearing the buffer by hand makes the input clean again.
    nav.note_keystroke("");
    assert_eq!(
        nav.navigate(HistoryDirection::Older, ""),
        Some("g2".to_string())
    );

    nav.reset();
    assert!(!nav.is_navigating());
    assert_eq!(
        nav.navigate(HistoryDirection::Older, "fresh"),
        Some("g2".to_string())
    );
    nav.navigate(HistoryDirection::Newer, "g2");
    assert!(!nav.is_navigating());
}

#[test]
fn keystroke_re_arms_the_draft() {
    let mut nav = HistoryNavigator::new();
    nav.set_histories(strings(&["g1"]), Vec::new());

    nav.navigate(HistoryDirection::Older, "first draft");
    nav.note_keystroke("");
    nav.navigate(HistoryDirection::Older, "");
    assert_eq!(
        nav.navigate(HistoryDirection::Newer, "g1"),
        Some(String::new())
    );
}

#[test]
fn empty_histories_do_not_engage() {
    let mut nav = HistoryNavigator::new();
    assert_eq!(nav.navigate(HistoryDirection::Older, "draft"), None);
    assert_eq!(nav.navigate(HistoryDirection::Newer, "draft"), None);
    assert!(!nav.is_navigating());
}

#[test]
fn sent_messages_land_in_both_histories_once() {
    let mut nav = HistoryNavigator::new().with_max_entries(3);
    nav.record_sent("a");
    nav.record_sent("a");
    nav.record_sent("  b ");
    nav.record_sent("c");
    nav.record_sent("d");
    nav.record_sent("   ");

    assert_eq!(nav.global(), strings(&["b", "c", "d"]).as_slice());
    assert_eq!(nav.local(), strings(&["b", "c", "d"]).as_slice());
}
