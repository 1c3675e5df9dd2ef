use super::cards::{Card, CardKind, NoSelection, build_cards, parse_id_list, resolve_selection};
use super::catalog::{AmbientClip, Catalog, Exercise};
use super::records::{
    NO_RECORD_PLACEHOLDER, RecordRow, generate_summary, pop_digit, push_digit,
};
use super::sequencer::{Effect, Sequencer, SequencerState, SessionEvent};

fn exercise(id: &str, title: &str, reps: u32, sets: u32) -> Exercise {
    Exercise {
        id: id.to_string(),
        title: title.to_string(),
        tips: String::new(),
        standard_reps: reps,
        standard_sets: sets,
        media: None,
        audio: Some(format!("https://cdn.example/{id}.wav")),
    }
}

fn clip(comment: &str) -> AmbientClip {
    AmbientClip {
        comment: comment.to_string(),
        audio: Some("https://cdn.example/clip.wav".to_string()),
    }
}

fn first_pick(_len: usize) -> usize {
    0
}

fn kinds_of(cards: &[Card]) -> Vec<CardKind> {
    cards.iter().map(|card| card.kind).collect()
}

fn training_card(title: &str, records: Vec<RecordRow>) -> Card {
    Card {
        kind: CardKind::Training,
        title: title.to_string(),
        comment: String::new(),
        media: None,
        audio: None,
        standard_reps: 10,
        standard_sets: records.len() as u32,
        records,
    }
}

fn row(weight: u32, reps: u32, bodyweight: bool) -> RecordRow {
    RecordRow {
        weight,
        reps,
        bodyweight,
    }
}

#[test]
fn build_cards_orders_prep_training_rest_and_end() {
    let exercises = vec![
        exercise("ex1", "スクワット", 10, 3),
        exercise("ex2", "ベンチプレス", 8, 3),
    ];
    let prep = vec![clip("準備しましょう")];
    let rest = vec![clip("少し休憩")];
    let end = vec![clip("お疲れさまでした")];

    let mut pick = first_pick;
    let cards =
        build_cards(&exercises, &prep, &rest, &end, &mut pick).expect("cards should build");

    assert_eq!(
        kinds_of(&cards),
        vec![
            CardKind::Preparation,
            CardKind::Training,
            CardKind::Rest,
            CardKind::Training,
            CardKind::End,
        ]
    );
    // Training order follows the selection order; no rest after the last.
    assert_eq!(cards[1].title, "スクワット");
    assert_eq!(cards[3].title, "ベンチプレス");
}

#[test]
fn build_cards_without_pools_yields_training_only() {
    let exercises = vec![exercise("ex1", "A", 10, 1), exercise("ex2", "B", 10, 1)];
    let mut pick = first_pick;
    let cards = build_cards(&exercises, &[], &[], &[], &mut pick).expect("cards should build");
    assert_eq!(kinds_of(&cards), vec![CardKind::Training, CardKind::Training]);
}

#[test]
fn build_cards_rejects_empty_selection() {
    let mut pick = first_pick;
    let err = build_cards(&[], &[clip("prep")], &[], &[], &mut pick)
        .expect_err("empty selection must be refused");
    assert_eq!(err, NoSelection);
}

#[test]
fn training_cards_prefill_standard_sets_with_standard_reps() {
    let exercises = vec![exercise("ex1", "A", 12, 3), exercise("ex2", "B", 8, 0)];
    let mut pick = first_pick;
    let cards = build_cards(&exercises, &[], &[], &[], &mut pick).expect("cards should build");

    assert_eq!(cards[0].records.len(), 3);
    assert!(cards[0].records.iter().all(|row| row.reps == 12 && row.weight == 0));
    // Zero declared sets still leaves one row to fill in.
    assert_eq!(cards[1].records.len(), 1);
}

#[test]
fn build_cards_uses_the_injected_picker() {
    let exercises = vec![exercise("ex1", "A", 10, 1)];
    let prep = vec![clip("one"), clip("two"), clip("three")];
    let mut pick = |_len: usize| 2;
    let cards = build_cards(&exercises, &prep, &[], &[], &mut pick).expect("cards should build");
    assert_eq!(cards[0].comment, "three");
}

#[test]
fn resolve_selection_preserves_order_and_reports_unknown_ids() {
    let catalog = Catalog {
        exercises: vec![
            exercise("ex1", "A", 10, 1),
            exercise("ex2", "B", 10, 1),
            exercise("ex3", "C", 10, 1),
        ],
        ..Catalog::default()
    };
    let ids = vec![
        "ex3".to_string(),
        "missing".to_string(),
        "ex1".to_string(),
    ];

    let outcome = resolve_selection(&catalog, &ids);
    let resolved: Vec<&str> = outcome
        .exercises
        .iter()
        .map(|exercise| exercise.id.as_str())
        .collect();
    assert_eq!(resolved, vec!["ex3", "ex1"]);
    assert_eq!(outcome.unknown_ids, vec!["missing"]);
}

#[test]
fn parse_id_list_trims_and_drops_empty_entries() {
    assert_eq!(
        parse_id_list(" ex1, ex2 ,,ex3 ,"),
        vec!["ex1", "ex2", "ex3"]
    );
    assert!(parse_id_list(" , ,").is_empty());
}

#[test]
fn n_ended_events_advance_exactly_n_times_and_end() {
    let mut sequencer = Sequencer::new(vec![
        CardKind::Training,
        CardKind::Training,
        CardKind::Training,
    ]);
    sequencer.handle(SessionEvent::Start);

    let mut activations = 0;
    for index in 0..3 {
        let effects = sequencer.handle(SessionEvent::MediaEnded(index));
        activations += effects
            .iter()
            .filter(|effect| matches!(effect, Effect::Activate(_)))
            .count();
    }

    assert_eq!(sequencer.state(), SequencerState::Ended);
    assert_eq!(sequencer.completed(), 3);
    // The final completion ends the session instead of activating a card.
    assert_eq!(activations, 2);
}

#[test]
fn progress_reports_completed_count_over_total() {
    let mut sequencer = Sequencer::new(vec![CardKind::Training, CardKind::Training]);
    sequencer.handle(SessionEvent::Start);

    let effects = sequencer.handle(SessionEvent::MediaEnded(0));
    assert!(effects.contains(&Effect::Progress { done: 1, total: 2 }));
    let effects = sequencer.handle(SessionEvent::MediaEnded(1));
    assert!(effects.contains(&Effect::Progress { done: 2, total: 2 }));
}

#[test]
fn stale_completion_events_are_ignored() {
    let mut sequencer = Sequencer::new(vec![CardKind::Training, CardKind::Training]);
    sequencer.handle(SessionEvent::Start);

    // Completion for a card that is not the cursor does nothing.
    assert!(sequencer.handle(SessionEvent::MediaEnded(1)).is_empty());
    assert_eq!(sequencer.state(), SequencerState::Playing(0));

    // A queued duplicate for an already-superseded card is also ignored.
    sequencer.handle(SessionEvent::MediaEnded(0));
    assert!(sequencer.handle(SessionEvent::MediaEnded(0)).is_empty());
    assert_eq!(sequencer.state(), SequencerState::Playing(1));
    assert_eq!(sequencer.completed(), 1);
}

#[test]
fn preparation_completion_sets_ready_without_advancing() {
    let mut sequencer = Sequencer::new(vec![CardKind::Preparation, CardKind::Training]);
    assert_eq!(sequencer.begin(), vec![Effect::Activate(0)]);

    let effects = sequencer.handle(SessionEvent::MediaEnded(0));
    assert!(effects.is_empty());
    assert!(sequencer.ready_to_start());
    assert_eq!(sequencer.state(), SequencerState::NotStarted);
    assert_eq!(sequencer.completed(), 0);
}

#[test]
fn start_cancels_preparation_and_activates_first_training_card() {
    let mut sequencer = Sequencer::new(vec![
        CardKind::Preparation,
        CardKind::Training,
        CardKind::End,
    ]);
    let effects = sequencer.handle(SessionEvent::Start);
    assert_eq!(effects, vec![Effect::StopAll, Effect::Activate(1)]);
    assert_eq!(sequencer.state(), SequencerState::Playing(1));
}

#[test]
fn toggle_pauses_and_resumes_without_moving_the_cursor() {
    let mut sequencer = Sequencer::new(vec![CardKind::Training]);
    sequencer.handle(SessionEvent::Start);

    assert_eq!(
        sequencer.handle(SessionEvent::TogglePause),
        vec![Effect::PauseAudio]
    );
    assert!(sequencer.is_paused());
    assert_eq!(sequencer.state(), SequencerState::Playing(0));

    assert_eq!(
        sequencer.handle(SessionEvent::TogglePause),
        vec![Effect::ResumeAudio]
    );
    assert!(!sequencer.is_paused());
    assert_eq!(sequencer.state(), SequencerState::Playing(0));
}

#[test]
fn skip_advances_like_a_completion_event() {
    let mut sequencer = Sequencer::new(vec![CardKind::Training, CardKind::Training]);
    sequencer.handle(SessionEvent::Start);

    let effects = sequencer.handle(SessionEvent::Skip);
    assert!(effects.contains(&Effect::Progress { done: 1, total: 2 }));
    assert!(effects.contains(&Effect::Activate(1)));
    assert_eq!(sequencer.state(), SequencerState::Playing(1));
}

#[test]
fn terminate_stops_media_and_shows_results_exactly_once() {
    let mut sequencer = Sequencer::new(vec![
        CardKind::Training,
        CardKind::Training,
        CardKind::Training,
    ]);
    sequencer.handle(SessionEvent::Start);
    sequencer.handle(SessionEvent::MediaEnded(0));

    let effects = sequencer.handle(SessionEvent::Terminate);
    assert_eq!(effects, vec![Effect::StopAll, Effect::ShowResults]);
    assert_eq!(sequencer.state(), SequencerState::Ended);
    // Completed count is frozen at termination time.
    assert_eq!(sequencer.completed(), 1);

    assert!(sequencer.handle(SessionEvent::Terminate).is_empty());
    assert!(sequencer.handle(SessionEvent::MediaEnded(1)).is_empty());
    assert_eq!(sequencer.completed(), 1);
}

#[test]
fn full_session_walk_counts_training_cards_and_generates_results_once() {
    // selection = [ex1, ex2] with every clip pool non-empty.
    let kinds = vec![
        CardKind::Preparation,
        CardKind::Training,
        CardKind::Rest,
        CardKind::Training,
        CardKind::End,
    ];
    let mut sequencer = Sequencer::new(kinds.clone());
    assert_eq!(sequencer.total_training(), 2);

    sequencer.handle(SessionEvent::Start);
    assert_eq!(sequencer.state(), SequencerState::Playing(1));

    let mut progress_seen = Vec::new();
    let mut results_shown = 0;
    for index in 1..kinds.len() {
        for effect in sequencer.handle(SessionEvent::MediaEnded(index)) {
            match effect {
                Effect::Progress { done, total } => progress_seen.push((done, total)),
                Effect::ShowResults => results_shown += 1,
                _ => {}
            }
        }
    }

    assert_eq!(progress_seen, vec![(1, 2), (2, 2)]);
    assert_eq!(results_shown, 1);
    assert_eq!(sequencer.state(), SequencerState::Ended);
}

#[test]
fn summary_formats_bodyweight_and_weighted_rows() {
    let cards = vec![training_card(
        "スクワット",
        vec![row(0, 5, true), row(20, 5, false)],
    )];
    let summary = generate_summary(&cards);
    assert_eq!(summary, "スクワット\n  自重 × 5回\n  20kg × 5回");
}

#[test]
fn summary_emits_placeholder_only_when_no_row_is_valid() {
    let cards = vec![
        training_card("A", vec![row(0, 10, false), row(30, 0, false)]),
        training_card("B", vec![row(0, 8, false), row(40, 8, false)]),
    ];
    let summary = generate_summary(&cards);
    assert_eq!(
        summary,
        format!("A\n{NO_RECORD_PLACEHOLDER}\n\nB\n  40kg × 8回")
    );
}

#[test]
fn summary_skips_ambient_cards() {
    let mut cards = vec![training_card("A", vec![row(20, 10, false)])];
    cards.push(Card {
        kind: CardKind::Rest,
        title: "休憩".to_string(),
        comment: "水分補給".to_string(),
        media: None,
        audio: None,
        standard_reps: 0,
        standard_sets: 0,
        records: Vec::new(),
    });
    let summary = generate_summary(&cards);
    assert_eq!(summary, "A\n  20kg × 10回");
}

#[test]
fn summary_generation_is_idempotent() {
    let cards = vec![
        training_card("A", vec![row(20, 10, false), row(0, 0, false)]),
        training_card("B", vec![row(0, 12, true)]),
    ];
    let first = generate_summary(&cards);
    let second = generate_summary(&cards);
    assert_eq!(first, second);
}

#[test]
fn copy_previous_copies_weight_reps_and_mode() {
    let previous = row(40, 8, false);
    let mut current = RecordRow::empty();
    current.copy_previous(&previous);
    assert_eq!(current, row(40, 8, false));
}

#[test]
fn copy_previous_from_bodyweight_row_keeps_own_weight_value() {
    let previous = row(0, 15, true);
    let mut current = row(25, 0, false);
    current.copy_previous(&previous);
    assert!(current.bodyweight);
    assert_eq!(current.reps, 15);
    // The hidden weight survives for when bodyweight is toggled back off.
    assert_eq!(current.weight, 25);
}

#[test]
fn record_row_validity_rules() {
    assert!(row(20, 5, false).is_valid());
    assert!(row(0, 5, true).is_valid());
    assert!(!row(0, 5, false).is_valid());
    assert!(!row(20, 0, false).is_valid());
    assert!(!row(0, 0, true).is_valid());
}

#[test]
fn toggling_bodyweight_preserves_the_stored_weight() {
    let mut record = row(60, 5, false);
    record.toggle_bodyweight();
    assert!(record.bodyweight);
    assert_eq!(record.weight, 60);
    record.toggle_bodyweight();
    assert!(!record.bodyweight);
    assert_eq!(record.weight, 60);
}

#[test]
fn digit_editing_caps_input_values() {
    assert_eq!(push_digit(12, 3), 123);
    assert_eq!(push_digit(999, 9), 999);
    assert_eq!(push_digit(100, 0), 100);
    assert_eq!(pop_digit(123), 12);
    assert_eq!(pop_digit(0), 0);
}
