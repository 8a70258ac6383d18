//! Integration tests for the CogniSpy engine.
//!
//! These tests drive complete rounds through the public API, from board
//! generation to stage completion.

use cognispy_core::*;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn click(session: &mut Session, id: &str) -> Vec<SessionEvent> {
    session
        .apply(SessionAction::Click {
            item_id: id.to_string(),
        })
        .expect("clicks never fail")
}

fn ids_where(session: &Session, pred: impl Fn(&Item) -> bool) -> Vec<String> {
    session
        .board()
        .expect("session has a board")
        .items
        .iter()
        .filter(|item| pred(item))
        .map(|item| item.id.clone())
        .collect()
}

#[test]
fn test_target_counts_follow_stage_formula() {
    let mut rng = StdRng::seed_from_u64(2024);
    for game in GameType::ALL {
        for stage in 1..=10 {
            for _ in 0..5 {
                let board = Board::generate_with_rng(game, stage, &mut rng);
                let counted = board.items.iter().filter(|i| i.is_target).count();
                assert_eq!(board.total_target_count, counted);
                assert_eq!(
                    board.total_target_count,
                    game.stage_params(stage).target_count,
                    "{} stage {}",
                    game,
                    stage
                );
                assert!(board.total_target_count >= 1);
            }
        }
    }
}

#[test]
fn test_distractors_never_match_target() {
    let mut rng = StdRng::seed_from_u64(17);
    for game in GameType::ALL {
        for stage in 1..=8 {
            let board = Board::generate_with_rng(game, stage, &mut rng);
            for item in board.items.iter().filter(|i| !i.is_target) {
                assert!(
                    !board.target_signature.matches(&item.value),
                    "{} stage {}: {} matches target",
                    game,
                    stage,
                    item.id
                );
            }
        }
    }
}

#[test]
fn test_positions_stay_inside_padding() {
    let mut rng = StdRng::seed_from_u64(99);
    for game in GameType::ALL {
        for stage in 1..=10 {
            let board = Board::generate_with_rng(game, stage, &mut rng);
            let padding = board.params.layout.padding();
            for item in &board.items {
                assert!(
                    item.x >= padding && item.x <= 100.0 - padding,
                    "{} x={}",
                    item.id,
                    item.x
                );
                assert!(
                    item.y >= padding && item.y <= 100.0 - padding,
                    "{} y={}",
                    item.id,
                    item.y
                );
            }
        }
    }
}

#[test]
fn test_repeat_clicks_are_idempotent() {
    for game in GameType::ALL {
        let mut session = Session::with_seed(game, 1);
        session.apply(SessionAction::Start { stage: 2 }).unwrap();
        let target = ids_where(&session, |i| i.is_target)[0].clone();

        click(&mut session, &target);
        let (found, score) = (session.found_count(), session.score());
        assert!(click(&mut session, &target).is_empty());
        assert_eq!(session.found_count(), found);
        assert_eq!(session.score(), score);
    }
}

#[test]
fn test_completion_with_interleaved_misses() {
    let mut rng = StdRng::seed_from_u64(5);
    for game in GameType::ALL {
        let mut session = Session::with_seed(game, 77);
        session.apply(SessionAction::Start { stage: 3 }).unwrap();

        let mut targets = ids_where(&session, |i| i.is_target);
        let misses = ids_where(&session, |i| !i.is_target);
        targets.shuffle(&mut rng);

        for (n, target) in targets.iter().enumerate() {
            if let Some(miss) = misses.choose(&mut rng) {
                click(&mut session, miss);
            }
            assert!(session.is_active(), "{} ended early", game);
            let events = click(&mut session, target);
            assert_eq!(events.iter().any(SessionEvent::is_completion), n + 1 == targets.len());
            assert!(session.score() <= 10 * session.found_count() as u32);
        }

        assert!(!session.is_active());
        assert_eq!(session.phase(), SessionPhase::Complete);
        assert_eq!(session.found_count(), session.total_target_count());
    }
}

#[test]
fn test_scenario_numbers_stage_one() {
    // Find a seed whose board holds at least one 7 among the distractors
    let (mut session, seven) = (0..200)
        .find_map(|seed| {
            let mut session = Session::with_seed(GameType::Numbers, seed);
            session.apply(SessionAction::Start { stage: 1 }).unwrap();
            let sevens = ids_where(&session, |i| i.value == Variant::Digit(7));
            sevens.first().cloned().map(|id| (session, id))
        })
        .expect("some board contains a 7");

    let board = session.board().unwrap();
    assert_eq!(
        board.target_signature,
        TargetSignature::AnyOf(vec![Variant::Digit(1), Variant::Digit(2), Variant::Digit(3)])
    );
    for item in board.targets() {
        assert!(matches!(item.value, Variant::Digit(1..=3)));
    }

    let events = click(&mut session, &seven);
    assert_eq!(
        events,
        vec![SessionEvent::Incorrect {
            item_id: seven.clone(),
            score: 0
        }]
    );

    let targets = ids_where(&session, |i| i.is_target);
    assert_eq!(targets.len(), session.total_target_count());
    for id in &targets {
        click(&mut session, id);
    }
    assert_eq!(session.phase(), SessionPhase::Complete);
    assert_eq!(session.score(), 10 * targets.len() as u32);
}

#[test]
fn test_scenario_house_stage_zero() {
    let target = HouseConfig::new(Door::Center, Windows::Double, true);
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..50 {
        let board = BoardBuilder::new(GameType::House, 0)
            .with_target(TargetSignature::Single(Variant::House(target)))
            .build(&mut rng);
        assert_eq!(board.total_target_count, 4);

        for item in board.items.iter().filter(|i| !i.is_target) {
            match &item.value {
                Variant::House(house) => assert_ne!(*house, target),
                other => panic!("unexpected value {:?}", other),
            }
        }
    }
}

#[test]
fn test_scenario_transport_stage_five() {
    let mut rng = StdRng::seed_from_u64(55);
    let mut saw_decoy = false;

    for _ in 0..30 {
        let board = Board::generate_with_rng(GameType::Transport, 5, &mut rng);
        let overlap = board.params.overlap.expect("stage 5 has overlap decoys");
        assert_eq!(overlap.probability, 0.25);
        assert_eq!(board.params.max_rotation, 25.0);

        for item in &board.items {
            assert!(item.rotation.abs() <= 25.0, "{} rotated {}", item.id, item.rotation);
            if item.id.contains("-ov-") {
                saw_decoy = true;
                assert!(!item.is_target);
                assert!(item.z_index < TARGET_Z_BASE);
            }
        }
    }
    assert!(saw_decoy, "a quarter of items should get decoys");
}

#[test]
fn test_scenario_weather_clicks_after_completion() {
    let mut session = Session::with_seed(GameType::Weather, 8);
    session.apply(SessionAction::Start { stage: 1 }).unwrap();

    for id in ids_where(&session, |i| i.is_target) {
        click(&mut session, &id);
    }
    assert_eq!(session.phase(), SessionPhase::Complete);
    let score = session.score();

    for id in ids_where(&session, |i| !i.is_target && !i.is_found) {
        assert!(click(&mut session, &id).is_empty());
    }
    assert_eq!(session.score(), score);
    assert_eq!(session.found_count(), session.total_target_count());
}

#[test]
fn test_boards_are_reproducible_from_seed() {
    let a = Board::generate_with_rng(GameType::Shoes, 4, &mut StdRng::seed_from_u64(12));
    let b = Board::generate_with_rng(GameType::Shoes, 4, &mut StdRng::seed_from_u64(12));
    assert_eq!(a.items, b.items);
    assert_eq!(a.target_signature, b.target_signature);
}

#[test]
fn test_replaying_a_stage_builds_a_new_board() {
    let mut session = Session::with_seed(GameType::House, 31);
    session.apply(SessionAction::Start { stage: 2 }).unwrap();
    let first = session.board().unwrap().items.clone();
    session.apply(SessionAction::Retry).unwrap();
    assert_ne!(session.board().unwrap().items, first);
}

#[test]
fn test_activity_round_with_feedback_and_advisory() {
    struct Counter(usize);

    impl FeedbackSink for Counter {
        fn play(&mut self, _kind: FeedbackKind) -> Result<(), FeedbackError> {
            self.0 += 1;
            Ok(())
        }
    }

    let mut activity = Activity::from_name("fruit", Some(4)).unwrap();
    let mut feedback = Feedback::new(Counter(0));
    activity.apply(SessionAction::Start { stage: 2 }).unwrap();

    let targets: Vec<String> = match &activity {
        Activity::Board(session) => ids_where(session, |i| i.is_target),
        _ => unreachable!(),
    };
    for id in &targets {
        let events = activity
            .apply(SessionAction::Click {
                item_id: id.clone(),
            })
            .unwrap();
        feedback.dispatch(&events);
    }
    // One tone per target plus the completion tone
    assert_eq!(feedback.sink().0, targets.len() + 1);

    let (token, request) = activity.advisory_request("Ann", Locale::En).unwrap();
    assert_eq!(request.stage_label, "Banana");
    activity.apply(SessionAction::NextStage).unwrap();
    assert!(!activity.accept_advisory(token, "late text"));
    assert_eq!(activity.progress().stage, 3);
}
