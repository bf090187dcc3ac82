use bonde_bot::{AutoAction, BidContext, GameController, PendingAction, Policy};
use bonde_core::bidding::BidError;
use bonde_core::game::round::{BidOutcome, PlayError, PlayOutcome};
use bonde_core::game::series::SeriesConfig;
use bonde_core::model::card::Card;
use bonde_core::model::deck::{Deck, DeckVariant};
use bonde_core::model::difficulty::Difficulty;
use bonde_core::model::player::{PlayerKind, Seat};
use bonde_core::state::PublicState;

fn config(seats: Vec<PlayerKind>, start_cards: u8) -> SeriesConfig {
    SeriesConfig {
        seats,
        start_cards,
        deck: DeckVariant::Full,
    }
}

fn humans(players: usize, start_cards: u8) -> SeriesConfig {
    config(vec![PlayerKind::Human; players], start_cards)
}

/// Bids from the pending seat until bidding stops asking for bids.
fn bid_all(controller: &mut GameController, bids: &[&str]) -> BidOutcome {
    let mut last = None;
    for text in bids {
        let PendingAction::Bid(seat) = controller.pending_action() else {
            panic!("expected a bid, got {:?}", controller.pending_action());
        };
        last = Some(controller.submit_bid_text(seat, text).expect("valid bid"));
    }
    last.expect("at least one bid")
}

#[test]
fn human_bid_text_is_rejected_until_valid() {
    let mut seats = vec![PlayerKind::Computer(Difficulty::Medium); 3];
    seats[2] = PlayerKind::Human;
    let mut controller = GameController::new_with_seed(config(seats, 3), 17).unwrap();
    controller.run_until_human();

    let human = Seat::new(2);
    assert_eq!(controller.pending_action(), PendingAction::Bid(human));
    assert_eq!(
        controller.submit_bid_text(human, "tre"),
        Err(BidError::NotANumber("tre".into()))
    );
    assert_eq!(
        controller.submit_bid_text(human, "4"),
        Err(BidError::OutOfRange { value: 4, max: 3 })
    );
    assert_eq!(
        controller.submit_bid_text(human, "-1"),
        Err(BidError::OutOfRange { value: -1, max: 3 })
    );
    assert_eq!(controller.series().round().bid(human), None);
    assert_eq!(controller.pending_action(), PendingAction::Bid(human));
}

#[test]
fn blocked_total_forces_the_dealers_left_to_adjust() {
    let mut controller = GameController::new_with_seed(humans(3, 2), 5).unwrap();
    let first = controller.series().dealer().next(3);

    let outcome = bid_all(&mut controller, &["1", "1", "0"]);
    assert_eq!(outcome, BidOutcome::AdjustmentRequired(first));
    assert_eq!(controller.pending_action(), PendingAction::Adjust(first));

    assert_eq!(
        controller.submit_adjustment_text(first, "1"),
        Err(BidError::Unchanged(1))
    );
    let other = first.next(3);
    assert!(matches!(
        controller.submit_adjustment_text(other, "0"),
        Err(BidError::OutOfTurn { .. })
    ));

    let outcome = controller.submit_adjustment_text(first, "2").unwrap();
    let BidOutcome::BiddingComplete { leader } = outcome else {
        panic!("bidding should be complete, got {outcome:?}");
    };
    // The adjusted bid of 2 is now the highest.
    assert_eq!(leader, first);
    assert_eq!(controller.series().round().total_bid(), 3);
    assert_eq!(controller.pending_action(), PendingAction::Play(first));
}

#[test]
fn playing_a_card_not_held_changes_nothing() {
    let mut controller = GameController::new_with_seed(humans(3, 2), 9).unwrap();
    bid_all(&mut controller, &["0", "0", "0"]);
    let PendingAction::Play(seat) = controller.pending_action() else {
        panic!("play should have started");
    };

    let hand = controller.series().round().hand(seat).clone();
    let missing = Deck::standard()
        .cards()
        .iter()
        .copied()
        .find(|card| !hand.contains(*card))
        .expect("a card outside the hand");

    assert_eq!(controller.play(seat, missing), Ok(None));
    assert_eq!(controller.series().round().hand(seat), &hand);
    assert!(controller.series().round().current_trick().is_empty());
    assert_eq!(controller.pending_action(), PendingAction::Play(seat));

    let legal = controller.series().round().legal_cards(seat);
    let outcome = controller.play(seat, legal[0]).unwrap();
    assert!(outcome.is_some());
    assert_eq!(controller.series().round().hand(seat).len(), 1);
}

#[test]
fn hints_are_legal_and_explained() {
    let mut seats = vec![PlayerKind::Computer(Difficulty::Easy); 4];
    seats[0] = PlayerKind::Human;
    let mut controller = GameController::new_with_seed(config(seats, 4), 31)
        .unwrap()
        .with_hint_difficulty(Difficulty::Hard);
    let human = Seat::new(0);

    // Nothing to hint while bidding.
    assert!(controller.hint_for(human).is_none());

    loop {
        controller.run_until_human();
        match controller.pending_action() {
            PendingAction::Bid(seat) => {
                controller.submit_bid_text(seat, "1").unwrap();
            }
            PendingAction::Adjust(seat) => {
                let current = controller.series().round().bid(seat).unwrap_or(0);
                let replacement = if current == 0 { "2" } else { "0" };
                controller.submit_adjustment_text(seat, replacement).unwrap();
            }
            PendingAction::Play(seat) => {
                assert_eq!(seat, human);
                break;
            }
            other => panic!("unexpected pending action {other:?}"),
        }
    }

    let hint = controller.hint_for(human).expect("hint on the human's turn");
    let legal = controller.series().round().legal_cards(human);
    assert!(legal.contains(&hint.card));
    assert!(hint.explanation.contains("Simulation:"), "{}", hint.explanation);
    // A bot seat never gets a hint while the human is to act.
    assert!(controller.hint_for(Seat::new(1)).is_none());
}

#[test]
fn mixed_bots_play_a_whole_series() {
    let seats = vec![
        PlayerKind::Computer(Difficulty::Easy),
        PlayerKind::Computer(Difficulty::Medium),
        PlayerKind::Computer(Difficulty::Hard),
        PlayerKind::Computer(Difficulty::Medium),
    ];
    let mut controller = GameController::new_with_seed(config(seats, 3), 2024).unwrap();
    let mut scored = 0;
    while let Some(action) = controller.autoplay_one() {
        if let AutoAction::RoundScored(report) = action {
            scored += 1;
            assert_eq!(report.round_number, scored);
            let tricks: u32 = report.results.iter().map(|r| u32::from(r.tricks)).sum();
            assert_eq!(tricks, u32::from(report.cards));
            let bids: u32 = report.results.iter().map(|r| u32::from(r.bid)).sum();
            assert_ne!(bids, u32::from(report.cards));
        }
    }

    let series = controller.series();
    assert_eq!(controller.pending_action(), PendingAction::Finished);
    assert_eq!(scored, series.total_rounds());
    assert_eq!(series.reports().len(), 5);
    for index in 0..4 {
        let seat = Seat::new(index);
        let earned: u32 = series
            .reports()
            .iter()
            .flat_map(|report| report.results.iter())
            .filter(|result| result.seat == seat)
            .map(|result| result.points)
            .sum();
        assert_eq!(series.scores().score(seat), earned);
    }
    assert!(series.final_standings().is_some());
}

/// Always bids one more than the cards dealt and never picks a card.
struct Overbidder;

impl Policy for Overbidder {
    fn choose_bid(&mut self, ctx: &BidContext<'_>) -> u8 {
        ctx.cards + 1
    }

    fn choose_adjustment(&mut self, ctx: &BidContext<'_>) -> u8 {
        ctx.cards + 1
    }

    fn choose_play(&mut self, _state: &PublicState, _hand: &[Card]) -> Option<Card> {
        None
    }
}

#[test]
fn rejected_bot_decisions_fall_back_instead_of_stalling() {
    let mut seats = vec![PlayerKind::Computer(Difficulty::Medium); 4];
    seats[0] = PlayerKind::Human;
    let mut controller = GameController::new_with_seed(config(seats, 2), 12).unwrap();
    for index in 1..4 {
        controller.set_policy(Seat::new(index), Box::new(Overbidder));
    }

    loop {
        controller.run_until_human();
        match controller.pending_action() {
            PendingAction::Bid(seat) => {
                assert_eq!(seat, Seat::new(0));
                controller.submit_bid_text(seat, "0").unwrap();
            }
            PendingAction::Adjust(seat) => {
                assert_eq!(seat, Seat::new(0));
                let current = controller.series().round().bid(seat).unwrap_or(0);
                let replacement = if current == 0 { "1" } else { "0" };
                controller.submit_adjustment_text(seat, replacement).unwrap();
            }
            PendingAction::Play(seat) => {
                assert_eq!(seat, Seat::new(0));
                let card = controller.series().round().legal_cards(seat)[0];
                assert!(controller.play(seat, card).unwrap().is_some());
            }
            PendingAction::Finished => break,
            PendingAction::ScoreRound => panic!("autoplay leaves no round unscored"),
        }
    }

    let reports = controller.series().reports();
    assert_eq!(reports.len(), 3);
    for report in reports {
        assert!(report.results.iter().all(|result| result.bid <= report.cards));
    }
}

#[test]
fn typed_input_for_a_computer_seat_is_refused() {
    let mut seats = vec![PlayerKind::Human; 3];
    seats[1] = PlayerKind::Computer(Difficulty::Easy);
    let mut controller = GameController::new_with_seed(config(seats, 2), 3).unwrap();
    let bot = Seat::new(1);

    assert_eq!(
        controller.submit_bid_text(bot, "1"),
        Err(BidError::ComputerSeat(bot))
    );
    assert_eq!(
        controller.submit_adjustment_text(bot, "1"),
        Err(BidError::ComputerSeat(bot))
    );
    let card = controller.series().round().hand(bot).cards()[0];
    assert_eq!(controller.play(bot, card), Err(PlayError::ComputerSeat(bot)));
    assert_eq!(controller.series().round().bid(bot), None);
    assert_eq!(controller.series().round().hand(bot).len(), 2);
}

#[test]
fn last_trick_review_follows_each_completed_trick() {
    let seats = vec![PlayerKind::Computer(Difficulty::Medium); 3];
    let mut controller = GameController::new_with_seed(config(seats, 3), 21).unwrap();
    let viewer = Seat::new(0);
    assert!(controller.analyze_last_trick(viewer).is_none());

    let winner = loop {
        match controller.autoplay_one() {
            Some(AutoAction::Played {
                outcome: PlayOutcome::TrickCompleted { winner },
                ..
            }) => break winner,
            Some(_) => {}
            None => panic!("series ended before a trick completed"),
        }
    };

    let review = controller
        .analyze_last_trick(viewer)
        .expect("a trick has completed");
    let trick = &controller.series().round().trick_history()[0];
    assert_eq!(trick.plays().len(), 3);
    for play in trick.plays() {
        assert!(review.contains(&play.card.to_string()), "{review}");
    }
    let best = trick
        .plays()
        .iter()
        .find(|play| play.seat == winner)
        .map(|play| play.card)
        .expect("winner played a card");
    assert!(review.contains(&format!("Best card: {best}")), "{review}");
}
