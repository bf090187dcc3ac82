use crate::bot::{BidPlanner, BotContext, HardParams, difficulty_from_env, explain_with_rng};
use crate::policy::heuristic::seat_seed;
use crate::policy::{BidContext, HeuristicPolicy, Policy};
use bonde_core::analysis::analyze_trick;
use bonde_core::bidding::{self, BidError};
use bonde_core::game::round::{BidOutcome, PlayError, PlayOutcome, RoundPhase};
use bonde_core::game::series::{RoundReport, SeriesConfig, SeriesConfigError, SeriesState};
use bonde_core::model::card::Card;
use bonde_core::model::difficulty::Difficulty;
use bonde_core::model::player::{PlayerKind, Seat};
use bonde_core::state::PublicState;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use tracing::{Level, event};

/// What the table is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Bid(Seat),
    Adjust(Seat),
    Play(Seat),
    ScoreRound,
    Finished,
}

/// One step taken on a bot's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoAction {
    Bid {
        seat: Seat,
        bid: u8,
        outcome: BidOutcome,
    },
    Adjusted {
        seat: Seat,
        bid: u8,
        outcome: BidOutcome,
    },
    Played {
        seat: Seat,
        card: Card,
        outcome: PlayOutcome,
    },
    RoundScored(RoundReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub card: Card,
    pub explanation: String,
}

/// Owns a series and the bots sitting in it. Every call runs to completion
/// before returning; there is no pacing.
pub struct GameController {
    series: SeriesState,
    policies: Vec<Option<Box<dyn Policy>>>,
    hint_difficulty: Difficulty,
    params: HardParams,
    rng: StdRng,
}

impl GameController {
    pub fn new_with_seed(config: SeriesConfig, seed: u64) -> Result<Self, SeriesConfigError> {
        let policies = config
            .seats
            .iter()
            .enumerate()
            .map(|(index, kind)| match kind {
                PlayerKind::Human => None,
                PlayerKind::Computer(level) => Some(Box::new(HeuristicPolicy::with_seed(
                    *level,
                    seat_seed(seed, Seat::new(index)),
                )) as Box<dyn Policy>),
            })
            .collect();
        let series = SeriesState::with_seed(config, seed)?;
        Ok(Self {
            series,
            policies,
            hint_difficulty: difficulty_from_env(),
            params: HardParams::from_env(),
            rng: StdRng::seed_from_u64(seed.rotate_left(17)),
        })
    }

    pub fn new(config: SeriesConfig) -> Result<Self, SeriesConfigError> {
        Self::new_with_seed(config, rand::random())
    }

    /// Replaces the bot in `seat`. Ignored for human seats.
    pub fn set_policy(&mut self, seat: Seat, policy: Box<dyn Policy>) {
        if let Some(slot) = self.policies.get_mut(seat.index()) {
            if slot.is_some() {
                *slot = Some(policy);
            }
        }
    }

    pub fn with_hint_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.hint_difficulty = difficulty;
        self
    }

    pub fn with_params(mut self, params: HardParams) -> Self {
        self.params = params;
        self
    }

    pub fn series(&self) -> &SeriesState {
        &self.series
    }

    pub fn is_human(&self, seat: Seat) -> bool {
        self.series
            .kind(seat)
            .map(PlayerKind::is_human)
            .unwrap_or(false)
    }

    pub fn pending_action(&self) -> PendingAction {
        if self.series.is_finished() {
            return PendingAction::Finished;
        }
        let round = self.series.round();
        match round.phase() {
            RoundPhase::Bidding => round
                .expected_bidder()
                .map(PendingAction::Bid)
                .unwrap_or(PendingAction::ScoreRound),
            RoundPhase::Adjusting(seat) => PendingAction::Adjust(seat),
            RoundPhase::Playing => PendingAction::Play(round.current_trick().expected_seat()),
            RoundPhase::Complete => PendingAction::ScoreRound,
        }
    }

    /// Snapshot for `seat`, tagged with the tier that seat plays at.
    pub fn public_state_for(&self, seat: Seat) -> PublicState {
        let difficulty = self
            .series
            .kind(seat)
            .and_then(PlayerKind::difficulty)
            .unwrap_or(self.hint_difficulty);
        self.series.public_state(difficulty)
    }

    /// Applies exactly one bot action, or scores a finished round. Returns
    /// `None` when a human must act or the series is over. A bot decision
    /// the round rejects is logged and replaced by the heuristic choice.
    pub fn autoplay_one(&mut self) -> Option<AutoAction> {
        match self.pending_action() {
            PendingAction::Finished => None,
            PendingAction::ScoreRound => self
                .series
                .finish_round_and_start_next()
                .map(AutoAction::RoundScored),
            PendingAction::Bid(seat) => {
                let round = self.series.round();
                let ctx = BidContext {
                    seat,
                    hand: round.hand(seat).cards(),
                    trump: round.trump(),
                    cards: round.cards(),
                    total_bid: round.total_bid(),
                    current_bid: None,
                };
                let policy = self.policies.get_mut(seat.index())?.as_mut()?;
                let chosen = policy.choose_bid(&ctx);
                match self.series.round_mut().place_bid(seat, chosen) {
                    Ok(outcome) => {
                        return Some(AutoAction::Bid {
                            seat,
                            bid: chosen,
                            outcome,
                        });
                    }
                    Err(err) => log_rejected(seat, "bid", &err),
                }
                let bid = self.fallback_bid(seat);
                let outcome = self.series.round_mut().place_bid(seat, bid).ok()?;
                Some(AutoAction::Bid { seat, bid, outcome })
            }
            PendingAction::Adjust(seat) => {
                let round = self.series.round();
                let ctx = BidContext {
                    seat,
                    hand: round.hand(seat).cards(),
                    trump: round.trump(),
                    cards: round.cards(),
                    total_bid: round.total_bid(),
                    current_bid: round.bid(seat),
                };
                let policy = self.policies.get_mut(seat.index())?.as_mut()?;
                let chosen = policy.choose_adjustment(&ctx);
                match self.series.round_mut().adjust_bid(seat, chosen) {
                    Ok(outcome) => {
                        return Some(AutoAction::Adjusted {
                            seat,
                            bid: chosen,
                            outcome,
                        });
                    }
                    Err(err) => log_rejected(seat, "adjustment", &err),
                }
                let bid = self.fallback_adjustment(seat);
                let outcome = self.series.round_mut().adjust_bid(seat, bid).ok()?;
                Some(AutoAction::Adjusted { seat, bid, outcome })
            }
            PendingAction::Play(seat) => {
                let state = self.public_state_for(seat);
                let hand = self.series.round().hand(seat).cards().to_vec();
                let policy = self.policies.get_mut(seat.index())?.as_mut()?;
                match policy.choose_play(&state, &hand) {
                    Some(card) => match self.series.round_mut().play_card(seat, card) {
                        Ok(outcome) => {
                            return Some(AutoAction::Played {
                                seat,
                                card,
                                outcome,
                            });
                        }
                        Err(err) => log_rejected(seat, "play", &err),
                    },
                    None => log_rejected(seat, "play", &"no card chosen"),
                }
                let card = self.series.round().legal_cards(seat).first().copied()?;
                let outcome = self.series.round_mut().play_card(seat, card).ok()?;
                Some(AutoAction::Played {
                    seat,
                    card,
                    outcome,
                })
            }
        }
    }

    fn seat_difficulty(&self, seat: Seat) -> Difficulty {
        self.series
            .kind(seat)
            .and_then(PlayerKind::difficulty)
            .unwrap_or_default()
    }

    fn fallback_bid(&self, seat: Seat) -> u8 {
        let round = self.series.round();
        BidPlanner::choose_bid(
            round.hand(seat).cards(),
            round.trump(),
            round.cards(),
            self.seat_difficulty(seat),
        )
    }

    fn fallback_adjustment(&self, seat: Seat) -> u8 {
        let round = self.series.round();
        BidPlanner::adjust(
            round.hand(seat).cards(),
            round.trump(),
            round.cards(),
            round.total_bid(),
            round.bid(seat).unwrap_or(0),
        )
    }

    /// Plays bots until a human is due or the series ends. Returns the
    /// number of actions taken.
    pub fn run_until_human(&mut self) -> usize {
        let mut steps = 0;
        while self.autoplay_one().is_some() {
            steps += 1;
        }
        steps
    }

    /// Typed bid from a human seat. Bad text is rejected, never clamped.
    pub fn submit_bid_text(&mut self, seat: Seat, text: &str) -> Result<BidOutcome, BidError> {
        if !self.is_human(seat) {
            return Err(BidError::ComputerSeat(seat));
        }
        let round = self.series.round_mut();
        let bid = bidding::parse_bid(text, round.cards())?;
        round.place_bid(seat, bid)
    }

    /// Replacement bid after a blocked total.
    pub fn submit_adjustment_text(
        &mut self,
        seat: Seat,
        text: &str,
    ) -> Result<BidOutcome, BidError> {
        if !self.is_human(seat) {
            return Err(BidError::ComputerSeat(seat));
        }
        let round = self.series.round_mut();
        let bid = bidding::parse_bid(text, round.cards())?;
        round.adjust_bid(seat, bid)
    }

    /// Plays a card for a human `seat`. A card the seat does not hold is
    /// ignored and yields `Ok(None)`; rule breaches are errors.
    pub fn play(&mut self, seat: Seat, card: Card) -> Result<Option<PlayOutcome>, PlayError> {
        if !self.is_human(seat) {
            return Err(PlayError::ComputerSeat(seat));
        }
        match self.series.round_mut().play_card(seat, card) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(PlayError::CardNotInHand(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Review of the last finished trick of the current round, seen from
    /// `viewer`. `None` before the first trick completes.
    pub fn analyze_last_trick(&self, viewer: Seat) -> Option<String> {
        let round = self.series.round();
        let trick = round.trick_history().last()?;
        Some(analyze_trick(trick.plays(), round.trump(), viewer))
    }

    /// Suggested card and its explanation for `seat`, when it is that
    /// seat's turn to play.
    pub fn hint_for(&mut self, seat: Seat) -> Option<Hint> {
        if self.pending_action() != PendingAction::Play(seat) {
            return None;
        }
        let state = self.public_state_for(seat);
        let hand = self.series.round().hand(seat).cards().to_vec();
        let ctx = BotContext::new(&state, &hand, self.params);
        let decision = crate::bot::PlayPlanner::choose(&ctx, &mut self.rng)?;
        let explanation = explain_with_rng(&ctx, decision.card, &mut self.rng);
        Some(Hint {
            card: decision.card,
            explanation,
        })
    }
}

fn log_rejected(seat: Seat, action: &str, error: &dyn fmt::Display) {
    event!(
        target: "bonde_bot::controller",
        Level::WARN,
        seat = %seat,
        action,
        error = %error,
        "bot decision rejected; using the heuristic choice"
    );
}
