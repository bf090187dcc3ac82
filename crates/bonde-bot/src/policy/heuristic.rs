use super::{BidContext, Policy};
use crate::bot::{BidPlanner, BotContext, Decision, HardParams, PlayPlanner};
use bonde_core::model::card::Card;
use bonde_core::model::difficulty::Difficulty;
use bonde_core::model::player::Seat;
use bonde_core::state::PublicState;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, event};

/// Rule-based bot for one difficulty tier. Owns its random source so a
/// seeded policy replays the same choices.
pub struct HeuristicPolicy {
    difficulty: Difficulty,
    params: HardParams,
    rng: StdRng,
}

impl HeuristicPolicy {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            params: HardParams::from_env(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty,
            params: HardParams::from_env(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_params(mut self, params: HardParams) -> Self {
        self.params = params;
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

impl Policy for HeuristicPolicy {
    fn choose_bid(&mut self, ctx: &BidContext<'_>) -> u8 {
        let bid = BidPlanner::choose_bid(ctx.hand, ctx.trump, ctx.cards, self.difficulty);
        log_bid_decision(ctx, self.difficulty, bid, "estimate");
        bid
    }

    fn choose_adjustment(&mut self, ctx: &BidContext<'_>) -> u8 {
        let current = ctx.current_bid.unwrap_or(0);
        let bid = BidPlanner::adjust(ctx.hand, ctx.trump, ctx.cards, ctx.total_bid, current);
        log_bid_decision(ctx, self.difficulty, bid, "blocked-total");
        bid
    }

    fn choose_play(&mut self, state: &PublicState, hand: &[Card]) -> Option<Card> {
        let ctx = BotContext::new(state, hand, self.params).with_difficulty(self.difficulty);
        let decision = PlayPlanner::choose(&ctx, &mut self.rng)?;
        log_play_decision(&ctx, &decision);
        Some(decision.card)
    }
}

pub(crate) fn log_play_decision(ctx: &BotContext<'_>, decision: &Decision) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }

    let legal = ctx.legal();
    let legal_preview = if legal.len() <= 6 {
        legal
            .iter()
            .map(|card| card.to_string())
            .collect::<Vec<_>>()
            .join(",")
    } else {
        format!("{} moves", legal.len())
    };

    event!(
        target: "bonde_bot::play",
        Level::INFO,
        seat = %ctx.seat,
        difficulty = %ctx.difficulty,
        need = ctx.need(),
        legal_count = legal.len(),
        legal_moves = %legal_preview,
        chosen = %decision.card,
        trick_cards = ctx.state.current_trick.len(),
        reason = decision.reason,
    );
}

fn log_bid_decision(ctx: &BidContext<'_>, difficulty: Difficulty, bid: u8, reason: &str) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }

    event!(
        target: "bonde_bot::bid",
        Level::INFO,
        seat = %ctx.seat,
        difficulty = %difficulty,
        cards = ctx.cards,
        trump = %ctx.trump,
        previous = ?ctx.current_bid,
        bid,
        reason,
    );
}

/// Seed for a seat's policy derived from the table seed.
pub(crate) fn seat_seed(seed: u64, seat: Seat) -> u64 {
    seed ^ (0x9E37_79B9_7F4A_7C15u64.wrapping_mul(seat.index() as u64 + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonde_core::model::deck::DeckVariant;
    use bonde_core::model::suit::Suit;
    use bonde_core::model::trick::Play;
    use bonde_core::state::PlayerView;

    fn card(text: &str) -> Card {
        text.parse().expect("valid card")
    }

    fn state() -> PublicState {
        PublicState {
            players: (0..3)
                .map(|index| PlayerView {
                    seat: Seat::new(index),
                    bid: Some(1),
                    tricks_won: 0,
                    hand_size: 2,
                    score: 0,
                    is_human: false,
                })
                .collect(),
            cards_this_round: 2,
            trump: Suit::Hearts,
            deck: DeckVariant::Full,
            dealer: Seat::new(0),
            trick_leader: Seat::new(1),
            current_trick: vec![Play::new(Seat::new(1), card("♣8"))],
            lead_suit: Some(Suit::Clubs),
            turn: Seat::new(2),
            discards: vec![card("♣8")],
            // The policy's own tier wins over the snapshot's.
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn policy_tier_overrides_snapshot_difficulty() {
        let state = state();
        let hand = [card("♣2"), card("♣K")];
        let mut easy = HeuristicPolicy::with_seed(Difficulty::Easy, 1);
        let mut medium = HeuristicPolicy::with_seed(Difficulty::Medium, 1);
        // Easy chases with the strongest; medium takes the cheapest winner.
        assert_eq!(easy.choose_play(&state, &hand), Some(card("♣K")));
        assert_eq!(medium.choose_play(&state, &hand), Some(card("♣K")));
        let hand = [card("♣9"), card("♣K")];
        assert_eq!(medium.choose_play(&state, &hand), Some(card("♣9")));
    }

    #[test]
    fn seeded_hard_policy_is_repeatable() {
        let state = state();
        let hand = [card("♥2"), card("♣K")];
        let params = HardParams {
            min_samples: 40,
            samples_per_player: 1,
            explain_samples: 10,
        };
        let mut a = HeuristicPolicy::with_seed(Difficulty::Hard, 77).with_params(params);
        let mut b = HeuristicPolicy::with_seed(Difficulty::Hard, 77).with_params(params);
        assert_eq!(a.choose_play(&state, &hand), b.choose_play(&state, &hand));
    }

    #[test]
    fn bids_come_from_the_estimate() {
        let hand = [card("♥A"), card("♥K")];
        let ctx = BidContext {
            seat: Seat::new(0),
            hand: &hand,
            trump: Suit::Hearts,
            cards: 2,
            total_bid: 0,
            current_bid: None,
        };
        let mut policy = HeuristicPolicy::with_seed(Difficulty::Medium, 0);
        // (1.4 + 1.1) × 0.45 = 1.125
        assert_eq!(policy.choose_bid(&ctx), 1);

        let blocked = BidContext {
            total_bid: 2,
            current_bid: Some(1),
            ..ctx
        };
        let adjusted = policy.choose_adjustment(&blocked);
        assert_ne!(adjusted, 1);
    }

    #[test]
    fn seat_seeds_differ() {
        assert_ne!(seat_seed(5, Seat::new(0)), seat_seed(5, Seat::new(1)));
    }
}
