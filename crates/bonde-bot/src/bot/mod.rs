mod bid;
mod explain;
mod hard;
mod params;
mod play;
mod sampler;

pub use bid::BidPlanner;
pub use explain::{explain_with_rng, explanation};
pub use hard::{CandidateScore, evaluate_candidates, flexibility};
pub use params::HardParams;
pub use play::{Decision, PlayPlanner};
pub use sampler::{deal_unseen, unseen_cards};

use bonde_core::model::card::Card;
use bonde_core::model::difficulty::Difficulty;
use bonde_core::model::hand::Hand;
use bonde_core::model::player::Seat;
use bonde_core::model::suit::Suit;
use bonde_core::rules;
use bonde_core::state::PublicState;
use std::sync::OnceLock;

/// Difficulty for seats that do not name one, from `BONDE_BOT_DIFFICULTY`.
pub fn difficulty_from_env() -> Difficulty {
    static CACHED: OnceLock<Difficulty> = OnceLock::new();
    *CACHED.get_or_init(|| difficulty_from_reader(|key| std::env::var(key).ok()))
}

pub(crate) fn difficulty_from_reader<F>(mut read: F) -> Difficulty
where
    F: FnMut(&str) -> Option<String>,
{
    read("BONDE_BOT_DIFFICULTY")
        .and_then(|raw| raw.parse::<Difficulty>().ok())
        .unwrap_or_default()
}

/// Everything one play decision may look at: the public snapshot plus the
/// acting seat's own cards in display order.
#[derive(Debug, Clone)]
pub struct BotContext<'a> {
    pub state: &'a PublicState,
    pub seat: Seat,
    pub difficulty: Difficulty,
    pub params: HardParams,
    hand: Vec<Card>,
}

impl<'a> BotContext<'a> {
    pub fn new(state: &'a PublicState, hand: &[Card], params: HardParams) -> Self {
        Self {
            state,
            seat: state.turn,
            difficulty: state.difficulty,
            params,
            hand: Hand::with_cards(hand.to_vec()).cards().to_vec(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn trump(&self) -> Suit {
        self.state.trump
    }

    /// Suit of the first card in the trick in progress, if anyone has
    /// played.
    pub fn lead(&self) -> Option<Suit> {
        self.state.current_trick.first().map(|play| play.card.suit)
    }

    pub fn need(&self) -> i32 {
        self.state.need(self.seat)
    }

    pub fn legal(&self) -> Vec<Card> {
        rules::legal_cards(&self.hand, self.lead())
    }

    pub fn wins_if_played(&self, card: Card) -> bool {
        rules::wins_if_played(
            &self.state.current_trick,
            self.lead(),
            self.trump(),
            self.seat,
            card,
        )
    }
}
