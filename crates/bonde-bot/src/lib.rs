pub mod bot;
pub mod controller;
pub mod policy;

pub use bot::{
    BidPlanner, BotContext, CandidateScore, Decision, HardParams, PlayPlanner,
    difficulty_from_env,
};
pub use controller::{AutoAction, GameController, Hint, PendingAction};
pub use policy::{BidContext, HeuristicPolicy, Policy};

use bonde_core::model::card::Card;
use bonde_core::state::PublicState;
use rand::Rng;

/// Card the acting seat (`state.turn`) should play at the snapshot's
/// difficulty. `None` means no hint is available.
pub fn suggest_play(state: &PublicState, hand: &[Card]) -> Option<Card> {
    suggest_play_with_rng(state, hand, &mut rand::thread_rng())
}

/// As [`suggest_play`] with a caller-supplied random source, which makes
/// the hard tier reproducible.
pub fn suggest_play_with_rng<R: Rng + ?Sized>(
    state: &PublicState,
    hand: &[Card],
    rng: &mut R,
) -> Option<Card> {
    let ctx = BotContext::new(state, hand, HardParams::from_env());
    let decision = PlayPlanner::choose(&ctx, rng)?;
    policy::heuristic::log_play_decision(&ctx, &decision);
    Some(decision.card)
}

/// Rationale for playing `card`; the hard tier adds a fresh simulated
/// win rate.
pub fn explain(state: &PublicState, hand: &[Card], card: Card) -> String {
    let ctx = BotContext::new(state, hand, HardParams::from_env());
    bot::explain_with_rng(&ctx, card, &mut rand::thread_rng())
}
