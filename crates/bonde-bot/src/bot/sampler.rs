use super::BotContext;
use bonde_core::model::card::Card;
use bonde_core::model::deck::Deck;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Cards the acting seat has not seen: the deck minus discards, the trick
/// in progress and its own hand.
pub fn unseen_cards(ctx: &BotContext<'_>) -> Vec<Card> {
    let state = ctx.state;
    let seen: HashSet<Card> = state
        .discards
        .iter()
        .copied()
        .chain(state.current_trick.iter().map(|play| play.card))
        .chain(ctx.hand().iter().copied())
        .collect();
    Deck::of(state.deck)
        .cards()
        .iter()
        .copied()
        .filter(|card| !seen.contains(card))
        .collect()
}

/// One random holding per seat drawn from `unseen`, each sized to what the
/// seat still holds. The acting seat's slot stays empty.
pub fn deal_unseen<R: Rng + ?Sized>(
    ctx: &BotContext<'_>,
    unseen: &[Card],
    rng: &mut R,
) -> Vec<Vec<Card>> {
    let mut pool = unseen.to_vec();
    pool.shuffle(rng);
    ctx.state
        .players
        .iter()
        .map(|view| {
            if view.seat == ctx.seat {
                return Vec::new();
            }
            let take = view.hand_size.min(pool.len());
            pool.split_off(pool.len() - take)
        })
        .collect()
}
