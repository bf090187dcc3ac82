use super::{BotContext, hard};
use bonde_core::model::card::Card;
use bonde_core::model::difficulty::Difficulty;
use bonde_core::rules;
use rand::Rng;

/// A chosen card and the short tag logged with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub card: Card,
    pub reason: &'static str,
}

impl Decision {
    const fn new(card: Card, reason: &'static str) -> Self {
        Self { card, reason }
    }
}

pub struct PlayPlanner;

impl PlayPlanner {
    /// Dispatches on the context's difficulty. `None` only when no legal
    /// card exists.
    pub fn choose<R: Rng + ?Sized>(ctx: &BotContext<'_>, rng: &mut R) -> Option<Decision> {
        match ctx.difficulty {
            Difficulty::Easy => Self::easy(ctx),
            Difficulty::Medium => Self::medium(ctx),
            Difficulty::Hard => hard::choose(ctx, rng).or_else(|| Self::medium(ctx)),
        }
    }

    /// Chase with the strongest card while tricks are still needed,
    /// otherwise shed the lowest rank.
    pub fn easy(ctx: &BotContext<'_>) -> Option<Decision> {
        let legal = ctx.legal();
        if ctx.need() > 0 {
            let (lead, trump) = (ctx.lead(), ctx.trump());
            legal
                .iter()
                .copied()
                .max_by_key(|card| rules::strength_key(*card, lead, trump))
                .map(|card| Decision::new(card, "chase-strongest"))
        } else {
            legal
                .iter()
                .copied()
                .min_by_key(|card| card.rank)
                .map(|card| Decision::new(card, "dump-lowest"))
        }
    }

    /// Splits the legal cards by whether they take the trick right now and
    /// spends the cheapest card that serves the bid.
    pub fn medium(ctx: &BotContext<'_>) -> Option<Decision> {
        let legal = ctx.legal();
        let (mut winning, mut losing): (Vec<Card>, Vec<Card>) =
            legal.iter().partition(|card| ctx.wins_if_played(**card));
        winning.sort_by_key(|card| card.rank);
        losing.sort_by_key(|card| card.rank);

        if ctx.need() > 0 {
            if let Some(&card) = winning.first() {
                return Some(Decision::new(card, "cheapest-winner"));
            }
            legal
                .iter()
                .copied()
                .max_by_key(|card| card.rank)
                .map(|card| Decision::new(card, "best-effort-high"))
        } else if let Some(&card) = losing.first() {
            Some(Decision::new(card, "cheapest-loser"))
        } else if let Some(&card) = winning.first() {
            Some(Decision::new(card, "forced-win"))
        } else {
            legal
                .first()
                .map(|&card| Decision::new(card, "first-legal"))
        }
    }
}
