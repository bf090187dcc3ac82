use super::play::Decision;
use super::sampler::{deal_unseen, unseen_cards};
use super::BotContext;
use bonde_core::model::card::Card;
use bonde_core::model::player::Seat;
use bonde_core::model::suit::Suit;
use bonde_core::model::trick::Play;
use bonde_core::rules;
use rand::Rng;
use tracing::{Level, event};

// Trial payoffs. They reward hitting the bid, not the exact table score.
pub const EV_WIN_WHEN_NEEDED: f64 = 1.0;
pub const EV_LOSS_WHEN_NEEDED: f64 = -0.5;
pub const EV_WIN_WHEN_MET: f64 = -0.7;
pub const EV_LOSS_WHEN_MET: f64 = 1.0;
pub const FLEXIBILITY_WEIGHT: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub card: Card,
    pub wins: usize,
    pub trials: usize,
    pub mean_ev: f64,
    pub flexibility: u32,
    pub score: f64,
}

impl CandidateScore {
    pub fn win_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.wins as f64 / self.trials as f64
        }
    }
}

/// Trumps count double, aces once, over what is left after `played`.
pub fn flexibility(hand: &[Card], played: Card, trump: Suit) -> u32 {
    hand.iter()
        .filter(|card| **card != played)
        .map(|card| {
            let trump_bonus = if card.suit == trump { 2 } else { 0 };
            let ace_bonus = if card.is_ace() { 1 } else { 0 };
            trump_bonus + ace_bonus
        })
        .sum()
}

/// Runs `trials` sampled deals. Every candidate is tried against the same
/// deal in each trial; opponents answer with their lowest legal rank.
pub fn evaluate_candidates<R: Rng + ?Sized>(
    ctx: &BotContext<'_>,
    candidates: &[Card],
    trials: usize,
    rng: &mut R,
) -> Vec<CandidateScore> {
    let unseen = unseen_cards(ctx);
    let yet_to_play = ctx.state.yet_to_play(ctx.seat);
    let chasing = ctx.need() > 0;
    let mut tallies = vec![(0usize, 0.0f64); candidates.len()];

    for _ in 0..trials {
        let dealt = deal_unseen(ctx, &unseen, rng);
        for (tally, &card) in tallies.iter_mut().zip(candidates) {
            let won = simulate_trick(ctx, card, &dealt, &yet_to_play);
            let ev = match (chasing, won) {
                (true, true) => EV_WIN_WHEN_NEEDED,
                (true, false) => EV_LOSS_WHEN_NEEDED,
                (false, true) => EV_WIN_WHEN_MET,
                (false, false) => EV_LOSS_WHEN_MET,
            };
            tally.0 += usize::from(won);
            tally.1 += ev;
        }
    }

    candidates
        .iter()
        .zip(tallies)
        .map(|(&card, (wins, ev_total))| {
            let mean_ev = ev_total / trials.max(1) as f64;
            let flexibility = flexibility(ctx.hand(), card, ctx.trump());
            CandidateScore {
                card,
                wins,
                trials,
                mean_ev,
                flexibility,
                score: mean_ev + FLEXIBILITY_WEIGHT * f64::from(flexibility),
            }
        })
        .collect()
}

/// Highest combined score; the earliest candidate keeps ties.
pub(crate) fn choose<R: Rng + ?Sized>(ctx: &BotContext<'_>, rng: &mut R) -> Option<Decision> {
    let legal = ctx.legal();
    if legal.is_empty() {
        return None;
    }
    let trials = ctx.params.samples_for(ctx.state.player_count());
    let scores = evaluate_candidates(ctx, &legal, trials, rng);
    log_candidates(ctx, &scores);

    scores
        .iter()
        .fold(None::<&CandidateScore>, |best, candidate| match best {
            Some(top) if top.score >= candidate.score => Some(top),
            _ => Some(candidate),
        })
        .map(|best| Decision {
            card: best.card,
            reason: "monte-carlo",
        })
}

fn simulate_trick(ctx: &BotContext<'_>, card: Card, dealt: &[Vec<Card>], yet_to_play: &[Seat]) -> bool {
    let lead = ctx.lead().unwrap_or(card.suit);
    let mut plays: Vec<Play> = ctx.state.current_trick.clone();
    plays.push(Play::new(ctx.seat, card));
    for seat in yet_to_play {
        let Some(held) = dealt.get(seat.index()) else {
            continue;
        };
        let legal = rules::legal_cards(held, Some(lead));
        if let Some(reply) = opponent_reply(&legal) {
            plays.push(Play::new(*seat, reply));
        }
    }
    rules::winner_of_trick(&plays, lead, ctx.trump()) == Some(ctx.seat)
}

/// Simulated opponents never try to win: lowest rank, first seen.
fn opponent_reply(legal: &[Card]) -> Option<Card> {
    legal.iter().copied().min_by_key(|card| card.rank)
}

fn log_candidates(ctx: &BotContext<'_>, scores: &[CandidateScore]) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    for candidate in scores {
        event!(
            target: "bonde_bot::hard",
            Level::DEBUG,
            seat = %ctx.seat,
            card = %candidate.card,
            trials = candidate.trials,
            win_rate = candidate.win_rate(),
            mean_ev = candidate.mean_ev,
            flexibility = candidate.flexibility,
            score = candidate.score,
        );
    }
}
