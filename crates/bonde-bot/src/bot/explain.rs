use super::hard::evaluate_candidates;
use super::BotContext;
use bonde_core::model::card::Card;
use bonde_core::model::difficulty::Difficulty;
use rand::Rng;

/// Human-readable reasoning for playing `card`. The hard tier runs its own
/// smaller simulation, so the figure can change between calls and need
/// not match the sampling that picked the card.
pub fn explain_with_rng<R: Rng + ?Sized>(ctx: &BotContext<'_>, card: Card, rng: &mut R) -> String {
    let mut lines = vec![explanation(ctx, card)];
    if ctx.difficulty == Difficulty::Hard {
        let trials = ctx.params.explain_samples;
        let scores = evaluate_candidates(ctx, &[card], trials, rng);
        if let Some(score) = scores.first() {
            lines.push(format!(
                "Simulation: {card} takes this trick in {:.0}% of {trials} sampled deals.",
                score.win_rate() * 100.0
            ));
        }
    }
    lines.join(" ")
}

/// The deterministic part: suit obligations, trumping, and the tier's
/// rule of thumb.
pub fn explanation(ctx: &BotContext<'_>, card: Card) -> String {
    let mut parts = Vec::new();
    let trump = ctx.trump();

    match ctx.lead() {
        None => parts.push(format!("You lead, so any card is allowed; {card} sets the suit.")),
        Some(lead) if ctx.hand().iter().any(|held| held.suit == lead) => {
            parts.push(format!("Following {lead} is mandatory."));
        }
        Some(lead) => {
            parts.push(format!("You have no {lead}, so any card is allowed."));
            if card.suit == trump && lead != trump {
                parts.push(format!("{card} trumps the {lead} lead."));
            }
        }
    }

    let need = ctx.need();
    let rationale = match (ctx.difficulty, need > 0) {
        (Difficulty::Easy, true) => format!("Still need {need}: play the strongest card."),
        (Difficulty::Easy, false) => "Bid is covered: shed the lowest card.".to_string(),
        (Difficulty::Medium, true) if ctx.wins_if_played(card) => {
            format!("Still need {need}: {card} is the cheapest card that wins now.")
        }
        (Difficulty::Medium, true) => {
            format!("Still need {need}: nothing wins for sure, so play high.")
        }
        (Difficulty::Medium, false) if ctx.wins_if_played(card) => {
            "Bid is covered but every card wins: take it as cheaply as possible.".to_string()
        }
        (Difficulty::Medium, false) => {
            "Bid is covered: duck with the lowest losing card.".to_string()
        }
        (Difficulty::Hard, true) => format!("Still need {need}: aim to take this trick."),
        (Difficulty::Hard, false) => "Bid is covered: aim to lose this trick.".to_string(),
    };
    parts.push(rationale);
    parts.join(" ")
}
