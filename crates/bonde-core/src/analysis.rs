use crate::model::player::Seat;
use crate::model::suit::Suit;
use crate::model::trick::Play;
use crate::rules;

/// Short post-trick report from `viewer`'s point of view: every card with
/// who played it, the best card, and one tip.
pub fn analyze_trick(plays: &[Play], trump: Suit, viewer: Seat) -> String {
    let Some(first) = plays.first() else {
        return "No cards played yet.".to_string();
    };
    let lead = first.card.suit;
    let winner = rules::winner_of_trick(plays, lead, trump).unwrap_or(first.seat);
    let best = plays
        .iter()
        .find(|play| play.seat == winner)
        .map(|play| play.card)
        .unwrap_or(first.card);

    let cards: Vec<String> = plays
        .iter()
        .map(|play| {
            if play.seat == viewer {
                format!("{} (you)", play.card)
            } else {
                format!("{} ({})", play.card, play.seat)
            }
        })
        .collect();

    let tip = if first.seat == viewer {
        "You led this trick; strong cards are best spent with a plan."
    } else if winner == viewer {
        "You won the trick. Well played."
    } else {
        "You lost the trick; consider whether another card would have served better."
    };

    format!(
        "Trick: {}\nBest card: {best}\n{tip}",
        cards.join(" | ")
    )
}
