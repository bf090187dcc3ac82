//! Legal-move filter and trick resolution under trump and lead precedence.

use crate::model::card::Card;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use crate::model::trick::Play;
use std::cmp::Ordering;

/// Cards that may be played from `hand`. With no lead every card is legal;
/// otherwise the lead suit must be followed when held.
pub fn legal_cards(hand: &[Card], lead: Option<Suit>) -> Vec<Card> {
    match lead {
        Some(suit) if hand.iter().any(|card| card.suit == suit) => hand
            .iter()
            .copied()
            .filter(|card| card.suit == suit)
            .collect(),
        _ => hand.to_vec(),
    }
}

pub fn is_legal(hand: &[Card], lead: Option<Suit>, card: Card) -> bool {
    hand.contains(&card) && legal_cards(hand, lead).contains(&card)
}

/// Compares `a` against `b`. `Greater` means `a` beats `b`.
///
/// Same suit compares by rank. Otherwise trump beats non-trump and the lead
/// suit beats anything else; two off-suit non-trump cards are `Equal`.
pub fn compare_cards(a: Card, b: Card, lead: Option<Suit>, trump: Suit) -> Ordering {
    if a.suit == b.suit {
        return a.rank.cmp(&b.rank);
    }
    if a.suit == trump {
        return Ordering::Greater;
    }
    if b.suit == trump {
        return Ordering::Less;
    }
    match lead {
        Some(suit) if a.suit == suit => Ordering::Greater,
        Some(suit) if b.suit == suit => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Folds over the plays keeping the best so far; a later card replaces it
/// only on a strict win, so the earlier play keeps ties.
pub fn winner_of_trick(plays: &[Play], lead: Suit, trump: Suit) -> Option<Seat> {
    let (first, rest) = plays.split_first()?;
    let best = rest.iter().fold(first, |best, play| {
        if compare_cards(best.card, play.card, Some(lead), trump) == Ordering::Less {
            play
        } else {
            best
        }
    });
    Some(best.seat)
}

/// Whether `seat` would hold the trick after adding `card` to `plays`.
/// An empty trick takes its lead from `card`.
pub fn wins_if_played(
    plays: &[Play],
    lead: Option<Suit>,
    trump: Suit,
    seat: Seat,
    card: Card,
) -> bool {
    let mut simulated = Vec::with_capacity(plays.len() + 1);
    simulated.extend_from_slice(plays);
    simulated.push(Play::new(seat, card));
    winner_of_trick(&simulated, lead.unwrap_or(card.suit), trump) == Some(seat)
}

/// Total-order strength key consistent with [`compare_cards`] wherever
/// that comparison is decisive: trump above lead above the rest, then rank.
pub fn strength_key(card: Card, lead: Option<Suit>, trump: Suit) -> (u8, u8) {
    let class = if card.suit == trump {
        2
    } else if Some(card.suit) == lead {
        1
    } else {
        0
    };
    (class, card.rank.value())
}
