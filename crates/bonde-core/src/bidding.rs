//! Hand strength estimate and the blocked-total bid rule.

use crate::model::card::Card;
use crate::model::player::Seat;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use std::fmt;

pub const TRUMP_WEIGHT: f64 = 0.6;
pub const ACE_WEIGHT: f64 = 0.8;
pub const KING_WEIGHT: f64 = 0.5;
pub const QUEEN_WEIGHT: f64 = 0.3;
pub const LENGTH_WEIGHT: f64 = 0.3;
pub const LENGTH_THRESHOLD: usize = 4;
pub const ESTIMATE_SCALE: f64 = 0.45;

/// Easy bots shade their bid down.
pub const EASY_BID_SCALE: f64 = 0.9;

/// Expected trick count for `hand`, clamped to `[0, cards]`.
pub fn estimate_tricks(hand: &[Card], trump: Suit, cards: u8) -> f64 {
    let mut score = 0.0;
    for card in hand {
        if card.suit == trump {
            score += TRUMP_WEIGHT;
        }
        score += match card.rank {
            Rank::Ace => ACE_WEIGHT,
            Rank::King => KING_WEIGHT,
            Rank::Queen => QUEEN_WEIGHT,
            _ => 0.0,
        };
    }
    for suit in Suit::ALL {
        let length = hand.iter().filter(|card| card.suit == suit).count();
        if length >= LENGTH_THRESHOLD {
            score += LENGTH_WEIGHT * (length - 3) as f64;
        }
    }
    (score * ESTIMATE_SCALE).clamp(0.0, f64::from(cards))
}

/// Rounds `estimate * scale` to the nearest whole bid inside `[0, cards]`.
pub fn bid_from_estimate(estimate: f64, cards: u8, scale: f64) -> u8 {
    let rounded = (estimate * scale).round();
    rounded.clamp(0.0, f64::from(cards)) as u8
}

/// True when a full set of bids would add up to exactly the trick count.
pub fn is_forbidden_total(total: u32, cards: u8) -> bool {
    total == u32::from(cards)
}

/// Replacement bid for the seat forced to move off a blocked total.
///
/// Picks the bid in `0..=cards` nearest `estimate`, skipping `current` and
/// any value that recreates the forbidden total. Ties go to the lower bid.
pub fn blocked_adjustment(total: u32, current: u8, estimate: f64, cards: u8) -> u8 {
    let others = total.saturating_sub(u32::from(current));
    let mut best: Option<(u8, f64)> = None;
    for candidate in 0..=cards {
        if candidate == current || is_forbidden_total(others + u32::from(candidate), cards) {
            continue;
        }
        let distance = (f64::from(candidate) - estimate).abs();
        match best {
            Some((_, closest)) if closest <= distance => {}
            _ => best = Some((candidate, distance)),
        }
    }
    match best {
        Some((bid, _)) => bid,
        None if current < cards => current + 1,
        None => current.saturating_sub(1),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidError {
    NotANumber(String),
    OutOfRange { value: i64, max: u8 },
    Unchanged(u8),
    ForbiddenTotal { total: u32, cards: u8 },
    OutOfTurn { expected: Option<Seat>, actual: Seat },
    WrongPhase,
    /// Typed input arrived for a seat a bot plays.
    ComputerSeat(Seat),
}

impl fmt::Display for BidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BidError::NotANumber(text) => write!(f, "'{text}' is not a whole number"),
            BidError::OutOfRange { value, max } => {
                write!(f, "bid {value} is outside 0..={max}")
            }
            BidError::Unchanged(bid) => write!(f, "adjusted bid must differ from {bid}"),
            BidError::ForbiddenTotal { total, cards } => {
                write!(f, "bids would total {total}, equal to the {cards} cards dealt")
            }
            BidError::OutOfTurn {
                expected: Some(expected),
                actual,
            } => write!(f, "expected {expected} to bid but got {actual}"),
            BidError::OutOfTurn {
                expected: None,
                actual,
            } => write!(f, "{actual} may not bid now"),
            BidError::WrongPhase => write!(f, "no bid is being taken"),
            BidError::ComputerSeat(seat) => write!(f, "{seat} is played by the computer"),
        }
    }
}

impl std::error::Error for BidError {}

/// Parses typed bid text. Never clamps: anything outside `[0, cards]` is
/// an error.
pub fn parse_bid(input: &str, cards: u8) -> Result<u8, BidError> {
    let text = input.trim();
    let value: i64 = text
        .parse()
        .map_err(|_| BidError::NotANumber(text.to_string()))?;
    if value < 0 || value > i64::from(cards) {
        return Err(BidError::OutOfRange { value, max: cards });
    }
    Ok(value as u8)
}

/// Checks a replacement bid from a seat forced off a blocked total.
pub fn validate_adjustment(total: u32, current: u8, proposed: u8, cards: u8) -> Result<u8, BidError> {
    if proposed > cards {
        return Err(BidError::OutOfRange {
            value: i64::from(proposed),
            max: cards,
        });
    }
    if proposed == current {
        return Err(BidError::Unchanged(current));
    }
    let new_total = total.saturating_sub(u32::from(current)) + u32::from(proposed);
    if is_forbidden_total(new_total, cards) {
        return Err(BidError::ForbiddenTotal {
            total: new_total,
            cards,
        });
    }
    Ok(proposed)
}
