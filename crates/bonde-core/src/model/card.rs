use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn is_ace(self) -> bool {
        matches!(self.rank, Rank::Ace)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardParseError {
    Empty,
    UnknownSuit(String),
    UnknownRank(String),
}

impl fmt::Display for CardParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardParseError::Empty => write!(f, "empty card text"),
            CardParseError::UnknownSuit(text) => write!(f, "no suit found in '{text}'"),
            CardParseError::UnknownRank(text) => write!(f, "unknown rank in '{text}'"),
        }
    }
}

impl std::error::Error for CardParseError {}

/// Parses `♦7`, `D7`, `7♦` or `7d`. Suit may come first or last.
impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        let mut chars = text.chars();
        let first = chars.next().ok_or(CardParseError::Empty)?;
        let last = text.chars().last().ok_or(CardParseError::Empty)?;

        let (suit, rank_text) = if let Some(suit) = Suit::from_symbol(first) {
            (suit, &text[first.len_utf8()..])
        } else if let Some(suit) = Suit::from_symbol(last) {
            (suit, &text[..text.len() - last.len_utf8()])
        } else {
            return Err(CardParseError::UnknownSuit(text.to_string()));
        };

        let rank = Rank::from_symbol(rank_text.trim())
            .ok_or_else(|| CardParseError::UnknownRank(text.to_string()))?;
        Ok(Card::new(rank, suit))
    }
}
