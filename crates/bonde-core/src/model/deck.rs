use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Which ranks make up the pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckVariant {
    #[default]
    Full,
    /// 7 through Ace, 32 cards.
    Short,
}

impl DeckVariant {
    pub fn ranks(self) -> &'static [Rank] {
        match self {
            DeckVariant::Full => &Rank::ORDERED,
            DeckVariant::Short => &Rank::SHORT,
        }
    }

    pub fn size(self) -> usize {
        self.ranks().len() * Suit::ALL.len()
    }

    pub fn contains(self, card: Card) -> bool {
        self.ranks().contains(&card.rank)
    }
}

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn of(variant: DeckVariant) -> Self {
        let mut cards = Vec::with_capacity(variant.size());
        for suit in Suit::ALL.iter().copied() {
            for rank in variant.ranks().iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    pub fn standard() -> Self {
        Self::of(DeckVariant::Full)
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(variant: DeckVariant, rng: &mut R) -> Self {
        let mut deck = Self::of(variant);
        deck.cards.shuffle(rng);
        deck
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Deals `per_player` cards to each of `players` seats, one card at a
    /// time round the table, taking from the top (end) of the deck.
    /// Returns `None` when the deck runs short.
    pub fn deal(&mut self, players: usize, per_player: usize) -> Option<Vec<Hand>> {
        if players == 0 || players * per_player > self.cards.len() {
            return None;
        }
        let mut hands: Vec<Vec<Card>> = vec![Vec::with_capacity(per_player); players];
        for _ in 0..per_player {
            for hand in hands.iter_mut() {
                hand.push(self.cards.pop()?);
            }
        }
        Some(hands.into_iter().map(Hand::with_cards).collect())
    }
}
