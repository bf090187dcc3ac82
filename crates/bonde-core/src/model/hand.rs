use crate::model::card::Card;
use crate::model::suit::Suit;

/// Cards held by one seat, kept in display order (suit, then rank).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn remove(&mut self, card: Card) -> bool {
        if let Some(index) = self.cards.iter().position(|&c| c == card) {
            self.cards.remove(index);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.cards.iter().any(|c| c.suit == suit)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    fn sort(&mut self) {
        self.cards
            .sort_by(|a, b| a.suit.cmp(&b.suit).then(a.rank.cmp(&b.rank)));
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn remove_missing_card_is_noop() {
        let mut hand = Hand::with_cards(vec![Card::new(Rank::Three, Suit::Clubs)]);
        assert!(!hand.remove(Card::new(Rank::Four, Suit::Clubs)));
        assert_eq!(hand.len(), 1);
    }

    #[test]
    fn cards_sorted_spades_hearts_diamonds_clubs() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Two, Suit::Clubs),
            Card::new(Rank::King, Suit::Hearts),
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::Four, Suit::Spades),
        ]);
        let ordered: Vec<_> = hand.iter().copied().collect();
        assert_eq!(ordered[0], Card::new(Rank::Four, Suit::Spades));
        assert_eq!(ordered[1], Card::new(Rank::Ace, Suit::Spades));
        assert_eq!(ordered[2], Card::new(Rank::King, Suit::Hearts));
        assert_eq!(ordered[3], Card::new(Rank::Two, Suit::Clubs));
    }

    #[test]
    fn suit_presence() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Two, Suit::Clubs),
            Card::new(Rank::Nine, Suit::Clubs),
        ]);
        assert!(hand.has_suit(Suit::Clubs));
        assert!(!hand.has_suit(Suit::Hearts));
    }
}
