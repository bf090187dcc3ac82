use bonde_core::bidding::{self, EASY_BID_SCALE};
use bonde_core::model::card::Card;
use bonde_core::model::difficulty::Difficulty;
use bonde_core::model::suit::Suit;

pub struct BidPlanner;

impl BidPlanner {
    /// Rounded estimate; easy bots shade it down a little.
    pub fn choose_bid(hand: &[Card], trump: Suit, cards: u8, difficulty: Difficulty) -> u8 {
        let estimate = bidding::estimate_tricks(hand, trump, cards);
        let scale = match difficulty {
            Difficulty::Easy => EASY_BID_SCALE,
            Difficulty::Medium | Difficulty::Hard => 1.0,
        };
        bidding::bid_from_estimate(estimate, cards, scale)
    }

    /// New bid after the table's total was blocked.
    pub fn adjust(hand: &[Card], trump: Suit, cards: u8, total: u32, current: u8) -> u8 {
        let estimate = bidding::estimate_tricks(hand, trump, cards);
        bidding::blocked_adjustment(total, current, estimate, cards)
    }
}

#[cfg(test)]
mod tests {
    use super::BidPlanner;
    use bonde_core::model::card::Card;
    use bonde_core::model::difficulty::Difficulty;
    use bonde_core::model::suit::Suit;

    fn hand(cards: &[&str]) -> Vec<Card> {
        cards.iter().map(|c| c.parse().expect("valid card")).collect()
    }

    #[test]
    fn strong_hand_bids_more() {
        // 4 trumps with A K: 2.4 + 1.3 + 0.3 length = 4.0 → 1.8
        let cards = hand(&["♠A", "♠K", "♠5", "♠4", "♥2"]);
        assert_eq!(BidPlanner::choose_bid(&cards, Suit::Spades, 5, Difficulty::Medium), 2);
        // 1.8 × 0.9 = 1.62
        assert_eq!(BidPlanner::choose_bid(&cards, Suit::Spades, 5, Difficulty::Easy), 2);
    }

    #[test]
    fn easy_shading_can_drop_a_trick() {
        // Trump queen plus a side queen: 1.2 × 0.45 = 0.54, shaded to 0.486.
        let cards = hand(&["♠Q", "♥Q"]);
        assert_eq!(BidPlanner::choose_bid(&cards, Suit::Spades, 2, Difficulty::Hard), 1);
        assert_eq!(BidPlanner::choose_bid(&cards, Suit::Spades, 2, Difficulty::Easy), 0);
        let weak = hand(&["♥A", "♦2"]);
        assert_eq!(BidPlanner::choose_bid(&weak, Suit::Spades, 2, Difficulty::Medium), 0);
    }

    #[test]
    fn adjustment_moves_off_blocked_total() {
        let cards = hand(&["♥A", "♦2"]);
        let adjusted = BidPlanner::adjust(&cards, Suit::Spades, 2, 2, 0);
        assert_ne!(adjusted, 0);
        assert!(adjusted <= 2);
    }
}
