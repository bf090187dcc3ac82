use crate::model::card::Card;
use crate::model::deck::DeckVariant;
use crate::model::difficulty::Difficulty;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use crate::model::trick::Play;
use serde::{Deserialize, Serialize};

/// What every seat can see about one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub seat: Seat,
    pub bid: Option<u8>,
    pub tricks_won: u8,
    pub hand_size: usize,
    pub score: u32,
    pub is_human: bool,
}

/// Read-only snapshot handed to a decision. Opponents' cards are not part
/// of it, only how many each still holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicState {
    pub players: Vec<PlayerView>,
    pub cards_this_round: u8,
    pub trump: Suit,
    pub deck: DeckVariant,
    pub dealer: Seat,
    pub trick_leader: Seat,
    pub current_trick: Vec<Play>,
    pub lead_suit: Option<Suit>,
    pub turn: Seat,
    pub discards: Vec<Card>,
    pub difficulty: Difficulty,
}

impl PublicState {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, seat: Seat) -> Option<&PlayerView> {
        self.players.get(seat.index())
    }

    pub fn acting(&self) -> Option<&PlayerView> {
        self.player(self.turn)
    }

    /// Tricks still required to make the bid. Negative once over.
    pub fn need(&self, seat: Seat) -> i32 {
        self.player(seat)
            .map(|view| i32::from(view.bid.unwrap_or(0)) - i32::from(view.tricks_won))
            .unwrap_or(0)
    }

    pub fn total_bid(&self) -> u32 {
        self.players
            .iter()
            .map(|view| u32::from(view.bid.unwrap_or(0)))
            .sum()
    }

    /// Seats after `me` in trick order that have not played this trick.
    pub fn yet_to_play(&self, me: Seat) -> Vec<Seat> {
        Seat::order_from(self.trick_leader, self.player_count())
            .filter(|seat| *seat != me)
            .filter(|seat| !self.current_trick.iter().any(|play| play.seat == *seat))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rank::Rank;

    fn view(index: usize, bid: Option<u8>, tricks: u8) -> PlayerView {
        PlayerView {
            seat: Seat::new(index),
            bid,
            tricks_won: tricks,
            hand_size: 3,
            score: 0,
            is_human: index == 0,
        }
    }

    fn sample() -> PublicState {
        PublicState {
            players: vec![view(0, Some(2), 1), view(1, Some(0), 1), view(2, None, 0), view(3, Some(1), 0)],
            cards_this_round: 4,
            trump: Suit::Hearts,
            deck: DeckVariant::Full,
            dealer: Seat::new(0),
            trick_leader: Seat::new(2),
            current_trick: vec![Play::new(Seat::new(2), Card::new(Rank::Five, Suit::Clubs))],
            lead_suit: Some(Suit::Clubs),
            turn: Seat::new(3),
            discards: Vec::new(),
            difficulty: Difficulty::Hard,
        }
    }

    #[test]
    fn need_is_bid_minus_tricks() {
        let state = sample();
        assert_eq!(state.need(Seat::new(0)), 1);
        assert_eq!(state.need(Seat::new(1)), -1);
        assert_eq!(state.total_bid(), 3);
    }

    #[test]
    fn yet_to_play_follows_trick_order() {
        let state = sample();
        assert_eq!(state.yet_to_play(Seat::new(3)), vec![Seat::new(0), Seat::new(1)]);
        assert_eq!(state.acting().map(|p| p.seat), Some(Seat::new(3)));
    }
}
