use crate::bidding::{self, BidError};
use crate::model::card::Card;
use crate::model::deck::{Deck, DeckVariant};
use crate::model::difficulty::Difficulty;
use crate::model::hand::Hand;
use crate::model::player::Seat;
use crate::model::score::{RoundOutcome, ScoreBoard, round_points};
use crate::model::suit::Suit;
use crate::model::trick::{Trick, TrickError};
use crate::rules;
use crate::state::{PlayerView, PublicState};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Bidding,
    /// The blocked-total rule forces this seat to change its bid.
    Adjusting(Seat),
    Playing,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidOutcome {
    Placed { next: Seat },
    AdjustmentRequired(Seat),
    BiddingComplete { leader: Seat },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played { next: Seat },
    TrickCompleted { winner: Seat },
    RoundComplete { winner: Seat },
}

impl PlayOutcome {
    pub const fn trick_winner(self) -> Option<Seat> {
        match self {
            PlayOutcome::Played { .. } => None,
            PlayOutcome::TrickCompleted { winner } | PlayOutcome::RoundComplete { winner } => {
                Some(winner)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    WrongPhase,
    OutOfTurn { expected: Seat, actual: Seat },
    CardNotInHand(Card),
    MustFollowSuit(Suit),
    Trick(TrickError),
    ComputerSeat(Seat),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::WrongPhase => write!(f, "cards are not being played"),
            PlayError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to play but got {actual}")
            }
            PlayError::CardNotInHand(card) => write!(f, "{card} is not in hand"),
            PlayError::MustFollowSuit(suit) => write!(f, "must follow {suit}"),
            PlayError::Trick(err) => write!(f, "{err}"),
            PlayError::ComputerSeat(seat) => write!(f, "{seat} is played by the computer"),
        }
    }
}

impl std::error::Error for PlayError {}

/// One seat's line in the end-of-round tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub seat: Seat,
    pub bid: u8,
    pub tricks: u8,
    pub points: u32,
    pub outcome: RoundOutcome,
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: bid {}, tricks {} -> {} points ({})",
            self.seat, self.bid, self.tricks, self.points, self.outcome
        )
    }
}

#[derive(Debug, Clone)]
pub struct RoundState {
    hands: Vec<Hand>,
    bids: Vec<Option<u8>>,
    tricks_won: Vec<u8>,
    trump: Suit,
    dealer: Seat,
    cards: u8,
    deck: DeckVariant,
    current_trick: Trick,
    trick_history: Vec<Trick>,
    discards: Vec<Card>,
    phase: RoundPhase,
}

impl RoundState {
    /// Shuffles a fresh deck and deals `cards` to every seat.
    pub fn deal<R: rand::Rng + ?Sized>(
        variant: DeckVariant,
        player_count: usize,
        cards: u8,
        dealer: Seat,
        trump: Suit,
        rng: &mut R,
    ) -> Option<Self> {
        let mut deck = Deck::shuffled(variant, rng);
        let hands = deck.deal(player_count, usize::from(cards))?;
        Some(Self::from_hands(hands, variant, dealer, trump))
    }

    /// Starts bidding over hands that were dealt elsewhere. Every hand must
    /// hold the same number of cards.
    pub fn from_hands(hands: Vec<Hand>, variant: DeckVariant, dealer: Seat, trump: Suit) -> Self {
        let player_count = hands.len();
        let cards = hands.first().map(|hand| hand.len()).unwrap_or(0) as u8;
        let first_bidder = dealer.next(player_count.max(1));
        Self {
            hands,
            bids: vec![None; player_count],
            tricks_won: vec![0; player_count],
            trump,
            dealer,
            cards,
            deck: variant,
            current_trick: Trick::new(first_bidder, player_count),
            trick_history: Vec::new(),
            discards: Vec::new(),
            phase: RoundPhase::Bidding,
        }
    }

    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn trump(&self) -> Suit {
        self.trump
    }

    pub fn dealer(&self) -> Seat {
        self.dealer
    }

    pub fn cards(&self) -> u8 {
        self.cards
    }

    pub fn deck(&self) -> DeckVariant {
        self.deck
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn bid(&self, seat: Seat) -> Option<u8> {
        self.bids.get(seat.index()).copied().flatten()
    }

    pub fn bids(&self) -> &[Option<u8>] {
        &self.bids
    }

    pub fn tricks_won(&self, seat: Seat) -> u8 {
        self.tricks_won.get(seat.index()).copied().unwrap_or(0)
    }

    pub fn total_bid(&self) -> u32 {
        self.bids.iter().flatten().map(|&bid| u32::from(bid)).sum()
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn trick_history(&self) -> &[Trick] {
        &self.trick_history
    }

    pub fn discards(&self) -> &[Card] {
        &self.discards
    }

    /// First seat clockwise from the dealer's left still without a bid.
    pub fn expected_bidder(&self) -> Option<Seat> {
        if self.phase != RoundPhase::Bidding {
            return None;
        }
        let start = self.dealer.next(self.player_count());
        Seat::order_from(start, self.player_count()).find(|seat| self.bids[seat.index()].is_none())
    }

    /// Seat expected to act next, whatever the phase.
    pub fn turn(&self) -> Option<Seat> {
        match self.phase {
            RoundPhase::Bidding => self.expected_bidder(),
            RoundPhase::Adjusting(seat) => Some(seat),
            RoundPhase::Playing => Some(self.current_trick.expected_seat()),
            RoundPhase::Complete => None,
        }
    }

    pub fn place_bid(&mut self, seat: Seat, bid: u8) -> Result<BidOutcome, BidError> {
        if self.phase != RoundPhase::Bidding {
            return Err(BidError::WrongPhase);
        }
        let expected = self.expected_bidder();
        if expected != Some(seat) {
            return Err(BidError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        if bid > self.cards {
            return Err(BidError::OutOfRange {
                value: i64::from(bid),
                max: self.cards,
            });
        }

        self.bids[seat.index()] = Some(bid);
        if let Some(next) = self.expected_bidder() {
            return Ok(BidOutcome::Placed { next });
        }

        if bidding::is_forbidden_total(self.total_bid(), self.cards) {
            let adjuster = self.dealer.next(self.player_count());
            self.phase = RoundPhase::Adjusting(adjuster);
            return Ok(BidOutcome::AdjustmentRequired(adjuster));
        }

        let leader = self.begin_play();
        Ok(BidOutcome::BiddingComplete { leader })
    }

    pub fn adjust_bid(&mut self, seat: Seat, bid: u8) -> Result<BidOutcome, BidError> {
        let adjuster = match self.phase {
            RoundPhase::Adjusting(adjuster) => adjuster,
            _ => return Err(BidError::WrongPhase),
        };
        if adjuster != seat {
            return Err(BidError::OutOfTurn {
                expected: Some(adjuster),
                actual: seat,
            });
        }
        let current = self.bid(seat).unwrap_or(0);
        let bid = bidding::validate_adjustment(self.total_bid(), current, bid, self.cards)?;
        self.bids[seat.index()] = Some(bid);
        let leader = self.begin_play();
        Ok(BidOutcome::BiddingComplete { leader })
    }

    /// Highest bidder leads; on a tie the first of them clockwise from the
    /// dealer's left.
    fn begin_play(&mut self) -> Seat {
        let count = self.player_count();
        let start = self.dealer.next(count);
        let leader = Seat::order_from(start, count).fold(start, |best, seat| {
            if self.bid(seat).unwrap_or(0) > self.bid(best).unwrap_or(0) {
                seat
            } else {
                best
            }
        });
        self.current_trick = Trick::new(leader, count);
        self.phase = RoundPhase::Playing;
        leader
    }

    pub fn legal_cards(&self, seat: Seat) -> Vec<Card> {
        rules::legal_cards(self.hand(seat).cards(), self.current_trick.lead_suit())
    }

    /// Plays `card` for `seat`. On any error the round is left untouched.
    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayOutcome, PlayError> {
        if self.phase != RoundPhase::Playing {
            return Err(PlayError::WrongPhase);
        }
        let expected = self.current_trick.expected_seat();
        if expected != seat {
            return Err(PlayError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        let hand = &self.hands[seat.index()];
        if !hand.contains(card) {
            return Err(PlayError::CardNotInHand(card));
        }
        if let Some(lead) = self.current_trick.lead_suit() {
            if card.suit != lead && hand.has_suit(lead) {
                return Err(PlayError::MustFollowSuit(lead));
            }
        }

        self.current_trick.play(seat, card).map_err(PlayError::Trick)?;
        let removed = self.hands[seat.index()].remove(card);
        debug_assert!(removed, "{card} was checked to be in hand");
        self.discards.push(card);

        if !self.current_trick.is_complete() {
            return Ok(PlayOutcome::Played {
                next: self.current_trick.expected_seat(),
            });
        }

        let winner = self
            .current_trick
            .winner(self.trump)
            .unwrap_or(self.current_trick.leader());
        self.tricks_won[winner.index()] += 1;
        let fresh = Trick::new(winner, self.player_count());
        let finished = std::mem::replace(&mut self.current_trick, fresh);
        self.trick_history.push(finished);

        if self.hands.iter().all(Hand::is_empty) {
            self.phase = RoundPhase::Complete;
            Ok(PlayOutcome::RoundComplete { winner })
        } else {
            Ok(PlayOutcome::TrickCompleted { winner })
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == RoundPhase::Complete
    }

    /// Per-seat tally. Seats without a bid count as bidding zero.
    pub fn results(&self) -> Vec<RoundResult> {
        (0..self.player_count())
            .map(Seat::new)
            .map(|seat| {
                let bid = self.bid(seat).unwrap_or(0);
                let tricks = self.tricks_won(seat);
                RoundResult {
                    seat,
                    bid,
                    tricks,
                    points: round_points(bid, tricks),
                    outcome: RoundOutcome::classify(bid, tricks),
                }
            })
            .collect()
    }

    /// Snapshot for a decision. Only hand sizes leak, never cards.
    pub fn public_state(
        &self,
        scores: &ScoreBoard,
        humans: &[bool],
        difficulty: Difficulty,
    ) -> PublicState {
        let players = (0..self.player_count())
            .map(Seat::new)
            .map(|seat| PlayerView {
                seat,
                bid: self.bid(seat),
                tricks_won: self.tricks_won(seat),
                hand_size: self.hand(seat).len(),
                score: scores.score(seat),
                is_human: humans.get(seat.index()).copied().unwrap_or(false),
            })
            .collect();
        PublicState {
            players,
            cards_this_round: self.cards,
            trump: self.trump,
            deck: self.deck,
            dealer: self.dealer,
            trick_leader: self.current_trick.leader(),
            current_trick: self.current_trick.plays().to_vec(),
            lead_suit: self.current_trick.lead_suit(),
            turn: self.turn().unwrap_or(self.current_trick.leader()),
            discards: self.discards.clone(),
            difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn hand(cards: &[&str]) -> Hand {
        Hand::with_cards(cards.iter().map(|c| c.parse().expect("valid card")).collect())
    }

    fn card(text: &str) -> Card {
        text.parse().expect("valid card")
    }

    fn three_seat_round() -> RoundState {
        RoundState::from_hands(
            vec![
                hand(&["♠A", "♥2"]),
                hand(&["♠3", "♦K"]),
                hand(&["♥9", "♣4"]),
            ],
            DeckVariant::Full,
            Seat::new(0),
            Suit::Spades,
        )
    }

    #[test]
    fn deal_gives_each_seat_the_round_size() {
        let mut rng = StdRng::seed_from_u64(7);
        let round = RoundState::deal(DeckVariant::Full, 4, 5, Seat::new(2), Suit::Hearts, &mut rng)
            .expect("enough cards");
        for index in 0..4 {
            assert_eq!(round.hand(Seat::new(index)).len(), 5);
        }
        assert_eq!(round.expected_bidder(), Some(Seat::new(3)));
    }

    #[test]
    fn deal_refuses_oversized_round() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(RoundState::deal(DeckVariant::Short, 5, 7, Seat::new(0), Suit::Hearts, &mut rng).is_none());
    }

    #[test]
    fn bids_start_left_of_dealer() {
        let mut round = three_seat_round();
        assert!(matches!(
            round.place_bid(Seat::new(0), 1),
            Err(BidError::OutOfTurn { .. })
        ));
        assert_eq!(
            round.place_bid(Seat::new(1), 1),
            Ok(BidOutcome::Placed { next: Seat::new(2) })
        );
    }

    #[test]
    fn blocked_total_requires_adjustment_by_dealers_left() {
        let mut round = three_seat_round();
        round.place_bid(Seat::new(1), 1).unwrap();
        round.place_bid(Seat::new(2), 0).unwrap();
        assert_eq!(
            round.place_bid(Seat::new(0), 1),
            Ok(BidOutcome::AdjustmentRequired(Seat::new(1)))
        );
        assert_eq!(round.phase(), RoundPhase::Adjusting(Seat::new(1)));
        assert_eq!(
            round.adjust_bid(Seat::new(1), 1),
            Err(BidError::Unchanged(1))
        );
        assert_eq!(
            round.adjust_bid(Seat::new(1), 0),
            Ok(BidOutcome::BiddingComplete { leader: Seat::new(0) })
        );
        assert_eq!(round.total_bid(), 1);
    }

    #[test]
    fn tied_high_bid_goes_to_dealers_left() {
        let mut round = three_seat_round();
        round.place_bid(Seat::new(1), 0).unwrap();
        round.place_bid(Seat::new(2), 2).unwrap();
        let outcome = round.place_bid(Seat::new(0), 2).unwrap();
        // Seats 2 and 0 tie; seat 2 comes first from the dealer's left.
        assert_eq!(outcome, BidOutcome::BiddingComplete { leader: Seat::new(2) });
        assert_eq!(round.turn(), Some(Seat::new(2)));
    }

    #[test]
    fn rejected_play_leaves_state_untouched() {
        let mut round = three_seat_round();
        round.place_bid(Seat::new(1), 2).unwrap();
        round.place_bid(Seat::new(2), 1).unwrap();
        round.place_bid(Seat::new(0), 0).unwrap();
        assert_eq!(round.turn(), Some(Seat::new(1)));

        round.play_card(Seat::new(1), card("♦K")).unwrap();
        let before = round.hand(Seat::new(2)).clone();
        assert_eq!(
            round.play_card(Seat::new(2), card("♠A")),
            Err(PlayError::CardNotInHand(card("♠A")))
        );
        assert_eq!(round.hand(Seat::new(2)), &before);
        assert_eq!(round.discards().len(), 1);
        assert!(matches!(
            round.play_card(Seat::new(0), card("♠A")),
            Err(PlayError::OutOfTurn { .. })
        ));
    }

    #[test]
    fn full_round_scores_tricks() {
        let mut round = three_seat_round();
        round.place_bid(Seat::new(1), 0).unwrap();
        round.place_bid(Seat::new(2), 0).unwrap();
        round.place_bid(Seat::new(0), 1).unwrap();
        assert_eq!(round.turn(), Some(Seat::new(0)));

        round.play_card(Seat::new(0), card("♠A")).unwrap();
        assert_eq!(
            round.play_card(Seat::new(1), card("♦K")),
            Err(PlayError::MustFollowSuit(Suit::Spades))
        );
        round.play_card(Seat::new(1), card("♠3")).unwrap();
        let outcome = round.play_card(Seat::new(2), card("♣4")).unwrap();
        assert_eq!(outcome, PlayOutcome::TrickCompleted { winner: Seat::new(0) });
        assert_eq!(round.trick_history().len(), 1);
        assert_eq!(round.current_trick().leader(), Seat::new(0));
        assert!(round.current_trick().plays().is_empty());

        round.play_card(Seat::new(0), card("♥2")).unwrap();
        round.play_card(Seat::new(1), card("♦K")).unwrap();
        let outcome = round.play_card(Seat::new(2), card("♥9")).unwrap();
        assert_eq!(outcome, PlayOutcome::RoundComplete { winner: Seat::new(2) });
        assert!(round.is_complete());
        assert_eq!(round.discards().len(), 6);
        let last = &round.trick_history()[1];
        assert_eq!(last.winner(Suit::Spades), Some(Seat::new(2)));

        let results = round.results();
        assert_eq!(results[0].outcome, RoundOutcome::Hit);
        assert_eq!(results[0].points, 11);
        assert_eq!(results[1].outcome, RoundOutcome::ZeroHit);
        assert_eq!(results[2].outcome, RoundOutcome::Miss);
    }

    #[test]
    fn public_state_hides_cards() {
        let round = three_seat_round();
        let state = round.public_state(&ScoreBoard::new(3), &[true, false, false], Difficulty::Easy);
        assert_eq!(state.players[1].hand_size, 2);
        assert!(state.players[0].is_human);
        assert_eq!(state.turn, Seat::new(1));
        assert!(state.current_trick.is_empty());
    }
}
