pub(crate) mod heuristic;

pub use heuristic::HeuristicPolicy;

use bonde_core::model::card::Card;
use bonde_core::model::player::Seat;
use bonde_core::model::suit::Suit;
use bonde_core::state::PublicState;

/// What a seat knows when it bids.
#[derive(Debug, Clone, Copy)]
pub struct BidContext<'a> {
    pub seat: Seat,
    pub hand: &'a [Card],
    pub trump: Suit,
    pub cards: u8,
    /// Sum of every bid placed so far, including this seat's own.
    pub total_bid: u32,
    /// This seat's standing bid when it is being asked to adjust.
    pub current_bid: Option<u8>,
}

/// Seat-level decision maker driven by the controller.
pub trait Policy: Send {
    fn choose_bid(&mut self, ctx: &BidContext<'_>) -> u8;

    /// Replacement bid when the table total is blocked.
    fn choose_adjustment(&mut self, ctx: &BidContext<'_>) -> u8;

    /// `None` when no legal card exists.
    fn choose_play(&mut self, state: &PublicState, hand: &[Card]) -> Option<Card>;
}
