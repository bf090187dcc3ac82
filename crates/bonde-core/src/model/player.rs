use crate::model::difficulty::Difficulty;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A place at the table, numbered clockwise from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seat(u8);

impl Seat {
    pub const MAX_PLAYERS: usize = 6;

    pub const fn new(index: usize) -> Self {
        Seat(index as u8)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn next(self, player_count: usize) -> Seat {
        Seat::new((self.index() + 1) % player_count)
    }

    pub const fn offset(self, steps: usize, player_count: usize) -> Seat {
        Seat::new((self.index() + steps) % player_count)
    }

    /// Every seat once, clockwise, beginning with `start`.
    pub fn order_from(start: Seat, player_count: usize) -> impl Iterator<Item = Seat> {
        (0..player_count).map(move |step| start.offset(step, player_count))
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seat {}", self.0 + 1)
    }
}

/// Who sits in a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerKind {
    Human,
    Computer(Difficulty),
}

impl PlayerKind {
    pub const fn is_human(self) -> bool {
        matches!(self, PlayerKind::Human)
    }

    pub const fn difficulty(self) -> Option<Difficulty> {
        match self {
            PlayerKind::Human => None,
            PlayerKind::Computer(level) => Some(level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayerKind, Seat};
    use crate::model::difficulty::Difficulty;

    #[test]
    fn next_wraps_around() {
        assert_eq!(Seat::new(4).next(5), Seat::new(0));
        assert_eq!(Seat::new(1).next(3), Seat::new(2));
    }

    #[test]
    fn order_from_visits_each_seat_once() {
        let order: Vec<_> = Seat::order_from(Seat::new(2), 4).collect();
        assert_eq!(order, vec![Seat::new(2), Seat::new(3), Seat::new(0), Seat::new(1)]);
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(Seat::new(0).to_string(), "Seat 1");
    }

    #[test]
    fn kind_reports_difficulty() {
        assert_eq!(PlayerKind::Human.difficulty(), None);
        assert_eq!(
            PlayerKind::Computer(Difficulty::Hard).difficulty(),
            Some(Difficulty::Hard)
        );
    }
}
