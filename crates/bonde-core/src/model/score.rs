use crate::model::player::Seat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points for one round: 5 for a fulfilled zero bid, 10 + tricks for any
/// other exact bid, nothing otherwise.
pub const fn round_points(bid: u8, tricks: u8) -> u32 {
    if bid != tricks {
        0
    } else if bid == 0 {
        5
    } else {
        10 + tricks as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    ZeroHit,
    Hit,
    Miss,
}

impl RoundOutcome {
    pub const fn classify(bid: u8, tricks: u8) -> Self {
        if bid != tricks {
            RoundOutcome::Miss
        } else if bid == 0 {
            RoundOutcome::ZeroHit
        } else {
            RoundOutcome::Hit
        }
    }

    pub const fn is_hit(self) -> bool {
        !matches!(self, RoundOutcome::Miss)
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoundOutcome::ZeroHit => "zero-hit",
            RoundOutcome::Hit => "hit",
            RoundOutcome::Miss => "miss",
        };
        f.write_str(label)
    }
}

/// Cumulative series score per seat. Higher is better.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBoard {
    totals: Vec<u32>,
}

impl ScoreBoard {
    pub fn new(player_count: usize) -> Self {
        Self {
            totals: vec![0; player_count],
        }
    }

    pub fn add_points(&mut self, seat: Seat, points: u32) {
        if let Some(total) = self.totals.get_mut(seat.index()) {
            *total += points;
        }
    }

    pub fn score(&self, seat: Seat) -> u32 {
        self.totals.get(seat.index()).copied().unwrap_or(0)
    }

    pub fn standings(&self) -> &[u32] {
        &self.totals
    }
}
