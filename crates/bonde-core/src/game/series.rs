use crate::game::round::{RoundResult, RoundState};
use crate::model::deck::DeckVariant;
use crate::model::difficulty::Difficulty;
use crate::model::player::{PlayerKind, Seat};
use crate::model::score::ScoreBoard;
use crate::model::suit::Suit;
use crate::state::PublicState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = Seat::MAX_PLAYERS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub seats: Vec<PlayerKind>,
    pub start_cards: u8,
    #[serde(default)]
    pub deck: DeckVariant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesConfigError {
    PlayerCount(usize),
    StartCards { requested: u8, max: u8 },
}

impl fmt::Display for SeriesConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesConfigError::PlayerCount(count) => write!(
                f,
                "a series needs {MIN_PLAYERS} to {MAX_PLAYERS} players, got {count}"
            ),
            SeriesConfigError::StartCards { requested, max } => {
                write!(f, "start cards must be 1..={max}, got {requested}")
            }
        }
    }
}

impl std::error::Error for SeriesConfigError {}

impl SeriesConfig {
    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    /// Largest round the deck can serve to every seat.
    pub fn max_start_cards(&self) -> u8 {
        let count = self.player_count().max(1);
        (self.deck.size() / count).min(usize::from(u8::MAX)) as u8
    }

    pub fn validate(&self) -> Result<(), SeriesConfigError> {
        let count = self.player_count();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(SeriesConfigError::PlayerCount(count));
        }
        let max = self.max_start_cards();
        if self.start_cards == 0 || self.start_cards > max {
            return Err(SeriesConfigError::StartCards {
                requested: self.start_cards,
                max,
            });
        }
        Ok(())
    }

    pub fn humans(&self) -> Vec<bool> {
        self.seats.iter().map(|kind| kind.is_human()).collect()
    }
}

/// Cards per round: down from `start` to one, then back up.
pub fn round_sequence(start: u8) -> Vec<u8> {
    (1..=start).rev().chain(2..=start).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round_number: usize,
    pub cards: u8,
    pub trump: Suit,
    pub dealer: Seat,
    pub results: Vec<RoundResult>,
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Round {} ({} cards, trump {}, dealer {})",
            self.round_number, self.cards, self.trump, self.dealer
        )?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SeriesState {
    config: SeriesConfig,
    scores: ScoreBoard,
    sequence: Vec<u8>,
    round_index: usize,
    dealer: Seat,
    current_round: RoundState,
    reports: Vec<RoundReport>,
    finished: bool,
    rng: StdRng,
    seed: u64,
}

impl SeriesState {
    pub fn new(config: SeriesConfig) -> Result<Self, SeriesConfigError> {
        let seed: u64 = rand::random();
        Self::with_seed(config, seed)
    }

    pub fn with_seed(config: SeriesConfig, seed: u64) -> Result<Self, SeriesConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let count = config.player_count();
        let sequence = round_sequence(config.start_cards);
        // Advanced again before the first deal.
        let dealer = Seat::new(rng.gen_range(0..count));
        let (dealer, current_round) =
            Self::start_round(&config, dealer, sequence[0], &mut rng)
                .ok_or(SeriesConfigError::StartCards {
                    requested: config.start_cards,
                    max: config.max_start_cards(),
                })?;

        Ok(Self {
            scores: ScoreBoard::new(count),
            sequence,
            round_index: 0,
            dealer,
            current_round,
            reports: Vec::new(),
            finished: false,
            rng,
            seed,
            config,
        })
    }

    fn start_round(
        config: &SeriesConfig,
        previous_dealer: Seat,
        cards: u8,
        rng: &mut StdRng,
    ) -> Option<(Seat, RoundState)> {
        let trump = Suit::ALL[rng.gen_range(0..Suit::ALL.len())];
        let dealer = previous_dealer.next(config.player_count());
        let round = RoundState::deal(
            config.deck,
            config.player_count(),
            cards,
            dealer,
            trump,
            rng,
        )?;
        Some((dealer, round))
    }

    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn round(&self) -> &RoundState {
        &self.current_round
    }

    pub fn round_mut(&mut self) -> &mut RoundState {
        &mut self.current_round
    }

    /// One-based.
    pub fn round_number(&self) -> usize {
        self.round_index + 1
    }

    pub fn total_rounds(&self) -> usize {
        self.sequence.len()
    }

    pub fn round_sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn dealer(&self) -> Seat {
        self.dealer
    }

    pub fn reports(&self) -> &[RoundReport] {
        &self.reports
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn kind(&self, seat: Seat) -> Option<PlayerKind> {
        self.config.seats.get(seat.index()).copied()
    }

    pub fn public_state(&self, difficulty: Difficulty) -> PublicState {
        self.current_round
            .public_state(&self.scores, &self.config.humans(), difficulty)
    }

    pub fn is_round_ready_for_scoring(&self) -> bool {
        !self.finished && self.current_round.is_complete()
    }

    /// Scores the finished round, records its report and deals the next one.
    /// Returns `None` while the round is still in progress.
    pub fn finish_round_and_start_next(&mut self) -> Option<RoundReport> {
        if !self.is_round_ready_for_scoring() {
            return None;
        }
        let results = self.current_round.results();
        for result in &results {
            self.scores.add_points(result.seat, result.points);
        }
        let report = RoundReport {
            round_number: self.round_number(),
            cards: self.current_round.cards(),
            trump: self.current_round.trump(),
            dealer: self.current_round.dealer(),
            results,
        };
        self.reports.push(report.clone());

        let next_index = self.round_index + 1;
        let next = self.sequence.get(next_index).copied().and_then(|cards| {
            Self::start_round(&self.config, self.dealer, cards, &mut self.rng)
        });
        match next {
            Some((dealer, round)) => {
                self.round_index = next_index;
                self.dealer = dealer;
                self.current_round = round;
            }
            None => self.finished = true,
        }
        Some(report)
    }

    /// Seats with totals, best first. Equal totals keep seat order.
    pub fn standings(&self) -> Vec<(Seat, u32)> {
        let mut table: Vec<(Seat, u32)> = self
            .scores
            .standings()
            .iter()
            .enumerate()
            .map(|(index, &score)| (Seat::new(index), score))
            .collect();
        table.sort_by(|a, b| b.1.cmp(&a.1));
        table
    }

    pub fn final_standings(&self) -> Option<Vec<(Seat, u32)>> {
        self.finished.then(|| self.standings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(players: usize, start_cards: u8) -> SeriesConfig {
        SeriesConfig {
            seats: vec![PlayerKind::Computer(Difficulty::Medium); players],
            start_cards,
            deck: DeckVariant::Full,
        }
    }

    #[test]
    fn round_sequence_goes_down_and_up() {
        assert_eq!(round_sequence(3), vec![3, 2, 1, 2, 3]);
        assert_eq!(round_sequence(1), vec![1]);
    }

    #[test]
    fn validation_rejects_bad_setups() {
        assert_eq!(
            config(1, 3).validate(),
            Err(SeriesConfigError::PlayerCount(1))
        );
        assert_eq!(
            config(7, 3).validate(),
            Err(SeriesConfigError::PlayerCount(7))
        );
        assert_eq!(
            config(4, 14).validate(),
            Err(SeriesConfigError::StartCards {
                requested: 14,
                max: 13
            })
        );
        let mut short = config(5, 7);
        short.deck = DeckVariant::Short;
        assert!(short.validate().is_err());
        assert!(config(6, 8).validate().is_ok());
    }

    #[test]
    fn seeded_series_is_reproducible() {
        let a = SeriesState::with_seed(config(4, 5), 99).unwrap();
        let b = SeriesState::with_seed(config(4, 5), 99).unwrap();
        assert_eq!(a.dealer(), b.dealer());
        assert_eq!(a.round().trump(), b.round().trump());
        for index in 0..4 {
            assert_eq!(
                a.round().hand(Seat::new(index)),
                b.round().hand(Seat::new(index))
            );
        }
        assert_eq!(a.seed(), 99);
        assert_eq!(a.total_rounds(), 9);
    }

    #[test]
    fn unfinished_round_is_not_scored() {
        let mut series = SeriesState::with_seed(config(3, 2), 1).unwrap();
        assert!(series.finish_round_and_start_next().is_none());
        assert_eq!(series.round_number(), 1);
    }
}
