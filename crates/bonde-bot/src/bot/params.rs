/// Sample sizes for the Monte-Carlo tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardParams {
    pub min_samples: usize,
    pub samples_per_player: usize,
    pub explain_samples: usize,
}

impl HardParams {
    pub const DEFAULT_MIN_SAMPLES: usize = 200;
    pub const DEFAULT_SAMPLES_PER_PLAYER: usize = 60;
    pub const DEFAULT_EXPLAIN_SAMPLES: usize = 120;

    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    /// Trials per candidate for a table of `players`.
    pub fn samples_for(&self, players: usize) -> usize {
        self.min_samples.max(self.samples_per_player * players)
    }

    pub(crate) fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut count = |key: &str, fallback: usize| {
            read(key)
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(fallback)
        };

        Self {
            min_samples: count("BONDE_HARD_MIN_SAMPLES", Self::DEFAULT_MIN_SAMPLES),
            samples_per_player: count(
                "BONDE_HARD_SAMPLES_PER_PLAYER",
                Self::DEFAULT_SAMPLES_PER_PLAYER,
            ),
            explain_samples: count("BONDE_EXPLAIN_SAMPLES", Self::DEFAULT_EXPLAIN_SAMPLES),
        }
    }
}

impl Default for HardParams {
    fn default() -> Self {
        Self {
            min_samples: Self::DEFAULT_MIN_SAMPLES,
            samples_per_player: Self::DEFAULT_SAMPLES_PER_PLAYER,
            explain_samples: Self::DEFAULT_EXPLAIN_SAMPLES,
        }
    }
}
