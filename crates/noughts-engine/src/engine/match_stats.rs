use crate::core::{GameOutcome, Mark};

/// Outcome tallies over a series of games.
///
/// # Example
///
/// ```
/// use noughts_engine::{GameOutcome, Mark, MatchStats};
///
/// let mut stats = MatchStats::new();
/// stats.record(GameOutcome::Win(Mark::X));
/// stats.record(GameOutcome::Draw);
///
/// assert_eq!(stats.games(), 2);
/// assert_eq!(stats.wins(Mark::X), 1);
/// assert_eq!(stats.losses(Mark::X), 0);
/// assert_eq!(stats.draws(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStats {
    x_wins: usize,
    o_wins: usize,
    draws: usize,
}

impl MatchStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            x_wins: 0,
            o_wins: 0,
            draws: 0,
        }
    }

    pub const fn record(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Win(Mark::X) => self.x_wins += 1,
            GameOutcome::Win(Mark::O) => self.o_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }
    }

    #[must_use]
    pub const fn games(&self) -> usize {
        self.x_wins + self.o_wins + self.draws
    }

    #[must_use]
    pub const fn wins(&self, mark: Mark) -> usize {
        match mark {
            Mark::X => self.x_wins,
            Mark::O => self.o_wins,
        }
    }

    #[must_use]
    pub const fn losses(&self, mark: Mark) -> usize {
        self.wins(mark.opponent())
    }

    #[must_use]
    pub const fn draws(&self) -> usize {
        self.draws
    }

    /// Fraction of games `mark` did not lose. Returns `0.0` before any game.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn non_loss_rate(&self, mark: Mark) -> f64 {
        let games = self.games();
        if games == 0 {
            return 0.0;
        }
        (games - self.losses(mark)) as f64 / games as f64
    }
}

impl Extend<GameOutcome> for MatchStats {
    fn extend<T: IntoIterator<Item = GameOutcome>>(&mut self, iter: T) {
        for outcome in iter {
            self.record(outcome);
        }
    }
}
