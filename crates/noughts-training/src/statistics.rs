//! Population statistics for progress reports.

use serde::{Deserialize, Serialize};

/// Descriptive statistics of a set of fitness values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub median: f32,
    /// Population standard deviation.
    pub std_dev: f32,
}

impl FitnessSummary {
    /// Computes statistics from unsorted values. Returns `None` if empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use noughts_training::statistics::FitnessSummary;
    /// let stats = FitnessSummary::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);
        Self::from_sorted(&values)
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f32]) -> Option<Self> {
        debug_assert!(sorted_values.is_sorted_by(|a, b| a <= b));

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let n = sorted_values.len() as f32;
        let mean = sorted_values.iter().sum::<f32>() / n;
        let median = sorted_values[sorted_values.len() / 2];
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f32>()
            / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

/// Mean over gene positions of the population standard deviation of that gene.
///
/// `0.0` means every genome is identical. Returns `0.0` for an empty
/// population.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn gene_diversity<'a, I>(genomes: I) -> f32
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let genomes = genomes.into_iter().collect::<Vec<_>>();
    let Some(len) = genomes.first().map(|genome| genome.len()) else {
        return 0.0;
    };
    if len == 0 {
        return 0.0;
    }
    let total = (0..len)
        .filter_map(|i| FitnessSummary::new(genomes.iter().map(|genome| genome[i])))
        .map(|stats| stats.std_dev)
        .sum::<f32>();
    total / len as f32
}
