use std::{fmt, time::Duration};

use log::info;

use crate::{experiment::Experiment, policy::Discipline};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepConfig {
    /// Runs averaged per discipline and mix.
    pub repetitions: u32,
    /// Reader-count increment between mixes.
    pub step: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            repetitions: 50,
            step: 1,
        }
    }
}

/// Average run durations of one reader/writer mix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepRow {
    pub readers: usize,
    pub writers: usize,
    pub reader_preferring: Duration,
    pub exclusive: Duration,
}

impl SweepRow {
    /// `reader_preferring - exclusive` in nanoseconds.
    pub fn difference(&self) -> i128 {
        self.reader_preferring.as_nanos() as i128 - self.exclusive.as_nanos() as i128
    }
}

impl fmt::Display for SweepRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diff = self.difference();
        let sign = if diff < 0 { "-" } else { "" };
        let magnitude = Duration::from_nanos(diff.unsigned_abs() as u64);
        write!(
            f,
            "Readers: {}, Writers: {}, Avg Duration with Priority: {:?}, \
             Avg Duration without Priority: {:?}, Difference: {sign}{magnitude:?}",
            self.readers, self.writers, self.reader_preferring, self.exclusive,
        )
    }
}

/// Walks reader counts `0, step, 2 * step, ..` up to the experiment's population, yielding
/// one averaged row per mix.
pub struct Sweep<'a> {
    experiment: &'a mut Experiment,
    config: SweepConfig,
    next_readers: Option<usize>,
}

impl<'a> Sweep<'a> {
    pub fn new(experiment: &'a mut Experiment, config: SweepConfig) -> Self {
        assert!(config.step > 0, "sweep step must be positive");
        assert!(config.repetitions > 0, "sweep needs at least one repetition");
        Self {
            experiment,
            config,
            next_readers: Some(0),
        }
    }

    fn average(&mut self, discipline: Discipline, readers: usize, writers: usize) -> Duration {
        let total: Duration = (0..self.config.repetitions)
            .map(|_| self.experiment.run(discipline, readers, writers))
            .sum();
        total / self.config.repetitions
    }
}

impl Iterator for Sweep<'_> {
    type Item = SweepRow;

    fn next(&mut self) -> Option<SweepRow> {
        let readers = self.next_readers?;
        let population = self.experiment.config().population;
        let writers = population - readers;
        self.next_readers = readers
            .checked_add(self.config.step)
            .filter(|&next| next <= population);

        let row = SweepRow {
            readers,
            writers,
            reader_preferring: self.average(Discipline::ReaderPreferring, readers, writers),
            exclusive: self.average(Discipline::Exclusive, readers, writers),
        };
        info!("{readers}/{writers}: difference {}ns", row.difference());
        Some(row)
    }
}
