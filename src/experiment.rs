use std::{
    iter, thread,
    time::{Duration, Instant},
};

use log::{debug, warn};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    dataset::Dataset,
    policy::{AccessPolicy, Discipline, ExclusiveAccess, ReaderPreferring},
    task::{Role, Task},
    wait_group::WaitGroup,
};

pub const POPULATION: usize = 100;
pub const ITERATIONS: usize = 100;
pub const LINGER: Duration = Duration::from_millis(1);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExperimentConfig {
    /// Expected `readers + writers` of every run.
    pub population: usize,
    /// Operations performed by each task.
    pub iterations: usize,
    /// Pause a task takes after reporting completion.
    pub linger: Duration,
    /// Seed of the experiment's generator; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            population: POPULATION,
            iterations: ITERATIONS,
            linger: LINGER,
            seed: None,
        }
    }
}

/// Runs task populations against fresh copies of one dataset.
pub struct Experiment {
    dataset: Dataset,
    config: ExperimentConfig,
    rng: StdRng,
}

impl Experiment {
    pub fn new(dataset: Dataset, config: ExperimentConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            dataset,
            config,
            rng,
        }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn run_exclusive(&mut self, readers: usize, writers: usize) -> Duration {
        let policy = ExclusiveAccess::new(self.dataset.to_store());
        self.run_with(&policy, readers, writers)
    }

    pub fn run_reader_preferring(&mut self, readers: usize, writers: usize) -> Duration {
        let policy = ReaderPreferring::new(self.dataset.to_store());
        self.run_with(&policy, readers, writers)
    }

    pub fn run(&mut self, discipline: Discipline, readers: usize, writers: usize) -> Duration {
        match discipline {
            Discipline::Exclusive => self.run_exclusive(readers, writers),
            Discipline::ReaderPreferring => self.run_reader_preferring(readers, writers),
        }
    }

    /// Runs against a caller-built policy, drawing randomness from the experiment's generator.
    pub fn run_with<P: AccessPolicy>(
        &mut self,
        policy: &P,
        readers: usize,
        writers: usize,
    ) -> Duration {
        run_population(policy, readers, writers, &self.config, &mut self.rng)
    }
}

/// Launches `readers + writers` tasks in shuffled order and times them until every one has
/// reported completion.
pub fn run_population<P, R>(
    policy: &P,
    readers: usize,
    writers: usize,
    config: &ExperimentConfig,
    rng: &mut R,
) -> Duration
where
    P: AccessPolicy,
    R: Rng + ?Sized,
{
    let total = readers + writers;
    if total != config.population {
        warn!(
            "running {total} tasks ({readers} readers, {writers} writers), expected {}",
            config.population
        );
    }

    let mut roles: Vec<Role> = iter::repeat_n(Role::Reader, readers)
        .chain(iter::repeat_n(Role::Writer, writers))
        .collect();
    roles.shuffle(rng);

    let tasks: Vec<_> = roles
        .into_iter()
        .map(|role| {
            let task_rng = StdRng::seed_from_u64(rng.r#gen());
            Task::new(policy, role, config.iterations, task_rng)
        })
        .collect();

    let completion = WaitGroup::new(total);
    let linger = config.linger;

    thread::scope(|s| {
        let start = Instant::now();
        for task in tasks {
            let completion = &completion;
            s.spawn(move || task.run(completion, linger));
        }
        completion.wait();
        let elapsed = start.elapsed();

        debug!("{readers} readers, {writers} writers finished in {elapsed:?}");
        elapsed
    })
}
