use std::{thread, time::Duration};

use rand::{Rng, distributions::Uniform, rngs::StdRng};

use crate::{policy::AccessPolicy, wait_group::WaitGroup};

/// Value every writer stores.
pub const SENTINEL: &str = "MODIFIED";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Reader,
    Writer,
}

/// One simulated reader or writer hitting random positions of a shared policy.
pub struct Task<'a, P: ?Sized> {
    policy: &'a P,
    role: Role,
    iterations: usize,
    rng: StdRng,
}

impl<'a, P: AccessPolicy + ?Sized> Task<'a, P> {
    pub fn new(policy: &'a P, role: Role, iterations: usize, rng: StdRng) -> Self {
        Self {
            policy,
            role,
            iterations,
            rng,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Performs every iteration, reports to `completion`, then sleeps for `linger`.
    ///
    /// Completion is reported even if an operation panics, so the run's barrier still drains.
    pub fn run(mut self, completion: &WaitGroup, linger: Duration) {
        {
            let _report = Completion(completion);
            self.perform();
        }
        if !linger.is_zero() {
            thread::sleep(linger);
        }
    }

    fn perform(&mut self) {
        let positions = Uniform::new(0, self.policy.len());
        for _ in 0..self.iterations {
            let pos = self.rng.sample(positions);
            match self.role {
                Role::Reader => {
                    let _ = self.policy.read(pos);
                }
                Role::Writer => self.policy.write(pos, SENTINEL),
            }
        }
    }
}

struct Completion<'a>(&'a WaitGroup);

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        self.0.done();
    }
}
