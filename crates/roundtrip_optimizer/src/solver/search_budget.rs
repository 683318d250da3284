use std::time::{Duration, Instant};

use super::solver_params::Termination;

/// Tracks the terminations of a single search.
#[derive(Debug)]
pub struct SearchBudget {
    start: Instant,
    max_duration: Option<Duration>,
    max_iterations: Option<usize>,
    iterations: usize,
}

impl SearchBudget {
    pub fn new(terminations: &[Termination]) -> Self {
        let mut max_duration: Option<Duration> = None;
        let mut max_iterations: Option<usize> = None;

        for termination in terminations {
            match termination {
                Termination::Duration(duration) => {
                    // negative durations leave no time at all
                    let duration = Duration::try_from(*duration).unwrap_or(Duration::ZERO);
                    max_duration = Some(max_duration.map_or(duration, |d| d.min(duration)));
                }
                Termination::Iterations(iterations) => {
                    max_iterations =
                        Some(max_iterations.map_or(*iterations, |i| i.min(*iterations)));
                }
            }
        }

        Self {
            start: Instant::now(),
            max_duration,
            max_iterations,
            iterations: 0,
        }
    }

    pub fn is_out_of_time(&self) -> bool {
        self.max_duration
            .is_some_and(|max_duration| self.start.elapsed() >= max_duration)
    }

    pub fn is_exhausted(&self) -> bool {
        self.is_out_of_time()
            || self
                .max_iterations
                .is_some_and(|max_iterations| self.iterations >= max_iterations)
    }

    pub fn record_iteration(&mut self) {
        self.iterations += 1;
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
