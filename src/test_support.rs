//! Minimal fixture implementations of the out-of-scope collaborator traits,
//! used only by this crate's own unit tests. Never compiled outside
//! `#[cfg(test)]` and never part of the public API.

use crate::algorithm::Algorithm;
use crate::error::ArchipelagoError;
use crate::individual::Individual;
use crate::population::Population;
use crate::problem::Problem;
use crate::replacement::ReplacementPolicy;
use crate::selection::{resolve_migration_count, MigrationRate, SelectionPolicy};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// Installs the `env_logger` subscriber for the current test process, so
/// `log::debug!`/`log::info!` output from the core is visible under
/// `--nocapture`. Safe to call from every test: `try_init` is a no-op
/// after the first call.
pub(crate) fn init_logging() {
    let _ = env_logger::try_init();
}

/// A separable sphere function over `[-5, 5]^dim`, minimized at the
/// origin. Single objective, no constraints.
#[derive(Clone)]
pub(crate) struct SphereProblem {
    dim: usize,
}

impl SphereProblem {
    pub(crate) fn new(dim: usize) -> SphereProblem {
        SphereProblem { dim }
    }
}

impl Problem for SphereProblem {
    fn continuous_dimension(&self) -> usize {
        self.dim
    }

    fn integer_dimension(&self) -> usize {
        0
    }

    fn objective_dimension(&self) -> usize {
        1
    }

    fn constraint_dimension(&self) -> usize {
        0
    }

    fn bounds(&self) -> (&[f64], &[f64]) {
        (&BOUNDS_LOWER[..self.dim.min(8)], &BOUNDS_UPPER[..self.dim.min(8)])
    }

    fn objfun(&self, x: &[f64]) -> (Vec<f64>, Vec<f64>) {
        (vec![x.iter().map(|v| v * v).sum()], vec![])
    }
}

const BOUNDS_LOWER: [f64; 8] = [-5.0; 8];
const BOUNDS_UPPER: [f64; 8] = [5.0; 8];

/// Does nothing to the population; useful where a test only cares about
/// migration, not actual search progress.
#[derive(Clone)]
pub(crate) struct ConstantAlgorithm;

impl Algorithm for ConstantAlgorithm {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn evolve(&mut self, _population: &mut Population, _problem: &dyn Problem, _rng: &mut SmallRng) {}
}

/// Selects the `k` fittest individuals as emigrants.
#[derive(Clone)]
pub(crate) struct TopKSelection {
    k: usize,
}

impl TopKSelection {
    pub(crate) fn new(k: usize) -> TopKSelection {
        TopKSelection { k }
    }
}

impl SelectionPolicy for TopKSelection {
    fn select(&self, population: &Population, rng: &mut SmallRng) -> Vec<Individual> {
        let mut individuals: Vec<Individual> = population.individuals().to_vec();
        individuals.shuffle(rng);
        individuals.truncate(self.k);
        individuals
    }

    fn number_to_migrate(&self, population: &Population) -> Result<usize, ArchipelagoError> {
        resolve_migration_count(MigrationRate::Absolute(self.k), population.len())
    }
}

/// Appends every immigrant to the population unconditionally.
#[derive(Clone)]
pub(crate) struct AppendAllReplacement;

impl ReplacementPolicy for AppendAllReplacement {
    fn assimilate(&self, population: &mut Population, immigrants: Vec<Individual>) -> usize {
        let count = immigrants.len();
        for individual in immigrants {
            population.push(individual);
        }
        count
    }
}
