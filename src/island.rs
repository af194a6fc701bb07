use crate::algorithm::Algorithm;
use crate::individual::Individual;
use crate::population::Population;
use crate::problem::Problem;
use crate::replacement::ReplacementPolicy;
use crate::selection::SelectionPolicy;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// An autonomous evolutionary worker holding one population. Identified by
/// a stable zero-based index within its archipelago; owns one population,
/// one algorithm handle (cloned), a reference to its problem, and local
/// selection/replacement policy handles.
///
/// An island may be bound to at most one archipelago at a time. The bond
/// is a weak back-reference (an `Option<u64>` archipelago id), never
/// ownership: an island never reaches back into its archipelago, so the
/// two never need to agree on a lifetime.
pub struct Island {
    index: usize,
    population: Population,
    algorithm: Box<dyn Algorithm>,
    problem: Arc<dyn Problem>,
    selection: Box<dyn SelectionPolicy>,
    replacement: Box<dyn ReplacementPolicy>,
    rng: SmallRng,
    bound_to: Option<u64>,
}

impl Island {
    pub fn new(
        problem: Arc<dyn Problem>,
        algorithm: Box<dyn Algorithm>,
        selection: Box<dyn SelectionPolicy>,
        replacement: Box<dyn ReplacementPolicy>,
        population: Population,
    ) -> Island {
        Island {
            index: 0,
            population,
            algorithm,
            problem,
            selection,
            replacement,
            rng: SmallRng::from_entropy(),
            bound_to: None,
        }
    }

    /// Builds an island with a fresh population of `size` random
    /// individuals sampled uniformly within the problem's bounds, each
    /// evaluated once through `problem.objfun`.
    pub fn new_random(
        problem: Arc<dyn Problem>,
        algorithm: Box<dyn Algorithm>,
        selection: Box<dyn SelectionPolicy>,
        replacement: Box<dyn ReplacementPolicy>,
        size: usize,
    ) -> Island {
        let mut rng = SmallRng::from_entropy();
        let individuals = (0..size).map(|_| random_individual(problem.as_ref(), &mut rng)).collect();
        Island {
            index: 0,
            population: Population::new(individuals),
            algorithm,
            problem,
            selection,
            replacement,
            rng,
            bound_to: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn problem(&self) -> &dyn Problem {
        self.problem.as_ref()
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    pub fn is_bound(&self) -> bool {
        self.bound_to.is_some()
    }

    pub(crate) fn bound_to(&self) -> Option<u64> {
        self.bound_to
    }

    pub(crate) fn bind(&mut self, archipelago_id: u64) {
        self.bound_to = Some(archipelago_id);
    }

    pub(crate) fn unbind(&mut self) {
        self.bound_to = None;
    }

    /// Deep copy, used when an archipelago is copied: a fresh, unbound
    /// island with cloned algorithm/selection/replacement handles and an
    /// independently-seeded local RNG.
    pub(crate) fn deep_copy(&self) -> Island {
        Island {
            index: self.index,
            population: self.population.clone(),
            algorithm: self.algorithm.clone(),
            problem: Arc::clone(&self.problem),
            selection: self.selection.clone(),
            replacement: self.replacement.clone(),
            rng: SmallRng::from_entropy(),
            bound_to: None,
        }
    }

    pub(crate) fn run_one_epoch(&mut self) {
        self.algorithm.evolve(&mut self.population, self.problem.as_ref(), &mut self.rng);
    }

    pub(crate) fn selection(&self) -> &dyn SelectionPolicy {
        self.selection.as_ref()
    }

    pub(crate) fn replacement(&self) -> &dyn ReplacementPolicy {
        self.replacement.as_ref()
    }

    pub(crate) fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }
}

fn random_individual(problem: &dyn Problem, rng: &mut SmallRng) -> Individual {
    let (lower, upper) = problem.bounds();
    let decision: Vec<f64> = lower.iter().zip(upper.iter()).map(|(lo, hi)| rng.gen_range(*lo..=*hi)).collect();
    let (fitness, constraints) = problem.objfun(&decision);
    Individual::new(decision, fitness, constraints)
}
