//! Shared fixtures for the integration tests in this directory. Not
//! compiled as its own test binary because it lives under `tests/common/`
//! rather than directly under `tests/`.

use archipelago::{
    compare_by_fitness, resolve_migration_count, Algorithm, Individual, MigrationRate, Population, Problem,
    ReplacementPolicy, SelectionPolicy,
};
use rand::rngs::SmallRng;
use rand::Rng;

/// A separable sphere function over `[-bound, bound]^dim`, minimized at
/// the origin.
#[derive(Clone)]
pub struct Sphere {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Sphere {
    pub fn new(dim: usize, bound: f64) -> Sphere {
        Sphere { lower: vec![-bound; dim], upper: vec![bound; dim] }
    }
}

impl Problem for Sphere {
    fn continuous_dimension(&self) -> usize {
        self.lower.len()
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
        (&self.lower, &self.upper)
    }

    fn objfun(&self, x: &[f64]) -> (Vec<f64>, Vec<f64>) {
        (vec![x.iter().map(|v| v * v).sum()], vec![])
    }
}

/// A simple (1+1)-style hill climber: perturbs each individual in place
/// and keeps the perturbation only if it does not worsen fitness.
#[derive(Clone)]
pub struct HillClimber {
    step: f64,
}

impl HillClimber {
    pub fn new(step: f64) -> HillClimber {
        HillClimber { step }
    }
}

impl Algorithm for HillClimber {
    fn name(&self) -> &'static str {
        "hill-climber"
    }

    fn evolve(&mut self, population: &mut Population, problem: &dyn Problem, rng: &mut SmallRng) {
        let mut next = Vec::with_capacity(population.len());
        for individual in population.individuals() {
            let mut candidate: Vec<f64> =
                individual.decision().iter().map(|x| x + rng.gen_range(-self.step..=self.step)).collect();
            let (lower, upper) = problem.bounds();
            for (x, (lo, hi)) in candidate.iter_mut().zip(lower.iter().zip(upper.iter())) {
                *x = x.clamp(*lo, *hi);
            }
            let (fitness, constraints) = problem.objfun(&candidate);
            let candidate = Individual::new(candidate, fitness, constraints);
            if compare_by_fitness(&candidate, individual) != std::cmp::Ordering::Greater {
                next.push(candidate);
            } else {
                next.push(individual.clone());
            }
        }
        population.replace_all(next);
    }
}

/// Selects a fixed absolute number of the fittest individuals.
#[derive(Clone)]
pub struct BestKSelection {
    k: usize,
}

impl BestKSelection {
    pub fn new(k: usize) -> BestKSelection {
        BestKSelection { k }
    }
}

impl SelectionPolicy for BestKSelection {
    fn select(&self, population: &Population, _rng: &mut SmallRng) -> Vec<Individual> {
        let mut individuals: Vec<Individual> = population.individuals().to_vec();
        individuals.sort_by(compare_by_fitness);
        individuals.truncate(self.k);
        individuals
    }

    fn number_to_migrate(&self, population: &Population) -> Result<usize, archipelago::ArchipelagoError> {
        resolve_migration_count(MigrationRate::Absolute(self.k), population.len())
    }
}

/// Replaces the `k` worst individuals with immigrants, keeping whichever
/// of the two sets is smaller in count.
#[derive(Clone)]
pub struct WorstKReplacement;

impl ReplacementPolicy for WorstKReplacement {
    fn assimilate(&self, population: &mut Population, mut immigrants: Vec<Individual>) -> usize {
        let mut individuals: Vec<Individual> = population.individuals().to_vec();
        individuals.sort_by(compare_by_fitness);
        let budget = immigrants.len().min(individuals.len());
        individuals.truncate(individuals.len() - budget);
        let integrated = immigrants.len().min(budget);
        immigrants.truncate(integrated);
        individuals.extend(immigrants);
        population.replace_all(individuals);
        integrated
    }
}

/// Shuffles incoming immigrants into the population unconditionally, used
/// where a test only cares that migration happened, not its selectivity.
#[derive(Clone)]
pub struct AbsorbAllReplacement;

impl ReplacementPolicy for AbsorbAllReplacement {
    fn assimilate(&self, population: &mut Population, immigrants: Vec<Individual>) -> usize {
        let count = immigrants.len();
        for individual in immigrants {
            population.push(individual);
        }
        count
    }
}

pub fn init_logging() {
    let _ = env_logger::try_init();
}
