use crate::error::ArchipelagoError;
use crate::individual::Individual;
use crate::population::Population;
use rand::rngs::SmallRng;

/// How a selection policy expresses how many individuals should migrate:
/// either a fixed count, or a fraction of the current population size.
/// Validated by `resolve_migration_count`: a fractional rate outside
/// `[0, 1]` or an absolute rate above the population size is a
/// configuration error.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MigrationRate {
    Absolute(usize),
    Fractional(f64),
}

/// Shared helper for `SelectionPolicy` implementations: turns a
/// `MigrationRate` plus a population size into a concrete count, or a
/// `Configuration` error if the rate is out of range.
pub fn resolve_migration_count(rate: MigrationRate, population_size: usize) -> Result<usize, ArchipelagoError> {
    match rate {
        MigrationRate::Absolute(count) => {
            if count > population_size {
                Err(ArchipelagoError::Configuration(format!(
                    "absolute migration rate {} exceeds population size {}",
                    count, population_size
                )))
            } else {
                Ok(count)
            }
        }
        MigrationRate::Fractional(fraction) => {
            if !(0.0..=1.0).contains(&fraction) {
                Err(ArchipelagoError::Configuration(format!(
                    "fractional migration rate {} is outside [0, 1]",
                    fraction
                )))
            } else {
                Ok(((population_size as f64) * fraction).floor() as usize)
            }
        }
    }
}

/// Chooses emigrants from a population and reports how many individuals
/// should migrate. Out-of-scope collaborator: the core never defines a
/// selection rule itself, only invokes one through this contract.
pub trait SelectionPolicy: SelectionPolicyClone + Send {
    /// Selects emigrants (deep copies) from `population`.
    fn select(&self, population: &Population, rng: &mut SmallRng) -> Vec<Individual>;

    /// The number of individuals that should migrate from `population`,
    /// derived from an absolute or fractional rate.
    fn number_to_migrate(&self, population: &Population) -> Result<usize, ArchipelagoError>;
}

pub trait SelectionPolicyClone {
    fn clone_policy(&self) -> Box<dyn SelectionPolicy>;
}

impl<T> SelectionPolicyClone for T
where
    T: 'static + SelectionPolicy + Clone,
{
    fn clone_policy(&self) -> Box<dyn SelectionPolicy> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn SelectionPolicy> {
    fn clone(&self) -> Box<dyn SelectionPolicy> {
        self.clone_policy()
    }
}
