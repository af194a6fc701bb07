use crate::individual::Individual;
use crate::population::Population;

/// Integrates immigrants into a population. Out-of-scope collaborator: the
/// core never defines a replacement rule itself, only invokes one through
/// this contract.
pub trait ReplacementPolicy: ReplacementPolicyClone + Send {
    /// Integrates (possibly a subset of) `immigrants` into `population`,
    /// returning the count actually integrated.
    fn assimilate(&self, population: &mut Population, immigrants: Vec<Individual>) -> usize;
}

pub trait ReplacementPolicyClone {
    fn clone_policy(&self) -> Box<dyn ReplacementPolicy>;
}

impl<T> ReplacementPolicyClone for T
where
    T: 'static + ReplacementPolicy + Clone,
{
    fn clone_policy(&self) -> Box<dyn ReplacementPolicy> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn ReplacementPolicy> {
    fn clone(&self) -> Box<dyn ReplacementPolicy> {
        self.clone_policy()
    }
}
