use crate::population::Population;
use crate::problem::Problem;
use rand::rngs::SmallRng;

/// Evolves a population in place for one epoch. Out-of-scope collaborator:
/// the core never defines an evolutionary operator itself, only invokes
/// one through this contract.
pub trait Algorithm: AlgorithmClone + Send {
    fn name(&self) -> &'static str;

    /// Mutates `population` in place, using `problem` to evaluate any new
    /// individuals and `rng` for the algorithm's own randomness. `rng` is
    /// local to the calling island's worker thread, independent of the
    /// archipelago's shared migration RNG.
    fn evolve(&mut self, population: &mut Population, problem: &dyn Problem, rng: &mut SmallRng);
}

/// Lets `Box<dyn Algorithm>` be cloned, the way each island clones its
/// own algorithm handle. Same idiom as `ProblemClone`.
pub trait AlgorithmClone {
    fn clone_algorithm(&self) -> Box<dyn Algorithm>;
}

impl<T> AlgorithmClone for T
where
    T: 'static + Algorithm + Clone,
{
    fn clone_algorithm(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Algorithm> {
    fn clone(&self) -> Box<dyn Algorithm> {
        self.clone_algorithm()
    }
}
