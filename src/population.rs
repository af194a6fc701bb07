use crate::individual::{compare_by_fitness, Individual};

/// An island's local sub-population: an ordered sequence of individuals
/// plus best-so-far tracking. Owned exclusively by one island.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    pub fn new(individuals: Vec<Individual>) -> Population {
        Population { individuals }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn push(&mut self, individual: Individual) {
        self.individuals.push(individual);
    }

    /// Replaces the entire population, e.g. after an algorithm produces a
    /// new generation in place.
    pub fn replace_all(&mut self, individuals: Vec<Individual>) {
        self.individuals = individuals;
    }

    /// The best individual currently held, by ascending lexicographic
    /// fitness order (see `individual::compare_by_fitness`). Computed on
    /// demand rather than cached incrementally: populations stay small
    /// enough that a linear scan is cheap relative to an epoch.
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.iter().min_by(|a, b| compare_by_fitness(a, b))
    }

    /// The least fit individual, symmetric to `best`.
    pub fn worst(&self) -> Option<&Individual> {
        self.individuals.iter().max_by(|a, b| compare_by_fitness(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ind(fitness: f64) -> Individual {
        Individual::new(vec![], vec![fitness], vec![])
    }

    #[test]
    fn best_is_smallest_fitness() {
        let pop = Population::new(vec![ind(3.0), ind(1.0), ind(2.0)]);
        assert_eq!(pop.best().unwrap().fitness(), &[1.0]);
        assert_eq!(pop.worst().unwrap().fitness(), &[3.0]);
    }

    #[test]
    fn empty_population_has_no_best() {
        let pop = Population::new(vec![]);
        assert!(pop.best().is_none());
    }

    #[test]
    fn replace_all_swaps_contents() {
        let mut pop = Population::new(vec![ind(1.0)]);
        pop.replace_all(vec![ind(9.0), ind(9.0)]);
        assert_eq!(pop.len(), 2);
    }
}
