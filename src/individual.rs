/// A single candidate solution: a decision vector, the fitness vector the
/// problem computed for it, and any constraint values. Value type; once
/// placed into a `Population` or the migration store it is never mutated,
/// only cloned or replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct Individual {
    decision: Vec<f64>,
    fitness: Vec<f64>,
    constraints: Vec<f64>,
}

impl Individual {
    pub fn new(decision: Vec<f64>, fitness: Vec<f64>, constraints: Vec<f64>) -> Individual {
        Individual { decision, fitness, constraints }
    }

    pub fn decision(&self) -> &[f64] {
        &self.decision
    }

    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    pub fn constraints(&self) -> &[f64] {
        &self.constraints
    }
}

/// Ascending lexicographic order over the fitness vector: the first
/// objective is primary, ties are broken by subsequent objectives. The
/// default "better" relation used for best-so-far tracking, since the
/// core is deliberately agnostic to any algorithm-specific dominance or
/// ranking scheme.
pub fn compare_by_fitness(a: &Individual, b: &Individual) -> std::cmp::Ordering {
    for (x, y) in a.fitness.iter().zip(b.fitness.iter()) {
        match x.partial_cmp(y) {
            Some(std::cmp::Ordering::Equal) | None => continue,
            Some(order) => return order,
        }
    }
    a.fitness.len().cmp(&b.fitness.len())
}
