/// Evaluates an objective (fitness) vector on a decision vector; declares
/// dimension and bounds. Out-of-scope collaborator: the core never defines
/// an objective landscape itself, only invokes one through this contract.
pub trait Problem: ProblemClone + Send + Sync {
    fn continuous_dimension(&self) -> usize;
    fn integer_dimension(&self) -> usize;
    fn objective_dimension(&self) -> usize;
    fn constraint_dimension(&self) -> usize;

    /// Inclusive `(lower, upper)` bounds, one pair per decision dimension.
    fn bounds(&self) -> (&[f64], &[f64]);

    /// Evaluates `x`, returning `(fitness, constraints)`.
    fn objfun(&self, x: &[f64]) -> (Vec<f64>, Vec<f64>);

    /// Two problems are compatible iff they report identical dimensions
    /// and bounds. `push_back` rejects an island whose problem is
    /// incompatible with any existing island's problem.
    fn is_compatible_with(&self, other: &dyn Problem) -> bool {
        self.continuous_dimension() == other.continuous_dimension()
            && self.integer_dimension() == other.integer_dimension()
            && self.objective_dimension() == other.objective_dimension()
            && self.constraint_dimension() == other.constraint_dimension()
            && self.bounds() == other.bounds()
    }
}

/// Lets `Box<dyn Problem>` be cloned without every implementor hand-writing
/// it. The standard "clone a trait object" idiom: blanket-implemented for
/// any concrete, `'static` problem that is also `Clone`.
pub trait ProblemClone {
    fn clone_problem(&self) -> Box<dyn Problem>;
}

impl<T> ProblemClone for T
where
    T: 'static + Problem + Clone,
{
    fn clone_problem(&self) -> Box<dyn Problem> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Problem> {
    fn clone(&self) -> Box<dyn Problem> {
        self.clone_problem()
    }
}
