use fnv::FnvHashSet;

/// A graph over island indices `{0, …, N-1}`, exactly matching the
/// archipelago's islands. Edges are directed: `connect(from, to)` makes
/// `to` a neighbor of `from`; build a symmetric graph (like a ring) by
/// connecting both directions explicitly. A generic graph adapter, not
/// any particular shape: rings, fully-connected graphs, and anything
/// else are the caller's responsibility to build with `connect`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Topology {
    adjacency: Vec<FnvHashSet<usize>>,
}

impl Topology {
    pub fn new() -> Topology {
        Topology { adjacency: Vec::new() }
    }

    /// Appends a new vertex at the next index, with no edges yet. Returns
    /// the new vertex's index.
    pub fn push_back(&mut self) -> usize {
        self.adjacency.push(FnvHashSet::default());
        self.adjacency.len() - 1
    }

    /// Adds a directed edge `from -> to`. Both indices must already be
    /// vertices.
    pub fn connect(&mut self, from: usize, to: usize) -> Result<(), String> {
        let n = self.adjacency.len();
        if from >= n || to >= n {
            return Err(format!("vertex out of range: from={from} to={to} num_vertices={n}"));
        }
        self.adjacency[from].insert(to);
        Ok(())
    }

    /// The neighbors of `v`, as an unordered set of indices. Empty if `v`
    /// is out of range or has no outgoing edges.
    pub fn neighbors(&self, v: usize) -> FnvHashSet<usize> {
        self.adjacency.get(v).cloned().unwrap_or_default()
    }

    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    pub fn human_readable(&self) -> String {
        let mut out = format!("Topology: {} vertices\n", self.num_vertices());
        for (v, neighbors) in self.adjacency.iter().enumerate() {
            let mut sorted: Vec<usize> = neighbors.iter().copied().collect();
            sorted.sort_unstable();
            out.push_str(&format!("  {v} -> {sorted:?}\n"));
        }
        out
    }
}
