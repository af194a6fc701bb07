use crate::algorithm::Algorithm;
use crate::config::{DistributionType, MigrationDirection};
use crate::error::ArchipelagoError;
use crate::history::{MigrationHistory, MigrationHistoryItem};
use crate::individual::Individual;
use crate::island::Island;
use crate::migration_store::MigrationStore;
use crate::population::Population;
use crate::problem::Problem;
use crate::replacement::ReplacementPolicy;
use crate::selection::SelectionPolicy;
use crate::topology::Topology;
use fnv::FnvHashMap;
use log::{debug, error, info, trace, warn};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

static NEXT_ARCHIPELAGO_ID: AtomicU64 = AtomicU64::new(1);

fn next_archipelago_id() -> u64 {
    NEXT_ARCHIPELAGO_ID.fetch_add(1, Ordering::Relaxed)
}

/// The migration store, history log, and shared RNG, reached only through
/// the archipelago's single mutex.
struct SharedState {
    store: MigrationStore,
    history: MigrationHistory,
    rng: SmallRng,
}

impl SharedState {
    fn new() -> SharedState {
        SharedState { store: MigrationStore::new(), history: MigrationHistory::new(), rng: SmallRng::from_entropy() }
    }
}

/// A uniform index in `[0, bound)`, drawn from the archipelago's single
/// shared RNG.
fn next_index(rng: &mut SmallRng, bound: usize) -> usize {
    rng.gen_range(0..bound)
}

#[derive(Copy, Clone, Debug)]
enum EpochBudget {
    Count(usize),
    Duration(Duration),
}

/// Owns a set of islands, their topology, and the shared migration state
/// between them. Drives concurrent evolution across all islands, with a
/// pre/post-evolution hook around each epoch implementing migration.
pub struct Archipelago {
    id: u64,
    islands: Vec<Arc<Mutex<Island>>>,
    topology: Topology,
    distribution: DistributionType,
    direction: MigrationDirection,
    shared: Arc<Mutex<SharedState>>,
    interrupt: Arc<AtomicBool>,
    handles: Vec<JoinHandle<Result<(), ArchipelagoError>>>,
}

impl Archipelago {
    pub fn new(distribution: DistributionType, direction: MigrationDirection) -> Archipelago {
        Archipelago {
            id: next_archipelago_id(),
            islands: Vec::new(),
            topology: Topology::new(),
            distribution,
            direction,
            shared: Arc::new(Mutex::new(SharedState::new())),
            interrupt: Arc::new(AtomicBool::new(false)),
            handles: Vec::new(),
        }
    }

    /// An empty archipelago (0 islands) bound to `topology`. Fails if
    /// `topology` is not itself empty: an empty archipelago's vertex set
    /// must equal `{0,…,get_size()-1}` (here, the empty set) from the
    /// moment of construction, since `push_back` only ever grows the
    /// topology by one vertex at a time and never resyncs a mismatched
    /// starting point.
    pub fn with_topology(
        topology: Topology,
        distribution: DistributionType,
        direction: MigrationDirection,
    ) -> Result<Archipelago, ArchipelagoError> {
        if topology.num_vertices() != 0 {
            return Err(ArchipelagoError::Configuration(format!(
                "with_topology requires an empty topology, but it has {} vertices",
                topology.num_vertices()
            )));
        }
        Ok(Archipelago::with_topology_unchecked(topology, distribution, direction))
    }

    /// Binds `topology` as-is, without checking vertex count against the
    /// (currently empty) island list. Used internally by `with_problem`,
    /// which supplies a topology already sized to `num_islands` and then
    /// pushes the islands to match it.
    fn with_topology_unchecked(topology: Topology, distribution: DistributionType, direction: MigrationDirection) -> Archipelago {
        let mut archipelago = Archipelago::new(distribution, direction);
        archipelago.topology = topology;
        archipelago
    }

    /// An archipelago of `num_islands` islands, each with a fresh
    /// population of `population_size` random individuals on `problem`,
    /// each island cloning `algorithm`/`selection`/`replacement`.
    #[allow(clippy::too_many_arguments)]
    pub fn with_problem(
        problem: Arc<dyn Problem>,
        algorithm: Box<dyn Algorithm>,
        selection: Box<dyn SelectionPolicy>,
        replacement: Box<dyn ReplacementPolicy>,
        num_islands: usize,
        population_size: usize,
        topology: Topology,
        distribution: DistributionType,
        direction: MigrationDirection,
    ) -> Result<Archipelago, ArchipelagoError> {
        if topology.num_vertices() != num_islands {
            return Err(ArchipelagoError::Configuration(format!(
                "topology has {} vertices but {} islands were requested",
                topology.num_vertices(),
                num_islands
            )));
        }

        let mut archipelago = Archipelago::with_topology_unchecked(topology, distribution, direction);
        for index in 0..num_islands {
            let mut island = Island::new_random(
                Arc::clone(&problem),
                algorithm.clone(),
                selection.clone(),
                replacement.clone(),
                population_size,
            );
            island.set_index(index);
            island.bind(archipelago.id);
            archipelago.islands.push(Arc::new(Mutex::new(island)));
        }
        Ok(archipelago)
    }

    pub fn get_size(&self) -> usize {
        self.islands.len()
    }

    pub fn get_topology(&self) -> Topology {
        self.topology.clone()
    }

    pub fn set_topology(&mut self, topology: Topology) -> Result<(), ArchipelagoError> {
        if self.busy() {
            return Err(ArchipelagoError::State("cannot set_topology while evolving".to_string()));
        }
        if topology.num_vertices() != self.islands.len() {
            return Err(ArchipelagoError::Configuration(format!(
                "topology has {} vertices but archipelago has {} islands",
                topology.num_vertices(),
                self.islands.len()
            )));
        }
        self.topology = topology;
        Ok(())
    }

    /// Appends a new island at index `get_size()`, adds a matching vertex
    /// to the topology. Fails if busy, if the island is already bound to
    /// another archipelago, or if its problem is incompatible with any
    /// existing island's problem.
    pub fn push_back(&mut self, mut island: Island) -> Result<(), ArchipelagoError> {
        if self.busy() {
            return Err(ArchipelagoError::State("cannot push_back while evolving".to_string()));
        }
        if island.is_bound() {
            return Err(ArchipelagoError::Ownership(
                "island is already bound to another archipelago".to_string(),
            ));
        }
        for existing in &self.islands {
            let guard = existing.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if !guard.problem().is_compatible_with(island.problem()) {
                return Err(ArchipelagoError::Configuration(
                    "pushed island's problem is incompatible with an existing island's problem".to_string(),
                ));
            }
        }

        let index = self.islands.len();
        island.set_index(index);
        island.bind(self.id);
        self.topology.push_back();
        self.islands.push(Arc::new(Mutex::new(island)));
        Ok(())
    }

    /// True iff any island task is still running.
    pub fn busy(&self) -> bool {
        self.handles.iter().any(|handle| !handle.is_finished())
    }

    /// Spawns one concurrent worker per island, each running `epochs`
    /// epochs of pre-evolution hook → algorithm step → post-evolution
    /// hook. Returns immediately; call `join()` to wait for completion.
    pub fn evolve(&mut self, epochs: usize) -> Result<(), ArchipelagoError> {
        self.start_workers(EpochBudget::Count(epochs))
    }

    /// Identical to `evolve`, but each island evolves for at least `ms`
    /// milliseconds rather than a fixed epoch count.
    pub fn evolve_t(&mut self, ms: u64) -> Result<(), ArchipelagoError> {
        self.start_workers(EpochBudget::Duration(Duration::from_millis(ms)))
    }

    fn start_workers(&mut self, budget: EpochBudget) -> Result<(), ArchipelagoError> {
        if self.busy() {
            return Err(ArchipelagoError::State("archipelago is already evolving".to_string()));
        }

        let num_islands = self.islands.len();
        if num_islands == 0 {
            return Ok(());
        }

        info!("evolve: starting {} island worker(s) with budget {:?}", num_islands, budget);
        self.interrupt.store(false, Ordering::Relaxed);
        let barrier = Arc::new(Barrier::new(num_islands));

        let mut handles = Vec::with_capacity(num_islands);
        for island_lock in &self.islands {
            let island_lock = Arc::clone(island_lock);
            let shared = Arc::clone(&self.shared);
            let topology = self.topology.clone();
            let barrier = Arc::clone(&barrier);
            let interrupt = Arc::clone(&self.interrupt);
            let distribution = self.distribution;
            let direction = self.direction;

            let handle = thread::spawn(move || {
                let mut island = island_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                run_island(&mut island, budget, &shared, &topology, distribution, direction, &barrier, &interrupt)
            });
            handles.push(handle);
        }
        self.handles = handles;
        Ok(())
    }

    /// Blocks until all island tasks have completed. Idempotent: a no-op
    /// if nothing is running.
    pub fn join(&mut self) -> Result<(), ArchipelagoError> {
        if self.handles.is_empty() {
            return Ok(());
        }

        let handles = std::mem::take(&mut self.handles);
        let reclaimed = handles.len();
        let mut errors = Vec::new();
        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!("island worker failed: {err}");
                    errors.push(err.to_string());
                }
                Err(_) => {
                    error!("island worker thread panicked");
                    errors.push("island worker thread panicked".to_string());
                }
            }
        }
        info!("join: {reclaimed} worker(s) reclaimed, {} failure(s)", errors.len());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ArchipelagoError::Worker(errors.join("; ")))
        }
    }

    /// Signals all islands to stop at the next epoch boundary. `join()`
    /// still must be called to reclaim the worker tasks.
    pub fn interrupt(&self) {
        info!("interrupt requested");
        self.interrupt.store(true, Ordering::Relaxed);
    }

    pub fn dump_migr_history(&self) -> String {
        let guard = self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.history.dump()
    }

    pub fn migration_history_items(&self) -> Vec<MigrationHistoryItem> {
        let guard = self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.history.items().to_vec()
    }

    pub fn clear_migr_history(&self) {
        let mut guard = self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.history.clear();
    }

    /// A deep copy of all islands, topology, store, and history. A live
    /// archipelago first joins its in-flight evolution; the copy starts
    /// idle. Not named `clone`/`Clone::clone` because joining needs
    /// `&mut self`, which `Clone` cannot provide.
    pub fn deep_copy(&mut self) -> Result<Archipelago, ArchipelagoError> {
        self.join()?;

        let new_id = next_archipelago_id();
        let mut islands = Vec::with_capacity(self.islands.len());
        for island_lock in &self.islands {
            let guard = island_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let mut copy = guard.deep_copy();
            copy.bind(new_id);
            islands.push(Arc::new(Mutex::new(copy)));
        }

        let shared_guard = self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let shared = SharedState {
            store: shared_guard.store.clone(),
            history: shared_guard.history.clone(),
            rng: SmallRng::from_entropy(),
        };
        drop(shared_guard);

        Ok(Archipelago {
            id: new_id,
            islands,
            topology: self.topology.clone(),
            distribution: self.distribution,
            direction: self.direction,
            shared: Arc::new(Mutex::new(shared)),
            interrupt: Arc::new(AtomicBool::new(false)),
            handles: Vec::new(),
        })
    }

    /// A clone of the population currently held by island `index`. Errors
    /// with `Precondition` if the index is out of range, or `State` if
    /// the archipelago is busy (islands are exclusive to their worker
    /// while evolving).
    pub fn population_of(&self, index: usize) -> Result<Population, ArchipelagoError> {
        if self.busy() {
            return Err(ArchipelagoError::State("cannot inspect a population while evolving".to_string()));
        }
        let island_lock = self
            .islands
            .get(index)
            .ok_or_else(|| ArchipelagoError::Precondition(format!("island index {index} out of range")))?;
        let guard = island_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.population().clone())
    }

    /// A stable multi-line report: island count, topology summary,
    /// distribution mode, direction mode, per-island summary.
    pub fn human_readable(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Archipelago: {} island(s)\n", self.islands.len()));
        out.push_str(&self.topology.human_readable());
        out.push_str(&format!("distribution: {:?}\n", self.distribution));
        out.push_str(&format!("direction: {:?}\n", self.direction));
        for island_lock in &self.islands {
            let guard = island_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            out.push_str(&format!(
                "  island {}: {} individual(s), algorithm={}\n",
                guard.index(),
                guard.population().len(),
                guard.algorithm_name()
            ));
        }
        out
    }
}

impl Drop for Archipelago {
    fn drop(&mut self) {
        let _ = self.join();
    }
}

/// One worker's full run: wait on the shared start barrier, then loop
/// pre-evolution hook → algorithm epoch → post-evolution hook until the
/// budget is exhausted or `interrupt` is observed.
#[allow(clippy::too_many_arguments)]
fn run_island(
    island: &mut Island,
    budget: EpochBudget,
    shared: &Mutex<SharedState>,
    topology: &Topology,
    distribution: DistributionType,
    direction: MigrationDirection,
    barrier: &Barrier,
    interrupt: &AtomicBool,
) -> Result<(), ArchipelagoError> {
    barrier.wait();

    let start = Instant::now();
    let mut epochs_done = 0usize;
    loop {
        let budget_exhausted = match budget {
            EpochBudget::Count(n) => epochs_done >= n,
            EpochBudget::Duration(d) => epochs_done > 0 && start.elapsed() >= d,
        };
        if budget_exhausted {
            break;
        }

        pre_evolution_hook(island, shared, topology, direction)?;
        trace!("island {}: running epoch {}", island.index(), epochs_done);
        island.run_one_epoch();
        post_evolution_hook(island, shared, topology, distribution, direction)?;
        epochs_done += 1;

        if interrupt.load(Ordering::Relaxed) {
            info!("island {}: interrupted after {} epoch(s)", island.index(), epochs_done);
            break;
        }
    }
    debug!("island {}: completed {} epoch(s)", island.index(), epochs_done);
    Ok(())
}

/// Resolves incoming candidates from the store according to `direction`
/// and integrates them via the island's own replacement policy. Runs
/// before each epoch's algorithm step.
fn pre_evolution_hook(
    island: &mut Island,
    shared: &Mutex<SharedState>,
    topology: &Topology,
    direction: MigrationDirection,
) -> Result<(), ArchipelagoError> {
    let dst = island.index();
    match direction {
        MigrationDirection::Destination => {
            let neighbors = topology.neighbors(dst);
            if neighbors.is_empty() {
                return Ok(());
            }

            let budget = island.selection().number_to_migrate(island.population())?;
            if budget == 0 {
                warn!("island {dst}: selection policy returned a zero migration budget; no immigrants will be integrated this epoch");
            }
            let mut guard = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

            let mut pool: Vec<(usize, Individual)> = Vec::new();
            for origin in &neighbors {
                if let Some(offer) = guard.store.peek(*origin, *origin) {
                    pool.extend(offer.iter().cloned().map(|individual| (*origin, individual)));
                }
            }
            if pool.is_empty() {
                return Ok(());
            }

            pool.shuffle(&mut guard.rng);
            pool.truncate(budget);

            let mut by_origin: FnvHashMap<usize, Vec<Individual>> = FnvHashMap::default();
            for (origin, individual) in pool {
                by_origin.entry(origin).or_default().push(individual);
            }

            let offered: Vec<Individual> = by_origin.values().flat_map(|v| v.iter().cloned()).collect();
            let offered_count = offered.len();
            let integrated = island.replacement().assimilate(island.population_mut(), offered);
            debug!("island {dst}: integrated {integrated}/{offered_count} pulled immigrant(s)");

            for (origin, individuals) in by_origin {
                guard.history.push(MigrationHistoryItem::new(individuals.len(), origin, dst));
            }
            Ok(())
        }
        MigrationDirection::Source => {
            let mut guard = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let incoming = guard.store.consume(dst);
            drop(guard);

            for (_origin, batch) in incoming {
                let offered_count = batch.len();
                let integrated = island.replacement().assimilate(island.population_mut(), batch);
                debug!("island {dst}: integrated {integrated}/{offered_count} pushed immigrant(s)");
            }
            Ok(())
        }
    }
}

/// Selects emigrants and distributes them according to
/// `(distribution × direction)`. Runs after each epoch's algorithm step.
fn post_evolution_hook(
    island: &mut Island,
    shared: &Mutex<SharedState>,
    topology: &Topology,
    distribution: DistributionType,
    direction: MigrationDirection,
) -> Result<(), ArchipelagoError> {
    let src = island.index();
    match direction {
        MigrationDirection::Destination => {
            if let Some(best) = island.population().best() {
                let mut guard = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                guard.store.publish(src, src, vec![best.clone()]);
            }
            Ok(())
        }
        MigrationDirection::Source => {
            let neighbors = topology.neighbors(src);
            if neighbors.is_empty() {
                return Ok(());
            }

            let mut guard = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let emigrants = island.selection().select(island.population(), &mut guard.rng);
            if emigrants.is_empty() {
                return Ok(());
            }

            match distribution {
                DistributionType::PointToPoint => {
                    let neighbor_list: Vec<usize> = neighbors.into_iter().collect();
                    let chosen = neighbor_list[next_index(&mut guard.rng, neighbor_list.len())];
                    guard.store.publish(chosen, src, emigrants.clone());
                    guard.history.push(MigrationHistoryItem::new(emigrants.len(), src, chosen));
                }
                DistributionType::Broadcast => {
                    for destination in neighbors {
                        guard.store.publish(destination, src, emigrants.clone());
                        guard.history.push(MigrationHistoryItem::new(emigrants.len(), src, destination));
                    }
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{init_logging, AppendAllReplacement, ConstantAlgorithm, SphereProblem, TopKSelection};

    fn archipelago_of(n: usize, distribution: DistributionType, direction: MigrationDirection) -> Archipelago {
        init_logging();
        let mut topology = Topology::new();
        for _ in 0..n {
            topology.push_back();
        }
        for i in 0..n {
            topology.connect(i, (i + 1) % n).unwrap();
            topology.connect((i + 1) % n, i).unwrap();
        }
        Archipelago::with_problem(
            Arc::new(SphereProblem::new(2)),
            Box::new(ConstantAlgorithm),
            Box::new(TopKSelection::new(1)),
            Box::new(AppendAllReplacement),
            n,
            10,
            topology,
            distribution,
            direction,
        )
        .unwrap()
    }

    #[test]
    fn single_island_no_migration_history() {
        let mut archipelago = archipelago_of(1, DistributionType::PointToPoint, MigrationDirection::Destination);
        archipelago.evolve(5).unwrap();
        archipelago.join().unwrap();
        assert!(archipelago.dump_migr_history().is_empty());
    }

    #[test]
    fn zero_epochs_is_a_no_op() {
        let mut archipelago = archipelago_of(3, DistributionType::PointToPoint, MigrationDirection::Destination);
        let before = archipelago.population_of(0).unwrap();
        archipelago.evolve(0).unwrap();
        archipelago.join().unwrap();
        let after = archipelago.population_of(0).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn busy_archipelago_rejects_topology_mutation() {
        let mut archipelago = archipelago_of(3, DistributionType::Broadcast, MigrationDirection::Source);
        archipelago.evolve_t(50).unwrap();
        let err = archipelago.set_topology(Topology::new()).unwrap_err();
        assert!(matches!(err, ArchipelagoError::State(_)));
        archipelago.join().unwrap();
    }

    #[test]
    fn with_topology_rejects_a_non_empty_topology() {
        let mut topology = Topology::new();
        topology.push_back();
        let err = Archipelago::with_topology(topology, DistributionType::default(), MigrationDirection::default()).unwrap_err();
        assert!(matches!(err, ArchipelagoError::Configuration(_)));
    }

    #[test]
    fn with_topology_accepts_an_empty_topology() {
        let archipelago =
            Archipelago::with_topology(Topology::new(), DistributionType::default(), MigrationDirection::default()).unwrap();
        assert_eq!(archipelago.get_size(), 0);
        assert_eq!(archipelago.get_topology().num_vertices(), 0);
    }

    #[test]
    fn push_back_rejects_incompatible_problem() {
        let mut archipelago = Archipelago::with_problem(
            Arc::new(SphereProblem::new(5)),
            Box::new(ConstantAlgorithm),
            Box::new(TopKSelection::new(1)),
            Box::new(AppendAllReplacement),
            1,
            4,
            {
                let mut t = Topology::new();
                t.push_back();
                t
            },
            DistributionType::default(),
            MigrationDirection::default(),
        )
        .unwrap();

        let incompatible = Island::new_random(
            Arc::new(SphereProblem::new(6)),
            Box::new(ConstantAlgorithm),
            Box::new(TopKSelection::new(1)),
            Box::new(AppendAllReplacement),
            4,
        );
        let err = archipelago.push_back(incompatible).unwrap_err();
        assert!(matches!(err, ArchipelagoError::Configuration(_)));
        assert_eq!(archipelago.get_size(), 1);
    }

    #[test]
    fn unconnected_topology_has_no_migration() {
        let mut topology = Topology::new();
        for _ in 0..3 {
            topology.push_back();
        }
        let mut archipelago = Archipelago::with_problem(
            Arc::new(SphereProblem::new(2)),
            Box::new(ConstantAlgorithm),
            Box::new(TopKSelection::new(1)),
            Box::new(AppendAllReplacement),
            3,
            10,
            topology,
            DistributionType::PointToPoint,
            MigrationDirection::Destination,
        )
        .unwrap();
        archipelago.evolve(10).unwrap();
        archipelago.join().unwrap();
        assert!(archipelago.dump_migr_history().is_empty());
    }
}
