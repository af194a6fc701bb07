/// Whether migrants leaving an island are sent to a single neighbor or to
/// all of them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DistributionType {
    /// Emigrants are sent to one uniformly random neighbor.
    PointToPoint,

    /// Emigrants are sent to every neighbor.
    Broadcast,
}

impl Default for DistributionType {
    fn default() -> Self {
        DistributionType::PointToPoint
    }
}

/// Whether migration is initiated by the sending island (push) or pulled
/// by the receiving island (pull).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MigrationDirection {
    /// The island that just finished an epoch pushes emigrants toward its
    /// neighbors.
    Source,

    /// Each island pulls from the offers its neighbors have published.
    Destination,
}

impl Default for MigrationDirection {
    fn default() -> Self {
        MigrationDirection::Destination
    }
}
