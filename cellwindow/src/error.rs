/// Conditions a reconciliation pass reports to its [`crate::ViewportHost`].
///
/// None of these abort a pass. Adapter misses and budget exhaustion stop growth in one direction
/// until the next pass; the invariant variants are clamped in release builds (and trip a
/// `debug_assert!` in debug builds).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    /// The data source returned no cell for an index inside `[0, count)`.
    #[error("data source produced no cell for index {index} (item count {count})")]
    CellUnavailable { index: usize, count: usize },

    /// A window expansion skipped over an index.
    #[error("window expansion to {requested} is not adjacent to edge {edge}")]
    NonAdjacentExpansion { edge: usize, requested: usize },

    /// The window covers an index the cell cache has no entry for.
    #[error("cell cache has no entry for window index {index}")]
    MissingCell { index: usize },

    /// The per-pass materialization budget ran out before the margin was covered.
    #[error("materialization budget of {budget} cells exhausted for this pass")]
    BudgetExhausted { budget: usize },
}
