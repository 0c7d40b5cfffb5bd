//! Merging locally predicted battle state with the server's full snapshot.
//!
//! The server is authoritative, with one exception: a cell the client has
//! already resolved is never taken back to an unresolved state, because a
//! snapshot that still shows it unresolved was taken before our shot landed.

use core::fmt;

use crate::battle::{BattleBoard, BattleCell, BattleGrid};

/// Merge one cell: the server value, unless it would downgrade a terminal
/// local value.
pub fn merge_cell(local: BattleCell, server: BattleCell) -> BattleCell {
    if local.is_terminal() && !server.is_terminal() {
        local
    } else {
        server
    }
}

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Cells overwritten with the server value.
    pub corrected: usize,
    /// Cells where the server was behind and the local value was kept.
    pub stale_ignored: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.corrected == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    DimensionMismatch {
        local: (usize, usize),
        server: (usize, usize),
    },
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::DimensionMismatch { local, server } => write!(
                f,
                "server grid is {}x{}, local grid is {}x{}",
                server.0, server.1, local.0, local.1
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReconcileError {}

/// Pure merge of two same-shaped grids.
pub fn merge(local: &BattleGrid, server: &BattleGrid) -> Result<BattleGrid, ReconcileError> {
    check_dimensions(local, server)?;
    let mut merged = local.clone();
    for ((row, col), &server_cell) in server.iter() {
        if let Some(cell) = merged.get_mut(row, col) {
            *cell = merge_cell(*cell, server_cell);
        }
    }
    Ok(merged)
}

/// Apply a server snapshot to the local board in place.
pub fn reconcile(local: &mut BattleBoard, server: &BattleGrid) -> Result<ReconcileReport, ReconcileError> {
    check_dimensions(local.grid(), server)?;
    let mut report = ReconcileReport::default();
    for ((row, col), &server_cell) in server.iter() {
        let Some(current) = local.get(row, col) else {
            continue;
        };
        if current == server_cell {
            continue;
        }
        if merge_cell(current, server_cell) == current {
            report.stale_ignored += 1;
        } else {
            let _ = local.resolve(row, col, server_cell);
            report.corrected += 1;
        }
    }
    Ok(report)
}

fn check_dimensions(local: &BattleGrid, server: &BattleGrid) -> Result<(), ReconcileError> {
    if local.dimensions() != server.dimensions() {
        return Err(ReconcileError::DimensionMismatch {
            local: local.dimensions(),
            server: server.dimensions(),
        });
    }
    Ok(())
}
