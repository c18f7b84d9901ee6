use crate::Direction;

/// Terrain value that marks an impassable cell.
pub const COST_BLOCKED: u8 = 255;

/// Frontier membership of a cell during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CellState {
    #[default]
    Fresh,
    Open,
    Closed,
}

/// Per-cell working record for one search.
///
/// `terrain` is `None` until the cost source has been consulted for the cell,
/// which may never happen on a lazily filled grid.
#[derive(Debug, Clone)]
pub(crate) struct Cell {
    pub(crate) terrain: Option<u8>,
    pub(crate) g: u32,
    pub(crate) h: u32,
    pub(crate) f: u32,
    pub(crate) parent_dir: Option<Direction>,
    pub(crate) state: CellState,
}

impl Cell {
    pub(crate) const fn fresh() -> Self {
        Self {
            terrain: None,
            g: u32::MAX,
            h: 0,
            f: 0,
            parent_dir: None,
            state: CellState::Fresh,
        }
    }

    /// Return the cell to its pre-search state, optionally keeping terrain
    /// fetched by an eager grid fill.
    pub(crate) fn wipe(&mut self, keep_terrain: bool) {
        if !keep_terrain {
            self.terrain = None;
        }
        self.g = u32::MAX;
        self.h = 0;
        self.f = 0;
        self.parent_dir = None;
        self.state = CellState::Fresh;
    }
}
