use crate::cell::Cell;
use bevy_math::{uvec2, UVec2};

/// A contiguous w×h arena of search cells addressed by `offset = y·w + x`.
///
/// Coordinates handed to the cost source are translated by the origin, so the
/// grid can cover a window of a larger world map. The grid itself never calls
/// the cost source; the search driver does.
#[derive(Debug)]
pub(crate) struct Grid {
    width: u32,
    height: u32,
    origin: Option<UVec2>,
    initialised: bool,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of fresh cells. Panics if a dimension is zero or the
    /// cell count does not fit the offset type.
    pub(crate) fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be >= 1");
        assert!(
            width as u64 * height as u64 <= u32::MAX as u64,
            "grid cell count overflows offsets"
        );
        Self {
            width,
            height,
            origin: None,
            initialised: false,
            cells: vec![Cell::fresh(); (width * height) as usize],
        }
    }

    #[inline]
    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub(crate) fn len(&self) -> u32 {
        self.cells.len() as u32
    }

    #[inline]
    pub(crate) fn origin(&self) -> Option<UVec2> {
        self.origin
    }

    pub(crate) fn set_origin(&mut self, origin: UVec2) {
        self.origin = Some(origin);
    }

    /// True once an eager fill has stored terrain for every cell.
    #[inline]
    pub(crate) fn is_initialised(&self) -> bool {
        self.initialised
    }

    #[inline]
    pub(crate) fn contains(&self, point: UVec2) -> bool {
        point.x < self.width && point.y < self.height
    }

    #[inline]
    pub(crate) fn offset(&self, point: UVec2) -> u32 {
        point.y * self.width + point.x
    }

    #[inline]
    pub(crate) fn coords(&self, offset: u32) -> UVec2 {
        uvec2(offset % self.width, offset / self.width)
    }

    #[inline]
    pub(crate) fn cell(&self, offset: u32) -> &Cell {
        &self.cells[offset as usize]
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, offset: u32) -> &mut Cell {
        &mut self.cells[offset as usize]
    }

    /// Eagerly store terrain for every cell, consulting the cost source once
    /// per cell in the world frame. Returns the number of fetches.
    pub(crate) fn fill(&mut self, origin: UVec2, get: &mut dyn FnMut(u32, u32) -> u8) -> u32 {
        self.origin = Some(origin);
        for y in 0..self.height {
            for x in 0..self.width {
                let terrain = get(origin.x + x, origin.y + y);
                let offset = y * self.width + x;
                self.cells[offset as usize].terrain = Some(terrain);
            }
        }
        self.initialised = true;
        self.len()
    }

    /// Return every cell to the fresh state. Eagerly fetched terrain
    /// survives; lazily fetched terrain is forgotten so the next run
    /// re-queries the map.
    pub(crate) fn wipe(&mut self) {
        let keep_terrain = self.initialised;
        for cell in &mut self.cells {
            cell.wipe(keep_terrain);
        }
    }
}
