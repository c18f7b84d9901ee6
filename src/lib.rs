//! GridAstar
//! =========
//!
//! An `AStar` context computes least-cost routes across a rectangular grid of
//! cost-weighted cells using the A* algorithm, subject to an optional accumulated
//! cost cap and an optional wall-clock budget.
//! Terrain is supplied by a caller closure, either eagerly for the whole grid or
//! lazily as cells are touched, and the result of a search is a `Route` of
//! discrete `Direction` steps. When the goal is unreachable or the budget runs
//! out, the search still reports the nearest compromise cell it settled.

mod cell;
mod direction;
mod grid;
mod heap;
mod route;
mod search;

pub use self::{cell::COST_BLOCKED, direction::*, route::*, search::*};
