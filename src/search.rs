#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::cell::{CellState, COST_BLOCKED};
use crate::grid::Grid;
use crate::heap::OpenHeap;
use crate::{Direction, Route};
use bevy_math::{uvec2, IVec2, UVec2};
use std::time::Instant;
use tracing::{debug, trace};

/// Default cost of a cardinal move, before terrain is added.
pub const DEFAULT_CARDINAL_COST: u32 = 10;

/// Default cost of a diagonal move, before terrain is added.
pub const DEFAULT_DIAGONAL_COST: u32 = 14;

/// Default heuristic scale. Slightly below the cardinal move cost, which
/// makes the search mildly greedy and the resulting routes straighter.
pub const DEFAULT_HEURISTIC_FACTOR: u32 = 9;

/// Main-loop iterations between wall-clock polls when a timeout is set.
const TIMEOUT_POLL_INTERVAL: u32 = 16;

/// A cost source: world coordinates in, terrain cost out.
/// [COST_BLOCKED] marks an impassable square.
pub type CostFn = Box<dyn FnMut(u32, u32) -> u8>;

/// A heuristic: estimated distance between two grid-local points, before
/// the heuristic factor is applied.
pub type HeuristicFn = Box<dyn Fn(UVec2, UVec2) -> u32>;

/// Manhattan distance between two grid points. The default heuristic.
#[inline]
#[must_use]
pub fn manhattan_heuristic(a: UVec2, b: UVec2) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// Which neighbours the search expands.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Movement {
    /// N, E, S and W only.
    #[default]
    Cardinal,
    /// All eight directions.
    EightWay,
}

/// Outcome of a search, kept on the context until the next run.
///
/// The discriminants are stable and safe to persist.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SearchStatus {
    /// A full route to the goal was found.
    Found = 0,
    /// No search has run on this context yet.
    Nothing = 1,
    /// The goal is unreachable; a compromise route may exist.
    NotFound = 2,
    /// Start and goal are the same square.
    Trivial = 3,
    /// The time budget ran out; a compromise route may exist.
    Timeout = 4,
    /// Neither an eager grid fill nor a cost source is available.
    GridNotInitialised = 5,
    /// A lazily filled grid needs an origin before it can run.
    OriginNotSet = 6,
    /// The start square is impassable.
    Embedded = 7,
}

impl SearchStatus {
    /// Returns the stable wire code for this status.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    #[must_use]
    pub const fn from_code(code: u8) -> Option<SearchStatus> {
        match code {
            0 => Some(SearchStatus::Found),
            1 => Some(SearchStatus::Nothing),
            2 => Some(SearchStatus::NotFound),
            3 => Some(SearchStatus::Trivial),
            4 => Some(SearchStatus::Timeout),
            5 => Some(SearchStatus::GridNotInitialised),
            6 => Some(SearchStatus::OriginNotSet),
            7 => Some(SearchStatus::Embedded),
            _ => None,
        }
    }

    /// A short human-readable rendering of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SearchStatus::Found => "route found",
            SearchStatus::Nothing => "no search has run",
            SearchStatus::NotFound => "no route found",
            SearchStatus::Trivial => "start is the goal",
            SearchStatus::Timeout => "search timed out",
            SearchStatus::GridNotInitialised => "grid not initialised",
            SearchStatus::OriginNotSet => "origin not set",
            SearchStatus::Embedded => "start is embedded in a wall",
        }
    }
}

/// Counters describing the most recent run.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Moves in the materialized route.
    pub steps: u32,
    /// Accumulated cost of the route end.
    pub score: u32,
    /// Wall-clock duration of the run, in microseconds.
    pub usecs: u64,
    /// Main-loop iterations.
    pub loops: u32,
    /// Cost-source invocations.
    pub gets: u32,
    /// Open cells relaxed to a cheaper score.
    pub updates: u32,
    /// Cells still open when the search stopped.
    pub open: u32,
    /// Cells settled by the search.
    pub closed: u32,
}

/// An A* search context over a rectangular, cost-weighted grid.
///
/// The context owns the w×h cell arena and the open-set heap, and reuses
/// both across runs; the grid is returned to a fresh state at the start of
/// every run. Terrain comes from a caller-supplied cost source, consulted
/// either for the whole grid up front ([AStar::init_grid]) or lazily as the
/// search touches cells, in which case the grid origin must be set so cells
/// can be translated to world coordinates.
///
/// A context is a single-threaded mutable state machine. Distinct contexts
/// are fully independent.
pub struct AStar {
    grid: Grid,
    heap: OpenHeap,
    get: Option<CostFn>,
    heuristic: Option<HeuristicFn>,
    dx: [i32; 8],
    dy: [i32; 8],
    move_cost: [u32; 8],
    steering_penalty: u32,
    heuristic_factor: u32,
    max_cost: u32,
    timeout_us: u64,
    movement: Movement,
    result: SearchStatus,
    stats: SearchStats,
    start: UVec2,
    goal: UVec2,
    have_route: bool,
    best: Option<UVec2>,
}

impl AStar {
    /// Create a search context for a `width` × `height` grid.
    ///
    /// Panics if a dimension is zero or `width · height` overflows the cell
    /// offset type; both are programmer errors.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut dx = [0i32; 8];
        let mut dy = [0i32; 8];
        let mut move_cost = [0u32; 8];
        for dir in Direction::ALL {
            let d = dir.code() as usize;
            let unit = dir.unit();
            dx[d] = unit.x;
            dy[d] = unit.y;
            move_cost[d] = if dir.is_diagonal() {
                DEFAULT_DIAGONAL_COST
            } else {
                DEFAULT_CARDINAL_COST
            };
        }

        let grid = Grid::new(width, height);
        let heap = OpenHeap::new(grid.len());
        Self {
            grid,
            heap,
            get: None,
            heuristic: None,
            dx,
            dy,
            move_cost,
            steering_penalty: 0,
            heuristic_factor: DEFAULT_HEURISTIC_FACTOR,
            max_cost: 0,
            timeout_us: 0,
            movement: Movement::default(),
            result: SearchStatus::Nothing,
            stats: SearchStats::default(),
            start: UVec2::ZERO,
            goal: UVec2::ZERO,
            have_route: false,
            best: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Install the cost source used for lazy terrain fetches.
    ///
    /// Terrain stored by a previous [AStar::init_grid] stays in effect until
    /// `init_grid` is called again.
    pub fn set_cost_fn(&mut self, get: impl FnMut(u32, u32) -> u8 + 'static) {
        self.get = Some(Box::new(get));
    }

    /// Install a custom heuristic, replacing [manhattan_heuristic].
    ///
    /// For the search to settle each cell once and still return optimal
    /// routes, the heuristic must be consistent; this is not checked.
    pub fn set_heuristic(&mut self, heuristic: impl Fn(UVec2, UVec2) -> u32 + 'static) {
        self.heuristic = Some(Box::new(heuristic));
    }

    /// Eagerly fetch terrain for the whole grid from the given cost source,
    /// which is invoked once per cell in the world frame and then installed
    /// for subsequent runs. Also sets the origin.
    pub fn init_grid(&mut self, origin: UVec2, mut get: impl FnMut(u32, u32) -> u8 + 'static) {
        self.stats.gets = self.grid.fill(origin, &mut get);
        self.get = Some(Box::new(get));
    }

    /// Set the world coordinates of the grid's (0,0) cell. Required before
    /// a run on a lazily filled grid.
    pub fn set_origin(&mut self, origin: UVec2) {
        self.grid.set_origin(origin);
    }

    /// Stop expanding any route that accumulates more than this cost.
    /// Zero disables the cap.
    pub fn set_max_cost(&mut self, max_cost: u32) {
        self.max_cost = max_cost;
    }

    /// Bound a run to this many microseconds of wall-clock time.
    /// Zero disables the budget.
    pub fn set_timeout_us(&mut self, timeout_us: u64) {
        self.timeout_us = timeout_us;
    }

    /// Override the step deltas for one direction.
    pub fn set_dxy(&mut self, dir: Direction, delta: IVec2) {
        let d = dir.code() as usize;
        self.dx[d] = delta.x;
        self.dy[d] = delta.y;
    }

    /// Override the base move cost for one direction.
    pub fn set_move_cost(&mut self, dir: Direction, cost: u32) {
        self.move_cost[dir.code() as usize] = cost;
    }

    /// Extra cost charged whenever a move changes direction. Produces
    /// straighter routes.
    pub fn set_steering_penalty(&mut self, penalty: u32) {
        self.steering_penalty = penalty;
    }

    /// Scale applied to the heuristic distance.
    pub fn set_heuristic_factor(&mut self, factor: u32) {
        self.heuristic_factor = factor;
    }

    /// Select cardinal-only or eight-way expansion.
    pub fn set_movement(&mut self, movement: Movement) {
        self.movement = movement;
    }

    /// The delta-x applied by a step in the given direction.
    #[inline]
    #[must_use]
    pub fn dx(&self, dir: Direction) -> i32 {
        self.dx[dir.code() as usize]
    }

    /// The delta-y applied by a step in the given direction.
    #[inline]
    #[must_use]
    pub fn dy(&self, dir: Direction) -> i32 {
        self.dy[dir.code() as usize]
    }

    /// The status of the most recent run, or [SearchStatus::Nothing].
    #[inline]
    #[must_use]
    pub fn result(&self) -> SearchStatus {
        self.result
    }

    /// The status of the most recent run as a human-readable string.
    #[inline]
    #[must_use]
    pub fn result_str(&self) -> &'static str {
        self.result.as_str()
    }

    /// True when the most recent run produced a route, full or partial.
    /// Only a [SearchStatus::Found] result makes it a full route.
    #[inline]
    #[must_use]
    pub fn have_route(&self) -> bool {
        self.have_route
    }

    /// The nearest compromise cell settled by the most recent run, when the
    /// goal itself was not reached.
    #[inline]
    #[must_use]
    pub fn best(&self) -> Option<UVec2> {
        self.best
    }

    /// Counters for the most recent run.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Run the search from `start` to `goal`, both in grid-local
    /// coordinates.
    ///
    /// The grid and heap are returned to a fresh state first, so a context
    /// can be run any number of times; lazily fetched terrain is re-queried
    /// on each run. The search stops as soon as the goal is settled, the
    /// open set drains, the accumulated cost cap cuts off every remaining
    /// route, or the wall-clock budget runs out. On every exit except
    /// [SearchStatus::Found] and [SearchStatus::Trivial], the cell that came
    /// heuristically closest to the goal is recorded as a compromise and
    /// [AStar::route] materializes the partial route to it.
    ///
    /// Out-of-range coordinates are a programmer error: debug builds
    /// assert, release builds return [SearchStatus::NotFound] without
    /// touching the grid.
    pub fn run(&mut self, start: UVec2, goal: UVec2) -> SearchStatus {
        self.stats = SearchStats::default();
        self.result = SearchStatus::Nothing;
        self.have_route = false;
        self.best = None;
        self.start = start;
        self.goal = goal;

        if !self.grid.contains(start) || !self.grid.contains(goal) {
            debug_assert!(
                false,
                "run from {start:?} to {goal:?} is outside the {}x{} grid",
                self.grid.width(),
                self.grid.height()
            );
            return self.conclude(SearchStatus::NotFound);
        }
        if self.get.is_none() && !self.grid.is_initialised() {
            return self.conclude(SearchStatus::GridNotInitialised);
        }
        if !self.grid.is_initialised() && self.grid.origin().is_none() {
            return self.conclude(SearchStatus::OriginNotSet);
        }
        if start == goal {
            self.have_route = true;
            return self.conclude(SearchStatus::Trivial);
        }

        trace!(?start, ?goal, "search started");
        let t0 = Instant::now();
        self.grid.wipe();
        self.heap.clear();

        let ofs0 = self.grid.offset(start);
        let ofs1 = self.grid.offset(goal);

        if self.fetch_terrain(ofs0) == COST_BLOCKED {
            self.stats.usecs = t0.elapsed().as_micros() as u64;
            return self.conclude(SearchStatus::Embedded);
        }

        let h0 = self.estimate(start, goal);
        {
            let cell = self.grid.cell_mut(ofs0);
            cell.g = 0;
            cell.h = h0;
            cell.f = h0;
            cell.state = CellState::Open;
        }
        self.heap.push(ofs0, h0);
        self.stats.open = 1;

        let mut bestscore = h0;
        let mut bestofs = ofs0;

        let status = loop {
            if self.heap.is_empty() {
                break SearchStatus::NotFound;
            }
            if self.timeout_us > 0 && self.stats.loops % TIMEOUT_POLL_INTERVAL == 0 {
                let elapsed = t0.elapsed().as_micros() as u64;
                if elapsed > self.timeout_us {
                    trace!(elapsed_us = elapsed, "time budget exhausted");
                    break SearchStatus::Timeout;
                }
            }
            self.stats.loops += 1;

            let Some((ofs, _)) = self.heap.pop() else {
                break SearchStatus::NotFound;
            };
            self.grid.cell_mut(ofs).state = CellState::Closed;
            self.stats.open -= 1;
            self.stats.closed += 1;

            if ofs == ofs1 {
                self.have_route = true;
                break SearchStatus::Found;
            }

            let pos = self.grid.coords(ofs);
            let (g, entered_by) = {
                let cell = self.grid.cell(ofs);
                (cell.g, cell.parent_dir)
            };

            let dirs: &[Direction] = match self.movement {
                Movement::Cardinal => &Direction::CARDINAL,
                Movement::EightWay => &Direction::ALL,
            };
            for &dir in dirs {
                let d = dir.code() as usize;
                let nx = pos.x as i64 + self.dx[d] as i64;
                let ny = pos.y as i64 + self.dy[d] as i64;
                if nx < 0
                    || ny < 0
                    || nx >= self.grid.width() as i64
                    || ny >= self.grid.height() as i64
                {
                    continue;
                }
                let npos = uvec2(nx as u32, ny as u32);
                let nofs = self.grid.offset(npos);

                let terrain = self.fetch_terrain(nofs);
                if terrain == COST_BLOCKED {
                    continue;
                }

                let mut step = self.move_cost[d] + terrain as u32;
                if entered_by.is_some() && entered_by != Some(dir) {
                    step += self.steering_penalty;
                }
                let ng = g.saturating_add(step);
                if self.max_cost > 0 && ng > self.max_cost {
                    continue;
                }

                let (state, old_g, old_h) = {
                    let cell = self.grid.cell(nofs);
                    (cell.state, cell.g, cell.h)
                };
                match state {
                    CellState::Fresh => {
                        let nh = self.estimate(npos, goal);
                        let cell = self.grid.cell_mut(nofs);
                        cell.g = ng;
                        cell.h = nh;
                        cell.f = ng.saturating_add(nh);
                        cell.parent_dir = Some(dir);
                        cell.state = CellState::Open;
                        let key = cell.f;
                        self.heap.push(nofs, key);
                        self.stats.open += 1;
                        if nh < bestscore {
                            bestscore = nh;
                            bestofs = nofs;
                        }
                    }
                    CellState::Open if ng < old_g => {
                        let cell = self.grid.cell_mut(nofs);
                        cell.g = ng;
                        cell.f = ng.saturating_add(old_h);
                        cell.parent_dir = Some(dir);
                        let key = cell.f;
                        self.heap.update(nofs, key);
                        self.stats.updates += 1;
                    }
                    // Closed cells are final; correct for consistent
                    // heuristics.
                    _ => {}
                }
            }
        };

        if status != SearchStatus::Found && bestofs != ofs0 {
            self.best = Some(self.grid.coords(bestofs));
            self.have_route = true;
        }

        let end = match status {
            SearchStatus::Found => Some(ofs1),
            _ => self.best.map(|best| self.grid.offset(best)),
        };
        if let Some(end) = end {
            self.stats.score = self.grid.cell(end).g;
            self.stats.steps = self.count_steps(end);
        }
        self.stats.usecs = t0.elapsed().as_micros() as u64;
        self.conclude(status)
    }

    /// Materialize the route of the most recent run: the full route for
    /// [SearchStatus::Found], the partial route to the compromise cell
    /// otherwise, or `None` when there is no route at all.
    #[must_use]
    pub fn route(&self) -> Option<Route> {
        if !self.have_route {
            return None;
        }
        let end = match self.result {
            SearchStatus::Found => self.goal,
            SearchStatus::Trivial => return Some(Route::new(Vec::new())),
            _ => self.best?,
        };

        let mut steps = Vec::with_capacity(self.stats.steps as usize);
        let mut pos = end;
        while pos != self.start {
            let Some(dir) = self.grid.cell(self.grid.offset(pos)).parent_dir else {
                break;
            };
            steps.push(dir);
            pos = self.step_back(pos, dir);
        }
        steps.reverse();
        Some(Route::new(steps))
    }

    fn conclude(&mut self, status: SearchStatus) -> SearchStatus {
        self.result = status;
        debug!(
            status = status.as_str(),
            steps = self.stats.steps,
            score = self.stats.score,
            loops = self.stats.loops,
            usecs = self.stats.usecs,
            "search concluded"
        );
        status
    }

    /// Terrain for a cell, consulting the cost source in the world frame on
    /// first touch.
    fn fetch_terrain(&mut self, offset: u32) -> u8 {
        if let Some(terrain) = self.grid.cell(offset).terrain {
            return terrain;
        }
        let local = self.grid.coords(offset);
        let origin = self.grid.origin().unwrap_or(UVec2::ZERO);
        let terrain = match self.get.as_mut() {
            Some(get) => get(origin.x + local.x, origin.y + local.y),
            None => COST_BLOCKED,
        };
        self.stats.gets += 1;
        self.grid.cell_mut(offset).terrain = Some(terrain);
        terrain
    }

    fn estimate(&self, from: UVec2, goal: UVec2) -> u32 {
        let distance = match &self.heuristic {
            Some(heuristic) => heuristic(from, goal),
            None => manhattan_heuristic(from, goal),
        };
        distance.saturating_mul(self.heuristic_factor)
    }

    /// Undo one step: parent links record the direction a cell was entered
    /// by, so the parent lies one step against the configured deltas. This
    /// stays correct even when the direction table has been overridden
    /// asymmetrically.
    #[inline]
    fn step_back(&self, pos: UVec2, dir: Direction) -> UVec2 {
        let d = dir.code() as usize;
        uvec2(
            (pos.x as i64 - self.dx[d] as i64) as u32,
            (pos.y as i64 - self.dy[d] as i64) as u32,
        )
    }

    fn count_steps(&self, end: u32) -> u32 {
        let mut steps = 0;
        let mut pos = self.grid.coords(end);
        while let Some(dir) = self.grid.cell(self.grid.offset(pos)).parent_dir {
            pos = self.step_back(pos, dir);
            steps += 1;
        }
        steps
    }
}
