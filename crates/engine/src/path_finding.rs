use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::geometry::{Rect, Vec2};

static PATH_FINDER_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_path_finder_lock_poison_once(operation: &'static str) {
    if PATH_FINDER_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "path finder lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
}

/// Passability grid over one world area.
///
/// Cell `(x, y)` covers `origin + (x, y) * cell_size` with side `cell_size`.
/// A cell is blocked when any wall overlaps it.
#[derive(Debug, Clone, PartialEq)]
pub struct WallGrid {
    width: u32,
    height: u32,
    cell_size: f32,
    origin: Vec2,
    blocked: Vec<bool>,
}

impl WallGrid {
    pub fn from_walls(world_area: Rect, cell_size: f32, walls: &[Rect]) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        let width = (world_area.w / cell_size).ceil().max(0.0) as u32;
        let height = (world_area.h / cell_size).ceil().max(0.0) as u32;
        let origin = Vec2::new(world_area.x, world_area.y);
        let mut blocked = vec![false; width as usize * height as usize];

        for y in 0..height {
            for x in 0..width {
                let cell_rect = Rect::new(
                    origin.x + x as f32 * cell_size,
                    origin.y + y as f32 * cell_size,
                    cell_size,
                    cell_size,
                );
                if walls.iter().any(|wall| wall.intersects(&cell_rect)) {
                    blocked[y as usize * width as usize + x as usize] = true;
                }
            }
        }

        Self {
            width,
            height,
            cell_size,
            origin,
            blocked,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn blocked_cell_count(&self) -> usize {
        self.blocked.iter().filter(|blocked| **blocked).count()
    }

    pub fn index_of(&self, cell: GridCell) -> Option<usize> {
        if cell.x >= self.width || cell.y >= self.height {
            return None;
        }
        Some(cell.y as usize * self.width as usize + cell.x as usize)
    }

    /// Out-of-range cells count as blocked.
    pub fn is_blocked(&self, cell: GridCell) -> bool {
        self.index_of(cell)
            .and_then(|index| self.blocked.get(index))
            .copied()
            .unwrap_or(true)
    }

    pub fn world_to_cell(&self, world: Vec2) -> Option<GridCell> {
        let cell_x = ((world.x - self.origin.x) / self.cell_size).floor();
        let cell_y = ((world.y - self.origin.y) / self.cell_size).floor();
        if cell_x < 0.0 || cell_y < 0.0 {
            return None;
        }
        let cell = GridCell {
            x: cell_x as u32,
            y: cell_y as u32,
        };
        self.index_of(cell)?;
        Some(cell)
    }

    pub fn cell_center_world(&self, cell: GridCell) -> Vec2 {
        Vec2 {
            x: self.origin.x + (cell.x as f32 + 0.5) * self.cell_size,
            y: self.origin.y + (cell.y as f32 + 0.5) * self.cell_size,
        }
    }

    fn neighbors(&self, cell: GridCell) -> [Option<GridCell>; 4] {
        let north = (cell.y > 0).then(|| GridCell {
            x: cell.x,
            y: cell.y - 1,
        });
        let east = (cell.x + 1 < self.width).then(|| GridCell {
            x: cell.x + 1,
            y: cell.y,
        });
        let south = (cell.y + 1 < self.height).then(|| GridCell {
            x: cell.x,
            y: cell.y + 1,
        });
        let west = (cell.x > 0).then(|| GridCell {
            x: cell.x - 1,
            y: cell.y,
        });
        [north, east, south, west]
    }

    fn find_cell_path(&self, start: GridCell, goal: GridCell) -> Option<Vec<GridCell>> {
        let start_index = self.index_of(start)?;
        let goal_index = self.index_of(goal)?;
        if self.is_blocked(start) || self.is_blocked(goal) {
            return None;
        }
        if start == goal {
            return Some(vec![start]);
        }

        let node_count = self.width as usize * self.height as usize;
        let mut closed = vec![false; node_count];
        let mut best_g = vec![u32::MAX; node_count];
        let mut parent = vec![None::<usize>; node_count];
        let mut open = Vec::new();
        let mut next_insertion = 0u64;

        let start_h = manhattan_distance(start, goal);
        open.push(OpenNode {
            cell: start,
            h_cost: start_h,
            f_cost: start_h,
            insertion_order: next_insertion,
        });
        next_insertion = next_insertion.saturating_add(1);
        best_g[start_index] = 0;

        while !open.is_empty() {
            let best_index = pick_best_open_node_index(&open);
            let current = open.swap_remove(best_index);
            let Some(current_index) = self.index_of(current.cell) else {
                continue;
            };
            if closed[current_index] {
                continue;
            }
            closed[current_index] = true;

            if current.cell == goal {
                return reconstruct_cell_path(&parent, self.width, start_index, goal_index);
            }

            let current_g = best_g[current_index];
            for neighbor in self.neighbors(current.cell).into_iter().flatten() {
                let Some(neighbor_index) = self.index_of(neighbor) else {
                    continue;
                };
                if closed[neighbor_index] || self.is_blocked(neighbor) {
                    continue;
                }

                let tentative_g = current_g.saturating_add(1);
                if tentative_g >= best_g[neighbor_index] {
                    continue;
                }

                best_g[neighbor_index] = tentative_g;
                parent[neighbor_index] = Some(current_index);
                let h_cost = manhattan_distance(neighbor, goal);
                open.push(OpenNode {
                    cell: neighbor,
                    h_cost,
                    f_cost: tentative_g.saturating_add(h_cost),
                    insertion_order: next_insertion,
                });
                next_insertion = next_insertion.saturating_add(1);
            }
        }

        None
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    cell: GridCell,
    h_cost: u32,
    f_cost: u32,
    insertion_order: u64,
}

fn pick_best_open_node_index(open: &[OpenNode]) -> usize {
    let mut best_index = 0usize;
    for index in 1..open.len() {
        if open_node_order_key(open[index]) < open_node_order_key(open[best_index]) {
            best_index = index;
        }
    }
    best_index
}

fn open_node_order_key(node: OpenNode) -> (u32, u32, u32, u32, u64) {
    (
        node.f_cost,
        node.h_cost,
        node.cell.y,
        node.cell.x,
        node.insertion_order,
    )
}

fn reconstruct_cell_path(
    parent: &[Option<usize>],
    width: u32,
    start_index: usize,
    goal_index: usize,
) -> Option<Vec<GridCell>> {
    let mut cursor = goal_index;
    let mut indices = vec![cursor];

    while cursor != start_index {
        let next = parent.get(cursor).and_then(|value| *value)?;
        cursor = next;
        indices.push(cursor);
    }
    indices.reverse();
    Some(
        indices
            .into_iter()
            .map(|index| GridCell {
                x: (index as u32) % width,
                y: (index as u32) / width,
            })
            .collect(),
    )
}

fn manhattan_distance(a: GridCell, b: GridCell) -> u32 {
    a.x.abs_diff(b.x).saturating_add(a.y.abs_diff(b.y))
}

/// Computes NPC paths over the wall grid of the world currently being played.
#[derive(Debug, Default)]
pub struct PathFinder {
    grid: Option<Arc<WallGrid>>,
}

impl PathFinder {
    pub fn set_grid(&mut self, grid: Arc<WallGrid>) {
        self.grid = Some(grid);
    }

    pub fn clear(&mut self) {
        self.grid = None;
    }

    pub fn has_grid(&self) -> bool {
        self.grid.is_some()
    }

    pub fn is_bound_to(&self, grid: &Arc<WallGrid>) -> bool {
        self.grid
            .as_ref()
            .is_some_and(|bound| Arc::ptr_eq(bound, grid))
    }

    /// Waypoints are cell centers, excluding the start cell. A path whose
    /// start and goal share a cell is the goal cell's center alone.
    pub fn find_path(&self, start_world: Vec2, goal_world: Vec2) -> Option<Vec<Vec2>> {
        let Some(grid) = self.grid.as_ref() else {
            debug!("path_requested_without_grid");
            return None;
        };
        let start = grid.world_to_cell(start_world)?;
        let goal = grid.world_to_cell(goal_world)?;
        let cells = grid.find_cell_path(start, goal)?;
        if cells.len() == 1 {
            return Some(vec![grid.cell_center_world(goal)]);
        }
        Some(
            cells
                .iter()
                .skip(1)
                .map(|cell| grid.cell_center_world(*cell))
                .collect(),
        )
    }
}

/// Cloneable handle to the path finder shared by the active world's NPCs.
#[derive(Clone, Debug, Default)]
pub struct PathFinderHandle {
    inner: Arc<RwLock<PathFinder>>,
}

impl PathFinderHandle {
    fn read(&self) -> RwLockReadGuard<'_, PathFinder> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_path_finder_lock_poison_once("read");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, PathFinder> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_path_finder_lock_poison_once("write");
                poisoned.into_inner()
            }
        }
    }

    /// Drops any previously bound grid.
    pub fn reset(&self) {
        self.write().clear();
    }

    pub fn set_grid(&self, grid: Arc<WallGrid>) {
        debug!(
            width = grid.width(),
            height = grid.height(),
            blocked_cells = grid.blocked_cell_count(),
            "path_finder_grid_bound"
        );
        self.write().set_grid(grid);
    }

    pub fn has_grid(&self) -> bool {
        self.read().has_grid()
    }

    pub fn is_bound_to(&self, grid: &Arc<WallGrid>) -> bool {
        self.read().is_bound_to(grid)
    }

    pub fn find_path(&self, start_world: Vec2, goal_world: Vec2) -> Option<Vec<Vec2>> {
        self.read().find_path(start_world, goal_world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: u32, height: u32) -> WallGrid {
        WallGrid::from_walls(
            Rect::new(0.0, 0.0, width as f32, height as f32),
            1.0,
            &[],
        )
    }

    #[test]
    fn walls_block_every_overlapped_cell() {
        let grid = WallGrid::from_walls(
            Rect::new(0.0, 0.0, 64.0, 64.0),
            16.0,
            &[Rect::new(16.0, 0.0, 16.0, 40.0)],
        );
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 4);
        assert!(grid.is_blocked(GridCell { x: 1, y: 0 }));
        assert!(grid.is_blocked(GridCell { x: 1, y: 2 }));
        assert!(!grid.is_blocked(GridCell { x: 1, y: 3 }));
        assert!(!grid.is_blocked(GridCell { x: 0, y: 0 }));
        assert!(grid.is_blocked(GridCell { x: 9, y: 0 }));
        assert_eq!(grid.blocked_cell_count(), 3);
    }

    #[test]
    fn astar_path_never_steps_onto_blocked_cell() {
        let walls = [Rect::new(3.0, 0.0, 1.0, 4.0)];
        let grid = WallGrid::from_walls(Rect::new(0.0, 0.0, 7.0, 5.0), 1.0, &walls);
        let mut finder = PathFinder::default();
        finder.set_grid(Arc::new(grid.clone()));

        let start = grid.cell_center_world(GridCell { x: 1, y: 2 });
        let goal = grid.cell_center_world(GridCell { x: 5, y: 2 });
        let path = finder.find_path(start, goal).expect("reachable");
        assert!(!path.is_empty());
        assert_eq!(path.last().copied(), Some(goal));
        for waypoint in path {
            let cell = grid.world_to_cell(waypoint).expect("waypoint cell");
            assert!(!grid.is_blocked(cell), "waypoint stepped onto blocked cell");
        }
    }

    #[test]
    fn astar_tie_break_is_deterministic_on_symmetric_map() {
        let walls = [Rect::new(2.0, 2.0, 1.0, 1.0)];
        let grid = Arc::new(WallGrid::from_walls(
            Rect::new(0.0, 0.0, 5.0, 5.0),
            1.0,
            &walls,
        ));
        let mut finder = PathFinder::default();
        finder.set_grid(Arc::clone(&grid));

        let start = grid.cell_center_world(GridCell { x: 0, y: 2 });
        let goal = grid.cell_center_world(GridCell { x: 4, y: 2 });
        let first = finder.find_path(start, goal).expect("first path");
        let second = finder.find_path(start, goal).expect("second path");
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn unreachable_goal_yields_none() {
        let walls = [Rect::new(2.0, 0.0, 1.0, 3.0)];
        let grid = Arc::new(WallGrid::from_walls(
            Rect::new(0.0, 0.0, 5.0, 3.0),
            1.0,
            &walls,
        ));
        let mut finder = PathFinder::default();
        finder.set_grid(grid);
        assert_eq!(
            finder.find_path(Vec2::new(0.5, 1.5), Vec2::new(4.5, 1.5)),
            None
        );
    }

    #[test]
    fn same_cell_path_is_single_goal_waypoint() {
        let mut finder = PathFinder::default();
        finder.set_grid(Arc::new(open_grid(3, 3)));
        let path = finder
            .find_path(Vec2::new(1.1, 1.2), Vec2::new(1.8, 1.9))
            .expect("path");
        assert_eq!(path, vec![Vec2::new(1.5, 1.5)]);
    }

    #[test]
    fn finder_without_grid_returns_none() {
        let finder = PathFinder::default();
        assert!(!finder.has_grid());
        assert_eq!(finder.find_path(Vec2::ZERO, Vec2::new(1.0, 1.0)), None);
    }

    #[test]
    fn handle_clones_share_the_bound_grid() {
        let handle = PathFinderHandle::default();
        let other = handle.clone();
        let grid = Arc::new(open_grid(4, 4));
        handle.set_grid(Arc::clone(&grid));

        assert!(other.is_bound_to(&grid));
        assert!(!other.is_bound_to(&Arc::new(open_grid(4, 4))));
        assert!(other
            .find_path(Vec2::new(0.5, 0.5), Vec2::new(3.5, 3.5))
            .is_some());

        other.reset();
        assert!(!handle.has_grid());
    }
}
