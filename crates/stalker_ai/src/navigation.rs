//! Grid pathfinding for pursuit and detours

use serde::{Deserialize, Serialize};
use stalker_world::{Grid, GridPos};
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Find a path between two cells using A*
///
/// Four-directional, unit step cost, Manhattan heuristic. Only cells the
/// stalker can stand on are expanded, so crouch-only passages are never
/// part of a path. The returned cells exclude `start` and end at `goal`;
/// `start == goal` yields an empty path.
///
/// Returns `None` when the goal is not walkable, when no path exists, or
/// when more than `max_nodes` cells would be expanded.
pub fn find_path(grid: &Grid, start: GridPos, goal: GridPos, max_nodes: usize) -> Option<Vec<GridPos>> {
    if !grid.is_walkable_for_stalker(goal) {
        return None;
    }
    if start == goal {
        return Some(Vec::new());
    }

    #[derive(Clone, Copy)]
    struct Node {
        pos: GridPos,
        f_score: i32,
        h_score: i32,
    }

    impl PartialEq for Node {
        fn eq(&self, other: &Self) -> bool {
            self.cmp(other) == std::cmp::Ordering::Equal
        }
    }

    impl Eq for Node {}

    impl PartialOrd for Node {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for Node {
        // Min-heap on f, then h, then position for a stable expansion order
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            other
                .f_score
                .cmp(&self.f_score)
                .then_with(|| other.h_score.cmp(&self.h_score))
                .then_with(|| other.pos.cmp(&self.pos))
        }
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut g_score: HashMap<GridPos, i32> = HashMap::new();
    let mut closed_set: HashSet<GridPos> = HashSet::new();

    g_score.insert(start, 0);
    let h = start.manhattan(goal);
    open_set.push(Node {
        pos: start,
        f_score: h,
        h_score: h,
    });

    while let Some(current) = open_set.pop() {
        if current.pos == goal {
            let mut path = vec![goal];
            let mut cursor = goal;
            while let Some(&prev) = came_from.get(&cursor) {
                if prev == start {
                    break;
                }
                path.push(prev);
                cursor = prev;
            }
            path.reverse();
            log::trace!("Path {:?} -> {:?}: {} steps, {} expanded", start, goal, path.len(), closed_set.len());
            return Some(path);
        }

        if !closed_set.insert(current.pos) {
            continue;
        }
        if closed_set.len() > max_nodes {
            log::trace!("Path {:?} -> {:?} abandoned after {} nodes", start, goal, max_nodes);
            return None;
        }

        let current_g = g_score.get(&current.pos).copied().unwrap_or(i32::MAX);

        for neighbor in current.pos.neighbors4() {
            if closed_set.contains(&neighbor) || !grid.is_walkable_for_stalker(neighbor) {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = g_score.get(&neighbor).copied().unwrap_or(i32::MAX);
            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.pos);
                g_score.insert(neighbor, tentative_g);

                let h = neighbor.manhattan(goal);
                open_set.push(Node {
                    pos: neighbor,
                    f_score: tentative_g + h,
                    h_score: h,
                });
            }
        }
    }

    None
}

/// Pursuit path with its own recalculation timer
///
/// The path is recomputed on a fixed interval rather than every tick, so
/// the cells it holds may be slightly stale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChasePath {
    /// Cells still to visit, start excluded
    waypoints: Vec<GridPos>,
    /// Index of the current waypoint
    index: usize,
    /// Goal of the last plan
    goal: Option<GridPos>,
    /// Time until the next recalculation
    recalc_timer: f32,
}

impl ChasePath {
    /// Create an empty path that recalculates on first use
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the path and force a recalculation next time
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.index = 0;
        self.goal = None;
        self.recalc_timer = 0.0;
    }

    /// Count down the recalculation timer, returns true when it is due
    pub fn tick(&mut self, delta_time: f32) -> bool {
        self.recalc_timer = (self.recalc_timer - delta_time).max(0.0);
        self.recalc_timer <= 0.0
    }

    /// Recompute the path and restart the timer
    ///
    /// Returns false when no path was found; the path is then empty and
    /// the caller should steer directly at the goal.
    pub fn replan(&mut self, grid: &Grid, start: GridPos, goal: GridPos, max_nodes: usize, interval: f32) -> bool {
        self.recalc_timer = interval;
        self.index = 0;
        self.goal = Some(goal);
        match find_path(grid, start, goal, max_nodes) {
            Some(path) => {
                self.waypoints = path;
                true
            }
            None => {
                self.waypoints.clear();
                false
            }
        }
    }

    /// Current waypoint, if any remain
    pub fn current(&self) -> Option<GridPos> {
        self.waypoints.get(self.index).copied()
    }

    /// Move on to the next waypoint
    pub fn advance(&mut self) {
        if self.index < self.waypoints.len() {
            self.index += 1;
        }
    }

    /// Whether every waypoint has been reached
    pub fn is_complete(&self) -> bool {
        self.index >= self.waypoints.len()
    }

    /// Goal the current path was planned for
    pub fn goal(&self) -> Option<GridPos> {
        self.goal
    }

    /// All waypoints of the current path
    pub fn waypoints(&self) -> &[GridPos] {
        &self.waypoints
    }

    /// Index of the current waypoint
    pub fn index(&self) -> usize {
        self.index
    }

    /// Time until the next recalculation
    pub fn recalc_timer(&self) -> f32 {
        self.recalc_timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stalker_world::Cell;

    fn grid_from(text: &str) -> Grid {
        Grid::parse(text).unwrap()
    }

    fn assert_connected(start: GridPos, path: &[GridPos]) {
        let mut previous = start;
        for &step in path {
            assert_eq!(previous.manhattan(step), 1, "{:?} -> {:?} is not a single step", previous, step);
            previous = step;
        }
    }

    #[test]
    fn test_open_grid_path_is_manhattan() {
        let grid = Grid::filled(20, 20, Cell::Open);

        for (start, goal) in [
            (GridPos::new(0, 0), GridPos::new(19, 19)),
            (GridPos::new(3, 15), GridPos::new(12, 2)),
            (GridPos::new(5, 5), GridPos::new(5, 9)),
        ] {
            let path = find_path(&grid, start, goal, 2500).unwrap();
            assert_eq!(path.len() as i32, start.manhattan(goal));
            assert_eq!(path.last(), Some(&goal));
            assert!(!path.contains(&start));
            assert_connected(start, &path);
        }
    }

    #[test]
    fn test_same_cell_is_empty_path() {
        let grid = Grid::filled(5, 5, Cell::Open);
        let path = find_path(&grid, GridPos::new(2, 2), GridPos::new(2, 2), 10).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_crouch_only_goal_is_unreachable() {
        let grid = grid_from(
            "\
.....
..,..
.....",
        );
        assert!(find_path(&grid, GridPos::new(0, 0), GridPos::new(2, 1), 2500).is_none());
    }

    #[test]
    fn test_blocked_or_outside_goal() {
        let grid = grid_from(
            "\
...
.#.
...",
        );
        assert!(find_path(&grid, GridPos::new(0, 0), GridPos::new(1, 1), 2500).is_none());
        assert!(find_path(&grid, GridPos::new(0, 0), GridPos::new(7, -1), 2500).is_none());
    }

    #[test]
    fn test_routes_around_walls_and_vents() {
        // Direct route runs through a crouch-only vent; the stalker must go around
        let grid = grid_from(
            "\
.......
.#,###.
.#...#.
.#####.
.......",
        );
        let start = GridPos::new(2, 2);
        let goal = GridPos::new(2, 0);

        // The vent at (2, 1) is the only short way out of the room
        assert!(find_path(&grid, start, goal, 2500).is_none());

        let outside = GridPos::new(0, 4);
        let path = find_path(&grid, GridPos::new(0, 0), outside, 2500).unwrap();
        assert_eq!(path.len(), 4);
        assert!(path.iter().all(|&p| grid.is_walkable_for_stalker(p)));
    }

    #[test]
    fn test_detour_length() {
        let grid = grid_from(
            "\
.....
####.
.....",
        );
        let path = find_path(&grid, GridPos::new(0, 0), GridPos::new(0, 2), 2500).unwrap();
        // Across the top, down the open column, back along the bottom
        assert_eq!(path.len(), 10);
        assert_connected(GridPos::new(0, 0), &path);
    }

    #[test]
    fn test_node_cap_gives_up() {
        let grid = Grid::filled(60, 60, Cell::Open);
        let start = GridPos::new(0, 0);
        let goal = GridPos::new(59, 59);

        assert!(find_path(&grid, start, goal, 2500).is_some());
        assert!(find_path(&grid, start, goal, 10).is_none());
    }

    #[test]
    fn test_chase_path_follow() {
        let grid = Grid::filled(10, 10, Cell::Open);
        let mut path = ChasePath::new();

        assert!(path.tick(0.1));
        assert!(path.replan(&grid, GridPos::new(0, 0), GridPos::new(0, 3), 2500, 0.5));
        assert_eq!(path.current(), Some(GridPos::new(0, 1)));
        assert_eq!(path.goal(), Some(GridPos::new(0, 3)));
        assert!(!path.tick(0.25));

        path.advance();
        path.advance();
        assert_eq!(path.current(), Some(GridPos::new(0, 3)));
        path.advance();
        assert!(path.is_complete());
        assert_eq!(path.current(), None);

        assert!(path.tick(0.25));
    }

    #[test]
    fn test_chase_path_failed_replan_is_empty() {
        let grid = grid_from(
            "\
..#..
..#..",
        );
        let mut path = ChasePath::new();
        assert!(path.replan(&grid, GridPos::new(0, 0), GridPos::new(1, 1), 2500, 0.5));
        assert!(!path.replan(&grid, GridPos::new(0, 0), GridPos::new(4, 1), 2500, 0.5));
        assert!(path.waypoints().is_empty());
        assert!(path.is_complete());
        assert_eq!(path.recalc_timer(), 0.5);

        path.clear();
        assert_eq!(path.recalc_timer(), 0.0);
        assert_eq!(path.goal(), None);
    }
}
