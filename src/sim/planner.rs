//! A* grid search
//!
//! Standalone shortest-path utility over an abstract grid; nothing in the
//! engine consumes its output. Unit edge costs, 4-directional adjacency,
//! Manhattan heuristic. Ties on `f` are broken by insertion order, so two
//! identical queries always expand nodes in the same order and return the
//! same path.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// A cell coordinate on the search grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Open-set entry ordered for a min-heap: lowest `f` first, FIFO among
/// equal scores via the monotonic insertion sequence number.
#[derive(Debug, PartialEq, Eq)]
struct OpenEntry {
    f_score: u32,
    seq: u64,
    pos: GridPos,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest-path search over a bounded grid.
///
/// Carries no state across calls beyond the grid dimensions.
pub struct PathPlanner {
    width: i32,
    height: i32,
}

impl PathPlanner {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
        }
    }

    fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn neighbors(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        const STEPS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
        STEPS
            .iter()
            .map(move |&(dx, dy)| GridPos::new(pos.x + dx, pos.y + dy))
            .filter(|next| self.in_bounds(*next))
    }

    /// Find the shortest path from `start` to `goal`, inclusive of both
    /// endpoints.
    ///
    /// Returns an empty vector when either endpoint lies outside the grid
    /// or the frontier is exhausted without reaching the goal. A query
    /// with `start == goal` yields the single-cell path.
    pub fn find_path(&self, start: GridPos, goal: GridPos) -> Vec<GridPos> {
        if !self.in_bounds(start) || !self.in_bounds(goal) {
            return Vec::new();
        }

        let mut open = BinaryHeap::new();
        let mut closed: HashSet<GridPos> = HashSet::new();
        let mut g_score: HashMap<GridPos, u32> = HashMap::new();
        let mut parent: HashMap<GridPos, GridPos> = HashMap::new();
        let mut seq: u64 = 0;

        g_score.insert(start, 0);
        open.push(OpenEntry {
            f_score: start.manhattan(goal),
            seq,
            pos: start,
        });

        while let Some(OpenEntry { pos, .. }) = open.pop() {
            if pos == goal {
                return reconstruct(&parent, start, goal);
            }
            if !closed.insert(pos) {
                // Stale duplicate of an already-expanded node.
                continue;
            }

            let Some(g) = g_score.get(&pos).copied() else {
                continue;
            };
            for next in self.neighbors(pos) {
                if closed.contains(&next) {
                    continue;
                }
                let tentative = g + 1;
                if tentative < g_score.get(&next).copied().unwrap_or(u32::MAX) {
                    g_score.insert(next, tentative);
                    parent.insert(next, pos);
                    seq += 1;
                    open.push(OpenEntry {
                        f_score: tentative + next.manhattan(goal),
                        seq,
                        pos: next,
                    });
                }
            }
        }

        Vec::new()
    }
}

fn reconstruct(parent: &HashMap<GridPos, GridPos>, start: GridPos, goal: GridPos) -> Vec<GridPos> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match parent.get(&current) {
            Some(prev) => {
                current = *prev;
                path.push(current);
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}
