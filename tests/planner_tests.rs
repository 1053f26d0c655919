//! Grid path planner properties

use smart_intersection::sim::{GridPos, PathPlanner};

#[test]
fn path_length_matches_manhattan_distance() {
    let planner = PathPlanner::new(10, 10);
    let cases = [
        (GridPos::new(0, 0), GridPos::new(9, 9)),
        (GridPos::new(3, 7), GridPos::new(8, 1)),
        (GridPos::new(0, 5), GridPos::new(9, 5)),
        (GridPos::new(4, 4), GridPos::new(4, 0)),
        (GridPos::new(9, 0), GridPos::new(0, 9)),
    ];

    for (start, goal) in cases {
        let path = planner.find_path(start, goal);
        assert!(!path.is_empty(), "no path from {start:?} to {goal:?}");
        assert_eq!(path[0], start);
        assert_eq!(*path.last().unwrap(), goal);
        assert_eq!(
            path.len() as u32 - 1,
            start.manhattan(goal),
            "path from {start:?} to {goal:?} is not shortest"
        );
    }
}

#[test]
fn consecutive_path_cells_are_adjacent() {
    let planner = PathPlanner::new(8, 8);
    let path = planner.find_path(GridPos::new(1, 1), GridPos::new(6, 5));

    for pair in path.windows(2) {
        assert_eq!(
            pair[0].manhattan(pair[1]),
            1,
            "{:?} and {:?} are not 4-adjacent",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn start_equals_goal_yields_single_cell() {
    let planner = PathPlanner::new(5, 5);
    let cell = GridPos::new(2, 3);
    assert_eq!(planner.find_path(cell, cell), vec![cell]);
}

#[test]
fn out_of_bounds_endpoints_are_unreachable() {
    let planner = PathPlanner::new(10, 10);

    assert!(planner
        .find_path(GridPos::new(0, 0), GridPos::new(12, 3))
        .is_empty());
    assert!(planner
        .find_path(GridPos::new(-1, 0), GridPos::new(5, 5))
        .is_empty());
    assert!(planner
        .find_path(GridPos::new(0, 0), GridPos::new(0, 10))
        .is_empty());
}

#[test]
fn identical_queries_return_identical_paths() {
    let planner = PathPlanner::new(12, 12);
    let start = GridPos::new(0, 11);
    let goal = GridPos::new(11, 0);

    let first = planner.find_path(start, goal);
    let second = planner.find_path(start, goal);
    assert_eq!(first, second);
}
