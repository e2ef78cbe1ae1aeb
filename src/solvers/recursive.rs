use super::{Method, SolveOptions};
use crate::maze::{Coord, Maze};

/// Depth-first search with the program call stack as the traversal stack.
/// Returns the start-to-goal route, or an empty vec when none exists or the
/// walk was cancelled. Recursion depth is bounded by the cell count.
pub(super) fn solve(maze: &mut Maze, start: Coord, goal: Coord, opts: &SolveOptions) -> Vec<Coord> {
    let mut path = Vec::new();
    if !walk(maze, start, goal, &mut path, opts) {
        path.clear();
    }
    path
}

fn walk(
    maze: &mut Maze,
    coord: Coord,
    goal: Coord,
    path: &mut Vec<Coord>,
    opts: &SolveOptions,
) -> bool {
    maze.visit(coord, Method::Recursive);
    path.push(coord);
    if !opts.pause() {
        // Cancelled; unwind without a result
        return false;
    }

    if coord == goal {
        return true;
    }

    // Collect before descending: the recursive call needs the maze mutably
    for neighbor in maze.open_neighbors(coord) {
        if !maze[neighbor].visited && walk(maze, neighbor, goal, path, opts) {
            // A descendant reached the goal; skip the remaining siblings
            return true;
        }
    }

    // Dead end: this cell is not on the route
    path.pop();
    false
}
