use super::{Method, SolveOptions};
use crate::maze::{Coord, Maze};

/// Depth-first search with an explicit work-stack. Each entry carries the
/// route taken to reach it, so reaching the goal hands back the answer with
/// no backtracking pass.
///
/// Cells are marked visited when pushed, not when popped, so nothing is ever
/// pushed twice. Combined with the LIFO stack this prefers the last-enumerated
/// (left) branch at a fork, where the recursive walk prefers the first (top):
/// same algorithm, different traversal order.
pub(super) fn solve(maze: &mut Maze, start: Coord, goal: Coord, opts: &SolveOptions) -> Vec<Coord> {
    let mut stack = vec![(start, vec![start])];
    maze[start].visited = true;

    while let Some((coord, path)) = stack.pop() {
        maze.emit(crate::MazeEvent::Visited {
            coord,
            method: Method::Iterative,
        });
        if !opts.pause() {
            return Vec::new();
        }

        if coord == goal {
            return path;
        }

        for neighbor in maze.open_neighbors(coord) {
            if !maze[neighbor].visited {
                maze[neighbor].visited = true;
                let mut branch = path.clone();
                branch.push(neighbor);
                stack.push((neighbor, branch));
            }
        }
    }

    Vec::new()
}
