use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::maze::Maze;

/// Get a random number generator, optionally seeded for reproducibility.
fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Carves a perfect maze with randomized depth-first search and leaves it
/// ready for solving (transient flags cleared).
///
/// After this returns, the open-wall relation over the cells forms a spanning
/// tree: exactly `width * height - 1` passages, every cell reachable from
/// every other along exactly one route.
pub fn generate_maze(maze: &mut Maze, seed: Option<u64>) {
    let mut rng = get_rng(seed);
    randomized_dfs(maze, &mut rng);
    // Hand the maze over to the solvers with a clean slate
    maze.reset();
    tracing::debug!(
        width = maze.width(),
        height = maze.height(),
        passages = maze.open_edge_count(),
        "maze carved"
    );
}

fn randomized_dfs(maze: &mut Maze, rng: &mut StdRng) {
    let start: (u8, u8) = (
        rng.random_range(0..maze.width()),
        rng.random_range(0..maze.height()),
    );
    maze[start].carved = true;

    // The stack holds the carving frontier; the top is the cell currently
    // being extended.
    let mut stack = vec![start];

    while let Some(&cell) = stack.last() {
        let neighbors = maze.uncarved_neighbors(cell);

        if neighbors.is_empty() {
            // Dead end, backtrack
            stack.pop();
        } else {
            let (dir, neighbor) = neighbors[rng.random_range(0..neighbors.len())];
            maze.open_wall(cell, dir);
            maze[neighbor].carved = true;
            // Carve onward from the neighbor; this cell gets another look
            // once the branch below it is exhausted
            stack.push(neighbor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Coord;
    use crate::maze::Direction;
    use std::collections::HashSet;

    /// Every cell reachable from `from` through open walls.
    fn flood_fill(maze: &Maze, from: Coord) -> HashSet<Coord> {
        let mut seen = HashSet::from([from]);
        let mut stack = vec![from];
        while let Some(coord) = stack.pop() {
            for next in maze.open_neighbors(coord) {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen
    }

    #[test]
    fn test_spanning_tree_property() {
        for (w, h) in [(2u8, 2u8), (5, 5), (9, 4), (12, 7)] {
            let mut maze = Maze::new(w, h, None);
            generate_maze(&mut maze, Some(7));
            let cells = w as usize * h as usize;
            assert_eq!(maze.open_edge_count(), cells - 1);
            assert_eq!(flood_fill(&maze, (0, 0)).len(), cells);
            // Connectivity holds from an interior cell too
            assert_eq!(flood_fill(&maze, (w - 1, h - 1)).len(), cells);
        }
    }

    #[test]
    fn test_every_cell_carved() {
        let mut maze = Maze::new(6, 6, None);
        generate_maze(&mut maze, Some(3));
        for y in 0..6 {
            for x in 0..6 {
                assert!(maze[(x, y)].carved, "cell ({x}, {y}) never carved");
            }
        }
    }

    #[test]
    fn test_wall_symmetry() {
        let mut maze = Maze::new(8, 8, None);
        generate_maze(&mut maze, Some(11));
        for y in 0..8 {
            for x in 0..8 {
                for dir in Direction::ALL {
                    let Some(neighbor) = dir.step((x, y)).filter(|&c| maze.is_in_bounds(c)) else {
                        continue;
                    };
                    assert_eq!(
                        maze[(x, y)].walls.has(dir),
                        maze[neighbor].walls.has(dir.opposite()),
                        "asymmetric wall between ({x}, {y}) and {neighbor:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_maze() {
        let mut a = Maze::new(10, 10, None);
        let mut b = Maze::new(10, 10, None);
        generate_maze(&mut a, Some(42));
        generate_maze(&mut b, Some(42));
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(a[(x, y)].walls, b[(x, y)].walls);
            }
        }
    }

    #[test]
    fn test_different_seeds_usually_differ() {
        let mut a = Maze::new(10, 10, None);
        let mut b = Maze::new(10, 10, None);
        generate_maze(&mut a, Some(1));
        generate_maze(&mut b, Some(2));
        let differs = (0..10u8)
            .flat_map(|y| (0..10u8).map(move |x| (x, y)))
            .any(|c| a[c].walls != b[c].walls);
        assert!(differs);
    }

    #[test]
    fn test_single_corridor_degenerates_cleanly() {
        let mut row = Maze::new(9, 1, None);
        generate_maze(&mut row, Some(5));
        assert_eq!(row.open_edge_count(), 8);
        assert_eq!(flood_fill(&row, (0, 0)).len(), 9);

        let mut column = Maze::new(1, 9, None);
        generate_maze(&mut column, Some(5));
        assert_eq!(column.open_edge_count(), 8);
        assert_eq!(flood_fill(&column, (0, 0)).len(), 9);

        let mut single = Maze::new(1, 1, None);
        generate_maze(&mut single, Some(5));
        assert_eq!(single.open_edge_count(), 0);
    }

    #[test]
    fn test_transient_flags_cleared_after_generation() {
        let mut maze = Maze::new(5, 5, None);
        generate_maze(&mut maze, Some(9));
        for y in 0..5 {
            for x in 0..5 {
                assert!(!maze[(x, y)].visited);
                assert!(!maze[(x, y)].in_path);
            }
        }
    }
}
