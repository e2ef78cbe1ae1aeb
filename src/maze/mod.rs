pub mod cell;

use std::sync::mpsc::SyncSender;

pub use cell::{Cell, Direction, Walls};

use crate::MazeEvent;
use crate::solvers::Method;

/// Cell coordinates `(x, y)`, zero-based, `x` growing rightward and `y`
/// growing downward.
pub type Coord = (u8, u8);

/// The maze: an owned rectangle of cells with per-side wall flags, plus an
/// optional event sink that observes every mutation in order.
pub struct Maze {
    cells: Box<[Cell]>,
    width: u8,
    height: u8,
    sender: Option<SyncSender<MazeEvent>>,
}

impl Maze {
    /// Creates a maze with every wall present and no cell carved or visited.
    /// Dimension validation happens at the input boundary; here it is only a
    /// debug assertion.
    pub fn new(width: u8, height: u8, sender: Option<SyncSender<MazeEvent>>) -> Self {
        debug_assert!(width >= 1 && height >= 1, "maze dimensions must be >= 1");
        let cells = vec![Cell::default(); width as usize * height as usize].into_boxed_slice();
        let maze = Maze {
            cells,
            width,
            height,
            sender,
        };
        maze.emit(MazeEvent::Initial { width, height });
        maze
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Entry cell, fixed at the top-left corner.
    pub fn start(&self) -> Coord {
        (0, 0)
    }

    /// Goal cell, fixed at the bottom-right corner. Derived from the current
    /// dimensions, so it is always correct after a regeneration.
    pub fn goal(&self) -> Coord {
        (self.width - 1, self.height - 1)
    }

    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        coord.0 < self.width && coord.1 < self.height
    }

    fn ravel_index(&self, x: u8, y: u8) -> usize {
        // Overflow-safe since coordinates are u8
        y as usize * self.width as usize + x as usize
    }

    /// Sends an event to the attached sink, if any. Send errors mean the
    /// receiving side is gone, which is not this side's problem.
    pub fn emit(&self, event: MazeEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    /// Opens the wall between `from` and its neighbor in `dir`, updating both
    /// cells so the relation stays symmetric.
    ///
    /// # Panics
    /// If `from` or the stepped-to neighbor is out of bounds.
    pub fn open_wall(&mut self, from: Coord, dir: Direction) {
        if !self.is_in_bounds(from) {
            panic!("The given coordinate is out of bounds");
        }
        let to = match dir.step(from).filter(|&c| self.is_in_bounds(c)) {
            Some(to) => to,
            None => panic!("Cannot open a wall on the maze boundary"),
        };
        self[from].walls.open(dir);
        self[to].walls.open(dir.opposite());
        self.emit(MazeEvent::WallOpened { from, to });
    }

    /// Grid-adjacent neighbors that the carving pass has not reached yet,
    /// walls ignored. In fixed direction order.
    pub fn uncarved_neighbors(&self, coord: Coord) -> Vec<(Direction, Coord)> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| {
                dir.step(coord)
                    .filter(|&c| self.is_in_bounds(c))
                    .map(|c| (dir, c))
            })
            .filter(|&(_, c)| !self[c].carved)
            .collect()
    }

    /// Neighbors reachable through an open wall, visited or not. In fixed
    /// direction order; the solvers' branch preference depends on it.
    pub fn open_neighbors(&self, coord: Coord) -> Vec<Coord> {
        Direction::ALL
            .into_iter()
            .filter(|&dir| !self[coord].walls.has(dir))
            .filter_map(|dir| dir.step(coord).filter(|&c| self.is_in_bounds(c)))
            .collect()
    }

    /// Marks a cell explored and notifies the sink. One call per visitation.
    pub fn visit(&mut self, coord: Coord, method: Method) {
        self[coord].visited = true;
        self.emit(MazeEvent::Visited { coord, method });
    }

    /// Flags the solution path cells and streams them to the sink.
    pub fn mark_path(&mut self, path: &[Coord]) {
        for &coord in path {
            self[coord].in_path = true;
            self.emit(MazeEvent::PathCell { coord });
        }
    }

    /// Clears the transient solve state (`visited`/`in_path`) on every cell.
    /// Walls and the carving record stay untouched. Idempotent.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.visited = false;
            cell.in_path = false;
        }
        self.emit(MazeEvent::Cleared);
    }

    /// Number of cells the current solve pass has explored.
    pub fn visited_count(&self) -> usize {
        self.cells.iter().filter(|c| c.visited).count()
    }

    /// Number of carved passages. Counting only right/bottom sides counts
    /// each open wall exactly once.
    pub fn open_edge_count(&self) -> usize {
        let mut count = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                let walls = self[(x, y)].walls;
                if x + 1 < self.width && !walls.right {
                    count += 1;
                }
                if y + 1 < self.height && !walls.bottom {
                    count += 1;
                }
            }
        }
        count
    }
}

impl std::ops::Index<Coord> for Maze {
    type Output = Cell;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.cells[self.ravel_index(index.0, index.1)]
    }
}

impl std::ops::IndexMut<Coord> for Maze {
    fn index_mut(&mut self, index: Coord) -> &mut Self::Output {
        let idx = self.ravel_index(index.0, index.1);
        &mut self.cells[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maze_indexing() {
        let mut maze = Maze::new(5, 5, None);
        maze[(2, 3)].visited = true;
        assert!(maze[(2, 3)].visited);
        assert!(!maze[(3, 2)].visited);
    }

    #[test]
    fn test_open_wall_is_symmetric() {
        let mut maze = Maze::new(3, 3, None);
        maze.open_wall((0, 0), Direction::Right);
        assert!(!maze[(0, 0)].walls.right);
        assert!(!maze[(1, 0)].walls.left);
        // The other sides stay closed
        assert!(maze[(0, 0)].walls.bottom);
        assert!(maze[(1, 0)].walls.right);

        maze.open_wall((1, 1), Direction::Top);
        assert!(!maze[(1, 1)].walls.top);
        assert!(!maze[(1, 0)].walls.bottom);
    }

    #[test]
    #[should_panic(expected = "boundary")]
    fn test_open_wall_rejects_boundary() {
        let mut maze = Maze::new(3, 3, None);
        maze.open_wall((2, 0), Direction::Right);
    }

    #[test]
    fn test_neighbor_queries_respect_walls_and_order() {
        let mut maze = Maze::new(3, 3, None);
        // Everything is grid-adjacent to the center regardless of walls
        let grid: Vec<Coord> = maze.uncarved_neighbors((1, 1)).iter().map(|&(_, c)| c).collect();
        assert_eq!(grid, vec![(1, 0), (2, 1), (1, 2), (0, 1)]);

        // No open walls yet
        assert!(maze.open_neighbors((1, 1)).is_empty());

        maze.open_wall((1, 1), Direction::Bottom);
        maze.open_wall((1, 1), Direction::Top);
        // Fixed order: top before bottom
        assert_eq!(maze.open_neighbors((1, 1)), vec![(1, 0), (1, 2)]);
    }

    #[test]
    fn test_uncarved_filter() {
        let mut maze = Maze::new(2, 2, None);
        maze[(1, 0)].carved = true;
        let neighbors: Vec<Coord> = maze.uncarved_neighbors((0, 0)).iter().map(|&(_, c)| c).collect();
        assert_eq!(neighbors, vec![(0, 1)]);
    }

    #[test]
    fn test_corner_cells_have_two_grid_neighbors() {
        let maze = Maze::new(4, 4, None);
        assert_eq!(maze.uncarved_neighbors((0, 0)).len(), 2);
        assert_eq!(maze.uncarved_neighbors((3, 3)).len(), 2);
        assert_eq!(maze.uncarved_neighbors((0, 3)).len(), 2);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut maze = Maze::new(3, 2, None);
        maze.open_wall((0, 0), Direction::Right);
        maze[(0, 0)].visited = true;
        maze[(1, 0)].in_path = true;

        maze.reset();
        maze.reset();

        for y in 0..2 {
            for x in 0..3 {
                assert!(!maze[(x, y)].visited);
                assert!(!maze[(x, y)].in_path);
            }
        }
        // Walls survive resets
        assert!(!maze[(0, 0)].walls.right);
        assert_eq!(maze.open_edge_count(), 1);
    }

    #[test]
    fn test_start_and_goal_follow_dimensions() {
        let maze = Maze::new(7, 4, None);
        assert_eq!(maze.start(), (0, 0));
        assert_eq!(maze.goal(), (6, 3));
        let maze = Maze::new(1, 1, None);
        assert_eq!(maze.start(), maze.goal());
    }

    #[test]
    fn test_events_are_emitted_in_order() {
        let (tx, rx) = std::sync::mpsc::sync_channel(16);
        let mut maze = Maze::new(2, 1, Some(tx));
        maze.open_wall((0, 0), Direction::Right);
        maze.reset();
        drop(maze);

        let events: Vec<MazeEvent> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                MazeEvent::Initial {
                    width: 2,
                    height: 1
                },
                MazeEvent::WallOpened {
                    from: (0, 0),
                    to: (1, 0)
                },
                MazeEvent::Cleared,
            ]
        );
    }
}
