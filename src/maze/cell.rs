/// One of the four cardinal sides of a cell.
///
/// The `ALL` order decides which branch a traversal tries first; both solvers
/// and the generator rely on it staying fixed, so their output is reproducible
/// for a given maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    /// The side the adjacent cell sees this cell from.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// Step one cell in this direction. Returns `None` on coordinate
    /// underflow/overflow; bounds against the maze dimensions are the
    /// caller's job.
    pub fn step(self, (x, y): (u8, u8)) -> Option<(u8, u8)> {
        match self {
            Direction::Top => y.checked_sub(1).map(|y| (x, y)),
            Direction::Right => x.checked_add(1).map(|x| (x, y)),
            Direction::Bottom => y.checked_add(1).map(|y| (x, y)),
            Direction::Left => x.checked_sub(1).map(|x| (x, y)),
        }
    }
}

/// Per-side wall flags. `true` means the wall is present (impassable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Walls {
    /// All four walls present, the state every cell starts in.
    pub const CLOSED: Walls = Walls {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    pub fn has(self, dir: Direction) -> bool {
        match dir {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    pub fn open(&mut self, dir: Direction) {
        match dir {
            Direction::Top => self.top = false,
            Direction::Right => self.right = false,
            Direction::Bottom => self.bottom = false,
            Direction::Left => self.left = false,
        }
    }
}

/// A single maze cell: its walls plus the traversal flags.
///
/// `carved` belongs to generation and `visited` to solving; keeping them
/// separate means a solve never has to trust that generation cleaned up
/// after itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub walls: Walls,
    /// Reached by the carving pass during generation.
    pub carved: bool,
    /// Explored by the current solve pass.
    pub visited: bool,
    /// Part of the most recent solution path.
    pub in_path: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            walls: Walls::CLOSED,
            carved: false,
            visited: false,
            in_path: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_order_is_fixed() {
        assert_eq!(
            Direction::ALL,
            [
                Direction::Top,
                Direction::Right,
                Direction::Bottom,
                Direction::Left
            ]
        );
    }

    #[test]
    fn test_opposite_round_trips() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_step_checks_coordinate_edges() {
        assert_eq!(Direction::Top.step((3, 0)), None);
        assert_eq!(Direction::Left.step((0, 3)), None);
        assert_eq!(Direction::Right.step((u8::MAX, 3)), None);
        assert_eq!(Direction::Bottom.step((3, u8::MAX)), None);
        assert_eq!(Direction::Right.step((1, 1)), Some((2, 1)));
    }

    #[test]
    fn test_walls_start_closed() {
        let cell = Cell::default();
        for dir in Direction::ALL {
            assert!(cell.walls.has(dir));
        }
        assert!(!cell.carved && !cell.visited && !cell.in_path);
    }
}
