pub mod app;
pub mod generators;
pub mod maze;
pub mod session;
pub mod solvers;

pub use maze::{Coord, Maze};
pub use session::Session;
pub use solvers::{Method, SolveOptions, SolveReport};

/// Events streamed from the maze to whoever is watching it (the renderer in
/// the TUI, a collecting channel in tests). Emitted strictly in the order the
/// underlying mutation happened, one event per step, never batched.
#[derive(Debug, Clone, PartialEq)]
pub enum MazeEvent {
    /// A fresh maze was created with all walls present.
    Initial { width: u8, height: u8 },
    /// The wall between two adjacent cells was carved open.
    WallOpened { from: Coord, to: Coord },
    /// A solver examined a cell. Exactly one per visitation.
    Visited { coord: Coord, method: Method },
    /// A cell belongs to the final solution path.
    PathCell { coord: Coord },
    /// Transient solve state (visited/path flags) was wiped; walls unchanged.
    Cleared,
    /// A solve finished; carries the full metrics record.
    SolveDone { report: SolveReport },
}
