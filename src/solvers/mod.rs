mod iterative;
mod recursive;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::maze::{Coord, Maze};

/// Which depth-first variant to run. Both are DFS over the same maze; they
/// differ only in where the traversal stack lives, and therefore in which
/// branch they prefer at a fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// The program call stack is the traversal stack; backtracking is a
    /// function return. Prefers the first-enumerated (top) branch.
    Recursive,
    /// An explicit work-stack of (cell, path-so-far) entries. LIFO popping
    /// prefers the last-enumerated (left) branch.
    Iterative,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Recursive => write!(f, "Recursive DFS (call stack)"),
            Method::Iterative => write!(f, "Iterative DFS (explicit stack)"),
        }
    }
}

/// Metrics record of one finished solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub method: Method,
    /// Start to goal inclusive; empty when no route was found (only possible
    /// on a corrupted maze or after cancellation).
    pub path: Vec<Coord>,
    /// Cells explored by this pass, including dead ends.
    pub visited_count: usize,
    pub elapsed: Duration,
}

impl SolveReport {
    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    pub fn found(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Pacing and cancellation shared with the solver while it runs. The delay is
/// an atomic so the input thread can retune animation speed mid-solve.
pub struct SolveOptions<'a> {
    /// Pause after each visitation, in milliseconds. Zero skips the pause
    /// entirely (headless and test runs).
    pub delay_ms: &'a AtomicU64,
    /// Set by the boundary to abort the walk at the next pause point.
    pub cancel: &'a AtomicBool,
}

impl SolveOptions<'_> {
    /// Suspend between visitations. Returns `false` when the walk should
    /// abort instead of resuming.
    fn pause(&self) -> bool {
        if self.cancel.load(Ordering::Relaxed) {
            return false;
        }
        let ms = self.delay_ms.load(Ordering::Relaxed);
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
        !self.cancel.load(Ordering::Relaxed)
    }
}

/// Runs one solver over the maze and returns its metrics record.
///
/// Clears the transient flags first, so back-to-back runs with different
/// methods see identical starting conditions. The caller must not mutate the
/// maze while this runs; the TUI enforces that by giving the compute thread
/// sole ownership.
pub fn solve_maze(maze: &mut Maze, method: Method, opts: &SolveOptions) -> SolveReport {
    maze.reset();
    let start = maze.start();
    let goal = maze.goal();

    let begin = Instant::now();
    let path = match method {
        Method::Recursive => recursive::solve(maze, start, goal, opts),
        Method::Iterative => iterative::solve(maze, start, goal, opts),
    };
    let elapsed = begin.elapsed();

    let visited_count = maze.visited_count();
    maze.mark_path(&path);
    tracing::info!(
        %method,
        visited_count,
        path_len = path.len(),
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "solve finished"
    );
    SolveReport {
        method,
        path,
        visited_count,
        elapsed,
    }
}
