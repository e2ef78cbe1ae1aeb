use std::sync::mpsc::SyncSender;

use crate::MazeEvent;
use crate::generators::generate_maze;
use crate::maze::Maze;
use crate::solvers::{Method, SolveOptions, SolveReport, solve_maze};

/// One generate-and-race round: the maze plus the report slot for each
/// method. Owning both here keeps the "one operation at a time" rule simple —
/// whoever holds the session holds the maze.
pub struct Session {
    pub maze: Maze,
    recursive: Option<SolveReport>,
    iterative: Option<SolveReport>,
}

impl Session {
    /// Generates a fresh maze. Any previously stored reports belong to a maze
    /// that no longer exists, so a new session starts with both slots empty.
    pub fn new(
        width: u8,
        height: u8,
        seed: Option<u64>,
        sender: Option<SyncSender<MazeEvent>>,
    ) -> Self {
        let mut maze = Maze::new(width, height, sender);
        generate_maze(&mut maze, seed);
        Session {
            maze,
            recursive: None,
            iterative: None,
        }
    }

    /// Runs one solver, stores its report, and announces the result to the
    /// event sink.
    pub fn solve(&mut self, method: Method, opts: &SolveOptions) -> &SolveReport {
        let report = solve_maze(&mut self.maze, method, opts);
        self.maze.emit(MazeEvent::SolveDone {
            report: report.clone(),
        });
        let slot = match method {
            Method::Recursive => &mut self.recursive,
            Method::Iterative => &mut self.iterative,
        };
        &*slot.insert(report)
    }

    pub fn report(&self, method: Method) -> Option<&SolveReport> {
        match method {
            Method::Recursive => self.recursive.as_ref(),
            Method::Iterative => self.iterative.as_ref(),
        }
    }

    /// Wipes the solve overlays and drops both stored reports. The maze keeps
    /// its walls; this does not re-carve.
    pub fn clear_results(&mut self) {
        self.maze.reset();
        self.recursive = None;
        self.iterative = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64};

    #[test]
    fn test_reports_stored_per_method() {
        let delay = AtomicU64::new(0);
        let cancel = AtomicBool::new(false);
        let opts = SolveOptions {
            delay_ms: &delay,
            cancel: &cancel,
        };

        let mut session = Session::new(6, 6, Some(13), None);
        assert!(session.report(Method::Recursive).is_none());
        assert!(session.report(Method::Iterative).is_none());

        session.solve(Method::Recursive, &opts);
        assert!(session.report(Method::Recursive).is_some());
        assert!(session.report(Method::Iterative).is_none());

        session.solve(Method::Iterative, &opts);
        let recursive = session.report(Method::Recursive).unwrap();
        let iterative = session.report(Method::Iterative).unwrap();
        // Same maze, so both routes end at the same corner
        assert_eq!(recursive.path.last(), iterative.path.last());
    }

    #[test]
    fn test_clear_results_drops_reports_and_overlays() {
        let delay = AtomicU64::new(0);
        let cancel = AtomicBool::new(false);
        let opts = SolveOptions {
            delay_ms: &delay,
            cancel: &cancel,
        };

        let mut session = Session::new(5, 5, Some(21), None);
        session.solve(Method::Recursive, &opts);
        session.clear_results();

        assert!(session.report(Method::Recursive).is_none());
        assert_eq!(session.maze.visited_count(), 0);
        // Walls are untouched: still a perfect maze
        assert_eq!(session.maze.open_edge_count(), 24);
    }

    #[test]
    fn test_solve_done_event_reaches_the_sink() {
        let delay = AtomicU64::new(0);
        let cancel = AtomicBool::new(false);
        let opts = SolveOptions {
            delay_ms: &delay,
            cancel: &cancel,
        };

        let (tx, rx) = std::sync::mpsc::sync_channel(4096);
        let mut session = Session::new(4, 4, Some(2), Some(tx));
        session.solve(Method::Iterative, &opts);
        drop(session);

        let done: Vec<_> = rx
            .iter()
            .filter_map(|e| match e {
                MazeEvent::SolveDone { report } => Some(report),
                _ => None,
            })
            .collect();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].method, Method::Iterative);
        assert!(done[0].found());
    }
}
