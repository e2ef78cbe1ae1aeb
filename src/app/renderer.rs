use std::{
    io::{Stdout, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, RecvTimeoutError},
    },
    time::Duration,
};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::{
    MazeEvent,
    app::UserActionEvent,
    maze::Coord,
    solvers::{Method, SolveReport},
};

/// One drawable position of the maze frame. Cells sit at odd frame
/// coordinates; walls and junctions fill the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Tile {
    Wall,
    Floor,
    Start,
    Goal,
    Visited(Method),
    PathMark,
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let styled_symbol = match self {
            Tile::Wall => "#".with(Color::DarkGrey),
            Tile::Floor => " ".with(Color::Reset),
            Tile::Start => "S".with(Color::Green),
            Tile::Goal => "G".with(Color::Red),
            Tile::Visited(Method::Recursive) => ".".with(Color::Blue),
            Tile::Visited(Method::Iterative) => ".".with(Color::Magenta),
            Tile::PathMark => "*".with(Color::Yellow),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                Tile::TILE_WIDTH as usize,
                "Each tile must occupy exactly one character width."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}

impl Tile {
    /// The width of each tile when rendered, in character widths.
    const TILE_WIDTH: u16 = 1;
}

/// How a render run ended.
#[derive(Debug, PartialEq, Eq)]
pub enum RendererStatus {
    /// The event channel drained and disconnected.
    Completed,
    /// The user cancelled, or the terminal could not fit the maze.
    Cancelled,
}

/// Consumes the maze event stream and keeps the terminal picture current.
///
/// An `n`-cell maze dimension renders as `2n + 1` tiles: one tile per cell
/// with wall tiles between and around them. The renderer reconstructs the
/// whole picture from the events alone, so it can redraw from scratch after
/// a terminal resize.
pub struct Renderer {
    stdout: Stdout,
    frame: Vec<Tile>,
    frame_width: u16,
    frame_height: u16,
    maze_dims: Option<(u8, u8)>,
    reports: Vec<SolveReport>,
    /// Pause after each carving event so generation is watchable; solve
    /// pacing is the solver's own job.
    carve_refresh_time: Duration,
}

impl Renderer {
    /// Rows below the maze frame reserved for the comparison panel.
    pub const PANEL_ROWS: u16 = 5;

    pub fn new(carve_refresh_time: Duration) -> Self {
        Self {
            stdout: std::io::stdout(),
            frame: Vec::new(),
            frame_width: 0,
            frame_height: 0,
            maze_dims: None,
            reports: Vec::new(),
            carve_refresh_time,
        }
    }

    /// Event-consuming loop. Returns when the event channel disconnects
    /// (compute finished) or `cancel` is raised. Sets `done` on the way out
    /// so the input thread knows to stop.
    pub fn render(
        &mut self,
        events: Receiver<MazeEvent>,
        actions: Receiver<UserActionEvent>,
        cancel: &AtomicBool,
        done: &AtomicBool,
    ) -> std::io::Result<RendererStatus> {
        tracing::info!("render thread started");
        let status = loop {
            if cancel.load(Ordering::Relaxed) {
                break RendererStatus::Cancelled;
            }

            // Drain pending user actions before the next event
            while let Ok(action) = actions.try_recv() {
                match action {
                    UserActionEvent::Redraw => self.redraw_all()?,
                }
            }

            match events.recv_timeout(Duration::from_millis(50)) {
                Ok(event) => {
                    if !self.apply(&event, cancel)? {
                        break RendererStatus::Cancelled;
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break RendererStatus::Completed,
            }
        };
        done.store(true, Ordering::Relaxed);
        tracing::info!(?status, "render thread exiting");
        Ok(status)
    }

    /// Applies one event to the frame and the terminal. Returns Ok(false)
    /// when rendering cannot continue (terminal too small and user bailed).
    fn apply(&mut self, event: &MazeEvent, cancel: &AtomicBool) -> std::io::Result<bool> {
        match event {
            MazeEvent::Initial { width, height } => {
                self.maze_dims = Some((*width, *height));
                self.frame_width = *width as u16 * 2 + 1;
                self.frame_height = *height as u16 * 2 + 1;
                self.frame = vec![Tile::Wall; self.frame_width as usize * self.frame_height as usize];
                for y in 0..*height {
                    for x in 0..*width {
                        let idx = self.frame_index(Renderer::cell_pos((x, y)));
                        self.frame[idx] = Tile::Floor;
                    }
                }
                self.place_endpoints();
                self.reports.clear();

                if !self.check_terminal_size(cancel)? {
                    return Ok(false);
                }
                self.redraw_all()?;
            }
            MazeEvent::WallOpened { from, to } => {
                let gap = (
                    from.0 as u16 + to.0 as u16 + 1,
                    from.1 as u16 + to.1 as u16 + 1,
                );
                self.set_and_draw(gap, Tile::Floor)?;
                self.stdout.flush()?;
                if !self.carve_refresh_time.is_zero() {
                    std::thread::sleep(self.carve_refresh_time);
                }
            }
            MazeEvent::Visited { coord, method } => {
                if !self.is_endpoint(*coord) {
                    self.set_and_draw(Renderer::cell_pos(*coord), Tile::Visited(*method))?;
                }
                self.stdout.flush()?;
            }
            MazeEvent::PathCell { coord } => {
                if !self.is_endpoint(*coord) {
                    self.set_and_draw(Renderer::cell_pos(*coord), Tile::PathMark)?;
                }
                self.stdout.flush()?;
            }
            MazeEvent::Cleared => {
                for tile in &mut self.frame {
                    if matches!(tile, Tile::Visited(_) | Tile::PathMark) {
                        *tile = Tile::Floor;
                    }
                }
                self.redraw_all()?;
            }
            MazeEvent::SolveDone { report } => {
                tracing::debug!(method = %report.method, "received solve report");
                self.reports.retain(|r| r.method != report.method);
                self.reports.push(report.clone());
                self.draw_comparison_panel()?;
            }
        }
        Ok(true)
    }

    fn cell_pos(coord: Coord) -> (u16, u16) {
        (coord.0 as u16 * 2 + 1, coord.1 as u16 * 2 + 1)
    }

    fn frame_index(&self, (fx, fy): (u16, u16)) -> usize {
        fy as usize * self.frame_width as usize + fx as usize
    }

    fn is_endpoint(&self, coord: Coord) -> bool {
        match self.maze_dims {
            Some((w, h)) => coord == (0, 0) || coord == (w - 1, h - 1),
            None => false,
        }
    }

    fn place_endpoints(&mut self) {
        if let Some((w, h)) = self.maze_dims {
            let start = self.frame_index(Renderer::cell_pos((0, 0)));
            self.frame[start] = Tile::Start;
            let goal = self.frame_index(Renderer::cell_pos((w - 1, h - 1)));
            self.frame[goal] = Tile::Goal;
        }
    }

    fn set_and_draw(&mut self, pos: (u16, u16), tile: Tile) -> std::io::Result<()> {
        let idx = self.frame_index(pos);
        if self.frame[idx] != tile {
            self.frame[idx] = tile;
            self.stdout.queue(cursor::MoveTo(pos.0, pos.1))?;
            self.stdout.queue(style::Print(tile))?;
        }
        Ok(())
    }

    /// Repaints the whole frame and panel from the renderer's own state.
    fn redraw_all(&mut self) -> std::io::Result<()> {
        queue!(
            self.stdout,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        for fy in 0..self.frame_height {
            for fx in 0..self.frame_width {
                let tile = self.frame[self.frame_index((fx, fy))];
                self.stdout.queue(style::Print(tile))?;
            }
            self.stdout.queue(style::Print("\r\n"))?;
        }
        self.stdout.flush()?;
        if !self.reports.is_empty() {
            self.draw_comparison_panel()?;
        }
        Ok(())
    }

    /// Metrics panel below the maze: one line per finished solver plus a
    /// proportional elapsed-time bar chart.
    fn draw_comparison_panel(&mut self) -> std::io::Result<()> {
        const BAR_WIDTH: f64 = 24.0;

        queue!(
            self.stdout,
            cursor::MoveTo(0, self.frame_height),
            terminal::Clear(ClearType::FromCursorDown),
            style::PrintStyledContent("Results\r\n".with(Color::Yellow).attribute(Attribute::Bold)),
        )?;

        let max_ms = self
            .reports
            .iter()
            .map(|r| r.elapsed_ms())
            .fold(f64::EPSILON, f64::max);

        for report in &self.reports {
            let color = match report.method {
                Method::Recursive => Color::Blue,
                Method::Iterative => Color::Magenta,
            };
            let bar_len = ((report.elapsed_ms() / max_ms) * BAR_WIDTH).ceil() as usize;
            let line = format!(
                "{:<34} {:>9.2} ms  {:>4} visited  path {:<4} {}\r\n",
                report.method.to_string(),
                report.elapsed_ms(),
                report.visited_count,
                report.path_len(),
                "█".repeat(bar_len),
            );
            self.stdout
                .queue(style::PrintStyledContent(line.with(color)))?;
        }
        self.stdout.flush()?;
        Ok(())
    }

    /// Refuses to render into a terminal smaller than the frame. Waits for
    /// the user to cancel instead of drawing garbage.
    fn check_terminal_size(&mut self, cancel: &AtomicBool) -> std::io::Result<bool> {
        let (term_width, term_height) = terminal::size()?;
        if term_width >= self.frame_width * Tile::TILE_WIDTH
            && term_height >= self.frame_height + Renderer::PANEL_ROWS
        {
            return Ok(true);
        }

        let msg = format!(
            "Terminal ({}x{}) is too small for a {}x{} tile frame. Please enlarge it and restart.\r\n",
            term_width,
            term_height,
            self.frame_width,
            self.frame_height + Renderer::PANEL_ROWS,
        );
        queue!(
            self.stdout,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            style::PrintStyledContent(msg.with(Color::Yellow).attribute(Attribute::Bold)),
            style::PrintStyledContent(
                "Press Esc to exit...\r\n"
                    .with(Color::Blue)
                    .attribute(Attribute::Bold)
            )
        )?;
        self.stdout.flush()?;

        // Block until the input thread raises the cancel flag
        while !cancel.load(Ordering::Relaxed) {
            std::thread::sleep(Duration::from_millis(50));
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_frame_mapping() {
        assert_eq!(Renderer::cell_pos((0, 0)), (1, 1));
        assert_eq!(Renderer::cell_pos((4, 2)), (9, 5));
    }

    #[test]
    fn test_tiles_render_one_column_wide() {
        use unicode_width::UnicodeWidthStr;
        for tile in [
            Tile::Wall,
            Tile::Floor,
            Tile::Start,
            Tile::Goal,
            Tile::Visited(Method::Recursive),
            Tile::Visited(Method::Iterative),
            Tile::PathMark,
        ] {
            // Strip the ANSI styling by measuring the raw symbol
            let raw = match tile {
                Tile::Wall => "#",
                Tile::Floor => " ",
                Tile::Start => "S",
                Tile::Goal => "G",
                Tile::Visited(_) => ".",
                Tile::PathMark => "*",
            };
            assert_eq!(raw.width(), Tile::TILE_WIDTH as usize);
        }
    }
}
