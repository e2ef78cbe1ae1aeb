mod renderer;

use std::{
    io::{Stdout, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc::{Sender, SyncSender},
    },
    time::Duration,
};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{self, KeyCode},
    queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::{
    MazeEvent,
    app::renderer::{Renderer, RendererStatus},
    session::Session,
    solvers::{Method, SolveOptions},
};

/// Actions forwarded from the input thread to the renderer.
enum UserActionEvent {
    /// Terminal resized; repaint everything from the frame buffer.
    Redraw,
}

pub struct App {
    /// How often the input thread polls for key events, a.k.a. how often it
    /// rechecks the done/cancel flags
    user_input_event_poll_timeout: Duration,
    /// Pause the renderer takes after each carving event so generation is
    /// watchable
    carve_refresh_time: Duration,
    /// Pause between rounds in looping mode, long enough to read the panel
    loop_pause_time: Duration,
}

impl Default for App {
    fn default() -> Self {
        Self {
            user_input_event_poll_timeout: Duration::from_millis(100),
            carve_refresh_time: Duration::from_millis(3),
            loop_pause_time: Duration::from_secs(3),
        }
    }
}

impl App {
    /// Maximum number of maze events to buffer between compute and render threads
    const MAX_EVENTS_IN_CHANNEL_BUFFER: usize = 1000;
    /// The two contestants, always run in this order
    const METHODS: [Method; 2] = [Method::Recursive, Method::Iterative];
    /// How much one ↑/↓ press changes the per-step delay
    const SPEED_STEP_MS: u64 = 5;
    /// Per-step delay bounds; speed 1..=100 maps into this range
    const MAX_DELAY_MS: u64 = 99;

    /// Maps the 1..=100 speed setting to the per-step delay: higher speed,
    /// shorter pause, never below one millisecond.
    fn delay_from_speed(speed: u8) -> u64 {
        (100u64.saturating_sub(speed as u64)).max(1)
    }

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    /// even if the panic occurs in a different thread
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        crossterm::queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to original state
    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Main application loop: prompt for the round's parameters, then run
    /// generation and both solvers on a compute thread while the renderer
    /// animates every step.
    pub fn run(&self, stdout: &mut Stdout) -> std::io::Result<()> {
        let (width, height) = match App::ask_maze_dimensions(stdout)? {
            Some(dims) => dims,
            None => return Ok(()),
        };

        let speed = match App::ask_speed(stdout)? {
            Some(speed) => speed,
            None => return Ok(()),
        };

        queue!(
            stdout,
            style::PrintStyledContent(
                "Controls:\r\n"
                    .with(Color::Yellow)
                    .attribute(Attribute::Bold)
            ),
            style::PrintStyledContent("  ↑/↓: Speed up/slow down animation\r\n".with(Color::Cyan)),
            style::PrintStyledContent("  Esc: Exit\r\n\r\n".with(Color::Cyan)),
        )?;
        stdout.flush()?;

        let loop_animation = match App::select_from_menu(
            stdout,
            "Race repeatedly on fresh mazes? (use arrow keys and Enter, or Esc to exit):",
            &["No", "Yes"],
        )? {
            Some(choice) => choice == "Yes",
            None => return Ok(()),
        };

        // Shared per-step delay, retunable from the input thread mid-solve
        let delay_ms = Arc::new(AtomicU64::new(App::delay_from_speed(speed)));
        // Raised on Esc; every thread and both solvers watch it
        let cancel = Arc::new(AtomicBool::new(false));
        // Set by the render thread when it finishes
        let render_done = Arc::new(AtomicBool::new(false));

        let (maze_event_tx, maze_event_rx) =
            std::sync::mpsc::sync_channel::<MazeEvent>(App::MAX_EVENTS_IN_CHANNEL_BUFFER);
        let (user_action_tx, user_action_rx) = std::sync::mpsc::channel::<UserActionEvent>();

        let poll_timeout = self.user_input_event_poll_timeout;
        let delay_for_input = delay_ms.clone();
        let cancel_for_input = cancel.clone();
        let done_for_input = render_done.clone();
        let input_thread_handle = std::thread::spawn(move || -> std::io::Result<()> {
            App::listen_to_user_input(
                &delay_for_input,
                &cancel_for_input,
                &done_for_input,
                user_action_tx,
                poll_timeout,
            )
        });

        let carve_refresh_time = self.carve_refresh_time;
        let cancel_for_render = cancel.clone();
        let done_for_render = render_done.clone();
        let render_thread_handle = std::thread::spawn(move || {
            let mut renderer = Renderer::new(carve_refresh_time);
            renderer.render(
                maze_event_rx,
                user_action_rx,
                &cancel_for_render,
                &done_for_render,
            )
        });

        let loop_pause_time = self.loop_pause_time;
        let delay_for_compute = delay_ms.clone();
        let cancel_for_compute = cancel.clone();
        let compute_thread_handle = std::thread::spawn(move || -> bool {
            loop {
                let found = App::compute_round(
                    width,
                    height,
                    maze_event_tx.clone(),
                    &delay_for_compute,
                    &cancel_for_compute,
                );
                if !loop_animation || cancel_for_compute.load(Ordering::Relaxed) {
                    // Dropping the last sender ends the render loop
                    return found;
                }
                // Leave the comparison up for a moment before the next round
                std::thread::sleep(loop_pause_time);
                if cancel_for_compute.load(Ordering::Relaxed) {
                    return found;
                }
            }
        });

        let goal_reached = compute_thread_handle
            .join()
            .expect("Compute thread panicked");
        let status = render_thread_handle
            .join()
            .expect("Render thread panicked")?;
        let _ = input_thread_handle.join();

        if status == RendererStatus::Cancelled {
            tracing::info!("rendering was cancelled by user");
            return Ok(());
        }

        let msg = if goal_reached {
            "Both solvers reached the goal. "
        } else {
            "No route found. "
        };
        queue!(
            stdout,
            cursor::MoveTo(0, height as u16 * 2 + 1 + Renderer::PANEL_ROWS),
            style::PrintStyledContent(msg.with(Color::Green).attribute(Attribute::Bold)),
            style::PrintStyledContent(
                "Press Esc to exit...\r\n"
                    .with(Color::Blue)
                    .attribute(Attribute::Bold)
            ),
        )?;
        stdout.flush()?;
        App::wait_for_esc()?;
        Ok(())
    }

    /// One full round: generate a fresh maze, then run both solvers
    /// back-to-back. The session lives entirely on this thread, so nothing
    /// can generate or solve concurrently with it.
    fn compute_round(
        width: u8,
        height: u8,
        maze_event_tx: SyncSender<MazeEvent>,
        delay_ms: &AtomicU64,
        cancel: &AtomicBool,
    ) -> bool {
        let mut session = Session::new(width, height, None, Some(maze_event_tx));
        let opts = SolveOptions { delay_ms, cancel };
        let mut all_found = true;
        for method in App::METHODS {
            if cancel.load(Ordering::Relaxed) {
                return false;
            }
            all_found &= session.solve(method, &opts).found();
        }
        all_found
    }

    /// Profiling mode: run rounds headless with no pacing and print the
    /// metrics as plain lines.
    pub fn profile(
        &self,
        width: u8,
        height: u8,
        num_iterations: Option<usize>,
    ) -> std::io::Result<()> {
        let (maze_event_tx, maze_event_rx) =
            std::sync::mpsc::sync_channel::<MazeEvent>(App::MAX_EVENTS_IN_CHANNEL_BUFFER);

        // Discard events; there is no terminal picture in this mode
        let drain_thread_handle = std::thread::spawn(move || {
            while maze_event_rx.recv().is_ok() {}
        });

        let delay_ms = AtomicU64::new(0);
        let cancel = AtomicBool::new(false);
        let opts = SolveOptions {
            delay_ms: &delay_ms,
            cancel: &cancel,
        };

        for _ in 0..num_iterations.unwrap_or(1) {
            let mut session = Session::new(width, height, None, Some(maze_event_tx.clone()));
            for method in App::METHODS {
                let report = session.solve(method, &opts);
                println!(
                    "{}: {:.3} ms, {} visited, path {}",
                    report.method,
                    report.elapsed_ms(),
                    report.visited_count,
                    report.path_len()
                );
            }
        }

        drop(maze_event_tx);
        drain_thread_handle.join().expect("Drain thread panicked");
        Ok(())
    }

    /// Input thread body: Esc cancels, ↑/↓ retune the shared delay, resizes
    /// ask the renderer for a full repaint. Exits once rendering is done.
    fn listen_to_user_input(
        delay_ms: &AtomicU64,
        cancel: &AtomicBool,
        render_done: &AtomicBool,
        user_action_tx: Sender<UserActionEvent>,
        event_poll_timeout: Duration,
    ) -> std::io::Result<()> {
        loop {
            if render_done.load(Ordering::Relaxed) || cancel.load(Ordering::Relaxed) {
                return Ok(());
            }

            if !event::poll(event_poll_timeout)? {
                // No event available, continue loop to check flags again
                continue;
            }

            match event::read()? {
                event::Event::Key(key_event) if key_event.kind == event::KeyEventKind::Press => {
                    match key_event.code {
                        KeyCode::Esc => {
                            tracing::debug!("[input loop] Esc pressed, raising cancel flag");
                            cancel.store(true, Ordering::Relaxed);
                            return Ok(());
                        }
                        KeyCode::Up => {
                            let current = delay_ms.load(Ordering::Relaxed);
                            delay_ms.store(
                                current.saturating_sub(App::SPEED_STEP_MS).max(1),
                                Ordering::Relaxed,
                            );
                        }
                        KeyCode::Down => {
                            let current = delay_ms.load(Ordering::Relaxed);
                            delay_ms.store(
                                (current + App::SPEED_STEP_MS).min(App::MAX_DELAY_MS),
                                Ordering::Relaxed,
                            );
                        }
                        _ => {}
                    }
                }
                event::Event::Resize(_, _) => {
                    if user_action_tx.send(UserActionEvent::Redraw).is_err() {
                        // Renderer has exited
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    /// Wait for the user to press the Esc key
    /// This function blocks until Esc is pressed
    fn wait_for_esc() -> std::io::Result<()> {
        loop {
            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if code == KeyCode::Esc && kind == event::KeyEventKind::Press {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Get user input with real-time validation and feedback
    /// Returns None if user cancels input with Esc
    /// Returns Some(T) if user inputs a valid input and presses Enter, where T is the validated type
    fn prompt_with_validation<F, T>(
        stdout: &mut Stdout,
        prompt: &str,
        validate: F,
    ) -> std::io::Result<Option<T>>
    where
        F: Fn(&str) -> Result<T, String>,
    {
        // Save cursor position so we can restore / redraw
        queue!(stdout, cursor::Hide, cursor::SavePosition)?;
        stdout.flush()?;

        let mut input = String::new();

        let value_option = loop {
            // Re-render prompt line
            queue!(
                stdout,
                cursor::RestorePosition,
                terminal::Clear(ClearType::FromCursorDown)
            )?;

            stdout.queue(style::PrintStyledContent(
                prompt.with(Color::Cyan).attribute(Attribute::Bold),
            ))?;

            // Decide color based on validity
            let validation_result = validate(input.trim());
            match validation_result {
                Ok(_) => stdout.queue(style::SetForegroundColor(Color::Green))?,
                Err(_) => stdout.queue(style::SetForegroundColor(Color::Red))?,
            };
            queue!(stdout, style::Print(&input), style::ResetColor)?;
            stdout.queue(style::Print(" \r\n"))?;

            // Error message line (if any)
            if let Err(msg) = validation_result {
                stdout.queue(style::PrintStyledContent(
                    msg.with(Color::DarkGrey).attribute(Attribute::Dim),
                ))?;
            }

            stdout.flush()?;

            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                match code {
                    KeyCode::Enter => match validate(input.trim()) {
                        Ok(value) => break Some(value),
                        Err(_) => continue, // invalid, re-render
                    },
                    KeyCode::Char(c) if kind == event::KeyEventKind::Press => {
                        if !c.is_whitespace() && !c.is_control() {
                            input.push(c);
                        }
                    }
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Esc => break None,
                    _ => {}
                }
            }
        };
        // Cleanup
        queue!(
            stdout,
            cursor::RestorePosition,
            terminal::Clear(ClearType::FromCursorDown),
            cursor::Show
        )?;
        stdout.flush()?;

        Ok(value_option)
    }

    /// Largest maze dimension whose `2n + 1` tile frame fits in `term_size`
    /// columns or rows.
    fn get_max_maze_size(term_size: u16) -> u8 {
        (term_size.saturating_sub(1) / 2).clamp(1, u8::MAX as u16) as u8
    }

    /// Ask user for maze dimensions
    /// Returns None if user cancels input with Esc
    /// Returns Some((width, height)) if user inputs valid dimensions
    fn ask_maze_dimensions(stdout: &mut Stdout) -> std::io::Result<Option<(u8, u8)>> {
        stdout.execute(style::PrintStyledContent(
            "Enter maze dimensions, or press Esc to exit. Empty input picks a default. \
Maximum acceptable values are based on current terminal size.\r\n"
                .with(Color::Blue),
        ))?;

        let validate = |s: &str, is_width: bool| {
            let max_size = if let Ok((term_width, term_height)) = terminal::size() {
                if is_width {
                    App::get_max_maze_size(term_width)
                } else {
                    // Reserve rows for the results panel
                    App::get_max_maze_size(term_height.saturating_sub(Renderer::PANEL_ROWS))
                }
            } else {
                // Fallback if terminal size cannot be determined
                u8::MAX
            };

            if s.is_empty() {
                return Ok(15u8.min(max_size));
            }

            let error_msg = format!("Please enter a number between 1 and {}.", max_size);
            s.parse::<u8>()
                .map_err(|_| error_msg.clone())
                .and_then(|n| match n {
                    1..=255 if n <= max_size => Ok(n),
                    _ => Err(error_msg),
                })
        };

        let width = match App::prompt_with_validation(stdout, "Width: ", |s| validate(s, true))? {
            Some(w) => w,
            None => return Ok(None),
        };
        stdout.execute(style::PrintStyledContent(
            format!("Width set to {}\r\n", width)
                .with(Color::Green)
                .attribute(Attribute::Bold),
        ))?;

        let height = match App::prompt_with_validation(stdout, "Height: ", |s| validate(s, false))? {
            Some(h) => h,
            None => return Ok(None),
        };
        stdout.execute(style::PrintStyledContent(
            format!("Height set to {}\r\n", height)
                .with(Color::Green)
                .attribute(Attribute::Bold),
        ))?;

        Ok(Some((width, height)))
    }

    /// Ask for the animation speed (1 = slowest, 100 = fastest).
    fn ask_speed(stdout: &mut Stdout) -> std::io::Result<Option<u8>> {
        let validate = |s: &str| {
            if s.is_empty() {
                return Ok(50u8);
            }
            s.parse::<u8>()
                .ok()
                .filter(|n| (1..=100).contains(n))
                .ok_or_else(|| "Please enter a speed between 1 and 100.".to_string())
        };

        let speed = match App::prompt_with_validation(stdout, "Speed (1-100): ", validate)? {
            Some(speed) => speed,
            None => return Ok(None),
        };
        stdout.execute(style::PrintStyledContent(
            format!(
                "Speed set to {} ({} ms per step)\r\n",
                speed,
                App::delay_from_speed(speed)
            )
            .with(Color::Green)
            .attribute(Attribute::Bold),
        ))?;
        Ok(Some(speed))
    }

    /// Present a menu of options to the user and let them select one using arrow keys
    /// Returns None if user cancels input with Esc
    /// Returns Some(T) if user selects an option and presses Enter, where T is the option type
    fn select_from_menu<T: std::fmt::Display + Copy>(
        stdout: &mut Stdout,
        prompt: &str,
        options: &[T],
    ) -> std::io::Result<Option<T>> {
        if options.is_empty() {
            return Ok(None);
        }

        // Save cursor position so we can restore / redraw
        queue!(stdout, cursor::Hide, cursor::SavePosition)?;

        let mut selected = 0;

        let selected_option = loop {
            // Re-render prompt line
            queue!(
                stdout,
                cursor::RestorePosition,
                terminal::Clear(ClearType::FromCursorDown)
            )?;

            stdout.queue(style::PrintStyledContent(prompt.with(Color::Yellow)))?;

            for (i, option) in options.iter().enumerate() {
                if i == selected {
                    stdout.queue(style::SetAttribute(Attribute::Reverse))?;
                }
                stdout.queue(style::Print(format!("\r\n{}", option)))?;
                if i == selected {
                    stdout.queue(style::SetAttribute(Attribute::NoReverse))?;
                }
            }
            stdout.queue(style::Print("\r\n"))?;

            stdout.flush()?;

            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if kind != event::KeyEventKind::Press {
                    continue;
                }
                match code {
                    KeyCode::Up => {
                        selected = match selected {
                            0 => options.len() - 1,
                            _ => selected - 1,
                        };
                    }
                    KeyCode::Down => {
                        selected = if selected >= options.len() - 1 {
                            0
                        } else {
                            selected + 1
                        };
                    }
                    KeyCode::Enter => break Some(options[selected]),
                    KeyCode::Esc => break None,
                    _ => {}
                }
            }
        };
        // Cleanup
        queue!(
            stdout,
            cursor::RestorePosition,
            terminal::Clear(ClearType::FromCursorDown),
            cursor::Show
        )?;
        stdout.flush()?;

        Ok(selected_option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_maps_to_delay_with_floor() {
        assert_eq!(App::delay_from_speed(1), 99);
        assert_eq!(App::delay_from_speed(50), 50);
        assert_eq!(App::delay_from_speed(99), 1);
        // Floor of one millisecond even at full speed
        assert_eq!(App::delay_from_speed(100), 1);
    }

    #[test]
    fn test_max_maze_size_from_terminal() {
        // An 11-column terminal fits a 2*5+1 frame
        assert_eq!(App::get_max_maze_size(11), 5);
        assert_eq!(App::get_max_maze_size(10), 4);
        // Never reports zero even for absurdly small terminals
        assert_eq!(App::get_max_maze_size(0), 1);
        // Capped at the coordinate range
        assert_eq!(App::get_max_maze_size(u16::MAX), u8::MAX);
    }
}
