use mazeduel::app::App;

/// Headless metrics run: `profile [width] [height] [iterations]`.
/// No terminal UI and no per-step pacing, so the timings are the raw
/// algorithm cost.
fn main() -> std::io::Result<()> {
    let app = App::default();

    let mut args = std::env::args();
    args.next(); // Skip executable name
    let width = args.next().and_then(|s| s.parse::<u8>().ok()).unwrap_or(50);
    let height = args.next().and_then(|s| s.parse::<u8>().ok()).unwrap_or(50);
    let num_iters = args.next().and_then(|s| s.parse::<usize>().ok());

    app.profile(width, height, num_iters)?;
    Ok(())
}
