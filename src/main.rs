use mazeduel::app::App;

fn main() -> std::io::Result<()> {
    // Log to a file; stdout belongs to the TUI for the whole run
    let file_appender = tracing_appender::rolling::never(std::env::temp_dir(), "mazeduel.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let app = App::default();
    let run_result = app.run(&mut stdout);
    // Restore even when the run failed, then surface the original error
    App::restore_terminal(&mut stdout)?;
    run_result
}
