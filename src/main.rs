use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, SetSize, enable_raw_mode},
};
use fabula::app::{App, AppEvent};
use fabula::cleanup::cleanup;
use fabula::{logging, ui};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::panic;
use std::{io, time::Duration};
use tokio::sync::mpsc;
use tokio::time::Instant;

const MIN_WIDTH: u16 = 80;
const MIN_HEIGHT: u16 = 30;

fn ensure_minimum_terminal_size() -> io::Result<()> {
    let (width, height) = crossterm::terminal::size()?;
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        execute!(
            io::stdout(),
            SetSize(MIN_WIDTH.max(width), MIN_HEIGHT.max(height))
        )?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = logging::init() {
        eprintln!("Logging unavailable: {e}");
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    ensure_minimum_terminal_size()?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before printing panic details.
    panic::set_hook(Box::new(|panic_info| {
        cleanup();
        if let Some(location) = panic_info.location() {
            println!(
                "Panic occurred in file '{}' at line {}",
                location.file(),
                location.line(),
            );
        }
        if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            println!("Panic message: {}", message);
        }
    }));

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let app = App::new(event_tx);

    let result = run_app(&mut terminal, app, event_rx).await;
    cleanup();
    if let Err(err) = result {
        println!("Error: {err:?}");
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    mut event_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                app.on_tick();
                last_tick = Instant::now();
            }
            key = tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            }) => {
                if let Ok(Some(Event::Key(key))) = key {
                    app.on_key(key);
                }
            }
            Some(event) = event_rx.recv() => {
                app.handle_event(event);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
