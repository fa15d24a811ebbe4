mod app;
mod braille;
mod data;
mod ui;

use anyhow::{bail, Context, Result};
use app::{App, SystemKind};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::execute;
use graticule::config::Settings;
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE: &str = "graticule-view.log";
const DEFAULT_CONFIG: &str = "graticule.toml";
const DEFAULT_EXPORT: &str = "graticule.geojson";

struct Args {
    config: PathBuf,
    export: Option<PathBuf>,
    system: SystemKind,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: PathBuf::from(DEFAULT_CONFIG),
        export: None,
        system: SystemKind::LatLon,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().context("--config needs a path")?.into(),
            "--export" => args.export = Some(it.next().context("--export needs a path")?.into()),
            "--system" => {
                let name = it.next().context("--system needs a name")?;
                args.system = SystemKind::from_name(&name).with_context(|| format!("unknown grid system {name:?}"))?;
            }
            other => bail!("unknown argument {other:?} (expected --config, --export or --system)"),
        }
    }
    Ok(args)
}

/// Log to a file so the terminal UI stays clean
fn init_logging() -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)
        .with_context(|| format!("cannot open {LOG_FILE}"))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let args = parse_args()?;
    let settings = Settings::load_or_default(&args.config)?;
    let mut app = App::new(settings, args.system)?;

    // Headless: one pass with the configured camera, then write GeoJSON
    if let Some(path) = args.export {
        app.update();
        let count = app.export(&path)?;
        println!("wrote {count} features to {}", path.display());
        return Ok(());
    }

    app.coastlines = data::load_coastlines(Path::new("data"));
    info!(system = app.layer.name(), "viewer starting");

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &mut app);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in(),
        MouseEventKind::ScrollDown => app.zoom_out(),
        MouseEventKind::ScrollLeft => app.pan(-20, 0),
        MouseEventKind::ScrollRight => app.pan(20, 0),
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}

fn handle_key(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-20, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(20, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -20),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 20),

        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        KeyCode::Char('<') | KeyCode::Char(',') => app.rotate(-5.0),
        KeyCode::Char('>') | KeyCode::Char('.') => app.rotate(5.0),
        KeyCode::Char('t') => app.tilt(5.0),
        KeyCode::Char('g') => app.tilt(-5.0),

        KeyCode::Char('a') | KeyCode::Char('A') => app.cycle_angle_format(),
        KeyCode::Char('c') | KeyCode::Char('C') => app.show_coastlines = !app.show_coastlines,
        KeyCode::Char('e') | KeyCode::Char('E') => {
            app.export(Path::new(DEFAULT_EXPORT))?;
        }
        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

        KeyCode::Char(c) => {
            if let Some(system) = SystemKind::from_key(c) {
                app.switch_system(system)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    let size = terminal.size()?;
    app.resize(size.width as usize, size.height as usize);

    loop {
        app.update();
        terminal.draw(|frame| ui::render(frame, &*app))?;

        // ~60fps
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key.code)?,
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
