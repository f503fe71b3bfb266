use std::env;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info};

use crate::app::App;
use crate::audio::RodioPlatform;
use crate::logging;

mod event_loop;
mod settings;
mod startup;

use startup::Command;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let command = match startup::parse_args(env::args().skip(1)) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("tunebox: {msg}\n{}", startup::USAGE);
            std::process::exit(2);
        }
    };

    match &command {
        Command::Help => {
            println!("{}", startup::USAGE);
            return Ok(());
        }
        Command::PrintConfig => {
            print!("{}", settings.to_toml()?);
            return Ok(());
        }
        _ => {}
    }

    let data_dir = settings.data_dir();
    let _log_guard = match logging::init(&data_dir, &settings.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("tunebox: logging disabled: {e}");
            None
        }
    };
    info!(data_dir = %data_dir.display(), "starting");

    let mut store = startup::open_store(&data_dir);

    let paths = match command {
        Command::Export(path) => {
            std::fs::write(&path, store.export_data())?;
            println!("exported playlist to {}", path.display());
            return Ok(());
        }
        Command::Import(path) => {
            let json = std::fs::read_to_string(&path)?;
            if !store.import_data(&json) {
                return Err(format!("{} is not a playlist backup", path.display()).into());
            }
            println!("imported playlist from {}", path.display());
            return Ok(());
        }
        Command::Play(paths) => paths,
        Command::Help | Command::PrintConfig => return Ok(()),
    };

    let mut app = App::new(RodioPlatform, store, &settings);
    if !paths.is_empty() {
        app.add_paths(&paths);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app);
    if let Err(e) = &run_result {
        error!(error = %e, "event loop failed");
    }
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
