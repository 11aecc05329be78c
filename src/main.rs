mod term;

use std::process::exit;
use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use snake_arena::{Game, GameConfig, Key, Platform};
use tracing::info;

use crate::term::TermManager;

const TICK_INTERVAL_MS: u64 = 5;

fn main() -> Result<()> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(&path).with_context(|| format!("loading config {}", path))?,
        None => GameConfig::default(),
    };

    let mut term = TermManager::new(config.cell_size).context("reading terminal size")?;
    let (width, height) = term.surface_size();
    let mut game = Game::init(width, height, config)?;

    term.setup()?;
    info!(width, height, "terminal host started");

    match run(&mut game, &mut term) {
        Ok(()) => {
            term.restore()?;
            Ok(())
        }
        Err(err) => {
            term.throw_error(&format!("{:#}", err));
            exit(1);
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Polls input, feeds elapsed time to the game and redraws until CTRL+C.
fn run(game: &mut Game, term: &mut TermManager) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        sleep(Duration::from_millis(TICK_INTERVAL_MS));

        for key_ev in term.read_key_events_queue()? {
            if is_ctrl_c(&key_ev) {
                return Ok(());
            }
            if let Some(key) = map_key(&key_ev) {
                game.key_down(key)?;
            }
        }

        let now = Instant::now();
        game.update(now.duration_since(last_frame).as_secs_f32())?;
        last_frame = now;

        game.render(term);
        term.flush()?;
    }
}

fn map_key(ev: &KeyEvent) -> Option<Key> {
    match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Key::Up),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Key::Left),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Key::Down),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Key::Right),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(Key::Theme),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
