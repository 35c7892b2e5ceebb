mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use arcade_shooter::config::SpawnPolicy;
use arcade_shooter::entities::GameStatus;
use arcade_shooter::{Game, GameConfig, InputState};

use display::Viewport;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Config file looked up in the working directory when no path is given.
const DEFAULT_CONFIG_FILE: &str = "shooter.toml";

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── Logging & config ──────────────────────────────────────────────────────────

/// Open the log file, or explain on stderr why logging is off.  Must run
/// before raw mode so the notice is readable.
fn open_log_file<E: Write>(path: &str, err_out: &mut E) -> Option<File> {
    match File::create(path) {
        Ok(file) => Some(file),
        Err(err) => {
            let _ = writeln!(err_out, "SHOOTER_LOG={}: {}; logging disabled", path, err);
            None
        }
    }
}

/// Logs go to the file named by `SHOOTER_LOG`; the terminal belongs to the
/// game.  `RUST_LOG` filters as usual (default `info`).
fn init_tracing() {
    let Ok(path) = std::env::var("SHOOTER_LOG") else {
        return;
    };
    let Some(file) = open_log_file(&path, &mut std::io::stderr()) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .compact()
        .try_init();
}

fn load_config() -> GameConfig {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if !path.exists() {
        return GameConfig::default();
    }
    match GameConfig::load(&path) {
        Ok(config) => {
            info!(path = %path.display(), "config loaded");
            config
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "config rejected, using defaults");
            GameConfig::default()
        }
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(SpawnPolicy),
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  ARCADE  SHOOTER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(10), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select mode:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Classic", Color::Green, "Endless trickle down fixed lanes"),
        ("2", "Waves  ", Color::Red, "Staged waves, bosses and turrets"),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(10), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" - {}", desc)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(10), cy + 3))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Your ship fires on its own; SPACE adds extra shots."))?;
    out.queue(cursor::MoveTo(cx.saturating_sub(10), cy + 4))?;
    out.queue(Print("T buys a turret once your score covers its cost."))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        if let Ok(Event::Key(KeyEvent { code, kind, .. })) = rx.recv() {
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Char('1') => return Ok(MenuResult::Start(SpawnPolicy::Lanes)),
                KeyCode::Char('2') => return Ok(MenuResult::Start(SpawnPolicy::Waves)),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Menu,
}

/// Drives one session until the player quits or returns to the menu.
///
/// Input model: held keys are tracked in a `key_frame` map recording the
/// frame of the last press/repeat event.  Each frame the still-fresh
/// direction keys become the `InputState` for `Game::update`; one-shot keys
/// (fire, turret, pause, restart) call the matching `Game::on_*` handler as
/// soon as they are pressed.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut Game,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<LoopExit> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code.clone(), frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(LoopExit::Quit);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(LoopExit::Quit);
                        }
                        KeyCode::Char('m') | KeyCode::Char('M')
                            if game.status() == GameStatus::GameOver =>
                        {
                            return Ok(LoopExit::Menu);
                        }
                        KeyCode::Char(' ') => game.on_fire_requested(),
                        KeyCode::Char('t') | KeyCode::Char('T') => {
                            game.on_place_turret_requested();
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => game.on_pause_toggle(),
                        KeyCode::Char('r') | KeyCode::Char('R') => game.on_restart(),
                        _ => {}
                    }
                }
                // Repeat: refresh timestamp so key stays "held"
                KeyEventKind::Repeat => {
                    key_frame.insert(code.clone(), frame);
                }
                // Release: remove key immediately (keyboard-enhancement path)
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let left = is_held(&key_frame, &KeyCode::Left, frame)
            || is_held(&key_frame, &KeyCode::Char('a'), frame)
            || is_held(&key_frame, &KeyCode::Char('A'), frame);
        let right = is_held(&key_frame, &KeyCode::Right, frame)
            || is_held(&key_frame, &KeyCode::Char('d'), frame)
            || is_held(&key_frame, &KeyCode::Char('D'), frame);

        let now = Instant::now();
        let dt = now - last;
        last = now;

        let snapshot = game.update(InputState { left, right, dt });

        let (width, height) = terminal::size()?;
        display::render(out, Viewport { width, height }, &snapshot)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    init_tracing();
    let config = load_config();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &config);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &GameConfig,
) -> std::io::Result<()> {
    loop {
        match show_menu(out, rx)? {
            MenuResult::Quit => break,
            MenuResult::Start(spawn_policy) => {
                let mut game = Game::new(GameConfig {
                    spawn_policy,
                    ..config.clone()
                });
                info!(?spawn_policy, "session started");
                match game_loop(out, &mut game, rx)? {
                    LoopExit::Quit => break,
                    LoopExit::Menu => {}
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritable_log_path_is_reported() {
        let mut err_out: Vec<u8> = Vec::new();
        let path = "/nonexistent-dir/shooter.log";
        assert!(open_log_file(path, &mut err_out).is_none());

        let notice = String::from_utf8(err_out).unwrap();
        assert!(notice.starts_with("SHOOTER_LOG=/nonexistent-dir/shooter.log"));
        assert!(notice.contains("logging disabled"));
    }

    #[test]
    fn writable_log_path_opens_quietly() {
        let mut err_out: Vec<u8> = Vec::new();
        let path = std::env::temp_dir().join("arcade_shooter_log_test.log");
        let file = open_log_file(&path.to_string_lossy(), &mut err_out);
        assert!(file.is_some());
        assert!(err_out.is_empty());
        let _ = std::fs::remove_file(path);
    }
}
