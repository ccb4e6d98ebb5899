mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::ThreadRng;
use rand::thread_rng;

use display::Viewport;
use safe_voyage::catalog::{UpgradeId, DECK_HEIGHT, DECK_WIDTH};
use safe_voyage::entities::{GameState, Screen};
use safe_voyage::geometry::Vec2;
use safe_voyage::storage::FileStore;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Deck units the aiming cursor moves per step.
const CURSOR_STEP: f64 = 15.0;

/// Min frames between cursor steps while an arrow key is held.
const MOVE_COOLDOWN: u32 = 2;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 4;

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .is_some_and(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
}

// ── Save location ─────────────────────────────────────────────────────────────

fn save_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SAFE_VOYAGE_DATA") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".safe_voyage")
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// One-shot key presses, handled per screen. Returns `true` to quit.
fn handle_press(
    state: &mut GameState,
    code: KeyCode,
    cursor_pos: Vec2,
    rng: &mut ThreadRng,
) -> bool {
    if matches!(code, KeyCode::Char('q') | KeyCode::Char('Q')) {
        return true;
    }

    match state.screen {
        Screen::Start => match code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                state.start_run(rng);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                state.open_shop();
            }
            _ => {}
        },
        Screen::Playing => {
            if let Some(active) = &state.active_dialog {
                let options = active.dialog.options;
                if let KeyCode::Char(c @ '1'..='9') = code {
                    let index = c as usize - '1' as usize;
                    if let Some(option) = options.get(index) {
                        state.resolve_dialog(option, rng);
                    }
                }
                return false;
            }
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    state.handle_click(cursor_pos.x, cursor_pos.y, rng);
                }
                KeyCode::Char('h') | KeyCode::Char('H') => {
                    state.use_whistle();
                }
                _ => {}
            }
        }
        Screen::LevelComplete => match code {
            KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('N') => {
                state.next_level(rng);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                state.open_shop();
            }
            _ => {}
        },
        Screen::Shop => match code {
            KeyCode::Char('1') => {
                state.buy_upgrade(UpgradeId::Speed);
            }
            KeyCode::Char('2') => {
                state.buy_upgrade(UpgradeId::Whistle);
            }
            KeyCode::Char('3') => {
                state.buy_upgrade(UpgradeId::Radar);
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                state.next_level(rng);
            }
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('B') => {
                state.close_shop();
            }
            _ => {}
        },
        Screen::GameOver | Screen::Victory => match code {
            KeyCode::Char('r') | KeyCode::Char('R') => {
                state.start_run(rng);
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                state.return_to_start();
            }
            _ => {}
        },
    }
    false
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Arrow keys aim a cursor over the deck. Held keys are tracked in a
/// `key_frame` map (frame of the last press/repeat) so holding two arrows
/// moves diagonally, and terminals without release events still work.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let mut rng = thread_rng();

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut move_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut cursor_pos = Vec2::new(DECK_WIDTH / 2.0, DECK_HEIGHT / 2.0 - 60.0);
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code.clone(), frame);
                    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }
                    if handle_press(state, code, cursor_pos, &mut rng) {
                        return Ok(());
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        if state.screen == Screen::Playing && move_cooldown == 0 {
            let mut step = Vec2::default();
            if is_held(&key_frame, &KeyCode::Left, frame) {
                step.x -= CURSOR_STEP;
            }
            if is_held(&key_frame, &KeyCode::Right, frame) {
                step.x += CURSOR_STEP;
            }
            if is_held(&key_frame, &KeyCode::Up, frame) {
                step.y -= CURSOR_STEP;
            }
            if is_held(&key_frame, &KeyCode::Down, frame) {
                step.y += CURSOR_STEP;
            }
            if step != Vec2::default() {
                cursor_pos.x = (cursor_pos.x + step.x).clamp(0.0, DECK_WIDTH);
                cursor_pos.y = (cursor_pos.y + step.y).clamp(0.0, DECK_HEIGHT);
                move_cooldown = MOVE_COOLDOWN;
            }
        }
        move_cooldown = move_cooldown.saturating_sub(1);

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f64();
        last = now;
        state.update(dt, &mut rng);

        let (width, height) = terminal::size()?;
        display::render(out, state, Viewport { width, height }, cursor_pos)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    env_logger::init();

    let dir = save_dir();
    log::info!("Saving progress under {}", dir.display());
    let mut state = GameState::new(Box::new(FileStore::new(dir)));
    state.load_progress();

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking event reads live on their own thread so the frame loop never waits on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = game_loop(&mut out, &mut state, &rx);
    state.save_progress();

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
