//! Rendering layer: all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state. No game logic is performed; deck coordinates are scaled onto
//! the terminal grid and every frame is redrawn from scratch.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use safe_voyage::catalog::{self, ObstacleKind, DECK_HEIGHT, DECK_WIDTH, UPGRADE_STORE};
use safe_voyage::entities::{GameState, HazardState, Npc, NpcType, Screen};
use safe_voyage::geometry::Vec2;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::Yellow;
const C_COINS: Color = Color::DarkYellow;
const C_ACCIDENTS: Color = Color::Red;
const C_PLAYER: Color = Color::Blue;
const C_TARGET: Color = Color::DarkCyan;
const C_CURSOR: Color = Color::White;
const C_OBSTACLE: Color = Color::DarkGrey;
const C_SAFE: Color = Color::Green;
const C_STUNNED: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

/// Units around the player that stay visible on night levels.
const NIGHT_SIGHT: f64 = 160.0;

/// Terminal cell range the deck is drawn into.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    fn left(&self) -> f64 {
        1.0
    }
    fn top(&self) -> f64 {
        2.0
    }
    fn cols(&self) -> f64 {
        (self.width.saturating_sub(3)) as f64
    }
    fn rows(&self) -> f64 {
        (self.height.saturating_sub(5)) as f64
    }

    /// Deck position → terminal cell.
    pub fn to_cell(&self, p: Vec2) -> (u16, u16) {
        let col = self.left() + (p.x / DECK_WIDTH * self.cols()).round();
        let row = self.top() + (p.y / DECK_HEIGHT * self.rows()).round();
        (col.max(0.0) as u16, row.max(0.0) as u16)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame. `cursor_pos` is the deck point a click would hit.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    view: Viewport,
    cursor_pos: Vec2,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, state, view)?;

    match state.screen {
        Screen::Playing => {
            draw_obstacles(out, view)?;
            draw_npcs(out, state, view)?;
            draw_player(out, state, view)?;
            draw_cursor(out, view, cursor_pos)?;
            if state.active_dialog.is_some() {
                draw_dialog(out, state, view)?;
            }
        }
        Screen::Start => draw_start(out, state, view)?,
        Screen::LevelComplete => draw_level_complete(out, state, view)?,
        Screen::Shop => draw_shop(out, state, view)?,
        Screen::GameOver => draw_game_over(out, state, view)?,
        Screen::Victory => draw_victory(out, state, view)?,
    }

    draw_controls_hint(out, state, view)?;

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border & HUD ──────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, state: &GameState, view: Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!("Score:{:>6} ", state.score)))?;
    out.queue(style::SetForegroundColor(C_COINS))?;
    out.queue(Print(format!("Coins:{:>5} ", state.coins)))?;

    if state.screen != Screen::Playing {
        return Ok(());
    }
    let Some(level) = state.level_config() else {
        return Ok(());
    };

    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(format!(
        "[{} - Lv {}] {:>3}s ",
        level.name,
        state.current_level_index + 1,
        state.time_remaining().ceil()
    )))?;
    out.queue(style::SetForegroundColor(C_ACCIDENTS))?;
    out.queue(Print(format!(
        "Accidents {}/{} ",
        state.accidents, level.allowed_accidents
    )))?;
    if level.is_night {
        out.queue(style::SetForegroundColor(Color::DarkBlue))?;
        out.queue(Print("NIGHT "))?;
    }
    if level.is_party {
        out.queue(style::SetForegroundColor(Color::Magenta))?;
        out.queue(Print("PARTY "))?;
    }

    if state.upgrades.whistle > 0 {
        let tag = if state.whistle_cooldown > 0.0 {
            format!("Whistle {:>2}s", state.whistle_cooldown.ceil())
        } else {
            "Whistle READY".to_string()
        };
        let x = view.width.saturating_sub(tag.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(x, 0))?;
        out.queue(style::SetForegroundColor(C_STUNNED))?;
        out.queue(Print(tag))?;
    }
    Ok(())
}

// ── Deck ──────────────────────────────────────────────────────────────────────

fn draw_obstacles<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_OBSTACLE))?;
    for obstacle in &catalog::OBSTACLES {
        let r = obstacle.rect;
        let (c0, r0) = view.to_cell(Vec2::new(r.x, r.y));
        let (c1, r1) = view.to_cell(Vec2::new(r.x + r.w, r.y + r.h));
        let fill = match obstacle.kind {
            ObstacleKind::Bar => "▓",
            ObstacleKind::Chairs => "h",
            ObstacleKind::Equipment => "▒",
        };
        for row in r0..=r1 {
            out.queue(cursor::MoveTo(c0, row))?;
            out.queue(Print(fill.repeat((c1 - c0 + 1) as usize)))?;
        }
    }
    Ok(())
}

fn npc_glyph(kind: NpcType) -> &'static str {
    match kind {
        NpcType::PhotoJunkie => "p",
        NpcType::Curious => "c",
        NpcType::Family => "f",
        NpcType::Trendy => "t",
        NpcType::PartyGuest => "g",
        NpcType::Vip => "v",
    }
}

fn npc_color(npc: &Npc) -> Color {
    if npc.is_stunned() {
        return C_STUNNED;
    }
    match npc.state {
        HazardState::Safe => C_SAFE,
        HazardState::Yellow => Color::Yellow,
        HazardState::Orange => Color::DarkYellow,
        HazardState::Red => Color::Red,
        HazardState::Accident => Color::Magenta,
    }
}

fn draw_npcs<W: Write>(out: &mut W, state: &GameState, view: Viewport) -> std::io::Result<()> {
    let night = state.level_config().is_some_and(|c| c.is_night);
    let radar = state.radar_contacts();
    let player = state.player.body.pos;

    for npc in &state.npcs {
        let visible = !night
            || npc.body.pos.distance(player) <= NIGHT_SIGHT
            || radar.iter().any(|c| c.npc_id == npc.id);
        if !visible {
            continue;
        }
        let (col, row) = view.to_cell(npc.body.pos);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(npc_color(npc)))?;
        let glyph = match npc.state {
            HazardState::Accident => "X",
            HazardState::Safe => npc_glyph(npc.kind),
            _ => "!",
        };
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, state: &GameState, view: Viewport) -> std::io::Result<()> {
    let body = &state.player.body;
    if let Some(target) = body.target {
        let (col, row) = view.to_cell(target);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_TARGET))?;
        out.queue(Print("·"))?;
    }
    let (col, row) = view.to_cell(body.pos);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(Print("@"))?;
    Ok(())
}

fn draw_cursor<W: Write>(out: &mut W, view: Viewport, pos: Vec2) -> std::io::Result<()> {
    let (col, row) = view.to_cell(pos);
    out.queue(cursor::MoveTo(col, row.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_CURSOR))?;
    out.queue(Print("v"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

/// Centered block of colored lines.
fn draw_box<W: Write>(
    out: &mut W,
    view: Viewport,
    lines: &[(String, Color)],
) -> std::io::Result<()> {
    let cx = view.width / 2;
    let start_row = (view.height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}

fn draw_dialog<W: Write>(out: &mut W, state: &GameState, view: Viewport) -> std::io::Result<()> {
    let Some(active) = &state.active_dialog else {
        return Ok(());
    };
    let mut lines = vec![
        (format!("── {} ──", active.dialog.action_name), Color::Yellow),
        (format!("\"{}\"", active.dialog.excuse), Color::White),
        (String::new(), Color::White),
    ];
    for (i, option) in active.dialog.options.iter().enumerate() {
        lines.push((format!("[{}] {}", i + 1, option.text), Color::Cyan));
    }
    draw_box(out, view, &lines)
}

fn draw_start<W: Write>(out: &mut W, state: &GameState, view: Viewport) -> std::io::Result<()> {
    let mut lines = vec![
        ("★  SAFE  VOYAGE  ★".to_string(), Color::Cyan),
        (String::new(), Color::White),
        ("Keep the passengers safe until the timer runs out.".to_string(), Color::White),
    ];
    if let Some(level) = state.saved_level_index {
        lines.push((format!("Last saved at level {}", level + 1), Color::DarkGrey));
    }
    lines.push((String::new(), Color::White));
    lines.push(("ENTER - Start   S - Shop   Q - Quit".to_string(), Color::White));
    draw_box(out, view, &lines)
}

fn draw_level_complete<W: Write>(
    out: &mut W,
    state: &GameState,
    view: Viewport,
) -> std::io::Result<()> {
    let lines = vec![
        (format!("Level {} complete!", state.current_level_index + 1), Color::Green),
        (format!("Accidents: {}", state.accidents), Color::White),
        (format!("Coins: {}", state.coins), C_COINS),
        (String::new(), Color::White),
        ("N - Next level   S - Shop".to_string(), Color::White),
    ];
    draw_box(out, view, &lines)
}

fn draw_shop<W: Write>(out: &mut W, state: &GameState, view: Viewport) -> std::io::Result<()> {
    let mut lines = vec![
        ("── Upgrade Store ──".to_string(), Color::Yellow),
        (format!("Coins: {}", state.coins), C_COINS),
        (String::new(), Color::White),
    ];
    for (i, upgrade) in UPGRADE_STORE.iter().enumerate() {
        let level = state.upgrades.level(upgrade.id);
        let price = match state.upgrade_cost(upgrade.id) {
            Some(cost) => format!("{cost} coins"),
            None => "MAX".to_string(),
        };
        let color = match state.upgrade_cost(upgrade.id) {
            Some(cost) if cost <= state.coins => Color::Green,
            Some(_) => Color::DarkGrey,
            None => Color::Cyan,
        };
        lines.push((
            format!(
                "[{}] {} {}/{} - {}",
                i + 1,
                upgrade.name,
                level,
                upgrade.max_level,
                price
            ),
            color,
        ));
        lines.push((format!("    {}", upgrade.description), Color::DarkGrey));
    }
    lines.push((String::new(), Color::White));
    lines.push(("ESC - Back   N - Next level".to_string(), Color::White));
    draw_box(out, view, &lines)
}

fn draw_game_over<W: Write>(out: &mut W, state: &GameState, view: Viewport) -> std::io::Result<()> {
    let lines = vec![
        ("╔════════════════════╗".to_string(), Color::Red),
        ("║    GAME  OVER      ║".to_string(), Color::Red),
        ("╚════════════════════╝".to_string(), Color::Red),
        (format!("Score: {:>6}", state.score), Color::Yellow),
        ("R - Try again   M - Menu   Q - Quit".to_string(), Color::White),
    ];
    draw_box(out, view, &lines)
}

fn draw_victory<W: Write>(out: &mut W, state: &GameState, view: Viewport) -> std::io::Result<()> {
    let lines = vec![
        ("★ SAFE VOYAGE! ★".to_string(), Color::Yellow),
        ("Every passenger made it home.".to_string(), Color::White),
        (format!("Final score: {:>6}", state.score), Color::Yellow),
        ("R - Play again   M - Menu   Q - Quit".to_string(), Color::White),
    ];
    draw_box(out, view, &lines)
}

fn draw_controls_hint<W: Write>(
    out: &mut W,
    state: &GameState,
    view: Viewport,
) -> std::io::Result<()> {
    if state.screen != Screen::Playing {
        return Ok(());
    }
    out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    let hint = if state.active_dialog.is_some() {
        "1-3 : Answer"
    } else {
        "← ↑ → ↓ : Aim   SPACE : Walk / Intervene   H : Whistle   Q : Quit"
    };
    out.queue(Print(hint))?;
    Ok(())
}
