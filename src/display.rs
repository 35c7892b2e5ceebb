//! Rendering layer.  All terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable snapshot of the
//! session.  No game logic is performed; this module only scales arena
//! coordinates onto the terminal grid and translates them into commands.

use std::io::Write;
use std::time::Duration;

use arcade_shooter::entities::{
    Arena, BannerKind, Bullet, BulletSource, Enemy, EnemyKind, GameStatus, Turret,
};
use arcade_shooter::waves::WavePhase;
use arcade_shooter::Snapshot;
use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_TIME: Color = Color::White;
const C_HUD_WAVE: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_ENEMY_WEAK: Color = Color::Green;
const C_ENEMY_TOUGH: Color = Color::Yellow;
const C_ENEMY_ARMOURED: Color = Color::Red;
const C_BOSS: Color = Color::Magenta;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_TURRET: Color = Color::Yellow;
const C_TURRET: Color = Color::Cyan;
const C_WAVE_BANNER: Color = Color::Yellow;
const C_WARNING_BANNER: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Terminal area the arena is scaled into.  Rows 0 and `height-1` hold the
/// HUD and the controls hint; the border takes one cell on each side.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    fn inner_cols(&self) -> f32 {
        self.width.saturating_sub(2).max(1) as f32
    }

    fn inner_rows(&self) -> f32 {
        self.height.saturating_sub(4).max(1) as f32
    }

    fn col(&self, x: f32, arena: &Arena) -> u16 {
        let c = 1.0 + (x / arena.width * self.inner_cols()).floor();
        c.clamp(1.0, self.inner_cols()) as u16
    }

    fn row(&self, y: f32, arena: &Arena) -> u16 {
        let r = 2.0 + (y / arena.height * self.inner_rows()).floor();
        r.clamp(2.0, self.inner_rows() + 1.0) as u16
    }

    fn span(&self, size: f32, arena: &Arena) -> u16 {
        ((size / arena.width * self.inner_cols()).round() as u16).max(1)
    }

    /// Whether an arena point lies on the visible field (enemies start above it).
    fn visible(&self, y: f32, arena: &Arena) -> bool {
        y >= 0.0 && y <= arena.height
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, view: Viewport, snap: &Snapshot) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, view, snap)?;

    let arena = &snap.state.arena;
    for turret in &snap.state.turrets {
        draw_turret(out, view, arena, turret)?;
    }
    for enemy in &snap.state.enemies {
        draw_enemy(out, view, arena, enemy)?;
    }
    for bullet in &snap.state.bullets {
        draw_bullet(out, view, arena, bullet)?;
    }

    draw_player(out, view, snap)?;
    draw_banners(out, view, snap)?;
    draw_controls_hint(out, view, snap)?;

    match snap.state.status {
        GameStatus::Paused => draw_paused(out, view)?,
        GameStatus::GameOver => draw_game_over(out, view, snap)?,
        GameStatus::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2: bottom bar
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn format_time(elapsed: Duration) -> String {
    format!("{}s", elapsed.as_secs())
}

fn draw_hud<W: Write>(out: &mut W, view: Viewport, snap: &Snapshot) -> std::io::Result<()> {
    // Score and survival time, left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", snap.state.score)))?;
    out.queue(style::SetForegroundColor(C_HUD_TIME))?;
    out.queue(Print(format!("  Time: {}", format_time(snap.state.elapsed))))?;

    // Stage / wave, centre
    let wave_str = match snap.wave_phase {
        Some(WavePhase::StageExhausted) => "[ ALL CLEAR ]".to_string(),
        Some(_) => format!(
            "[ STAGE {}  WAVE {} ]",
            snap.stage_index + 1,
            snap.wave_index + 1
        ),
        None => "[ CLASSIC ]".to_string(),
    };
    let wx = (view.width / 2).saturating_sub(wave_str.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(wx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_WAVE))?;
    out.queue(Print(&wave_str))?;

    // Turrets, right
    let turret_str = format!(
        "Turrets {}/{} ({} pts)",
        snap.state.turrets.len(),
        snap.turret_limit,
        snap.turret_cost
    );
    let rx = view
        .width
        .saturating_sub(turret_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_TURRET))?;
    out.queue(Print(&turret_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, view: Viewport, snap: &Snapshot) -> std::io::Result<()> {
    // Sprite (2 rows, 3 cols):
    //   ▲       ← row y      (tip)
    //  /█\      ← row y+1    (fuselage + wings)
    let arena = &snap.state.arena;
    let p = &snap.state.player;
    let cx = view.col(p.x + p.size / 2.0, arena);
    let y = view.row(p.y, arena);
    out.queue(style::SetForegroundColor(C_PLAYER))?;

    out.queue(cursor::MoveTo(cx, y))?;
    out.queue(Print("▲"))?;

    let wing_y = y + 1;
    if wing_y < view.height.saturating_sub(2) {
        out.queue(cursor::MoveTo(cx.saturating_sub(1).max(1), wing_y))?;
        out.queue(Print("/█\\"))?;
    }

    Ok(())
}

fn enemy_color(hp: u32) -> Color {
    match hp {
        0 | 1 => C_ENEMY_WEAK,
        2 => C_ENEMY_TOUGH,
        _ => C_ENEMY_ARMOURED,
    }
}

fn draw_enemy<W: Write>(
    out: &mut W,
    view: Viewport,
    arena: &Arena,
    enemy: &Enemy,
) -> std::io::Result<()> {
    if !view.visible(enemy.y + enemy.size(), arena) {
        return Ok(());
    }
    let x = view.col(enemy.x, arena);
    let y = view.row(enemy.y.max(0.0), arena);

    match enemy.kind {
        EnemyKind::Normal => {
            // One cell, coloured by remaining hp.
            out.queue(style::SetForegroundColor(enemy_color(enemy.hp)))?;
            out.queue(cursor::MoveTo(x, y))?;
            out.queue(Print("▼"))?;
        }
        EnemyKind::Boss(_) => {
            // Solid block scaled to the boss size, hp label on top.
            let cols = view.span(enemy.size(), arena);
            let rows = ((cols as f32) / 2.0).ceil().max(1.0) as u16;
            out.queue(style::SetForegroundColor(C_BOSS))?;
            if y > 2 {
                out.queue(cursor::MoveTo(x, y - 1))?;
                out.queue(Print(format!("HP:{}", enemy.hp)))?;
            }
            for r in 0..rows {
                let row = y + r;
                if row >= view.height.saturating_sub(2) {
                    break;
                }
                out.queue(cursor::MoveTo(x, row))?;
                out.queue(Print("█".repeat(cols as usize)))?;
            }
        }
    }
    Ok(())
}

fn draw_bullet<W: Write>(
    out: &mut W,
    view: Viewport,
    arena: &Arena,
    bullet: &Bullet,
) -> std::io::Result<()> {
    if !view.visible(bullet.y, arena) {
        return Ok(());
    }
    out.queue(cursor::MoveTo(view.col(bullet.x, arena), view.row(bullet.y, arena)))?;
    match bullet.source {
        BulletSource::Player => {
            out.queue(style::SetForegroundColor(C_BULLET_PLAYER))?;
            out.queue(Print("║"))?;
        }
        BulletSource::Turret => {
            out.queue(style::SetForegroundColor(C_BULLET_TURRET))?;
            out.queue(Print("·"))?;
        }
    }
    Ok(())
}

fn draw_turret<W: Write>(
    out: &mut W,
    view: Viewport,
    arena: &Arena,
    turret: &Turret,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(view.col(turret.x, arena), view.row(turret.y, arena)))?;
    out.queue(style::SetForegroundColor(if turret.ammo > 0 {
        C_TURRET
    } else {
        C_HINT
    }))?;
    out.queue(Print("▣"))?;
    Ok(())
}

// ── Banners ───────────────────────────────────────────────────────────────────

fn draw_banners<W: Write>(out: &mut W, view: Viewport, snap: &Snapshot) -> std::io::Result<()> {
    let cx = view.width / 2;
    let top = view.height / 3;
    for (i, banner) in snap.banners.iter().enumerate() {
        let color = match banner.kind {
            BannerKind::ThreatApproaching => C_WARNING_BANNER,
            _ => C_WAVE_BANNER,
        };
        let col = cx.saturating_sub(banner.text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, top + i as u16 * 2))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(&banner.text))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(
    out: &mut W,
    view: Viewport,
    snap: &Snapshot,
) -> std::io::Result<()> {
    let pause = if snap.state.status == GameStatus::Paused {
        "P : Resume"
    } else {
        "P : Pause"
    };
    out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(format!(
        "← → / A D : Move   SPACE : Shoot   T : Turret   {}   R : Restart   Q : Quit",
        pause
    )))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    view: Viewport,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let cx = view.width / 2;
    let start_row = (view.height / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

fn draw_paused<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    draw_centered(
        out,
        view,
        &[
            ("╔══════════════╗", Color::Cyan),
            ("║    PAUSED    ║", Color::Cyan),
            ("╚══════════════╝", Color::Cyan),
        ],
    )
}

fn draw_game_over<W: Write>(out: &mut W, view: Viewport, snap: &Snapshot) -> std::io::Result<()> {
    let score_line = format!("Score: {}", snap.state.score);
    let time_line = format!("Survived: {}", format_time(snap.state.elapsed));
    draw_centered(
        out,
        view,
        &[
            ("╔════════════════════╗", Color::Red),
            ("║    GAME  OVER      ║", Color::Red),
            ("╚════════════════════╝", Color::Red),
            (score_line.as_str(), Color::Yellow),
            (time_line.as_str(), Color::White),
            ("R - Play Again  M - Menu  Q - Quit", Color::White),
        ],
    )
}
