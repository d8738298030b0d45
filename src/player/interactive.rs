//! Interactive terminal playback.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::event::{self, KeyEventKind};
use crossterm::{cursor, execute, queue, style, terminal};

use crate::errors::{AnimatorError, Result};
use crate::menubar::print_menu_item;
use crate::renderer::TerminalAdapter;

use super::config::{matches_binding, PlayerConfig};
use super::{FrameOutcome, PlaybackState, Player};

/// Rows reserved above the canvas for the menu bar.
pub const CANVAS_OFFSET: u16 = 1;

/// Play in the terminal until the user quits.
///
/// Sets up the terminal, runs the frame loop, and restores the terminal on
/// exit (even on error). `adapter` must be the adapter the player's engine
/// was loaded with, sized `canvas_height` rows tall.
pub fn play_interactive(
    player: &mut Player,
    adapter: &mut TerminalAdapter,
    config: &PlayerConfig,
    canvas_height: u16,
) -> Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode().map_err(|e| AnimatorError::Terminal(e.to_string()))?;
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::Clear(terminal::ClearType::All),
    )?;

    let result = run_loop(player, adapter, config, canvas_height, &mut stdout);

    // Always restore terminal state.
    let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run_loop(
    player: &mut Player,
    adapter: &mut TerminalAdapter,
    config: &PlayerConfig,
    canvas_height: u16,
    stdout: &mut io::Stdout,
) -> Result<()> {
    let bindings = &config.key_bindings;
    let step = Duration::from_secs_f32(config.frame_step);

    render_menubar(stdout, config)?;
    player.seek(0.0, adapter)?;
    player.play();
    render_status(stdout, player, canvas_height)?;

    let mut next_frame = Instant::now() + step;
    loop {
        let timeout = next_frame.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            match event::read()? {
                event::Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if matches_binding(&bindings.quit, &key) || key.code == event::KeyCode::Esc {
                        break;
                    } else if matches_binding(&bindings.toggle_pause, &key) {
                        player.toggle();
                    } else if matches_binding(&bindings.restart, &key) {
                        player.stop();
                        player.seek(0.0, adapter)?;
                        player.play();
                    }
                    render_status(stdout, player, canvas_height)?;
                }
                event::Event::Resize(_, _) => {
                    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
                    adapter.invalidate();
                    render_menubar(stdout, config)?;
                    player.seek(player.time(), adapter)?;
                    render_status(stdout, player, canvas_height)?;
                }
                _ => {}
            }
            continue;
        }

        next_frame += step;
        if player.is_frame_requested() {
            if player.on_frame(adapter)? == FrameOutcome::Looped {
                log::debug!("Animation looped");
            }
            render_status(stdout, player, canvas_height)?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Chrome
// ---------------------------------------------------------------------------

fn render_menubar(stdout: &mut io::Stdout, config: &PlayerConfig) -> Result<()> {
    let b = &config.key_bindings;
    let items = [
        format!("[{}] play/pause", b.toggle_pause),
        format!("[{}] restart", b.restart),
        format!("[{}][Esc] quit", b.quit),
    ];

    queue!(
        stdout,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::Print(" "),
    )?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            queue!(stdout, style::Print("  "))?;
        }
        print_menu_item(stdout, item)?;
    }
    stdout.flush()?;
    Ok(())
}

fn render_status(stdout: &mut io::Stdout, player: &Player, canvas_height: u16) -> Result<()> {
    let status_y = canvas_height + CANVAS_OFFSET;
    let (_, term_h) = terminal::size()?;
    if status_y >= term_h {
        return Ok(()); // No room for status bar.
    }

    let engine = player.engine();
    let state = match player.state() {
        PlaybackState::Playing => "PLAYING",
        PlaybackState::Paused => "PAUSED",
        PlaybackState::Stopped => "STOPPED",
    };
    let scene = engine.definition().scene.as_deref().unwrap_or("scene");
    let status = format!(
        " {scene} | {state} | {:6.2}s / {:.2}s{} ",
        player.time(),
        engine.duration(),
        if engine.looping() { " (loop)" } else { "" },
    );

    let mut cs = style::ContentStyle::default();
    cs.attributes.set(style::Attribute::Dim);

    queue!(
        stdout,
        cursor::MoveTo(0, status_y),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::PrintStyledContent(style::StyledContent::new(cs, status)),
    )?;
    stdout.flush()?;
    Ok(())
}
