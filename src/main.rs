use std::io::{self, Write};
use std::{fs, process};

use anyhow::{bail, Context, Result};

use scene_animator::{
    engine::{source::PropertyChange, Engine},
    player::{play_interactive, ClockMode, FrameOutcome, Player, PlayerConfig, CANVAS_OFFSET},
    renderer::{RecordingAdapter, TerminalAdapter},
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "scene-animator play <animation.json>";
const TRACE_USAGE: &str = "scene-animator trace <animation.json> [frames]";
const CHECK_USAGE: &str = "scene-animator check <animation.json>";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("play") => {
            let path = args.next().context(PLAY_USAGE)?;
            play(&path)
        }
        Some("trace") => {
            let path = args.next().context(TRACE_USAGE)?;
            trace(&path, args.next().as_deref())
        }
        Some("check") => {
            let path = args.next().context(CHECK_USAGE)?;
            check(&path)
        }
        _ => bail!(
            "scene-animator: declarative 3-D animation interpreter\n\nUsage:\n  {PLAY_USAGE}\n  {TRACE_USAGE}\n  {CHECK_USAGE}"
        ),
    }
}

fn read(path: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
}

fn play(path: &str) -> Result<()> {
    let json = read(path)?;
    let config = PlayerConfig::load();

    let (term_w, term_h) = crossterm::terminal::size()?;
    // One row for the menu bar, one for the status bar.
    if term_w < 20 || term_h < CANVAS_OFFSET + 6 {
        bail!("Terminal too small: need at least 20x{}, have {term_w}x{term_h}", CANVAS_OFFSET + 6);
    }
    let canvas_h = term_h - CANVAS_OFFSET - 1;

    let mut adapter =
        TerminalAdapter::new(term_w, canvas_h, CANVAS_OFFSET, config.world_units_per_cell);
    let engine =
        Engine::from_json(&json, &mut adapter).with_context(|| format!("Failed to load {path}"))?;

    let mut player = Player::new(engine, config.clock_mode());
    play_interactive(&mut player, &mut adapter, &config, canvas_h)?;
    player.into_engine().teardown(&mut adapter)?;
    Ok(())
}

fn trace(path: &str, frames: Option<&str>) -> Result<()> {
    let json = read(path)?;
    let config = PlayerConfig::load();

    let mut adapter = RecordingAdapter::new();
    let engine =
        Engine::from_json(&json, &mut adapter).with_context(|| format!("Failed to load {path}"))?;

    let step = config.frame_step;
    let frames = match frames {
        Some(s) => s
            .parse::<u64>()
            .with_context(|| format!("Invalid frame count '{s}'\n\nUsage: {TRACE_USAGE}"))?,
        None => (engine.duration() / step).ceil() as u64 + 1,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut player = Player::new(engine, ClockMode::Fixed(step));
    player.seek(0.0, &mut adapter)?;
    writeln!(out, "{}", serde_json::to_string(&player.engine().snapshot())?)?;

    player.play();
    let mut traced = 1;
    while traced < frames && player.is_frame_requested() {
        if player.on_frame(&mut adapter)? == FrameOutcome::Finished {
            break;
        }
        writeln!(out, "{}", serde_json::to_string(&player.engine().snapshot())?)?;
        traced += 1;
    }
    out.flush()?;

    eprintln!(
        "Traced {traced} frames ({} rendered) from {path}",
        adapter.frames_rendered()
    );
    Ok(())
}

fn check(path: &str) -> Result<()> {
    let json = read(path)?;
    let mut adapter = RecordingAdapter::new();
    let engine =
        Engine::from_json(&json, &mut adapter).with_context(|| format!("Failed to load {path}"))?;
    let def = engine.definition();
    let registry = engine.registry();

    println!(
        "{}: {}s{}",
        def.scene.as_deref().unwrap_or("animation"),
        def.duration,
        if def.looping { " (looping)" } else { "" },
    );

    println!("actors ({}):", registry.len());
    for actor in registry.iter() {
        let mut line = format!("  {:<16} {:<16}", actor.id, actor.kind.name());
        if actor.is_placeholder() {
            line.push_str(" placeholder");
        }
        if let Some(orbit) = actor.orbit() {
            line.push_str(&format!(" orbit r={} speed={}", orbit.radius, orbit.speed));
        }
        println!("{line}");
    }

    let mut dangling = 0;
    let mut ignored = 0;
    for event in &def.timeline {
        for assignment in &event.properties {
            if registry.get(&assignment.key.actor_id).is_none() {
                println!("  key '{}' names no actor", assignment.key);
                dangling += 1;
            } else if assignment.change == PropertyChange::Ignored {
                ignored += 1;
            }
        }
    }
    println!(
        "timeline: {} events ({dangling} dangling keys, {ignored} ignored properties)",
        def.timeline.len()
    );
    println!("annotations: {}", def.annotations.len());
    Ok(())
}
