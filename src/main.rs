use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use gruvtty::audio;
use gruvtty::middle::Middle;
use gruvtty::pipeline::{self, config_dir};
use gruvtty::sequencer::Sequencer;
use gruvtty::tui;

const DEFAULT_BOUNCE_BARS: u32 = 4;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        // gruvtty bounce <out.wav> [bars] [project_dir]
        Some("bounce") => {
            let out = args.get(1).context("usage: gruvtty bounce <out.wav> [bars] [project_dir]")?;
            let bars = match args.get(2) {
                Some(b) => b.parse().with_context(|| format!("bad bar count: {b}"))?,
                None => DEFAULT_BOUNCE_BARS,
            };
            let project_dir = project_dir(args.get(3).map(String::as_str));
            run_bounce(&project_dir, Path::new(out), bars)
        }
        // gruvtty [project_dir]
        other => run_live(&project_dir(other)),
    }
}

fn project_dir(arg: Option<&str>) -> PathBuf {
    arg.map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
}

// logs go to a file; stdout belongs to the tui
fn init_logging(project_dir: &Path) -> anyhow::Result<()> {
    let dir = config_dir(project_dir);
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let file = File::create(dir.join("gruvtty.log")).context("failed to open log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_bounce(project_dir: &Path, out: &Path, bars: u32) -> anyhow::Result<()> {
    init_logging(project_dir)?;
    let config = pipeline::load_config(project_dir)?;
    let stats = audio::bounce(&config, out, bars)?;
    println!(
        "wrote {} ({} steps, {:.2}s)",
        out.display(),
        stats.steps,
        stats.frames as f64 / f64::from(config.sample_rate)
    );
    Ok(())
}

fn run_live(project_dir: &Path) -> anyhow::Result<()> {
    init_logging(project_dir)?;
    let mut config = pipeline::load_config(project_dir)?;
    let sequencer = Sequencer::from_config(&config)?;
    let mut middle = Middle::new(sequencer);

    let audio = audio::start_audio(&config)?;
    let mut transport = audio.transport();

    terminal::enable_raw_mode()?;
    // keyboard enhancement gives real key releases for the step buttons.
    // terminals without it only ever send presses, which is enough to record
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::PushKeyboardEnhancementFlags(
            crossterm::event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    );
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    // the input poll doubles as the loop's sleep
    let tick_rate = Duration::from_millis(2);
    let redraw = Duration::from_millis(16); // ~60fps
    let start = Instant::now();
    let mut last_draw: Option<Instant> = None;

    loop {
        if last_draw.is_none_or(|t| t.elapsed() >= redraw) {
            let blink_on = (start.elapsed().as_millis() / 250) % 2 == 0;
            let ds = middle.display_state();
            term.draw(|frame| {
                tui::view::render(frame, frame.area(), &ds, blink_on);
            })?;
            last_draw = Some(Instant::now());
        }

        for event in tui::input::poll_input(tick_rate)? {
            middle.handle_input(event);
        }

        let now = start.elapsed().as_millis() as u64;
        if middle.should_quit() {
            if middle.sequencer().is_playing() {
                middle.sequencer_mut().stop(now, &mut transport);
                // let the panics out before the stream goes away
                middle.sequencer_mut().tick(now, &mut transport);
            }
            break;
        }
        middle.tick(now, &mut transport);
    }

    if transport.dropped() > 0 {
        tracing::warn!(dropped = transport.dropped(), "audio commands dropped this session");
    }

    // keep the tempo for next time; everything else in the file is as loaded
    config.bpm = middle.sequencer().bpm();
    if let Err(e) = pipeline::save_config(project_dir, &config) {
        tracing::error!("failed to save config: {e}");
    }
    drop(term);
    drop(audio);
    Ok(())
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PopKeyboardEnhancementFlags
        );
        let _ = terminal::disable_raw_mode();
    }
}
