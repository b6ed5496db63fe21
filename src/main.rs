//! Calendar Breakout headless driver
//!
//! Lays a week of calendar events out on a grid, then lets an autopilot
//! paddle play through it at 60 Hz and reports the result.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result, bail};
    use clap::Parser;

    use calendar_breakout::sim::{EventBlock, GameSignal, MINUTES_PER_WEEK, Rect, SessionOptions, StaticLayout};
    use calendar_breakout::{DeviceClass, Game, GameConfig, ManualScheduler, Playfield};

    /// First and last visible hour of the grid
    const DAY_START_HOUR: u32 = 8;
    const DAY_END_HOUR: u32 = 18;

    #[derive(Parser, Debug)]
    #[command(about = "Play Calendar Breakout headless with an autopilot paddle", version)]
    struct Args {
        /// Device class: mobile or desktop (defaults from --width)
        #[arg(long)]
        device: Option<String>,
        /// Seed for power-up drops
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Maximum frames to run
        #[arg(long, default_value_t = 60 * 60 * 5)]
        frames: u32,
        #[arg(long, default_value_t = 1280.0)]
        width: f32,
        #[arg(long, default_value_t = 800.0)]
        height: f32,
        /// JSON file with GameConfig overrides
        #[arg(long)]
        config: Option<PathBuf>,
        /// JSON file with an array of events
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = Args::parse();

        let device = match args.device.as_deref() {
            Some(name) => match DeviceClass::parse(name) {
                Some(device) => device,
                None => bail!("unknown device class {name:?}, expected mobile or desktop"),
            },
            None => DeviceClass::from_screen_width(args.width),
        };
        let playfield = Playfield::new(args.width, args.height, device);
        let config = load_config(args.config.as_deref(), device, playfield)?;
        let catalog = match &args.catalog {
            Some(path) => load_catalog(path)?,
            None => sample_week(),
        };

        log::info!(
            "Calendar Breakout ({}) {}x{} with {} events, seed {}",
            device.as_str(),
            args.width,
            args.height,
            catalog.len(),
            args.seed
        );

        let layout = week_grid_layout(&catalog, &config.playfield);
        let options = SessionOptions {
            show_tutorial: false,
            seed: args.seed,
        };
        let mut game = Game::new(config, catalog, options, layout, ManualScheduler::new());

        let frame_ms = 1000.0 / 60.0;
        let mut now = 0.0;
        game.start(now).context("starting session")?;

        for frame_index in 0..args.frames {
            now += frame_ms;
            autopilot(&mut game, frame_index);

            let Some(frame) = game.scheduler_mut().next_frame() else {
                break;
            };
            game.on_frame(frame, now);

            for signal in game.drain_signals() {
                match signal {
                    GameSignal::EventDestroyed { id, points } => log::info!("Destroyed {id} (+{points})"),
                    GameSignal::PowerUpCollected { kind } => log::info!("Picked up {}", kind.as_str()),
                    GameSignal::LifeLost { lives_left } => log::info!("Ball lost, {lives_left} lives left"),
                    other => log::debug!("{other:?}"),
                }
            }

            if game.status().is_finished() {
                break;
            }
        }

        let state = game.state();
        if args.json {
            let snapshot = serde_json::to_string_pretty(&game.snapshot()).context("serializing snapshot")?;
            println!("{snapshot}");
        } else {
            println!(
                "{:?} after {} ticks: score {} (final {}), lives {}, cleared {}/{}",
                state.status,
                state.time_ticks,
                state.score,
                state.final_score(),
                state.lives,
                state.destroyed.len(),
                state.total_events
            );
        }
        Ok(())
    }

    /// Track the ball, swaying across the paddle so bounces vary in angle
    fn autopilot(game: &mut Game<StaticLayout, ManualScheduler>, frame_index: u32) {
        let state = game.state();
        let sway = (frame_index as f32 * 0.05).sin() * state.paddle.width * 0.35;
        let target = state.ball.pos.x + sway;
        game.set_paddle_target_x(target);
    }

    fn load_config(path: Option<&Path>, device: DeviceClass, playfield: Playfield) -> Result<GameConfig> {
        let base = GameConfig::for_device(device, playfield);
        let Some(path) = path else {
            return Ok(base);
        };

        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        // Overrides sit on top of the device and screen resolved from the CLI
        let config = base.merge_json(&text).with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    fn load_catalog(path: &Path) -> Result<Vec<EventBlock>> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let events: Vec<EventBlock> =
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        if events.iter().any(|e| e.start_minute >= MINUTES_PER_WEEK) {
            bail!("event starts after the end of the week in {}", path.display());
        }
        Ok(events)
    }

    /// Day columns right of the time column, visible hours stacked in the
    /// upper half of the screen
    fn week_grid_layout(catalog: &[EventBlock], playfield: &Playfield) -> StaticLayout {
        let column_width = (playfield.width - playfield.time_column_width) / 7.0;
        let top = playfield.header_height + 20.0;
        let hour_height = (playfield.height * 0.5 - top).max(60.0) / (DAY_END_HOUR - DAY_START_HOUR) as f32;

        catalog
            .iter()
            .map(|event| {
                let minute_of_day = (event.start_minute % (24 * 60)).clamp(DAY_START_HOUR * 60, DAY_END_HOUR * 60 - 30);
                let hours_in = (minute_of_day - DAY_START_HOUR * 60) as f32 / 60.0;
                let height = (event.duration_minutes() as f32 / 60.0 * hour_height).max(12.0);
                let rect = Rect::new(
                    playfield.time_column_width + event.day() as f32 * column_width + 2.0,
                    top + hours_in * hour_height,
                    column_width - 4.0,
                    height,
                );
                (event.id.clone(), rect)
            })
            .collect()
    }

    /// A plausible working week
    fn sample_week() -> Vec<EventBlock> {
        let entries = [
            (1, 9, 0, 30, "Team Standup", "#039be5"),
            (1, 11, 0, 60, "Design Review", "#8e24aa"),
            (1, 14, 30, 90, "Roadmap Planning", "#f4511e"),
            (2, 9, 0, 30, "Team Standup", "#039be5"),
            (2, 10, 0, 60, "1:1 with Manager", "#33b679"),
            (2, 15, 0, 45, "Customer Call", "#e67c73"),
            (3, 9, 0, 30, "Team Standup", "#039be5"),
            (3, 12, 0, 60, "Lunch & Learn", "#f6bf26"),
            (3, 16, 0, 60, "Interview", "#7986cb"),
            (4, 9, 0, 30, "Team Standup", "#039be5"),
            (4, 13, 0, 120, "Focus Time", "#616161"),
            (5, 9, 0, 30, "Team Standup", "#039be5"),
            (5, 11, 30, 60, "Sprint Retro", "#8e24aa"),
            (5, 16, 0, 60, "Team Social", "#33b679"),
        ];

        entries
            .iter()
            .enumerate()
            .map(|(i, &(day, hour, minute, duration, title, color))| {
                let start = day * 24 * 60 + hour * 60 + minute;
                EventBlock::new(format!("evt-{}", i + 1), title, color, start, start + duration)
            })
            .collect()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the WASM entry point; the headless driver is native only
}
