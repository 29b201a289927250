//! Arcade headless runner
//!
//! Plays an arcade scene against the rapier backend without a window, using
//! synthetic frame timestamps and scripted touches, then prints the session
//! summary as JSON.
//!
//! Usage:
//!   arcade_headless [--preset edge|top-right] [--config <scene.json>]
//!                   [--seconds 30] [--fps 60] [--seed 1] [--touch 2:4:100]...

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use arcade2d::{ArcadeScene, RapierBackend, SceneConfig};
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// Square obstacles from a random side edge every second
    Edge,
    /// Round obstacles from near the top-right corner every three seconds
    TopRight,
}

impl Preset {
    fn config(self) -> SceneConfig {
        match self {
            Preset::Edge => SceneConfig::edge_spawn(),
            Preset::TopRight => SceneConfig::top_right(),
        }
    }
}

/// A pointer held down at `x` from `start` until `end` seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
struct TouchScript {
    start: f64,
    end: f64,
    x: f32,
}

impl TouchScript {
    fn is_active(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

impl FromStr for TouchScript {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [start, end, x] = parts.as_slice() else {
            return Err(format!("expected start:end:x, got `{s}`"));
        };
        let start: f64 = start
            .parse()
            .map_err(|_| format!("bad start time `{start}`"))?;
        let end: f64 = end.parse().map_err(|_| format!("bad end time `{end}`"))?;
        let x: f32 = x.parse().map_err(|_| format!("bad x position `{x}`"))?;
        if end <= start {
            return Err(format!("touch must end after it starts, got `{s}`"));
        }
        Ok(Self { start, end, x })
    }
}

#[derive(Parser)]
#[command(name = "arcade_headless")]
#[command(about = "Run the arcade scene without a window and report the session")]
struct Args {
    /// Scene layout to start from
    #[arg(long, value_enum, default_value = "edge")]
    preset: Preset,

    /// Scene config JSON; replaces the preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the resolved scene config to this path before running
    #[arg(long)]
    dump_config: Option<PathBuf>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 30.0)]
    seconds: f64,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed for obstacle placement
    #[arg(long)]
    seed: Option<u64>,

    /// Scripted touch as start:end:x (seconds, seconds, points); repeatable
    #[arg(long = "touch")]
    touches: Vec<TouchScript>,
}

fn resolve_config(args: &Args) -> Result<SceneConfig> {
    let mut config = match &args.config {
        Some(path) => SceneConfig::load_from_file(path)
            .with_context(|| format!("Failed to load scene config {}", path.display()))?,
        None => args.preset.config(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.fps == 0 {
        anyhow::bail!("--fps must be at least 1");
    }
    if !(args.seconds.is_finite() && args.seconds > 0.0) {
        anyhow::bail!("--seconds must be positive");
    }

    let config = resolve_config(&args)?;
    if let Some(path) = &args.dump_config {
        config
            .save_to_file(path)
            .with_context(|| format!("Failed to write scene config {}", path.display()))?;
        log::info!("Wrote scene config to {}", path.display());
    }

    let physics = RapierBackend::new();
    let mut scene = ArcadeScene::new(config, physics).context("Invalid scene config")?;
    scene.did_move().context("Failed to set up scene")?;

    let frame_dt = 1.0 / f64::from(args.fps);
    let total_frames = (args.seconds * f64::from(args.fps)).ceil() as u64;
    let mut held: Option<TouchScript> = None;
    let mut next_report = 1.0;

    for frame in 0..=total_frames {
        let t = frame as f64 * frame_dt;

        let active = args.touches.iter().rev().find(|touch| touch.is_active(t)).copied();
        if active != held {
            if held.is_some() {
                scene.touch_ended();
            }
            if let Some(touch) = active {
                scene.touch_began(touch.x);
            }
            held = active;
        }

        scene
            .tick(t)
            .with_context(|| format!("Frame {frame} failed"))?;

        if t >= next_report {
            let summary = scene.summary();
            log::info!(
                "t={:.0}s obstacles={} hits={} dodged={} player={:?}",
                t,
                scene.obstacle_count(),
                summary.hits,
                summary.dodged,
                scene.player_position()
            );
            next_report += 1.0;
        }

        if scene.session().is_game_over() {
            log::info!("Game over at t={t:.2}s");
            break;
        }
    }

    let summary = serde_json::to_string_pretty(&scene.summary())
        .context("Failed to serialize session summary")?;
    println!("{summary}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_script_parses() {
        let touch: TouchScript = "1.5:3:100".parse().unwrap();
        assert_eq!(
            touch,
            TouchScript {
                start: 1.5,
                end: 3.0,
                x: 100.0
            }
        );
        assert!(touch.is_active(1.5));
        assert!(!touch.is_active(3.0));
    }

    #[test]
    fn test_touch_script_rejects_garbage() {
        assert!("1:2".parse::<TouchScript>().is_err());
        assert!("a:2:3".parse::<TouchScript>().is_err());
        assert!("3:2:100".parse::<TouchScript>().is_err());
    }

    #[test]
    fn test_cli_parses_presets_and_touches() {
        let args = Args::try_parse_from([
            "arcade_headless",
            "--preset",
            "top-right",
            "--seed",
            "4",
            "--touch",
            "0:1:10",
            "--touch",
            "2:3:390",
        ])
        .unwrap();
        assert!(matches!(args.preset, Preset::TopRight));
        assert_eq!(args.touches.len(), 2);

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.spawn.seed, Some(4));
        assert_eq!(config.spawn.interval, 3.0);
    }
}
