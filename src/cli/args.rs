//! CLI argument parsing with clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, FPS_RANGE};
use crate::telemetry::Grammar;

/// Live 3-D view of an IMU streaming orientation over a serial port
#[derive(Parser, Debug)]
#[command(name = "imu-visualizer")]
#[command(version, about = "Live orientation view for serial IMU telemetry", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Serial device the sensor is attached to (e.g. /dev/ttyUSB0)
    pub device: Option<PathBuf>,

    /// Telemetry format the firmware emits
    #[arg(long, short)]
    pub grammar: Option<Grammar>,

    /// Line speed in baud
    #[arg(long, short)]
    pub baud: Option<u32>,

    /// Frames per second
    #[arg(long, value_parser = parse_fps)]
    pub fps: Option<u32>,

    /// Hide the text overlay
    #[arg(long)]
    pub no_overlay: bool,

    /// Print decoded samples instead of drawing
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many frames
    #[arg(long, requires = "headless")]
    pub frames: Option<u64>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

/// Parse and validate frames per second
fn parse_fps(s: &str) -> Result<u32, String> {
    let fps: u32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !FPS_RANGE.contains(&fps) {
        return Err(format!(
            "FPS must be between {} and {}, got {}",
            FPS_RANGE.start(),
            FPS_RANGE.end(),
            fps
        ));
    }
    Ok(fps)
}

impl Args {
    /// Overlay command-line flags on a loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(grammar) = self.grammar {
            config.decoder.grammar = grammar;
        }
        if let Some(baud) = self.baud {
            config.serial.baud = baud;
        }
        if let Some(fps) = self.fps {
            config.render.fps = fps;
        }
        if self.no_overlay {
            config.render.overlay = false;
        }
    }

    /// Log filter for the requested verbosity.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["imu-visualizer"]);
        assert!(args.device.is_none());
        assert!(args.grammar.is_none());
        assert!(args.baud.is_none());
        assert!(args.fps.is_none());
        assert!(!args.no_overlay);
        assert!(!args.headless);
        assert!(args.frames.is_none());
        assert!(args.config.is_none());
        assert_eq!(args.verbose, 0);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_args_device_positional() {
        let args = Args::parse_from(["imu-visualizer", "/dev/ttyUSB0"]);
        assert_eq!(args.device, Some(PathBuf::from("/dev/ttyUSB0")));
    }

    #[test]
    fn test_args_grammar_values() {
        let args = Args::parse_from(["imu-visualizer", "--grammar", "euler"]);
        assert_eq!(args.grammar, Some(Grammar::Euler));

        let args = Args::parse_from(["imu-visualizer", "-g", "quaternion"]);
        assert_eq!(args.grammar, Some(Grammar::Quaternion));

        assert!(Args::try_parse_from(["imu-visualizer", "--grammar", "binary"]).is_err());
    }

    #[test]
    fn test_args_fps_range() {
        let args = Args::parse_from(["imu-visualizer", "--fps", "60"]);
        assert_eq!(args.fps, Some(60));

        assert!(Args::try_parse_from(["imu-visualizer", "--fps", "0"]).is_err());
        assert!(Args::try_parse_from(["imu-visualizer", "--fps", "241"]).is_err());
        assert!(Args::try_parse_from(["imu-visualizer", "--fps", "fast"]).is_err());
    }

    #[test]
    fn test_args_frames_requires_headless() {
        assert!(Args::try_parse_from(["imu-visualizer", "--frames", "10"]).is_err());

        let args = Args::parse_from(["imu-visualizer", "--headless", "--frames", "10"]);
        assert!(args.headless);
        assert_eq!(args.frames, Some(10));
    }

    #[test]
    fn test_args_verbose_count() {
        let args = Args::parse_from(["imu-visualizer", "-vv"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.log_level(), log::LevelFilter::Debug);

        let args = Args::parse_from(["imu-visualizer"]);
        assert_eq!(args.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_args_config_option() {
        let args = Args::parse_from(["imu-visualizer", "--config", "/tmp/config.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/config.toml")));

        let args = Args::parse_from(["imu-visualizer", "-c", "/tmp/test.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
    }

    #[test]
    fn test_args_config_show_subcommand() {
        let args = Args::parse_from(["imu-visualizer", "config", "show"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));
    }

    #[test]
    fn test_args_config_init_subcommand() {
        let args = Args::parse_from(["imu-visualizer", "config", "init"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Init
            })
        ));
    }

    #[test]
    fn test_apply_to_overrides_config() {
        let args = Args::parse_from([
            "imu-visualizer",
            "--grammar",
            "euler",
            "--baud",
            "115200",
            "--fps",
            "60",
            "--no-overlay",
            "/dev/ttyACM0",
        ]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.decoder.grammar, Grammar::Euler);
        assert_eq!(config.serial.baud, 115_200);
        assert_eq!(config.render.fps, 60);
        assert!(!config.render.overlay);
    }

    #[test]
    fn test_apply_to_keeps_config_when_unset() {
        let args = Args::parse_from(["imu-visualizer"]);
        let mut config = Config::default();
        config.decoder.grammar = Grammar::Euler;
        args.apply_to(&mut config);
        assert_eq!(config.decoder.grammar, Grammar::Euler);
        assert!(config.render.overlay);
    }
}
