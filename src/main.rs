mod config;
mod display;
mod driver;
mod effects;
mod state;
mod util;

use std::path::Path;

use config::{Config, DEFAULT_CONFIG_PATH};
use display::{Display, FrameBuffer, SdlSurface};
use driver::FrameDriver;
use effects::{ColorScheme, Plasma};
use state::MAX_SPEED;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use util::SystemClock;

/// What the command line asked for
#[derive(Debug, PartialEq)]
enum Cli {
    Run(Config),
    Help,
}

fn parse_u32(flag: &str, value: Option<&String>) -> Result<u32, String> {
    let value = value.ok_or_else(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .map_err(|_| format!("{}: invalid number '{}'", flag, value))
}

/// Parse command line arguments (without the program name).
/// A config file is read first; flags override its fields.
fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut config = match args.iter().position(|a| a == "--config" || a == "-c") {
        Some(i) => {
            let path = args.get(i + 1).ok_or("--config needs a path")?;
            Config::load(path)?
        },
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)?,
        None => Config::default(),
    };

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args.get(i + 1);
        match flag {
            "--config" | "-c" => i += 1,
            "--no-vsync" => config.vsync = false,
            "--fullscreen" => config.fullscreen = true,
            "--sequential" => config.parallel = false,
            "--width" | "-w" => {
                config.width = parse_u32(flag, value)?;
                i += 1;
            },
            "--height" | "-h" => {
                config.height = parse_u32(flag, value)?;
                i += 1;
            },
            "--upscale" | "-u" => {
                config.upscale = parse_u32(flag, value)?;
                i += 1;
            },
            "--speed" => {
                // Wrap before narrowing so 256 does not alias to 0
                config.speed = (parse_u32(flag, value)? % (MAX_SPEED as u32 + 1)) as u8;
                i += 1;
            },
            "--scheme" => {
                config.scheme = (parse_u32(flag, value)? % ColorScheme::COUNT as u32) as u8;
                i += 1;
            },
            "--resolution" | "-r" => {
                // WxH format (e.g., 640x480)
                let value = value.ok_or("--resolution needs a value")?;
                let (w, h) = value
                    .split_once('x')
                    .ok_or_else(|| format!("--resolution: expected WxH, got '{}'", value))?;
                config.width = parse_u32(flag, Some(&w.to_string()))?;
                config.height = parse_u32(flag, Some(&h.to_string()))?;
                i += 1;
            },
            "--help" => return Ok(Cli::Help),
            other => warn!(arg = other, "ignoring unknown argument"),
        }
        i += 1;
    }

    Ok(Cli::Run(config.normalized()?))
}

fn print_help() {
    println!("Usage: plasma [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config PATH, -c PATH    Load settings from a JSON file (default: {} if present)", DEFAULT_CONFIG_PATH);
    println!("  --width W, -w W           Render width (default: {})", display::DEFAULT_WIDTH);
    println!("  --height H, -h H          Render height (default: {})", display::DEFAULT_HEIGHT);
    println!("  --resolution WxH, -r WxH  Set render resolution (e.g., 640x480)");
    println!("  --upscale N, -u N         Window scale factor (default: {})", display::DEFAULT_UPSCALE);
    println!("  --speed N                 Initial speed 0-5 (default: 1)");
    println!("  --scheme N                Initial color scheme 0-4 (default: 0)");
    println!("  --fullscreen              Start fullscreen");
    println!("  --sequential              Render on a single thread");
    println!("  --no-vsync                Disable VSync for uncapped framerate");
    println!("  --help                    Show this help message");
}

fn print_controls() {
    println!("=== plasma ===");
    println!("Controls:");
    println!("  S      - Cycle speed (0 = paused)");
    println!("  C      - Cycle color scheme");
    println!("  F      - Toggle fullscreen");
    println!("  T      - Print frame rate");
    println!("  P      - Run render benchmark");
    println!("  Escape - Quit");
    println!();
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), String> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match parse_args(&args)? {
        Cli::Run(config) => config,
        Cli::Help => {
            print_help();
            return Ok(());
        },
    };

    info!(
        width = config.width,
        height = config.height,
        upscale = config.upscale,
        vsync = config.vsync,
        parallel = config.parallel,
        speed = config.speed,
        scheme = config.color_scheme().name(),
        threads = rayon::current_num_threads(),
        "starting plasma"
    );

    let (mut display, texture_creator) = Display::with_options(
        "Plasma",
        config.width,
        config.height,
        config.upscale,
        config.vsync,
    )?;
    if config.fullscreen {
        display.set_fullscreen(true)?;
    }
    let surface = SdlSurface::new(display, &texture_creator)?;

    print_controls();

    let mut driver = FrameDriver::new(
        surface,
        SystemClock::new(),
        std::io::stdout(),
        FrameBuffer::with_size(config.width, config.height)?,
        config.initial_state(),
        Plasma::with_parallel(config.parallel),
    )
    .with_benchmark_frames(config.benchmark_frames);

    let frames = driver.run()?;
    info!(frames, "exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run_config(list: &[&str]) -> Config {
        match parse_args(&args(list)).unwrap() {
            Cli::Run(config) => config,
            Cli::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = run_config(&["-r", "640x360", "--upscale", "3", "--no-vsync", "--sequential"]);
        assert_eq!((config.width, config.height), (640, 360));
        assert_eq!(config.upscale, 3);
        assert!(!config.vsync);
        assert!(!config.parallel);
    }

    #[test]
    fn test_speed_and_scheme_are_wrapped() {
        let config = run_config(&["--speed", "8", "--scheme", "4"]);
        assert_eq!(config.speed, 2);
        assert_eq!(config.scheme, 4);
    }

    #[test]
    fn test_speed_wraps_before_narrowing() {
        assert_eq!(run_config(&["--speed", "256"]).speed, 4);
        assert_eq!(run_config(&["--speed", "6"]).speed, 0);
        assert_eq!(run_config(&["--scheme", "257"]).scheme, 2);
    }

    #[test]
    fn test_huge_sizes_are_errors() {
        assert!(parse_args(&args(&["-w", "70000", "-u", "70000"])).is_err());
        assert!(parse_args(&args(&["-r", "70000x70000", "-u", "70000"])).is_err());
        assert!(parse_args(&args(&["-r", "16384x16384", "-u", "200000"])).is_err());
        assert!(parse_args(&args(&["-r", "1920x1080", "-u", "1"])).is_ok());
    }

    #[test]
    fn test_help() {
        assert_eq!(parse_args(&args(&["--help"])), Ok(Cli::Help));
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert!(parse_args(&args(&["--width"])).is_err());
        assert!(parse_args(&args(&["--width", "wide"])).is_err());
        assert!(parse_args(&args(&["-r", "640"])).is_err());
        assert!(parse_args(&args(&["--config", "/nonexistent/plasma.json"])).is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let path = std::env::temp_dir().join(format!("plasma-cli-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "width": 800, "height": 600, "scheme": 3 }"#).unwrap();
        let path_str = path.to_string_lossy().to_string();
        let config = run_config(&["--height", "500", "--config", &path_str]);
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 500);
        assert_eq!(config.scheme, 3);
    }
}
