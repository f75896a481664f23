use clap::Parser;

use imu_visualizer::app::{self, RunSettings};
use imu_visualizer::cli::{handle_config_action, Args, Command};
use imu_visualizer::config::Config;
use imu_visualizer::render::ScreenLogWriter;

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(ScreenLogWriter)))
        .init();

    if let Some(Command::Config { action }) = &args.command {
        if let Err(e) = handle_config_action(action.clone(), args.config.as_deref()) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let Some(device) = args.device.clone() else {
        println!("No serial port indicated");
        return;
    };

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    args.apply_to(&mut config);

    let settings = match RunSettings::resolve(device, &config, args.headless) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Reading {} telemetry from {} at {} baud",
        settings.grammar,
        settings.device.display(),
        settings.baud
    );

    if let Err(e) = app::run(&settings, args.frames) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
