//! envi-view entry point: `envi-view <image.raw>`

use std::io;
use std::process::ExitCode;

use envi_view::cli::{self, RunOutcome};
use envi_view::config::{AppConfig, LogLevel};

fn init_logging(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let config = AppConfig::load_from_default_path().unwrap_or_default();
    init_logging(config.preferences.log_level);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let outcome =
        cli::Args::from_env().and_then(|args| cli::run(&args, &config, &mut input, &mut output));

    let (message, prompt) = match outcome {
        Ok(RunOutcome::Exported(report)) => (
            format!(
                "TIFF files saved into new folder {:?} ({} bands).",
                report.directory,
                report.files.len()
            ),
            "Press enter to close.",
        ),
        Ok(RunOutcome::Viewed) => return ExitCode::SUCCESS,
        Err(e) => {
            if e.is_user_input() {
                log::info!("Run stopped: {}", e);
            } else {
                log::error!("Run failed: {}", e);
            }
            (e.to_string(), cli::closing_prompt(&e))
        }
    };

    let pause = config.preferences.pause_on_exit;
    match cli::finish(&mut input, &mut output, &message, prompt, pause) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Application error: {}", e);
            ExitCode::FAILURE
        }
    }
}
