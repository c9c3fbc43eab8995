mod cli;

use clap::Parser;
use std::time::Duration;

use cli::{Args, Command, CommandError, SimulateOptions};
use scan_session::config::{default_path, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CommandError> {
    let config_path = args.config.clone().unwrap_or_else(default_path);

    match args.command {
        Command::Config { action } => cli::handle_config_action(action, &config_path),
        Command::SelectCamera { labels, prefer } => {
            let config = Config::load(Some(&config_path))?;
            let preferred = match prefer {
                Some(p) => p.into(),
                None => config.preferred_facing()?,
            };
            cli::select_camera(&labels, preferred);
            Ok(())
        }
        Command::Simulate {
            results,
            then,
            mode,
            timeout_ms,
            frame_ms,
            cameras,
            prefer,
            block_autoplay,
        } => {
            let config = Config::load(Some(&config_path))?;
            let options = SimulateOptions {
                results: cli::parse_results(&results)?,
                then: cli::parse_result(&then)?,
                mode: match mode {
                    Some(m) => m.into(),
                    None => config.recognition_mode()?,
                },
                timeout: timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or_else(|| config.timeout()),
                frame_time: Duration::from_millis(frame_ms),
                cameras,
                preferred: match prefer {
                    Some(p) => p.into(),
                    None => config.preferred_facing()?,
                },
                settings: config.stream_settings(),
                block_autoplay,
            };
            cli::simulate(options).await.map(|_| ())
        }
    }
}
