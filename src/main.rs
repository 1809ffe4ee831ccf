use auto_commit::error::Interrupted;
use auto_commit::{cli, logger, ui};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logger::init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    let run = tokio::spawn(cli::main());

    let result = tokio::select! {
        joined = run => match joined {
            Ok(result) => result,
            Err(e) => Err(e.into()),
        },
        _ = tokio::signal::ctrl_c() => {
            ui::print_warning("\nInterrupted by user");
            std::process::exit(130);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is::<Interrupted>() => {
            ui::print_warning("Interrupted by user");
            ExitCode::from(130)
        }
        Err(e) => {
            ui::print_error(&format!("❌ {e:#}"));
            ExitCode::FAILURE
        }
    }
}
