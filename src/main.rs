// src/main.rs

use std::process::ExitCode;

use signalwatch::{cli, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let result = match logging::init_logging(args.log_level) {
        Ok(()) => signalwatch::run(args).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("signalwatch: {err:#}");
            ExitCode::FAILURE
        }
    }
}
