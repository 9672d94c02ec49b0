//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use geocluster_cli::CliError;

fn main() {
    env_logger::init();
    match geocluster_cli::run() {
        Ok(()) => {}
        // Lets clap print help and version output with its own exit codes.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("geocluster: {err}");
            std::process::exit(1);
        }
    }
}
