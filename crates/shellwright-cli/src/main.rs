// Shellwright CLI entry point

use shellwright_cli::{output, router::CommandRouter, runtime::block_on_detached};

fn main() {
    let outcome = match block_on_detached(CommandRouter::route()) {
        Ok(outcome) => outcome,
        Err(e) => {
            output::print_error(&format!("failed to start async runtime: {}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
