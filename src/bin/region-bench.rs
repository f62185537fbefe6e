//! region-bench: region pre-split calculator and write throughput benchmark

mod cli;

use cli::utils::{exit_code_for, json_error, print_error};
use cli::GlobalOptions;

fn main() {
    let matches = cli::build_cli().get_matches();
    let json = matches
        .subcommand()
        .map(|(_, sub)| GlobalOptions::from_matches(sub).is_json())
        .unwrap_or(false);

    if let Err(e) = cli::run(matches) {
        if json {
            json_error(&e.to_string()).print();
        } else {
            print_error(&e.to_string());
        }
        std::process::exit(exit_code_for(e.as_ref()));
    }
}
