//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = haulroute_cli::run() {
        eprintln!("haulroute: {err}");
        std::process::exit(1);
    }
}
