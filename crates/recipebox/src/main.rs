/// CLI module - command-line interface for recipebox
mod cli;

fn main() {
    cli::run_cli();
}
