fn main() {
    if let Err(e) = caseng::cli::run_cli() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
