fn main() {
    if let Err(error) = warpath_cli::run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
