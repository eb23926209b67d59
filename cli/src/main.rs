fn main() {
    if let Err(err) = zbrdf_cli::run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
