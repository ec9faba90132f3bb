fn main() {
    if let Err(error) = twig_cli::run() {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}
