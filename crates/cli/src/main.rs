fn main() {
    if let Err(err) = semgraph_cli::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
