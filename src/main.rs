fn main() {
    if let Err(err) = tasktree::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
