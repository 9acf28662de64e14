fn main() {
    if let Err(e) = ayurdiet_lib::run() {
        eprintln!("ayurdiet: {e}");
        std::process::exit(1);
    }
}
