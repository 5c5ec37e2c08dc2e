fn main() {
    if let Err(e) = carecompass_lib::run() {
        eprintln!("carecompass: {e}");
        std::process::exit(1);
    }
}
