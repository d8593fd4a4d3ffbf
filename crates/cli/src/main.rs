fn main() {
    widlgen::init_tracing();
    let code = widlgen::run_cli(std::env::args().collect());
    std::process::exit(code);
}
