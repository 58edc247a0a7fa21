use std::env;
use std::process;

fn main() {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "docprobe".to_string());
    let code = docprobe::driver::run(&program, args.collect());
    process::exit(code);
}
