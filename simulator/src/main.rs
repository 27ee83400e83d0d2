use std::process::ExitCode;

mod demo;

use demo::DemoToolkit;

fn main() -> ExitCode {
    simkit::run(&mut DemoToolkit::new())
}
