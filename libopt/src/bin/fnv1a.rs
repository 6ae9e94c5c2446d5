// Demonstration program: print the fnv1a hash of each argument string.

use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;

use libopt::{FlagCell, Opt, OptionTable, Parser, ValueCell};

fn fnv1a(s: &str, ignore_case: bool) -> u32 {
    let mut hash: u32 = 0x4b9a_ce2f;
    for b in s.bytes() {
        let c = if ignore_case { b.to_ascii_lowercase() } else { b };
        hash = (hash ^ u32::from(c)).wrapping_mul(0x0100_0193);
    }
    hash.wrapping_mul(0x0100_0193)
}

fn main() -> ExitCode {
    let ignore_case = FlagCell::new();
    let outfile = ValueCell::new();

    let table = OptionTable::new()
        .option(Opt::help())
        .option(Opt::version())
        .option(
            Opt::short_only('i')
                .description("Ignore case when computing hashes")
                .set_flag(&ignore_case),
        )
        .option(
            Opt::new("output")
                .short('o')
                .description("[FILE]Write output to FILE")
                .store(&outfile),
        )
        .option(
            Opt::new("caseful")
                .short('c')
                .description("Do not ignore case when computing hashes")
                .clear_flag(&ignore_case),
        );

    let argv: Vec<String> = std::env::args().collect();
    let mut parser = Parser::new(table)
        .version("1.0.0")
        .usage("[options] string...");
    let first = match parser.parse(&argv) {
        Ok(i) => i,
        Err(e) => {
            return if e.is_help() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };

    let mut out: Box<dyn Write> = match outfile.get() {
        Some(path) => match File::create(&path) {
            Ok(f) => Box::new(f),
            Err(_) => return ExitCode::FAILURE,
        },
        None => Box::new(io::stdout()),
    };
    for arg in &argv[first..] {
        if writeln!(out, "{:8x}    {}", fnv1a(arg, ignore_case.get()), arg).is_err() {
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
