// Demonstration program: echo arguments to standard output.

use std::process::ExitCode;

use libopt::{FlagCell, Opt, OptionTable, Parser, ValueCell};

fn main() -> ExitCode {
    let no_lf = FlagCell::new();
    let prefix = ValueCell::new();

    let table = OptionTable::new()
        .option(Opt::help())
        .option(
            Opt::short_only('n')
                .description("Do not echo a line-feed")
                .set_flag(&no_lf),
        )
        .option(
            Opt::new("prefix")
                .short('p')
                .description("[STRING]Prepend STRING to each argument")
                .store(&prefix),
        );

    let argv: Vec<String> = std::env::args().collect();
    let mut parser = Parser::new(table);
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

    let prefix = prefix.get().unwrap_or_default();
    let mut sep = "";
    for arg in &argv[first..] {
        print!("{}{}{}", sep, prefix, arg);
        sep = " ";
    }
    if first < argv.len() && !no_lf.get() {
        println!();
    }
    ExitCode::SUCCESS
}
