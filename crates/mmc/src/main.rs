//! MiniMat translator CLI
//!
//! Usage: mmc [OPTIONS] <files>...

use clap::Parser as ClapParser;
use mm_translator::driver::{self, TranslateConfig};
use std::path::PathBuf;
use std::process;

#[derive(ClapParser, Debug)]
#[command(name = "mmc")]
#[command(version)]
#[command(about = "MiniMat to three-address-code translator", long_about = None)]
struct Args {
    /// Input source files (.mm)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Trace the scanner (echo every token)
    #[arg(long)]
    trace_scan: bool,

    /// Trace the parser (echo every production)
    #[arg(long)]
    trace_parse: bool,

    /// Print the generated three-address code after a successful translation
    #[arg(long)]
    dump_tacos: bool,

    /// Print the symbol tables after a successful translation
    #[arg(long)]
    dump_symbols: bool,
}

fn main() {
    let args = Args::parse();
    let config = TranslateConfig {
        trace_scan: args.trace_scan,
        trace_parse: args.trace_parse,
        dump_tacos: args.dump_tacos,
        dump_symbols: args.dump_symbols,
    };

    let all_ok = driver::run(&args.files, &config);
    process::exit(if all_ok { 0 } else { 1 });
}
