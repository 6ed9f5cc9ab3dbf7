//! Vela command-line interface.

mod commands;
mod logging;

use commands::{check_file, lex_file, parse_file, run_file, RunArgs};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    logging::init(args.iter().any(|a| a == "--trace-tree"));

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "run" => match RunArgs::parse(&args[2..]) {
            Ok(run) => run_file(&run),
            Err(message) => {
                eprintln!("error: {message}");
                eprintln!();
                print_run_usage();
                std::process::exit(1);
            }
        },
        "check" | "lex" | "parse" => {
            let Some(path) = args[2..].iter().find(|a| !a.starts_with("--")) else {
                eprintln!("Usage: vela {} <file.vela>", args[1]);
                std::process::exit(1);
            };
            match args[1].as_str() {
                "check" => check_file(path),
                "lex" => lex_file(path),
                _ => parse_file(path),
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Vela query processor");
    println!();
    println!("Usage: vela <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file>     Evaluate a script and print its result");
    println!("  check <file>   Compile a script without running it");
    println!("  lex <file>     Print the token stream");
    println!("  parse <file>   Print a summary of the syntax tree");
    println!("  help           Show this message");
    println!();
    println!("Global options:");
    println!("  --trace-tree   Render logs as a call tree");
    println!();
    println!("Logging is enabled through VELA_LOG (or RUST_LOG), e.g. VELA_LOG=debug.");
}

fn print_run_usage() {
    eprintln!("Usage: vela run <file.vela> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --arg <name>=<literal>  Value for a script variable (repeatable)");
    eprintln!("  --timeout <ms>          Time limit (default: 3000)");
    eprintln!("  --max-rows <n>          Row limit per repository read (default: 5000)");
    eprintln!("  --using <module>        Import a module into every scope (repeatable)");
}
