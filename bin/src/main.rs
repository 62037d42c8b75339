use std::{
    io::{stdin, stdout, Write},
    path::PathBuf,
    process::exit,
};

use clap::Parser;

use lox::{run_source, Options};

/// Scans and parses Lox expressions and prints their syntax tree.
#[derive(clap::Parser)]
struct Args {
    /// Script to run. Starts an interactive prompt if omitted.
    file: Option<PathBuf>,

    /// Print the scanned tokens before the syntax tree.
    #[arg(long)]
    tokens: bool,
}

fn run_file(path: PathBuf, options: Options) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(path)?;
    if let Err(e) = run_source(&source, options, &mut stdout()) {
        eprintln!("{e}");
        exit(e.exit_code());
    }
    Ok(())
}

fn run_prompt(options: Options) -> anyhow::Result<()> {
    let mut line = String::new();
    loop {
        print!("> ");
        stdout().flush()?;

        line.clear();
        if stdin().read_line(&mut line)? == 0 {
            return Ok(());
        }

        let source = line.trim_end();
        if source.is_empty() {
            continue;
        }

        if let Err(e) = run_source(source, options, &mut stdout()) {
            eprintln!("{e}");
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = Options { print_tokens: args.tokens };

    match args.file {
        Some(file) => run_file(file, options),
        None => run_prompt(options),
    }
}
