// crustc: Crust front end, source to three-address code

use std::fs;
use std::path::PathBuf;

use clap::Parser as ClapParser;
use crustc::tac::render_table;
use crustc::{compile_file, MismatchRecovery, ParserConfig};

/// Parse a Crust source file and print its three-address code
#[derive(Debug, ClapParser)]
#[command(name = "crustc", version, about)]
struct Cli {
    /// Source file to compile
    file: PathBuf,

    /// Print the syntax tree
    #[arg(long)]
    tree: bool,

    /// Write the syntax tree as a Graphviz file
    #[arg(long, value_name = "PATH")]
    dot: Option<PathBuf>,

    /// Print the code as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Maximum nesting depth
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Drop a stray token before an expected terminal instead of consuming it
    #[arg(long)]
    resync: bool,

    /// JSON parser configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ParserConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => ParserConfig::default(),
    };
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    if cli.resync {
        config.mismatch = MismatchRecovery::Resync;
    }

    let compilation = match compile_file(&cli.file, &config) {
        Ok(compilation) => compilation,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    for diagnostic in &compilation.diagnostics {
        eprintln!("{}", diagnostic);
    }

    if cli.tree {
        print!("{}", compilation.program);
    }

    if let Some(path) = &cli.dot {
        if let Err(e) = fs::write(path, compilation.program.to_dot()) {
            eprintln!("Error: cannot write '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(compilation.code()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", render_table(compilation.code()));
    }

    if compilation.has_errors() {
        std::process::exit(1);
    }
}
