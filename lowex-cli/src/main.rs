use clap::{Parser, Subcommand};
use colored::Colorize;
use log::LevelFilter;
use lowex::{
    ConvertOptions, DEFAULT_MAX_INLINE_DEPTH, DEFAULT_MAX_INLINED_NODES, Origin,
    transpile_debug_with, transpile_with,
};

#[derive(Parser)]
#[command(name = "lowex")]
#[command(about = "Lowex - lowers Onigmo-style regex patterns into ECMAScript RegExp syntax")]
#[command(version)]
struct Cli {
    /// Log more (-v warnings, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a pattern to ECMAScript syntax
    Convert {
        /// The pattern to convert
        pattern: String,
        /// Show AST debug output
        #[arg(short, long)]
        debug: bool,
        /// How deeply subexpression calls may be inlined inside one another
        #[arg(long, default_value_t = DEFAULT_MAX_INLINE_DEPTH)]
        max_inline_depth: usize,
        /// How many nodes subexpression-call copies may add in total
        #[arg(long, default_value_t = DEFAULT_MAX_INLINED_NODES)]
        max_inlined_nodes: usize,
        /// Exit with status 2 if the conversion is lossy
        #[arg(long)]
        deny_warnings: bool,
    },
    /// Show the capture groups of the converted pattern
    Groups {
        /// The pattern to inspect
        pattern: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            pattern,
            debug,
            max_inline_depth,
            max_inlined_nodes,
            deny_warnings,
        } => {
            let options = ConvertOptions::default()
                .with_max_inline_depth(max_inline_depth)
                .with_max_inlined_nodes(max_inlined_nodes);
            cmd_convert(&pattern, debug, &options, deny_warnings)
        }
        Commands::Groups { pattern } => cmd_groups(&pattern),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), e);
    std::process::exit(1);
}

fn cmd_convert(pattern: &str, debug: bool, options: &ConvertOptions, deny_warnings: bool) {
    println!("{}", "Converting pattern...".bold());
    println!("  Input:  {}", pattern.cyan());
    println!();

    let warnings = if debug {
        match transpile_debug_with(pattern, options) {
            Ok(result) => {
                result.report();
                result.diagnostics.len()
            }
            Err(e) => fail(e),
        }
    } else {
        match transpile_with(pattern, options) {
            Ok(result) => {
                println!("{}", "Output:".bold());
                println!("  {}", result.pattern.green());
                if !result.diagnostics.is_empty() {
                    println!();
                    println!("{}", "Warnings:".yellow().bold());
                    for diagnostic in &result.diagnostics {
                        println!("  {}", diagnostic.to_string().yellow());
                    }
                }
                result.diagnostics.len()
            }
            Err(e) => fail(e),
        }
    };

    if deny_warnings && warnings > 0 {
        eprintln!(
            "{} conversion produced {} warning(s)",
            "Error:".red().bold(),
            warnings
        );
        std::process::exit(2);
    }
}

fn cmd_groups(pattern: &str) {
    let result = match transpile_with(pattern, &ConvertOptions::default()) {
        Ok(r) => r,
        Err(e) => fail(e),
    };

    if result.groups.is_empty() {
        println!("{}", "No capture groups".yellow());
        return;
    }

    println!(
        "{} {}",
        "Found".bold(),
        format!("{} group(s)", result.groups.len()).green()
    );
    println!("  Output: {}", result.pattern.cyan());
    println!();

    for group in &result.groups {
        let origin = match group.origin {
            Origin::Original => "original".green(),
            Origin::Synthetic => "synthetic".yellow(),
        };
        let source = group
            .source_index
            .map(|n| format!("source #{}", n))
            .unwrap_or_default();
        let name = group
            .name
            .as_deref()
            .map(|n| format!("<{}>", n))
            .unwrap_or_default();
        println!(
            "  \\{:<4} {:<10} {:<10} {}",
            group.ordinal,
            origin,
            source,
            name.cyan()
        );
    }
}
