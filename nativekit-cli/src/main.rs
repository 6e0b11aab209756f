//! nativekit-cli: drive the native library from the shell.
//!
//! Matrices are written row by row: cells separated by commas, rows by
//! semicolons (`"1,2,3;4,5,6"`).

#![allow(missing_docs, clippy::print_stderr, clippy::print_stdout)]

use std::io::Write;
use std::process;

use clap::{Parser, Subcommand};
use nativekit::{Matrix, Vector, basic};

/// Exercise nativekit resources from the command line.
#[derive(Parser)]
#[command(name = "nativekit", version, about, long_about = None)]
struct Cli {
    /// Log filter directive (e.g. "debug", "nativekit_ffi=trace").
    /// Defaults to the NATIVEKIT_LOG environment variable.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Multiply two matrices.
    Matmul {
        /// Left operand.
        #[arg(value_parser = parse_matrix, allow_hyphen_values = true)]
        a: Rows,
        /// Right operand.
        #[arg(value_parser = parse_matrix, allow_hyphen_values = true)]
        b: Rows,
    },
    /// Transpose a matrix.
    Transpose {
        #[arg(value_parser = parse_matrix, allow_hyphen_values = true)]
        m: Rows,
    },
    /// Mean, variance and standard deviation of some numbers.
    Stats {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },
    /// Sort integers and print them with their sum.
    Sort {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i32>,
    },
    /// Reverse a string byte by byte.
    Reverse { text: String },
    /// Print a greeting.
    Greet { name: Option<String> },
    /// Run the progress-callback demo.
    Progress {
        /// Total duration in milliseconds.
        #[arg(long, default_value = "500")]
        duration_ms: u32,
    },
}

// Aliased so clap parses the whole argument as one value.
type Rows = Vec<Vec<f64>>;

fn parse_matrix(s: &str) -> Result<Rows, String> {
    s.split(';')
        .map(|row| {
            row.split(',')
                .map(|cell| {
                    cell.trim()
                        .parse::<f64>()
                        .map_err(|e| format!("bad cell {cell:?}: {e}"))
                })
                .collect()
        })
        .collect()
}

fn to_matrix(rows: &Rows) -> nativekit::Result<Matrix> {
    let refs: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
    Matrix::from_rows(&refs)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("fatal: {e}");
        process::exit(1);
    }
}

fn run() -> nativekit::Result<()> {
    let cli = Cli::parse();
    nativekit::init_logger(cli.log_level.as_deref())?;

    match cli.command {
        Command::Matmul { a, b } => {
            let product = to_matrix(&a)?.multiply(&to_matrix(&b)?)?;
            print!("{product}");
        }
        Command::Transpose { m } => print!("{}", to_matrix(&m)?.transpose()?),
        Command::Stats { values } => {
            println!("mean     {}", nativekit::mean(&values));
            println!("variance {}", nativekit::variance(&values));
            println!("stddev   {}", nativekit::standard_deviation(&values));
        }
        Command::Sort { values } => {
            let v = Vector::from_slice(&values)?;
            v.sort();
            let sorted = v.to_vec()?;
            let line: Vec<String> = sorted.iter().map(ToString::to_string).collect();
            println!("{}", line.join(" "));
            println!("sum {}", v.sum());
        }
        Command::Reverse { text } => println!("{}", basic::reverse(&text)?),
        Command::Greet { name } => println!("{}", basic::greeting(name.as_deref())?),
        Command::Progress { duration_ms } => {
            basic::simulate_work(duration_ms, report_progress);
            println!();
        }
    }
    Ok(())
}

extern "C" fn report_progress(progress: i32) {
    print!("\rprogress {progress:>3}%");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_matrix_literals() {
        assert_eq!(
            parse_matrix("1, 2;-3,4.5").unwrap(),
            vec![vec![1.0, 2.0], vec![-3.0, 4.5]]
        );
        assert!(parse_matrix("1,x").is_err());
    }
}
