use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use cst_lti::{MagnitudeMode, TransferFunction};
use cst_matrix::{Eigenvalue, colon, eig, logspace, roots};
use serde::Serialize;
use tracing::info;

mod error;
mod parse;

use error::{CliError, CliResult};
use parse::{parse_list, parse_matrix};

#[derive(Parser)]
#[command(name = "cst-cli")]
#[command(about = "Control systems toolbox CLI - LTI model analysis", long_about = None)]
struct Cli {
    /// Write JSON to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a transfer function to controller canonical state space
    Tf2ss {
        /// Numerator coefficients, highest power first (e.g. 1,2)
        #[arg(long, allow_hyphen_values = true)]
        num: String,
        /// Denominator coefficients, highest power first (e.g. 1,3,2)
        #[arg(long, allow_hyphen_values = true)]
        den: String,
    },
    /// Roots of a polynomial
    Roots {
        /// Coefficients, highest power first (e.g. 1,-3,2)
        #[arg(long, allow_hyphen_values = true)]
        poly: String,
    },
    /// Eigenvalues of a square matrix
    Eig {
        /// Rows separated by ';' (e.g. "0,1;-2,-3")
        #[arg(long, allow_hyphen_values = true)]
        matrix: String,
    },
    /// Magnitude and phase of a transfer function over a log-spaced grid
    Freqresp {
        #[arg(long, allow_hyphen_values = true)]
        num: String,
        #[arg(long, allow_hyphen_values = true)]
        den: String,
        /// Lowest frequency exponent (rad/s = 10^w_lo)
        #[arg(long, default_value_t = -2.0, allow_negative_numbers = true)]
        w_lo: f64,
        /// Highest frequency exponent
        #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
        w_hi: f64,
        /// Number of frequencies
        #[arg(long, default_value_t = 50)]
        points: usize,
        /// Report |H| instead of dB
        #[arg(long)]
        abs: bool,
        /// Keep the phase wrapped to (-180, 180]
        #[arg(long)]
        no_unwrap: bool,
    },
    /// Unit step response of a transfer function
    Step {
        #[arg(long, allow_hyphen_values = true)]
        num: String,
        #[arg(long, allow_hyphen_values = true)]
        den: String,
        /// End time in seconds
        #[arg(long, default_value_t = 10.0)]
        t_end: f64,
        /// Time step in seconds
        #[arg(long, default_value_t = 0.01)]
        dt: f64,
    },
    /// Extract a submatrix with a range descriptor
    Slice {
        #[arg(long, allow_hyphen_values = true)]
        matrix: String,
        /// Descriptor such as "0:1,1:" or ":-1"
        #[arg(long, allow_hyphen_values = true)]
        range: String,
    },
}

#[derive(Serialize)]
struct MagPhaseReport {
    w: Vec<f64>,
    magnitude: Vec<f64>,
    phase: Vec<f64>,
}

#[derive(Serialize)]
struct StepReport {
    t: Vec<f64>,
    y: Vec<f64>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let output = cli.output.as_deref();

    match cli.command {
        Commands::Tf2ss { num, den } => cmd_tf2ss(&num, &den, output),
        Commands::Roots { poly } => cmd_roots(&poly, output),
        Commands::Eig { matrix } => cmd_eig(&matrix, output),
        Commands::Freqresp {
            num,
            den,
            w_lo,
            w_hi,
            points,
            abs,
            no_unwrap,
        } => cmd_freqresp(&num, &den, (w_lo, w_hi, points), abs, !no_unwrap, output),
        Commands::Step { num, den, t_end, dt } => cmd_step(&num, &den, t_end, dt, output),
        Commands::Slice { matrix, range } => cmd_slice(&matrix, &range, output),
    }
}

fn transfer_function(num: &str, den: &str) -> CliResult<TransferFunction> {
    Ok(TransferFunction::new(parse_list(num)?, parse_list(den)?)?)
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).map_err(|source| CliError::OutputWrite {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), "wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_tf2ss(num: &str, den: &str, output: Option<&Path>) -> CliResult<()> {
    let ss = transfer_function(num, den)?.tf2ss()?;
    emit(&ss, output)
}

fn cmd_roots(poly: &str, output: Option<&Path>) -> CliResult<()> {
    let r: Vec<Eigenvalue> = roots(&parse_list(poly)?)?;
    emit(&r, output)
}

fn cmd_eig(matrix: &str, output: Option<&Path>) -> CliResult<()> {
    let e = eig(&parse_matrix(matrix)?)?;
    emit(&e, output)
}

fn cmd_freqresp(
    num: &str,
    den: &str,
    (w_lo, w_hi, points): (f64, f64, usize),
    abs: bool,
    unwrap: bool,
    output: Option<&Path>,
) -> CliResult<()> {
    let tf = transfer_function(num, den)?;
    let w: Vec<f64> = logspace(w_lo, w_hi, points).iter().collect();
    let mode = if abs {
        MagnitudeMode::Abs
    } else {
        MagnitudeMode::Db
    };
    let resp = tf.freqresp(&w)?;
    let mp = resp.to_magph(mode, unwrap)?;
    emit(
        &MagPhaseReport {
            w: resp.w,
            magnitude: mp.magnitude,
            phase: mp.phase,
        },
        output,
    )
}

fn cmd_step(num: &str, den: &str, t_end: f64, dt: f64, output: Option<&Path>) -> CliResult<()> {
    let tf = transfer_function(num, den)?;
    let t: Vec<f64> = colon(0.0, dt, t_end)?.iter().collect();
    info!(samples = t.len(), dt, t_end, "step response");
    let trace = tf.step(&t)?;
    emit(
        &StepReport {
            y: trace.output(0),
            t: trace.t,
        },
        output,
    )
}

fn cmd_slice(matrix: &str, range: &str, output: Option<&Path>) -> CliResult<()> {
    let sub = parse_matrix(matrix)?.sub2d(range)?;
    emit(&sub, output)
}
