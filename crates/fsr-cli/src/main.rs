//! Command-line interface for `fsr-core`.

#![forbid(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use fsr_ciphers::{Grain, A51, E0};
use fsr_core::{
    bits_to_string, Bit, Expression, InitialState, Lfsr, LfsrConfig, NlfsrConfig, ShiftRegister,
    Topology,
};
use log::{debug, info, LevelFilter};

/// Feedback shift register toolkit.
#[derive(Parser)]
#[command(
    name = "fsr",
    version,
    author,
    about = "Simulate linear and nonlinear feedback shift registers"
)]
struct Cli {
    /// Log construction and progress details.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clock an LFSR and print its output bits.
    Lfsr {
        #[command(flatten)]
        register: LfsrArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Clock an NLFSR and print its output bits.
    Nlfsr {
        /// Feedback function in RPN, e.g. "0 1 and 2 xor".
        #[arg(long, value_name = "EXPR")]
        feedback: String,
        /// Initial state: a bit string such as 0110, "ones" or "random".
        #[arg(long, value_name = "STATE")]
        state: String,
        /// Register length, required for "ones" and "random".
        #[arg(long)]
        size: Option<usize>,
        /// Output function in RPN; defaults to the tail bit.
        #[arg(long, value_name = "EXPR")]
        output_fn: Option<String>,
        /// Cycles to run and discard after seeding.
        #[arg(long, default_value_t = 0)]
        warmup: u64,
        /// RNG seed for a reproducible "random" state.
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Measure how many cycles an LFSR needs to return to its initial state.
    Period {
        #[command(flatten)]
        register: LfsrArgs,
        /// Give up after this many cycles.
        #[arg(long, default_value_t = 1 << 24)]
        limit: u64,
    },
    /// Print an A5/1-style keystream.
    A51 {
        /// 64-bit key as 16 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Number of keystream bits.
        #[arg(long, default_value_t = 128)]
        count: usize,
    },
    /// Print an E0-style summation combiner keystream.
    E0 {
        /// 128-bit key as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Number of keystream bits.
        #[arg(long, default_value_t = 128)]
        count: usize,
    },
    /// Print a Grain v0-style keystream.
    Grain {
        /// 80-bit key as 20 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// 64-bit IV as 16 hex characters.
        #[arg(long, value_name = "HEX")]
        iv_hex: String,
        /// Number of keystream bits.
        #[arg(long, default_value_t = 128)]
        count: usize,
    },
}

#[derive(Args)]
struct LfsrArgs {
    /// Tap positions, e.g. 3,2 (the largest is the register length).
    #[arg(long, value_delimiter = ',', required = true)]
    taps: Vec<usize>,
    /// Initial state: a bit string such as 011, "ones" or "random".
    #[arg(long, value_name = "STATE")]
    state: String,
    /// Feedback topology: external (Fibonacci) or internal (Galois).
    #[arg(long, default_value = "external")]
    topology: String,
    /// Output function in RPN; defaults to the tail bit.
    #[arg(long, value_name = "EXPR")]
    output_fn: Option<String>,
    /// Cycles to run and discard after seeding.
    #[arg(long, default_value_t = 0)]
    warmup: u64,
    /// RNG seed for a reproducible "random" state.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct OutputArgs {
    /// Number of output bits to generate.
    #[arg(long, default_value_t = 32)]
    count: usize,
    /// Print register details after generating.
    #[arg(long, default_value_t = false)]
    info: bool,
    /// Log progress while generating.
    #[arg(long, default_value_t = false)]
    progress: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Lfsr { register, output } => cmd_lfsr(&register, &output),
        Commands::Nlfsr {
            feedback,
            state,
            size,
            output_fn,
            warmup,
            seed,
            output,
        } => cmd_nlfsr(
            &feedback,
            &state,
            size,
            output_fn.as_deref(),
            warmup,
            seed,
            &output,
        ),
        Commands::Period { register, limit } => cmd_period(&register, limit),
        Commands::A51 { key_hex, count } => cmd_a51(&key_hex, count),
        Commands::E0 { key_hex, count } => cmd_e0(&key_hex, count),
        Commands::Grain {
            key_hex,
            iv_hex,
            count,
        } => cmd_grain(&key_hex, &iv_hex, count),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .init();
}

fn cmd_lfsr(args: &LfsrArgs, output: &OutputArgs) -> Result<()> {
    let mut lfsr = build_lfsr(args)?;
    let bits = generate(&mut lfsr, output)?;
    println!("{}", bits_to_string(&bits));
    if output.info {
        println!("{}", lfsr.info());
    }
    Ok(())
}

fn cmd_nlfsr(
    feedback: &str,
    state: &str,
    size: Option<usize>,
    output_fn: Option<&str>,
    warmup: u64,
    seed: Option<u64>,
    output: &OutputArgs,
) -> Result<()> {
    let mut config = NlfsrConfig::new(parse_state(state, seed)?)
        .feedback(parse_expression(feedback)?)
        .warmup_cycles(warmup);
    if let Some(size) = size {
        config = config.size(size);
    }
    if let Some(text) = output_fn {
        config = config.output(parse_expression(text)?);
    }
    let mut nlfsr = config.build().context("build nlfsr")?;
    let bits = generate(&mut nlfsr, output)?;
    println!("{}", bits_to_string(&bits));
    if output.info {
        println!("{}", nlfsr.info());
    }
    Ok(())
}

fn cmd_period(args: &LfsrArgs, limit: u64) -> Result<()> {
    let mut lfsr = build_lfsr(args)?;
    let expected = lfsr.maximal_period();
    match lfsr.period(limit).context("clock lfsr")? {
        Some(period) => {
            println!("{lfsr}: period {period}");
            if expected == Some(u128::from(period)) {
                println!("maximal length sequence");
            }
        }
        None => bail!("no return to the initial state within {limit} cycles"),
    }
    Ok(())
}

fn cmd_a51(key_hex: &str, count: usize) -> Result<()> {
    let key: [u8; 8] = parse_hex_array(key_hex, "A5/1 key")?;
    let mut cipher = A51::new(&key).context("key a5/1")?;
    let stream = cipher.keystream(count).context("generate keystream")?;
    println!("{}", bits_to_string(&stream));
    Ok(())
}

fn cmd_e0(key_hex: &str, count: usize) -> Result<()> {
    let key: [u8; 16] = parse_hex_array(key_hex, "E0 key")?;
    let mut cipher = E0::new(&key).context("key e0")?;
    let stream = cipher.keystream(count).context("generate keystream")?;
    println!("{}", bits_to_string(&stream));
    Ok(())
}

fn cmd_grain(key_hex: &str, iv_hex: &str, count: usize) -> Result<()> {
    let key: [u8; 10] = parse_hex_array(key_hex, "Grain key")?;
    let iv: [u8; 8] = parse_hex_array(iv_hex, "Grain IV")?;
    let mut cipher = Grain::new(&key, &iv).context("initialise grain")?;
    let stream = cipher.keystream(count).context("generate keystream")?;
    println!("{}", bits_to_string(&stream));
    Ok(())
}

fn build_lfsr(args: &LfsrArgs) -> Result<Lfsr> {
    let topology: Topology = args.topology.parse().context("parse topology")?;
    let mut config = LfsrConfig::new(&args.taps, parse_state(&args.state, args.seed)?)
        .topology(topology)
        .warmup_cycles(args.warmup);
    if let Some(text) = &args.output_fn {
        config = config.output(parse_expression(text)?);
    }
    config.build().context("build lfsr")
}

fn generate<R: ShiftRegister + std::fmt::Display>(
    register: &mut R,
    output: &OutputArgs,
) -> Result<Vec<Bit>> {
    debug!("generating {} bits from {register}", output.count);
    let step = (output.count / 10).max(1);
    let mut report = |done: usize, total: usize| {
        if output.progress && (done % step == 0 || done == total) {
            info!("generated {done}/{total} bits");
        }
    };
    register
        .sequence_with_progress(output.count, &mut report)
        .context("generate sequence")
}

fn parse_state(text: &str, seed: Option<u64>) -> Result<InitialState> {
    let state: InitialState = text
        .parse()
        .with_context(|| format!("parse initial state {text:?}"))?;
    Ok(match state {
        InitialState::Random(_) => InitialState::Random(seed),
        other => other,
    })
}

fn parse_expression(text: &str) -> Result<Expression> {
    text.parse()
        .with_context(|| format!("parse expression {text:?}"))
}

fn parse_hex_array<const N: usize>(hex_str: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(hex_str.trim()).with_context(|| format!("decode {what} hex"))?;
    if bytes.len() != N {
        bail!("{what} must be {N} bytes ({} hex characters)", N * 2);
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}
