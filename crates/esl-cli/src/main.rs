// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ESL CLI - Command Line Interface for the Elastic Scaled Ledger
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "esl")]
#[command(about = "Elastic Scaled Ledger - rebasing token ledger", long_about = None)]
#[command(version)]
struct Cli {
    /// Ledger state file (default: ~/.esl/ledger.json)
    #[arg(short, long, env = "ESL_STATE")]
    state: Option<PathBuf>,

    /// Ledger config TOML. Without it, ESL_* environment variables are used.
    #[arg(short, long, env = "ESL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh ledger with the whole supply in the reserve
    Init {
        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Show token parameters and conversion state
    Info,

    /// Show the public balance of an account
    Balance {
        address: String,

        /// Print atomic units instead of whole tokens
        #[arg(long)]
        raw: bool,
    },

    /// Show the scaled balance of an account
    ScaledBalance { address: String },

    /// Show how much `spender` may move on behalf of `owner`
    Allowance {
        owner: String,
        spender: String,

        /// Print atomic units instead of whole tokens
        #[arg(long)]
        raw: bool,
    },

    /// Move tokens from the caller to `to`
    Transfer {
        #[arg(long)]
        caller: String,

        #[arg(short, long)]
        to: String,

        /// Amount in tokens (e.g. 1.5), or atomic units with --raw
        #[arg(short, long)]
        amount: String,

        #[arg(long)]
        raw: bool,
    },

    /// Move tokens from `from` to `to` using the caller's allowance
    TransferFrom {
        #[arg(long)]
        caller: String,

        #[arg(short, long)]
        from: String,

        #[arg(short, long)]
        to: String,

        #[arg(short, long)]
        amount: String,

        #[arg(long)]
        raw: bool,
    },

    /// Set the allowance of `spender` over the caller's tokens
    Approve {
        #[arg(long)]
        caller: String,

        #[arg(short, long)]
        spender: String,

        #[arg(short, long)]
        amount: String,

        #[arg(long)]
        raw: bool,
    },

    /// Raise the allowance of `spender`
    IncreaseAllowance {
        #[arg(long)]
        caller: String,

        #[arg(short, long)]
        spender: String,

        #[arg(short, long)]
        amount: String,

        #[arg(long)]
        raw: bool,
    },

    /// Lower the allowance of `spender` (clamps at zero)
    DecreaseAllowance {
        #[arg(long)]
        caller: String,

        #[arg(short, long)]
        spender: String,

        #[arg(short, long)]
        amount: String,

        #[arg(long)]
        raw: bool,
    },

    /// Multiply total supply by delta/100 (operator only)
    Rebase {
        #[arg(long)]
        caller: String,

        /// Percentage multiplier; 100 keeps supply unchanged
        #[arg(short, long)]
        delta: u128,
    },

    /// Claim the fixed reserve allocation (once per account)
    Claim {
        #[arg(long)]
        caller: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG=esl_core=debug shows every committed operation
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let state = cli.state.unwrap_or_else(commands::common::default_state_path);
    let config = commands::common::load_config(cli.config.as_deref())?;
    let ctx = commands::common::Context { state, config };

    match cli.command {
        Commands::Init { force } => commands::tx::init(&ctx, force),
        Commands::Info => commands::query::info(&ctx),
        Commands::Balance { address, raw } => commands::query::balance(&ctx, &address, raw),
        Commands::ScaledBalance { address } => commands::query::scaled_balance(&ctx, &address),
        Commands::Allowance {
            owner,
            spender,
            raw,
        } => commands::query::allowance(&ctx, &owner, &spender, raw),
        Commands::Transfer {
            caller,
            to,
            amount,
            raw,
        } => commands::tx::transfer(&ctx, &caller, &to, &amount, raw),
        Commands::TransferFrom {
            caller,
            from,
            to,
            amount,
            raw,
        } => commands::tx::transfer_from(&ctx, &caller, &from, &to, &amount, raw),
        Commands::Approve {
            caller,
            spender,
            amount,
            raw,
        } => commands::tx::approve(&ctx, &caller, &spender, &amount, raw),
        Commands::IncreaseAllowance {
            caller,
            spender,
            amount,
            raw,
        } => commands::tx::increase_allowance(&ctx, &caller, &spender, &amount, raw),
        Commands::DecreaseAllowance {
            caller,
            spender,
            amount,
            raw,
        } => commands::tx::decrease_allowance(&ctx, &caller, &spender, &amount, raw),
        Commands::Rebase { caller, delta } => commands::tx::rebase(&ctx, &caller, delta),
        Commands::Claim { caller } => commands::tx::claim(&ctx, &caller),
    }
}

fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

// ─────────────────────────────────────────────────────────────────
// UNIT TESTS
// ─────────────────────────────────────────────────────────────────
