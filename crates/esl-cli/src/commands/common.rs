use esl_core::{Address, LedgerConfig, LedgerEvent, LedgerSnapshot, ScaledLedger};
use std::path::{Path, PathBuf};

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub state: PathBuf,
    pub config: LedgerConfig,
}

pub fn default_state_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".esl")
        .join("ledger.json")
}

/// Config file if one was given, otherwise ESL_* environment variables.
pub fn load_config(path: Option<&Path>) -> Result<LedgerConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => LedgerConfig::load_from_file(path)
            .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?,
        None => LedgerConfig::load_from_env()?,
    };
    config.validate()?;
    Ok(config)
}

pub fn load_ledger(state: &Path) -> Result<ScaledLedger, Box<dyn std::error::Error>> {
    if !state.exists() {
        return Err(format!(
            "No ledger at {} (run `esl init` first)",
            state.display()
        )
        .into());
    }
    let ledger = LedgerSnapshot::load_from_file(state)?.restore()?;
    log::debug!(
        "loaded ledger from {} (supply {})",
        state.display(),
        ledger.total_supply()
    );
    Ok(ledger)
}

pub fn save_ledger(ledger: &ScaledLedger, state: &Path) -> Result<(), Box<dyn std::error::Error>> {
    ledger.snapshot().save_to_file(state)?;
    log::debug!("saved ledger to {}", state.display());
    Ok(())
}

pub fn parse_address(text: &str) -> Result<Address, Box<dyn std::error::Error>> {
    text.parse::<Address>()
        .map_err(|e| format!("'{}': {}", text, e).into())
}

/// Parse a token amount into atomic units.
///
/// `"1.5"` with 9 decimals is 1_500_000_000. With `raw` the text is taken
/// as atomic units directly.
pub fn parse_amount(text: &str, decimals: u8, raw: bool) -> Result<u128, String> {
    let text = text.trim();
    if raw {
        return text
            .parse::<u128>()
            .map_err(|e| format!("Invalid amount '{}': {}", text, e));
    }

    let unit = 10u128
        .checked_pow(decimals as u32)
        .ok_or_else(|| format!("Unsupported decimals: {}", decimals))?;
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(format!("Invalid amount '{}'", text));
    }
    if fraction.len() > decimals as usize {
        return Err(format!(
            "Amount '{}' has more than {} decimal places",
            text, decimals
        ));
    }
    let digits = |s: &str| -> Result<u128, String> {
        if s.is_empty() {
            return Ok(0);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("Invalid amount '{}'", text));
        }
        s.parse::<u128>()
            .map_err(|e| format!("Invalid amount '{}': {}", text, e))
    };

    let whole = digits(whole)?;
    let padding = 10u128.pow((decimals as usize - fraction.len()) as u32);
    let fraction = digits(fraction)? * padding;
    whole
        .checked_mul(unit)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(|| format!("Amount '{}' is too large", text))
}

/// Render atomic units as tokens, trimming trailing zeros.
pub fn format_amount(atomic: u128, decimals: u8) -> String {
    let unit = match 10u128.checked_pow(decimals as u32) {
        Some(unit) => unit,
        None => return atomic.to_string(),
    };
    let whole = atomic / unit;
    let fraction = atomic % unit;
    if fraction == 0 {
        return whole.to_string();
    }
    let padded = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, padded.trim_end_matches('0'))
}

pub fn describe_event(event: &LedgerEvent, decimals: u8, symbol: &str) -> String {
    match event {
        LedgerEvent::Transfer { from, to, amount } => format!(
            "Transfer {} {} {} → {}",
            format_amount(*amount, decimals),
            symbol,
            from,
            to
        ),
        LedgerEvent::Approval {
            owner,
            spender,
            amount,
        } => format!(
            "Approval {} → {} for {} {}",
            owner,
            spender,
            format_amount(*amount, decimals),
            symbol
        ),
        LedgerEvent::Rebase { total_supply } => format!(
            "Rebase: total supply {} {}",
            format_amount(*total_supply, decimals),
            symbol
        ),
    }
}
