use crate::commands::common::{format_amount, load_ledger, parse_address, Context};
use colored::*;
use esl_core::TokenMetadata;

pub fn info(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = load_ledger(&ctx.state)?;
    let meta = TokenMetadata::of(&ledger);

    println!();
    println!("{}", "Ledger Info".bold().underline());
    println!();
    println!(
        "  {}: {} ({})",
        "Name".bold(),
        meta.name.green(),
        meta.symbol.yellow()
    );
    println!("  {}: {}", "Decimals".bold(), meta.decimals);
    println!(
        "  {}: {} {}",
        "Total Supply".bold(),
        format_amount(meta.total_supply, meta.decimals).cyan(),
        meta.symbol
    );
    println!(
        "  {}: {} {}",
        "Max Supply".bold(),
        format_amount(meta.max_supply, meta.decimals),
        meta.symbol
    );
    println!("  {}: {}", "Scaled Pool".bold(), meta.scaled_total_supply);
    println!("  {}: {}", "Scaled/Fragment".bold(), meta.scaled_per_fragment);
    println!("  {}: {}", "Ledger".bold(), meta.ledger_address);
    println!(
        "  {}: {} ({} {} left)",
        "Reserve".bold(),
        meta.reserve,
        format_amount(ledger.balance_of(&meta.reserve), meta.decimals),
        meta.symbol
    );
    println!(
        "  {}: {} {}",
        "Claim Amount".bold(),
        format_amount(meta.claim_amount, meta.decimals),
        meta.symbol
    );
    println!("  {}: {}", "Holders".bold(), ledger.accounts().count());
    println!("  {}: {}", "State File".dimmed(), ctx.state.display());
    Ok(())
}

pub fn balance(ctx: &Context, address: &str, raw: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = load_ledger(&ctx.state)?;
    let account = parse_address(address)?;
    let amount = ledger.balance_of(&account);
    let shown = if raw {
        amount.to_string()
    } else {
        format_amount(amount, ledger.decimals())
    };
    println!("{}: {} {}", account, shown.cyan().bold(), ledger.symbol());
    if ledger.has_claimed(&account) {
        println!("  {}", "reserve allocation claimed".dimmed());
    }
    Ok(())
}

pub fn scaled_balance(ctx: &Context, address: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = load_ledger(&ctx.state)?;
    let account = parse_address(address)?;
    println!(
        "{}: {} scaled units",
        account,
        ledger.scaled_balance_of(&account).to_string().cyan().bold()
    );
    Ok(())
}

pub fn allowance(
    ctx: &Context,
    owner: &str,
    spender: &str,
    raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = load_ledger(&ctx.state)?;
    let owner = parse_address(owner)?;
    let spender = parse_address(spender)?;
    let amount = ledger.allowance(&owner, &spender);
    let shown = if raw {
        amount.to_string()
    } else {
        format_amount(amount, ledger.decimals())
    };
    println!(
        "{} → {}: {} {}",
        owner,
        spender,
        shown.cyan().bold(),
        ledger.symbol()
    );
    Ok(())
}
