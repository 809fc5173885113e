use crate::commands::common::{
    describe_event, format_amount, load_ledger, parse_address, parse_amount, save_ledger, Context,
};
use crate::{print_info, print_success};
use colored::*;
use esl_core::{execute, LedgerAction};

pub fn init(ctx: &Context, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if ctx.state.exists() && !force {
        return Err(format!(
            "Ledger already exists at {} (use --force to overwrite)",
            ctx.state.display()
        )
        .into());
    }

    let ledger = ctx.config.build_ledger()?;
    save_ledger(&ledger, &ctx.state)?;

    print_success(&format!(
        "Created {} ({}) at {}",
        ledger.name(),
        ledger.symbol(),
        ctx.state.display()
    ));
    print_info(&format!(
        "Reserve {} holds {} {}",
        ledger.reserve(),
        format_amount(ledger.total_supply(), ledger.decimals()),
        ledger.symbol()
    ));
    print_info(&format!("Rebase operator: {}", ctx.config.operator));
    Ok(())
}

pub fn transfer(
    ctx: &Context,
    caller: &str,
    to: &str,
    amount: &str,
    raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let to = parse_address(to)?;
    submit(ctx, caller, |decimals| {
        Ok(LedgerAction::Transfer {
            to,
            amount: parse_amount(amount, decimals, raw)?,
        })
    })
}

pub fn transfer_from(
    ctx: &Context,
    caller: &str,
    from: &str,
    to: &str,
    amount: &str,
    raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let from = parse_address(from)?;
    let to = parse_address(to)?;
    submit(ctx, caller, |decimals| {
        Ok(LedgerAction::TransferFrom {
            from,
            to,
            amount: parse_amount(amount, decimals, raw)?,
        })
    })
}

pub fn approve(
    ctx: &Context,
    caller: &str,
    spender: &str,
    amount: &str,
    raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let spender = parse_address(spender)?;
    submit(ctx, caller, |decimals| {
        Ok(LedgerAction::Approve {
            spender,
            amount: parse_amount(amount, decimals, raw)?,
        })
    })
}

pub fn increase_allowance(
    ctx: &Context,
    caller: &str,
    spender: &str,
    amount: &str,
    raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let spender = parse_address(spender)?;
    submit(ctx, caller, |decimals| {
        Ok(LedgerAction::IncreaseAllowance {
            spender,
            added: parse_amount(amount, decimals, raw)?,
        })
    })
}

pub fn decrease_allowance(
    ctx: &Context,
    caller: &str,
    spender: &str,
    amount: &str,
    raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let spender = parse_address(spender)?;
    submit(ctx, caller, |decimals| {
        Ok(LedgerAction::DecreaseAllowance {
            spender,
            subtracted: parse_amount(amount, decimals, raw)?,
        })
    })
}

pub fn rebase(ctx: &Context, caller: &str, delta: u128) -> Result<(), Box<dyn std::error::Error>> {
    submit(ctx, caller, |_| Ok(LedgerAction::Rebase { delta }))
}

pub fn claim(ctx: &Context, caller: &str) -> Result<(), Box<dyn std::error::Error>> {
    submit(ctx, caller, |_| Ok(LedgerAction::ClaimReserve))
}

/// Load, execute one action, and persist only if it succeeded.
///
/// `build` receives the ledger's decimals so amounts can be parsed against them.
fn submit(
    ctx: &Context,
    caller: &str,
    build: impl FnOnce(u8) -> Result<LedgerAction, String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let caller = parse_address(caller)?;
    let mut ledger = load_ledger(&ctx.state)?;
    let action = build(ledger.decimals())?;
    let authority = ctx.config.authority();

    let response = execute(&mut ledger, &authority, &caller, action);
    if !response.success {
        return Err(response.message.into());
    }
    save_ledger(&ledger, &ctx.state)?;

    print_success(&response.message);
    for event in &response.events {
        println!(
            "  {} {}",
            "•".cyan(),
            describe_event(event, ledger.decimals(), ledger.symbol())
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use esl_core::{Address, LedgerConfig};

    const ALICE: &str = "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a";
    const BOB: &str = "0x0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b";

    fn context(dir: &tempfile::TempDir) -> Context {
        Context {
            state: dir.path().join("ledger.json"),
            config: LedgerConfig::default(),
        }
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        init(&ctx, false).unwrap();
        assert!(init(&ctx, false).is_err());
        assert!(init(&ctx, true).is_ok());
    }

    #[test]
    fn test_claim_then_transfer_persists() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        init(&ctx, false).unwrap();

        claim(&ctx, ALICE).unwrap();
        transfer(&ctx, ALICE, BOB, "2.5", false).unwrap();

        let ledger = load_ledger(&ctx.state).unwrap();
        let bob: Address = BOB.parse().unwrap();
        assert_eq!(ledger.balance_of(&bob), 2_500_000_000);
        assert_eq!(
            ledger.balance_of(&ALICE.parse().unwrap()),
            ledger.claim_amount() - 2_500_000_000
        );
    }

    #[test]
    fn test_failed_action_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        init(&ctx, false).unwrap();
        claim(&ctx, ALICE).unwrap();
        let before = std::fs::read_to_string(&ctx.state).unwrap();

        assert!(claim(&ctx, ALICE).is_err());
        assert!(transfer(&ctx, BOB, ALICE, "1", false).is_err());
        assert_eq!(std::fs::read_to_string(&ctx.state).unwrap(), before);
    }

    #[test]
    fn test_rebase_requires_operator() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        init(&ctx, false).unwrap();

        let err = rebase(&ctx, ALICE, 110).unwrap_err();
        assert!(err.to_string().starts_with("Unauthorized"));

        let operator = ctx.config.operator.to_string();
        rebase(&ctx, &operator, 110).unwrap();
        let ledger = load_ledger(&ctx.state).unwrap();
        assert_eq!(ledger.total_supply(), ctx.config.initial_supply * 110 / 100);
    }

    #[test]
    fn test_allowance_flow() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        init(&ctx, false).unwrap();
        claim(&ctx, ALICE).unwrap();

        approve(&ctx, ALICE, BOB, "10", false).unwrap();
        increase_allowance(&ctx, ALICE, BOB, "5", false).unwrap();
        decrease_allowance(&ctx, ALICE, BOB, "100", false).unwrap();
        let ledger = load_ledger(&ctx.state).unwrap();
        assert_eq!(ledger.allowance(&ALICE.parse().unwrap(), &BOB.parse().unwrap()), 0);

        approve(&ctx, ALICE, BOB, "1000", true).unwrap();
        transfer_from(&ctx, BOB, ALICE, BOB, "400", true).unwrap();
        let ledger = load_ledger(&ctx.state).unwrap();
        assert_eq!(ledger.allowance(&ALICE.parse().unwrap(), &BOB.parse().unwrap()), 600);
        assert_eq!(ledger.balance_of(&BOB.parse().unwrap()), 400);
    }
}
