//! CLI commands

use crate::context::AppContext;
use chrono::{DateTime, Utc};
use peerlend_core::{AccountId, Amount, MAX_UNIT_FIGURE};
use peerlend_engine::MarketConfig;
use peerlend_ledger::TokenInfo;
use peerlend_registry::RoleRegistry;

/// Convert a CLI unit figure into ledger value, refusing absurd inputs
fn attach(value: u64) -> anyhow::Result<Amount> {
    if value > MAX_UNIT_FIGURE {
        anyhow::bail!(
            "attached value {value} exceeds the settlement range (max {MAX_UNIT_FIGURE} units)"
        );
    }
    Ok(Amount::from_units(value))
}

/// Open the market: bind roles, mint the initial supply
pub fn init(
    ctx: &mut AppContext,
    admin: AccountId,
    borrowers: Vec<AccountId>,
    guarantors: Vec<AccountId>,
    lenders: Vec<AccountId>,
    supply: u64,
    correlation_id: &str,
) -> anyhow::Result<()> {
    let registry = RoleRegistry::builder()
        .admin(admin)?
        .borrowers(borrowers)?
        .guarantors(guarantors)?
        .lenders(lenders)?
        .build()?;

    let config = MarketConfig {
        registry,
        token: TokenInfo::loan_token(),
        initial_supply: supply,
    };
    let record = ctx.open_market(config, correlation_id)?;

    let engine = ctx.engine()?;
    let registry = engine.registry();
    println!("✅ Market opened with {}", engine.token());
    println!(
        "   admin {}, {} borrowers, {} guarantors, {} lenders, {} units supply (seq: {})",
        registry.admin(),
        registry.borrowers().len(),
        registry.guarantors().len(),
        registry.lenders().len(),
        supply,
        record.sequence
    );
    Ok(())
}

/// File a loan request
pub fn request(
    ctx: &mut AppContext,
    from: &AccountId,
    amount: u64,
    due: DateTime<Utc>,
    interest: u64,
    correlation_id: &str,
) -> anyhow::Result<()> {
    let record = ctx.submit(correlation_id, |engine| {
        engine.request_loan(from, amount, due, interest)
    })?;

    println!(
        "✅ {} requested {} units due {} (+{} interest) (seq: {})",
        from,
        amount,
        due.format("%Y-%m-%d %H:%M:%S"),
        interest,
        record.sequence
    );
    Ok(())
}

/// Post collateral backing a borrower's request
pub fn guarantee(
    ctx: &mut AppContext,
    from: &AccountId,
    borrower: &AccountId,
    interest: u64,
    value: u64,
    correlation_id: &str,
) -> anyhow::Result<()> {
    let attached = attach(value)?;
    let record = ctx.submit(correlation_id, |engine| {
        engine.place_guarantee(from, borrower, interest, attached)
    })?;

    println!(
        "✅ {} guaranteed {} with {} units, asking {} interest (seq: {})",
        from, borrower, value, interest, record.sequence
    );
    Ok(())
}

/// Accept the pending guarantee
pub fn accept(
    ctx: &mut AppContext,
    from: &AccountId,
    borrower: &AccountId,
    correlation_id: &str,
) -> anyhow::Result<()> {
    let record = ctx.submit(correlation_id, |engine| {
        engine.accept_guarantee(from, borrower)
    })?;

    println!("✅ {} accepted the guarantee (seq: {})", borrower, record.sequence);
    Ok(())
}

/// Turn the pending guarantee down, refunding the guarantor
pub fn reject(
    ctx: &mut AppContext,
    from: &AccountId,
    borrower: &AccountId,
    correlation_id: &str,
) -> anyhow::Result<()> {
    let record = ctx.submit(correlation_id, |engine| {
        engine.reject_guarantee(from, borrower)
    })?;

    println!("✅ {} rejected the guarantee (seq: {})", borrower, record.sequence);
    Ok(())
}

/// Fund an accepted request
pub fn grant(
    ctx: &mut AppContext,
    from: &AccountId,
    borrower: &AccountId,
    value: u64,
    correlation_id: &str,
) -> anyhow::Result<()> {
    let attached = attach(value)?;
    let record = ctx.submit(correlation_id, |engine| {
        engine.grant_loan(from, borrower, attached)
    })?;

    println!(
        "✅ {} granted {} units to {} (seq: {})",
        from, value, borrower, record.sequence
    );
    Ok(())
}

/// Pay a granted loan back, principal plus interest
pub fn payback(
    ctx: &mut AppContext,
    from: &AccountId,
    borrower: &AccountId,
    value: u64,
    correlation_id: &str,
) -> anyhow::Result<()> {
    let attached = attach(value)?;
    let record = ctx.submit(correlation_id, |engine| {
        engine.payback_loan(from, borrower, attached)
    })?;

    println!(
        "✅ {} paid back {} units (seq: {})",
        borrower, value, record.sequence
    );
    Ok(())
}

/// Claim the forfeited collateral of a defaulted loan
pub fn claim(
    ctx: &mut AppContext,
    from: &AccountId,
    borrower: &AccountId,
    correlation_id: &str,
) -> anyhow::Result<()> {
    let record = ctx.submit(correlation_id, |engine| {
        engine.withdraw_guarantee(from, borrower)
    })?;

    println!(
        "✅ {} withdrew the forfeited collateral of {}'s loan (seq: {})",
        from, borrower, record.sequence
    );
    Ok(())
}

/// Show a borrower's loan record
pub fn status(ctx: &AppContext, borrower: &AccountId) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    match engine.loan_request_for_borrower(borrower) {
        None => println!("No loan record for {}", borrower),
        Some(record) => {
            println!("Loan record for {}:", borrower);
            println!("  state:     {}", record.state);
            println!("  amount:    {} units", record.loan_amount);
            println!("  interest:  {} units", record.payback_interest);
            println!("  due:       {}", record.payback_date.format("%Y-%m-%d %H:%M:%S"));
            match &record.guarantor {
                Some(guarantor) => println!(
                    "  guarantor: {} (asking {} units)",
                    guarantor, record.guarantor_interest
                ),
                None => println!("  guarantor: none"),
            }
            match &record.lender {
                Some(lender) => println!("  lender:    {}", lender),
                None => println!("  lender:    none"),
            }
        }
    }
    Ok(())
}

/// Show an account's ledger balance
pub fn balance(ctx: &AppContext, account: &AccountId) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    let balance = engine.balance_of(account);
    println!(
        "Balance for {}: {} units ({} base)",
        account,
        balance.to_units(),
        balance
    );
    Ok(())
}

/// Show the settlement token and total supply
pub fn token(ctx: &AppContext) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    let token = engine.token();
    println!("{}", token);
    println!("  decimals:     {}", token.decimals);
    println!("  total supply: {} units", engine.total_supply().to_units());
    Ok(())
}

/// List the latest journal records
pub fn history(ctx: &AppContext, limit: usize) -> anyhow::Result<()> {
    let records = ctx.records()?;
    let start = records.len().saturating_sub(limit);

    println!(
        "Journal: {} records (showing {})",
        records.len(),
        records.len() - start
    );
    for record in &records[start..] {
        println!(
            "{:>5}  {}  {}",
            record.sequence,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.event
        );
    }
    Ok(())
}
