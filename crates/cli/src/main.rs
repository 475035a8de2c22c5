//! PeerLend CLI - main entry point

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use peerlend_cli::{commands, AppContext};
use peerlend_core::AccountId;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "peerlend")]
#[command(about = "PeerLend - Peer-to-peer loan marketplace", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the market: bind roles and mint the initial supply
    Init {
        /// Admin (escrow) account
        #[arg(long)]
        admin: AccountId,
        /// Borrower account (repeatable)
        #[arg(long = "borrower")]
        borrowers: Vec<AccountId>,
        /// Guarantor account (repeatable)
        #[arg(long = "guarantor")]
        guarantors: Vec<AccountId>,
        /// Lender account (repeatable)
        #[arg(long = "lender")]
        lenders: Vec<AccountId>,
        /// Initial supply minted to the admin, in settlement units
        #[arg(long, default_value_t = 1_000_000)]
        supply: u64,
    },

    /// File a loan request (borrower)
    Request {
        /// Calling borrower
        from: AccountId,
        /// Principal in settlement units
        amount: u64,
        /// Payback date, RFC 3339 (e.g. 2026-12-31T00:00:00Z)
        due: DateTime<Utc>,
        /// Interest owed on top of the principal, in settlement units
        #[arg(long, default_value_t = 0)]
        interest: u64,
        /// Optional correlation ID
        #[arg(long)]
        correlation_id: Option<String>,
    },

    /// Post collateral backing a request (guarantor)
    Guarantee {
        /// Calling guarantor
        from: AccountId,
        /// Borrower whose request is backed
        borrower: AccountId,
        /// Attached collateral in settlement units (must equal the principal)
        value: u64,
        /// Interest the guarantor asks for, in settlement units
        #[arg(long, default_value_t = 0)]
        interest: u64,
        /// Optional correlation ID
        #[arg(long)]
        correlation_id: Option<String>,
    },

    /// Accept the pending guarantee (borrower)
    Accept {
        /// Calling borrower
        from: AccountId,
        /// Borrower whose record is accepted (must be the caller)
        borrower: AccountId,
        /// Optional correlation ID
        #[arg(long)]
        correlation_id: Option<String>,
    },

    /// Turn the pending guarantee down (borrower)
    Reject {
        /// Calling borrower
        from: AccountId,
        /// Borrower whose record is rejected (must be the caller)
        borrower: AccountId,
        /// Optional correlation ID
        #[arg(long)]
        correlation_id: Option<String>,
    },

    /// Fund an accepted request (lender)
    Grant {
        /// Calling lender
        from: AccountId,
        /// Borrower receiving the loan
        borrower: AccountId,
        /// Attached principal in settlement units
        value: u64,
        /// Optional correlation ID
        #[arg(long)]
        correlation_id: Option<String>,
    },

    /// Pay a granted loan back (borrower)
    Payback {
        /// Calling borrower
        from: AccountId,
        /// Borrower whose loan is repaid (must be the caller)
        borrower: AccountId,
        /// Attached value in settlement units (principal plus interest)
        value: u64,
        /// Optional correlation ID
        #[arg(long)]
        correlation_id: Option<String>,
    },

    /// Claim forfeited collateral after a default (lender)
    Claim {
        /// Calling lender
        from: AccountId,
        /// Borrower whose loan defaulted
        borrower: AccountId,
        /// Optional correlation ID
        #[arg(long)]
        correlation_id: Option<String>,
    },

    /// Show a borrower's loan record
    Status {
        /// Borrower to inspect
        borrower: AccountId,
    },

    /// Show an account's ledger balance
    Balance {
        /// Account to inspect
        account: AccountId,
    },

    /// Show the settlement token and total supply
    Token,

    /// List the latest journal records
    History {
        /// Maximum number of records to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Rebuild the market from the journal
    let mut ctx = AppContext::new(&cli.data)?;

    match cli.command {
        Commands::Init {
            admin,
            borrowers,
            guarantors,
            lenders,
            supply,
        } => {
            let correlation_id = Uuid::new_v4().to_string();
            commands::init(
                &mut ctx,
                admin,
                borrowers,
                guarantors,
                lenders,
                supply,
                &correlation_id,
            )?;
        }

        Commands::Request {
            from,
            amount,
            due,
            interest,
            correlation_id,
        } => {
            let correlation_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            commands::request(&mut ctx, &from, amount, due, interest, &correlation_id)?;
        }

        Commands::Guarantee {
            from,
            borrower,
            value,
            interest,
            correlation_id,
        } => {
            let correlation_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            commands::guarantee(&mut ctx, &from, &borrower, interest, value, &correlation_id)?;
        }

        Commands::Accept {
            from,
            borrower,
            correlation_id,
        } => {
            let correlation_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            commands::accept(&mut ctx, &from, &borrower, &correlation_id)?;
        }

        Commands::Reject {
            from,
            borrower,
            correlation_id,
        } => {
            let correlation_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            commands::reject(&mut ctx, &from, &borrower, &correlation_id)?;
        }

        Commands::Grant {
            from,
            borrower,
            value,
            correlation_id,
        } => {
            let correlation_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            commands::grant(&mut ctx, &from, &borrower, value, &correlation_id)?;
        }

        Commands::Payback {
            from,
            borrower,
            value,
            correlation_id,
        } => {
            let correlation_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            commands::payback(&mut ctx, &from, &borrower, value, &correlation_id)?;
        }

        Commands::Claim {
            from,
            borrower,
            correlation_id,
        } => {
            let correlation_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            commands::claim(&mut ctx, &from, &borrower, &correlation_id)?;
        }

        Commands::Status { borrower } => {
            commands::status(&ctx, &borrower)?;
        }

        Commands::Balance { account } => {
            commands::balance(&ctx, &account)?;
        }

        Commands::Token => {
            commands::token(&ctx)?;
        }

        Commands::History { limit } => {
            commands::history(&ctx, limit)?;
        }
    }

    Ok(())
}
