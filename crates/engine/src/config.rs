//! MarketConfig - everything fixed at market opening

use peerlend_ledger::TokenInfo;
use peerlend_registry::RoleRegistry;
use serde::{Deserialize, Serialize};

/// Opening configuration of a market
///
/// Captured in the journal's first event so a replay reconstructs the same
/// registry, token and supply without any out-of-band state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub registry: RoleRegistry,
    pub token: TokenInfo,
    /// Supply minted to the admin at opening, in settlement units
    pub initial_supply: u64,
}
