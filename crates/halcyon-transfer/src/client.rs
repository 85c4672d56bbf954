//! RPC collaborator seam and wire types.
//!
//! The wallet core never talks to a node directly; it drives an
//! injected [`RpcClient`]. Production embedders back the trait with a
//! real signing/broadcast client, tests with a scripted mock. Wire
//! types mirror the Cosmos-style JSON the collaborator exchanges.

use async_trait::async_trait;
use halcyon_types::config::ChainConfig;
use halcyon_types::{AccountId, HalcyonError, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A denominated token amount as the chain represents it.
///
/// The amount is a decimal string of base units; chains routinely
/// exceed `u64` here, and JSON numbers cannot carry `u128` safely.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    /// Base denomination, e.g. `uhal`.
    pub denom: String,
    /// Amount in base units, rendered as a decimal string.
    pub amount: String,
}

impl Coin {
    /// Creates a coin from an integer amount of base units.
    pub fn new(denom: &str, amount_base: u128) -> Self {
        Self {
            denom: denom.to_owned(),
            amount: amount_base.to_string(),
        }
    }

    /// Parses the amount string back into base units.
    ///
    /// # Errors
    ///
    /// Returns [`HalcyonError::InvalidAmount`] if the stored string is
    /// not a non-negative integer.
    pub fn amount_base(&self) -> Result<u128> {
        self.amount
            .parse()
            .map_err(|_| HalcyonError::InvalidAmount {
                reason: format!("'{}' is not an integer base amount", self.amount),
            })
    }
}

/// Fee attached to a broadcast transaction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    /// Fee coins; a single base-denomination coin for transfers.
    pub amount: Vec<Coin>,
    /// Gas limit requested for execution.
    pub gas_limit: u64,
}

impl Fee {
    /// Creates a single-coin fee.
    pub fn new(coin: Coin, gas_limit: u64) -> Self {
        Self {
            amount: vec![coin],
            gas_limit,
        }
    }
}

/// Outcome reported by the chain for a broadcast transaction.
///
/// A non-zero `code` means the chain accepted the broadcast but
/// rejected the transaction; it is a result, not a transport failure.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BroadcastResult {
    /// Chain result code; `0` is success.
    pub code: u32,
    /// Hex transaction hash assigned by the chain.
    #[serde(rename = "transactionHash")]
    pub tx_hash: String,
    /// Raw execution log, verbatim from the node.
    #[serde(rename = "rawLog")]
    pub raw_log: String,
}

// ---------------------------------------------------------------------------
// RpcClient
// ---------------------------------------------------------------------------

/// Async seam to the signing/broadcast collaborator.
///
/// Implementations own connection lifecycle, timeouts, and transaction
/// signing. Every method failure is a transport-level problem; chain
/// rejection of a transaction arrives as a successful
/// [`BroadcastResult`] with a non-zero code.
#[async_trait]
pub trait RpcClient {
    /// Returns the chain id the connected node reports.
    async fn chain_id(&self) -> Result<String>;

    /// Returns the current block height.
    async fn height(&self) -> Result<u64>;

    /// Returns the balance of `address` in the given denomination.
    async fn balance(&self, address: &AccountId, denom: &str) -> Result<Coin>;

    /// Signs and broadcasts a token transfer, waiting for the chain's
    /// inclusion result.
    async fn send_tokens(
        &self,
        sender: &AccountId,
        destination: &AccountId,
        amount: &[Coin],
        fee: &Fee,
        memo: &str,
    ) -> Result<BroadcastResult>;
}

// ---------------------------------------------------------------------------
// Chain id verification
// ---------------------------------------------------------------------------

/// Checks that the connected node serves the configured chain.
///
/// Call once after connecting, before any broadcast; a wallet signing
/// for the wrong chain is unrecoverable user damage.
///
/// # Errors
///
/// - [`HalcyonError::ChainMismatch`] if the node reports a different
///   chain id than the configuration expects.
/// - Any transport error from the client, passed through.
pub async fn verify_chain_id<C: RpcClient + ?Sized>(
    client: &C,
    config: &ChainConfig,
) -> Result<()> {
    let actual = client.chain_id().await?;
    if actual != config.chain_id {
        return Err(HalcyonError::ChainMismatch {
            expected: config.chain_id.clone(),
            actual,
        });
    }
    tracing::debug!(chain_id = %actual, "chain id verified");
    Ok(())
}
