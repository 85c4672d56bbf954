//! Transfer state machine: prepare, confirm, broadcast.
//!
//! A transfer walks a strict state machine so that nothing reaches the
//! network without an explicit user approval step:
//!
//! ```text
//! Idle -> Prepared -> Confirmed -> Broadcast -> {Settled, Failed}
//! ```
//!
//! All validation and fee math happen in `prepare`; `confirm` is the
//! approval gate; `send` is the only network-touching operation. A
//! wrong-state call returns an error and leaves the machine untouched,
//! and terminal states only ever leave through an explicit [`reset`].
//!
//! [`reset`]: TransferFlow::reset

use halcyon_types::config::ChainConfig;
use halcyon_types::{AccountId, HalcyonError, Result};

use crate::amount::{fee_base_units, parse_display_amount};
use crate::client::{BroadcastResult, Coin, Fee, RpcClient};

// ---------------------------------------------------------------------------
// TransferState
// ---------------------------------------------------------------------------

/// States of the transfer flow.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransferState {
    /// No transfer in progress.
    Idle,
    /// Inputs validated, fee computed; awaiting user confirmation.
    Prepared,
    /// User has approved; ready to broadcast.
    Confirmed,
    /// Broadcast handed to the RPC client; awaiting the chain result.
    Broadcast,
    /// The chain included the transaction with result code 0.
    Settled,
    /// Broadcast failed, or the chain rejected the transaction.
    Failed,
}

// ---------------------------------------------------------------------------
// TransferIntent
// ---------------------------------------------------------------------------

/// A validated transfer awaiting confirmation and broadcast.
///
/// Produced by [`TransferFlow::prepare`]; every field has already
/// passed validation, and `total_base` is the exact amount the sender
/// balance must cover.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferIntent {
    /// Recipient address, verified against the network prefix.
    pub destination: AccountId,
    /// Transfer amount in base units.
    pub amount_base: u128,
    /// Fee in base units (`gas_limit * gas_price`, rounded).
    pub fee_base: u128,
    /// `amount_base + fee_base`.
    pub total_base: u128,
    /// Free-form transaction memo; may be empty.
    pub memo: String,
}

// ---------------------------------------------------------------------------
// FailureReason
// ---------------------------------------------------------------------------

/// Why a transfer ended in [`TransferState::Failed`].
///
/// The two cases are deliberately distinguishable: a chain rejection
/// carries a definitive verdict and must not be retried blindly, while
/// a transport failure says nothing about whether the transaction
/// reached the chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FailureReason {
    /// The chain processed the broadcast and rejected the transaction.
    ChainRejected {
        /// Chain result code, verbatim.
        code: u32,
        /// Raw execution log, verbatim.
        raw_log: String,
    },
    /// The RPC call itself failed before the chain gave a verdict.
    Transport {
        /// Human-readable description of the transport failure.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// TransferFlow
// ---------------------------------------------------------------------------

/// State machine driving one token transfer at a time.
///
/// The flow owns the sender identity and network configuration for its
/// lifetime; per-transfer data lives in the [`TransferIntent`] and is
/// cleared by [`reset`](Self::reset). The flow never signs anything;
/// broadcast is delegated to the injected [`RpcClient`].
pub struct TransferFlow {
    /// Network parameters (prefix, denom, decimals, gas).
    config: ChainConfig,
    /// Sending wallet address.
    sender: AccountId,
    /// Current state in the flow.
    state: TransferState,
    /// The validated transfer, present from Prepared onward.
    intent: Option<TransferIntent>,
    /// Chain response, present in Settled and chain-rejected Failed.
    outcome: Option<BroadcastResult>,
    /// Failure detail, present in Failed.
    failure: Option<FailureReason>,
}

impl TransferFlow {
    /// Creates an idle flow for the given sender on the given network.
    ///
    /// # Errors
    ///
    /// - [`HalcyonError::ConfigError`] if the configuration fails
    ///   validation.
    /// - [`HalcyonError::InvalidAddress`] if the sender address does
    ///   not carry the configured network prefix.
    pub fn new(sender: AccountId, config: ChainConfig) -> Result<Self> {
        config.validate()?;
        if !sender.matches_hrp(&config.bech32_prefix) {
            return Err(HalcyonError::InvalidAddress {
                reason: format!(
                    "sender prefix '{}' does not match network prefix '{}'",
                    sender.hrp(),
                    config.bech32_prefix
                ),
            });
        }
        Ok(Self {
            config,
            sender,
            state: TransferState::Idle,
            intent: None,
            outcome: None,
            failure: None,
        })
    }

    /// Returns the current flow state.
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Returns the sender address.
    pub fn sender(&self) -> &AccountId {
        &self.sender
    }

    /// Returns the validated transfer, if one has been prepared.
    pub fn intent(&self) -> Option<&TransferIntent> {
        self.intent.as_ref()
    }

    /// Returns the chain response, once a broadcast has a verdict.
    pub fn outcome(&self) -> Option<&BroadcastResult> {
        self.outcome.as_ref()
    }

    /// Returns the failure detail for a failed transfer.
    pub fn failure(&self) -> Option<&FailureReason> {
        self.failure.as_ref()
    }

    /// Returns `true` once the flow has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, TransferState::Settled | TransferState::Failed)
    }

    /// Validates a transfer request and computes its fee and total.
    ///
    /// Transitions from [`TransferState::Idle`] to
    /// [`TransferState::Prepared`] and returns the intent for display
    /// on a confirmation screen. On any validation failure the flow
    /// stays in `Idle` with no stored intent.
    ///
    /// `spendable_balance` is the sender's balance in base units,
    /// queried by the caller beforehand; preparation itself performs
    /// no I/O.
    ///
    /// # Errors
    ///
    /// - [`HalcyonError::InvalidTransition`] if not in `Idle` state.
    /// - [`HalcyonError::InvalidAddress`] if the destination does not
    ///   parse or carries a foreign network prefix.
    /// - [`HalcyonError::InvalidAmount`] if the amount does not parse,
    ///   is not positive and finite, or rounds to zero base units.
    /// - [`HalcyonError::InsufficientFunds`] if the balance cannot
    ///   cover amount plus fee.
    pub fn prepare(
        &mut self,
        destination: &str,
        amount_display: &str,
        memo: &str,
        spendable_balance: u128,
    ) -> Result<&TransferIntent> {
        if self.state != TransferState::Idle {
            return Err(HalcyonError::InvalidTransition {
                reason: "can only prepare from Idle state".into(),
            });
        }

        // 1. Destination must be a well-formed address on this network.
        let destination: AccountId = destination.trim().parse()?;
        if !destination.matches_hrp(&self.config.bech32_prefix) {
            return Err(HalcyonError::InvalidAddress {
                reason: format!(
                    "destination prefix '{}' does not match network prefix '{}'",
                    destination.hrp(),
                    self.config.bech32_prefix
                ),
            });
        }

        // 2. Amount and fee in base units.
        let amount_base = parse_display_amount(amount_display, self.config.decimals)?;
        let fee_base = fee_base_units(self.config.gas_limit, self.config.gas_price)?;
        let total_base = amount_base
            .checked_add(fee_base)
            .ok_or(HalcyonError::InvalidAmount {
                reason: "amount plus fee overflows".into(),
            })?;

        // 3. Funds check, inclusive: spending the entire balance is
        //    allowed.
        if total_base > spendable_balance {
            return Err(HalcyonError::InsufficientFunds {
                needed: total_base,
                available: spendable_balance,
            });
        }

        let intent = TransferIntent {
            destination,
            amount_base,
            fee_base,
            total_base,
            memo: memo.to_owned(),
        };
        tracing::debug!(
            destination = %intent.destination,
            amount = intent.amount_base,
            fee = intent.fee_base,
            "transfer prepared"
        );
        self.state = TransferState::Prepared;
        Ok(self.intent.insert(intent))
    }

    /// Records the user's explicit approval of the prepared transfer.
    ///
    /// Transitions from [`TransferState::Prepared`] to
    /// [`TransferState::Confirmed`]. Pure transition; broadcasting is
    /// impossible without it.
    ///
    /// # Errors
    ///
    /// Returns [`HalcyonError::InvalidTransition`] if not in
    /// `Prepared` state.
    pub fn confirm(&mut self) -> Result<()> {
        if self.state != TransferState::Prepared {
            return Err(HalcyonError::InvalidTransition {
                reason: "can only confirm from Prepared state".into(),
            });
        }
        self.state = TransferState::Confirmed;
        Ok(())
    }

    /// Broadcasts the confirmed transfer and waits for the verdict.
    ///
    /// Transitions from [`TransferState::Confirmed`] through
    /// [`TransferState::Broadcast`] to a terminal state, which is also
    /// returned:
    ///
    /// - [`TransferState::Settled`] when the chain reports code 0.
    /// - [`TransferState::Failed`] with
    ///   [`FailureReason::ChainRejected`] for a non-zero code; the
    ///   code and raw log are surfaced verbatim. This is a valid
    ///   outcome, not an error, and is never retried here.
    /// - [`TransferState::Failed`] with [`FailureReason::Transport`]
    ///   when the RPC call itself fails; whether the transaction
    ///   reached the chain is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`HalcyonError::InvalidTransition`] if not in
    /// `Confirmed` state; the flow is left unchanged.
    pub async fn send<C: RpcClient + ?Sized>(&mut self, client: &C) -> Result<TransferState> {
        if self.state != TransferState::Confirmed {
            return Err(HalcyonError::InvalidTransition {
                reason: "can only send from Confirmed state".into(),
            });
        }
        let intent = self
            .intent
            .clone()
            .ok_or_else(|| HalcyonError::InvalidTransition {
                reason: "confirmed flow has no transfer intent".into(),
            })?;

        self.state = TransferState::Broadcast;
        let coins = [Coin::new(&self.config.base_denom, intent.amount_base)];
        let fee = Fee::new(
            Coin::new(&self.config.base_denom, intent.fee_base),
            self.config.gas_limit,
        );

        let response = client
            .send_tokens(&self.sender, &intent.destination, &coins, &fee, &intent.memo)
            .await;

        match response {
            Ok(result) if result.code == 0 => {
                tracing::info!(tx_hash = %result.tx_hash, "transfer settled");
                self.outcome = Some(result);
                self.state = TransferState::Settled;
            }
            Ok(result) => {
                tracing::warn!(code = result.code, raw_log = %result.raw_log, "chain rejected transfer");
                self.failure = Some(FailureReason::ChainRejected {
                    code: result.code,
                    raw_log: result.raw_log.clone(),
                });
                self.outcome = Some(result);
                self.state = TransferState::Failed;
            }
            Err(e) => {
                tracing::warn!(error = %e, "transfer broadcast failed in transport");
                self.failure = Some(FailureReason::Transport {
                    reason: e.to_string(),
                });
                self.state = TransferState::Failed;
            }
        }
        Ok(self.state)
    }

    /// Returns the flow to [`TransferState::Idle`], clearing the
    /// intent, outcome, and failure detail.
    ///
    /// This is the only way out of a terminal state; starting another
    /// transfer always requires it.
    pub fn reset(&mut self) {
        self.state = TransferState::Idle;
        self.intent = None;
        self.outcome = None;
        self.failure = None;
    }
}
