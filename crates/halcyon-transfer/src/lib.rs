//! Token transfer construction for the Halcyon wallet.
//!
//! Turns a user's transfer request (destination, display amount, memo)
//! into a validated, fee-covered intent and walks it through an
//! explicit confirmation state machine before handing it to an
//! injected RPC client for broadcast. Nothing here signs or serializes
//! transactions; that lives behind the [`client::RpcClient`] seam.
//!
//! # Modules
//!
//! - [`amount`] — display/base unit conversion and fee arithmetic
//! - [`client`] — the [`client::RpcClient`] collaborator seam and wire
//!   types ([`client::Coin`], [`client::Fee`],
//!   [`client::BroadcastResult`])
//! - [`flow`] — the [`flow::TransferFlow`] state machine

pub mod amount;
pub mod client;
pub mod flow;
