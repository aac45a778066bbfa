//! Queue primitives: a single-clock FIFO, a dual-clock FIFO and the flop
//! synchronizer both domain crossings are built from.

/// Dual-clock FIFO with gray-coded pointer exchange.
pub mod async_fifo;
/// Flop-chain synchronizer and gray-code helpers.
pub mod cdc;
/// Single-clock FIFO.
pub mod sync;

pub use async_fifo::AsyncFifo;
pub use cdc::{gray_decode, gray_encode, Synchronizer, SYNC_STAGES};
pub use sync::SyncFifo;
