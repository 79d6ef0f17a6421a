//! Constant-product pool core.
//!
//! - [`quote`]: pure quote functions over [`Reserves`].
//! - [`ledger`]: [`PoolLedger`], the owner of reserves and share balances.
//! - [`event`]: event records and the append-only [`EventLog`].
//!
//! Quantities are 18-decimal fixed-point integers ([`Amount`], [`Shares`]);
//! products are evaluated in 256-bit integers ([`U256`]).

pub mod amount;
pub mod error;
pub mod event;
pub mod ledger;
pub(crate) mod math;
pub mod quote;

pub use amount::{Amount, DECIMALS, Shares, UNIT};
pub use error::AmmError;
pub use event::{DepositEvent, EventLog, LedgerEvent, SwapEvent, WithdrawEvent};
pub use ledger::{HolderId, LedgerSnapshot, PoolLedger};
pub use math::U256;
pub use quote::{Reserves, TokenSide};
