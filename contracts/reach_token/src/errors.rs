//! Error kinds returned by every fallible engine operation.
//!
//! All variants are recoverable: a failed call leaves the ledger exactly as
//! it was before the call.

use thiserror::Error;

#[derive(Copy, Clone, Debug, Error, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Error {
    #[error("caller is not authorized")]
    Unauthorized,

    #[error("contract paused")]
    Paused,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("insufficient payment")]
    InsufficientPayment,

    #[error("slippage exceeded")]
    SlippageExceeded,

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("invalid proposal id")]
    NotFound,

    #[error("voting period ended")]
    VotingClosed,

    #[error("voting period still open")]
    VotingStillOpen,

    #[error("already voted")]
    AlreadyVoted,

    #[error("proposal already executed")]
    AlreadyExecuted,
}

pub type Result<T> = std::result::Result<T, Error>;
