use std::fmt::Formatter;
use web3::types::{Address, U256};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// malformed campaign window or deposit
    InvalidParameters(&'static str),
    NotFound(u64),
    WindowNotOpen,
    WindowClosed,
    AlreadyJoined,
    AlreadyCommitted,
    AlreadyRevealed,
    AlreadyRewarded,
    AlreadyRefunded,
    DuplicateCommitment,
    CommitmentMismatch,
    NotAParticipant,
    NotAConsumer,
    IncompleteReveal,
    RefundNotAllowed,
    /// the participant did not reveal while others did
    DepositForfeited,
    NotPayable,
    DepositMismatch { expected: U256, got: U256 },
    InsufficientFunds { account: Address, needed: U256, available: U256 },
    Overflow,
    Config(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidParameters(e) => write!(f, "invalid parameters: {}", e),
            Error::NotFound(id) => write!(f, "campaign {} not found", id),
            Error::WindowNotOpen => write!(f, "window for this operation is not open yet"),
            Error::WindowClosed => write!(f, "window for this operation is closed"),
            Error::AlreadyJoined => write!(f, "caller already follows this campaign"),
            Error::AlreadyCommitted => write!(f, "caller already committed to this campaign"),
            Error::AlreadyRevealed => write!(f, "secret already revealed"),
            Error::AlreadyRewarded => write!(f, "bounty already claimed"),
            Error::AlreadyRefunded => write!(f, "bounty already refunded"),
            Error::DuplicateCommitment => write!(f, "commitment already used in this campaign"),
            Error::CommitmentMismatch => write!(f, "secret does not match commitment"),
            Error::NotAParticipant => write!(f, "caller is not a participant"),
            Error::NotAConsumer => write!(f, "caller is not a consumer"),
            Error::IncompleteReveal => write!(f, "not every committer revealed"),
            Error::RefundNotAllowed => write!(f, "campaign succeeded, bounty is not refundable"),
            Error::DepositForfeited => write!(f, "deposit forfeited: secret was never revealed"),
            Error::NotPayable => write!(f, "operation does not accept value"),
            Error::DepositMismatch { expected, got } => {
                write!(f, "deposit must be exactly {}, got {}", expected, got)
            }
            Error::InsufficientFunds {
                account,
                needed,
                available,
            } => write!(
                f,
                "insufficient funds on {:?}: needed {}, available {}",
                account, needed, available
            ),
            Error::Overflow => write!(f, "arithmetic overflow"),
            Error::Config(e) => write!(f, "config error: {}", e),
            Error::Io(e) => write!(f, "Io error {:?}", e),
            Error::Json(e) => write!(f, "Json error {:?}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
