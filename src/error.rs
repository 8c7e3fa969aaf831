use thiserror::Error;

#[derive(Debug, Error)]
pub enum Ev3Error {
    #[error("device used before initialise()")]
    NotInitialised,
    #[error("invalid sensor port {0} (expected 1..=4)")]
    InvalidPort(u8),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serial: {0}")]
    Serial(#[from] serialport::Error),
    #[error("reply too short: {0} bytes")]
    ShortReply(usize),
    #[error("reply length field says {declared}, got {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("unknown reply type 0x{0:02X}")]
    UnknownReplyType(u8),
    #[error("reply counter {got} does not match request {expected}")]
    CounterMismatch { expected: u16, got: u16 },
    #[error("brick reported an error for message {0}")]
    ReplyError(u16),
    #[error("no reply received")]
    NoReply,
}

pub type Result<T> = std::result::Result<T, Ev3Error>;
