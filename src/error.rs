// ─── Error ──────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    // ── Builder ──
    #[error("arena growth to {requested} bytes exceeds the configured maximum of {max}")]
    CapacityExceeded { requested: usize, max: usize },
    #[error("unbalanced object: {0}")]
    UnbalancedObject(&'static str),
    #[error("no object is open for field writes")]
    NoActiveObject,
    #[error("field index {slot} out of range for an object of {field_count} fields")]
    FieldIndexOutOfRange { slot: usize, field_count: usize },
    #[error("object declares {requested} fields, the limit is {max}")]
    TooManyFields { requested: usize, max: usize },
    #[error("object inline size {size} does not fit a 16-bit vtable entry")]
    ObjectTooLarge { size: usize },
    #[error("offset {offset} refers past the {used} bytes written so far")]
    ForeignOffset { offset: u32, used: usize },
    #[error("buffer is sealed, no further writes are permitted")]
    SealedBuffer,
    #[error("buffer has not been finished")]
    NotFinished,

    // ── Reader ──
    #[error("read at offset {offset} runs past the end of a {len}-byte buffer")]
    TruncatedBuffer { offset: usize, len: usize },
    #[error("index {index} out of range for a vector of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("malformed vtable at offset {offset}")]
    InvalidVTable { offset: usize },
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    // ── Config ──
    #[error("config error: {0}")]
    Config(String),
}
