use thiserror::Error;

/// Everything that can abort a conversion. Nothing is recovered locally: every
/// error propagates to the binary, which reports it and exits with code 1.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown {kind}: {value}")]
    UnknownEnumValue { kind: &'static str, value: String },

    #[error("too many {field}: {len} given, at most {capacity} fit")]
    Cardinality {
        field: &'static str,
        len: usize,
        capacity: usize,
    },

    #[error("no encoding found in header")]
    MissingEncoding,

    #[error("{field} = {value} does not fit in {target}")]
    Overflow {
        field: &'static str,
        value: i128,
        target: &'static str,
    },

    #[error("unsupported message {0} in {1}")]
    UnsupportedMessage(u64, &'static str),

    #[error("input stream starts with neither a header nor a data item (message id {0})")]
    MissingHeader(u16),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid time: {0}")]
    InvalidTime(String),

    #[error("malformed XML: {0}")]
    MalformedXml(String),

    #[error("missing <{element}> in <{parent}>")]
    MissingElement {
        parent: String,
        element: &'static str,
    },

    #[error("invalid value for <{element}>: {value:?}")]
    InvalidValue { element: String, value: String },

    #[error("not an MRD stream: bad magic bytes")]
    BadMagic,

    #[error("unsupported MRD binary format version {0}")]
    UnsupportedVersion(u32),

    #[error("stream schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("{what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{0} written out of order")]
    OutOfOrder(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn unknown(kind: &'static str, value: impl ToString) -> Self {
        Error::UnknownEnumValue {
            kind,
            value: value.to_string(),
        }
    }
}

/// check that `len` items fit in a fixed-capacity slot array
pub(crate) fn check_capacity(field: &'static str, len: usize, capacity: usize) -> Result<()> {
    if len > capacity {
        return Err(Error::Cardinality {
            field,
            len,
            capacity,
        });
    }
    Ok(())
}

/// narrow an integer to a smaller width, failing instead of truncating
pub(crate) fn narrow<S, T>(field: &'static str, value: S) -> Result<T>
where
    S: Copy + Into<i128>,
    T: TryFrom<S>,
{
    T::try_from(value).map_err(|_| Error::Overflow {
        field,
        value: value.into(),
        target: std::any::type_name::<T>(),
    })
}
