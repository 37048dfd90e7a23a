//! Error types for message construction and decoding.

/// Alias for `Result<T, edgelink_proto::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Which half of a tagged parameter an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParamPosition {
    /// The identifier half.
    Identifier,
    /// The value half.
    Value,
}

impl std::fmt::Display for ParamPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Identifier => "identifier",
            Self::Value => "value",
        })
    }
}

/// Errors produced while building or decoding protocol messages.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A required field, or one half of an all-or-nothing field group,
    /// was never set.
    #[error("required field missing: {field}")]
    RequiredFieldMissing {
        /// Name of the missing field.
        field: &'static str,
    },

    /// Decoding encountered a kind tag this protocol does not define.
    /// Treated as data corruption, never skipped.
    #[error("unknown {position} kind tag `{tag}`")]
    UnknownType {
        /// Which half of the parameter carried the tag.
        position: ParamPosition,
        /// The unrecognized tag, verbatim.
        tag: String,
    },

    /// A recognized kind tag carried a payload of the wrong shape.
    #[error("malformed {position} payload")]
    InvalidParameter {
        /// Which half of the parameter is malformed.
        position: ParamPosition,
    },

    /// A numeric field was set outside its documented range.
    #[error("value out of range for field `{field}`")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A record document had the wrong top-level shape.
    #[error("malformed {0} record")]
    MalformedRecord(&'static str),
}
