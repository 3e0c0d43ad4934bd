use core::fmt;

/// A structured code identifying the reason an ARI was rejected.
///
/// Codes are grouped by the processing phase that detects them; the phase is
/// recoverable through [`ErrorCode::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
    // Lexical (text input)
    /// A character that cannot start or continue any token.
    IllegalCharacter,
    /// A text string missing its closing double quote.
    UnterminatedString,
    /// A byte string missing its closing single quote.
    UnterminatedBytes,
    /// A `%` escape that is not two hexadecimal digits.
    BadPercentEscape,
    /// Percent-decoded segment is not valid UTF-8.
    BadPercentUtf8,
    /// Malformed digits in an integer token.
    BadIntegerToken,
    /// Malformed real-number token.
    BadRealToken,
    /// Hexadecimal byte string content is not valid base16.
    BadBase16,
    /// Base64 byte string content is not valid.
    BadBase64,
    /// A byte string encoding prefix this codec does not accept.
    UnsupportedBytesEncoding,

    // Syntax (text input)
    /// A well-formed token in a position the grammar forbids.
    UnexpectedToken,
    /// Input ended in the middle of a production.
    UnexpectedEnd,
    /// Extra tokens after a complete ARI.
    TrailingText,
    /// A literal-type name outside the closed registry set.
    UnknownTypeName,
    /// A literal value that does not fit the named literal type.
    BadLiteralValue,
    /// A malformed timepoint or timedelta text form.
    BadTimeText,

    // Decode (CBOR input)
    /// Unexpected end-of-input while decoding.
    UnexpectedEof,
    /// Arithmetic overflow while computing a length or offset.
    LengthOverflow,
    /// Input contains bytes after the single CBOR item.
    TrailingBytes,
    /// Reserved additional-info value (28..30) was used.
    ReservedAdditionalInfo,
    /// Indefinite-length encoding is not accepted.
    IndefiniteLengthForbidden,
    /// Non-shortest integer/length head encoding.
    NonCanonicalHead,
    /// Invalid UTF-8 in a CBOR text string.
    Utf8Invalid,
    /// Wrong CBOR major type for this position.
    WrongItemType,
    /// The outer item is not the ARI tag.
    MissingAriTag,
    /// A literal-type code outside the closed registry set.
    UnknownLitTypeCode,
    /// An object-type code outside the closed registry set.
    UnknownObjTypeCode,
    /// An ARI array with an impossible element count.
    BadAriArrayLength,
    /// A simple value this codec does not accept.
    UnsupportedSimpleValue,

    // Type
    /// Integer outside the declared width's range.
    IntegerOutOfRange,
    /// Table payload length not divisible by the column count.
    TableShape,
    /// Duplicate key in an AM map.
    DuplicateMapKey,
    /// Timepoint or timedelta outside the representable range.
    TimeOutOfRange,
    /// A parameter's type disagrees with the declared signature type.
    ParamTypeMismatch,

    // Resolution
    /// Namespace name or enumerator not present in the catalog.
    UnknownNamespace,
    /// Object name or enumerator not present in its namespace table.
    UnknownObject,
    /// Installing an ADM whose moniker or enumerator collides.
    NamespaceCollision,
    /// Installing an object whose name or enumerator collides.
    ObjectCollision,

    // Signature
    /// Parameter count disagrees with the declared signature arity.
    ArityMismatch,
}

/// The processing phase an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed token in text input.
    Lexical,
    /// Well-formed tokens in a forbidden arrangement.
    Syntax,
    /// CBOR-level decoding failure.
    Decode,
    /// Value does not fit its declared type.
    Type,
    /// Unknown namespace, object, or missing identifier side.
    Resolution,
    /// Parameter arity mismatch.
    Signature,
}

impl ErrorCode {
    /// The phase that detects this code.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::IllegalCharacter
            | Self::UnterminatedString
            | Self::UnterminatedBytes
            | Self::BadPercentEscape
            | Self::BadPercentUtf8
            | Self::BadIntegerToken
            | Self::BadRealToken
            | Self::BadBase16
            | Self::BadBase64
            | Self::UnsupportedBytesEncoding => ErrorKind::Lexical,

            Self::UnexpectedToken
            | Self::UnexpectedEnd
            | Self::TrailingText
            | Self::UnknownTypeName
            | Self::BadLiteralValue
            | Self::BadTimeText => ErrorKind::Syntax,

            Self::UnexpectedEof
            | Self::LengthOverflow
            | Self::TrailingBytes
            | Self::ReservedAdditionalInfo
            | Self::IndefiniteLengthForbidden
            | Self::NonCanonicalHead
            | Self::Utf8Invalid
            | Self::WrongItemType
            | Self::MissingAriTag
            | Self::UnknownLitTypeCode
            | Self::UnknownObjTypeCode
            | Self::BadAriArrayLength
            | Self::UnsupportedSimpleValue => ErrorKind::Decode,

            Self::IntegerOutOfRange
            | Self::TableShape
            | Self::DuplicateMapKey
            | Self::TimeOutOfRange
            | Self::ParamTypeMismatch => ErrorKind::Type,

            Self::UnknownNamespace
            | Self::UnknownObject
            | Self::NamespaceCollision
            | Self::ObjectCollision => ErrorKind::Resolution,

            Self::ArityMismatch => ErrorKind::Signature,
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::IllegalCharacter => "illegal character",
            Self::UnterminatedString => "unterminated text string",
            Self::UnterminatedBytes => "unterminated byte string",
            Self::BadPercentEscape => "percent escape is not two hex digits",
            Self::BadPercentUtf8 => "percent-decoded segment is not valid UTF-8",
            Self::BadIntegerToken => "malformed integer",
            Self::BadRealToken => "malformed real number",
            Self::BadBase16 => "byte string content is not valid base16",
            Self::BadBase64 => "byte string content is not valid base64",
            Self::UnsupportedBytesEncoding => "unsupported byte string encoding prefix",

            Self::UnexpectedToken => "unexpected token",
            Self::UnexpectedEnd => "unexpected end of input",
            Self::TrailingText => "trailing input after ARI",
            Self::UnknownTypeName => "unknown literal type name",
            Self::BadLiteralValue => "value does not fit the named literal type",
            Self::BadTimeText => "malformed timepoint or timedelta",

            Self::UnexpectedEof => "unexpected end of input",
            Self::LengthOverflow => "length overflow",
            Self::TrailingBytes => "trailing bytes after single CBOR item",
            Self::ReservedAdditionalInfo => "reserved additional info value",
            Self::IndefiniteLengthForbidden => "indefinite length forbidden",
            Self::NonCanonicalHead => "non-shortest head encoding",
            Self::Utf8Invalid => "text must be valid UTF-8",
            Self::WrongItemType => "wrong CBOR item type for this position",
            Self::MissingAriTag => "outer item is not tagged as an ARI",
            Self::UnknownLitTypeCode => "unknown literal type code",
            Self::UnknownObjTypeCode => "unknown object type code",
            Self::BadAriArrayLength => "ARI array has an impossible length",
            Self::UnsupportedSimpleValue => "unsupported CBOR simple value",

            Self::IntegerOutOfRange => "integer outside declared width",
            Self::TableShape => "table length not divisible by column count",
            Self::DuplicateMapKey => "duplicate AM map key",
            Self::TimeOutOfRange => "time value outside representable range",
            Self::ParamTypeMismatch => "parameter type disagrees with signature",

            Self::UnknownNamespace => "unknown namespace",
            Self::UnknownObject => "unknown object in namespace",
            Self::NamespaceCollision => "namespace moniker or enumerator collides",
            Self::ObjectCollision => "object name or enumerator collides",

            Self::ArityMismatch => "parameter count disagrees with signature arity",
        }
    }
}

/// Source position of an error.
///
/// Text input carries 1-based `line`/`column`; binary input leaves both zero
/// and only the byte `offset` is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    /// Byte offset into the input where the error was detected.
    pub offset: usize,
    /// 1-based line for text input, 0 otherwise.
    pub line: u32,
    /// 1-based column for text input, 0 otherwise.
    pub column: u32,
}

impl Pos {
    /// A byte-offset-only position (binary input).
    #[inline]
    #[must_use]
    pub const fn at(offset: usize) -> Self {
        Self {
            offset,
            line: 0,
            column: 0,
        }
    }

    /// A full text position.
    #[inline]
    #[must_use]
    pub const fn text(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

/// An ACE error with a stable code and the position it was detected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AriError {
    /// The error code.
    pub code: ErrorCode,
    /// Where the error was detected.
    pub pos: Pos,
}

impl AriError {
    /// Construct an error at a byte offset.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self {
            code,
            pos: Pos::at(offset),
        }
    }

    /// Construct an error at a full position.
    #[inline]
    #[must_use]
    pub const fn at(code: ErrorCode, pos: Pos) -> Self {
        Self { code, pos }
    }

    /// The phase that produced this error.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lexical => "lexical",
            Self::Syntax => "syntax",
            Self::Decode => "decode",
            Self::Type => "type",
            Self::Resolution => "resolution",
            Self::Signature => "signature",
        };
        f.write_str(name)
    }
}

impl fmt::Display for AriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pos.line != 0 {
            write!(
                f,
                "{} error at {}:{} (offset {}): {}",
                self.kind(),
                self.pos.line,
                self.pos.column,
                self.pos.offset,
                self.code.message()
            )
        } else {
            write!(
                f,
                "{} error at offset {}: {}",
                self.kind(),
                self.pos.offset,
                self.code.message()
            )
        }
    }
}

impl std::error::Error for AriError {}
