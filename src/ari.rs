//! The in-memory AMM value / ARI data model.
//!
//! Values are immutable once constructed; constructors enforce the structural
//! invariants (integer ranges, table shape, map key uniqueness). Equality is
//! structural and type-aware: `UINT.1`, `INT.1` and `VAST.1` are all distinct.

use crate::dtntime::DtnTime;
use crate::error::{AriError, ErrorCode, Pos};
use crate::types::{LitType, ObjType};

/// An ARI: the undefined value, a typed literal, or an object reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Ari {
    /// The absence of a value; distinct from null.
    Undefined,
    /// A typed literal value.
    Lit(Lit),
    /// A reference to an ADM-defined object.
    Ref(Box<RefAri>),
}

impl Ari {
    /// The literal type of this value, if it is a literal.
    #[must_use]
    pub fn lit_type(&self) -> Option<LitType> {
        match self {
            Self::Lit(l) => Some(l.lit_type()),
            Self::Undefined | Self::Ref(_) => None,
        }
    }

    /// Shorthand for a `UVAST` literal.
    #[must_use]
    pub fn uvast(v: u64) -> Self {
        Self::Lit(Lit::Int(IntLit::new_unchecked(IntType::Uvast, i128::from(v))))
    }

    /// Shorthand for a `VAST` literal.
    #[must_use]
    pub fn vast(v: i64) -> Self {
        Self::Lit(Lit::Int(IntLit::new_unchecked(IntType::Vast, i128::from(v))))
    }

    /// Shorthand for a `UINT` literal.
    #[must_use]
    pub fn uint(v: u32) -> Self {
        Self::Lit(Lit::Int(IntLit::new_unchecked(IntType::Uint, i128::from(v))))
    }

    /// Shorthand for an `INT` literal.
    #[must_use]
    pub fn int(v: i32) -> Self {
        Self::Lit(Lit::Int(IntLit::new_unchecked(IntType::Int, i128::from(v))))
    }

    /// Shorthand for a `TEXTSTR` literal.
    #[must_use]
    pub fn text(v: impl Into<String>) -> Self {
        Self::Lit(Lit::TextStr(v.into()))
    }

    /// Shorthand for a `BYTESTR` literal.
    #[must_use]
    pub fn bytes(v: impl Into<Vec<u8>>) -> Self {
        Self::Lit(Lit::ByteStr(v.into()))
    }
}

/// A typed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    /// The null value.
    Null,
    /// Boolean.
    Bool(bool),
    /// A fixed-width integer; the width and signedness live in [`IntLit`].
    Int(IntLit),
    /// IEEE 754 binary32.
    Real32(f32),
    /// IEEE 754 binary64.
    Real64(f64),
    /// UTF-8 text.
    TextStr(String),
    /// Opaque octets.
    ByteStr(Vec<u8>),
    /// Absolute timepoint.
    Tp(DtnTime),
    /// Relative timedelta.
    Td(DtnTime),
    /// Interned identifier, textual or enumerated.
    Label(Label),
    /// An embedded CBOR item, preserved bit-exactly.
    Cbor(Vec<u8>),
    /// Ordered sequence of values.
    Ac(Vec<Ari>),
    /// Value-to-value map, key order preserved.
    Am(Vec<(Ari, Ari)>),
    /// Column count plus row-major values.
    Tbl(Table),
    /// Execution set.
    ExecSet(ExecSet),
    /// Report set.
    RptSet(RptSet),
}

impl Lit {
    /// The registry code of this literal.
    #[must_use]
    pub fn lit_type(&self) -> LitType {
        match self {
            Self::Null => LitType::Null,
            Self::Bool(_) => LitType::Bool,
            Self::Int(i) => i.ty().lit_type(),
            Self::Real32(_) => LitType::Real32,
            Self::Real64(_) => LitType::Real64,
            Self::TextStr(_) => LitType::TextStr,
            Self::ByteStr(_) => LitType::ByteStr,
            Self::Tp(_) => LitType::Tp,
            Self::Td(_) => LitType::Td,
            Self::Label(_) => LitType::Label,
            Self::Cbor(_) => LitType::Cbor,
            Self::Ac(_) => LitType::Ac,
            Self::Am(_) => LitType::Am,
            Self::Tbl(_) => LitType::Tbl,
            Self::ExecSet(_) => LitType::ExecSet,
            Self::RptSet(_) => LitType::RptSet,
        }
    }
}

/// Width and signedness of an integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntType {
    /// Unsigned 8-bit (`BYTE`).
    Byte,
    /// Signed 8-bit.
    Int8,
    /// Signed 16-bit.
    Int16,
    /// Unsigned 16-bit.
    Uint16,
    /// Signed 32-bit (`INT`).
    Int,
    /// Unsigned 32-bit (`UINT`).
    Uint,
    /// Signed 64-bit (`VAST`).
    Vast,
    /// Unsigned 64-bit (`UVAST`).
    Uvast,
}

impl IntType {
    /// The literal-type registry code for this width.
    #[must_use]
    pub const fn lit_type(self) -> LitType {
        match self {
            Self::Byte => LitType::Byte,
            Self::Int8 => LitType::Int8,
            Self::Int16 => LitType::Int16,
            Self::Uint16 => LitType::Uint16,
            Self::Int => LitType::Int,
            Self::Uint => LitType::Uint,
            Self::Vast => LitType::Vast,
            Self::Uvast => LitType::Uvast,
        }
    }

    /// The integer width corresponding to a literal type, if any.
    #[must_use]
    pub const fn from_lit_type(ty: LitType) -> Option<Self> {
        match ty {
            LitType::Byte => Some(Self::Byte),
            LitType::Int8 => Some(Self::Int8),
            LitType::Int16 => Some(Self::Int16),
            LitType::Uint16 => Some(Self::Uint16),
            LitType::Int => Some(Self::Int),
            LitType::Uint => Some(Self::Uint),
            LitType::Vast => Some(Self::Vast),
            LitType::Uvast => Some(Self::Uvast),
            _ => None,
        }
    }

    /// Smallest representable value.
    #[must_use]
    pub const fn min(self) -> i128 {
        match self {
            Self::Byte | Self::Uint16 | Self::Uint | Self::Uvast => 0,
            Self::Int8 => i8::MIN as i128,
            Self::Int16 => i16::MIN as i128,
            Self::Int => i32::MIN as i128,
            Self::Vast => i64::MIN as i128,
        }
    }

    /// Largest representable value.
    #[must_use]
    pub const fn max(self) -> i128 {
        match self {
            Self::Byte => u8::MAX as i128,
            Self::Int8 => i8::MAX as i128,
            Self::Int16 => i16::MAX as i128,
            Self::Uint16 => u16::MAX as i128,
            Self::Int => i32::MAX as i128,
            Self::Uint => u32::MAX as i128,
            Self::Vast => i64::MAX as i128,
            Self::Uvast => u64::MAX as i128,
        }
    }
}

/// A range-checked fixed-width integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntLit {
    ty: IntType,
    value: i128,
}

impl IntLit {
    /// Construct a checked integer literal.
    ///
    /// # Errors
    ///
    /// Returns `IntegerOutOfRange` when `value` is outside the declared width.
    pub fn new(ty: IntType, value: i128) -> Result<Self, AriError> {
        if value < ty.min() || value > ty.max() {
            return Err(AriError::at(ErrorCode::IntegerOutOfRange, Pos::default()));
        }
        Ok(Self { ty, value })
    }

    pub(crate) const fn new_unchecked(ty: IntType, value: i128) -> Self {
        Self { ty, value }
    }

    /// The declared width and signedness.
    #[inline]
    #[must_use]
    pub const fn ty(self) -> IntType {
        self.ty
    }

    /// The numeric value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i128 {
        self.value
    }
}

/// An interned identifier carried as text or as an enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// Textual form.
    Text(String),
    /// Enumerated form.
    Int(i64),
}

/// A table: column count plus row-major values.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    cols: u64,
    items: Vec<Ari>,
}

impl Table {
    /// Construct a checked table.
    ///
    /// # Errors
    ///
    /// Returns `TableShape` when `items.len()` is not a multiple of `cols`
    /// (a zero column count admits only an empty table).
    pub fn new(cols: u64, items: Vec<Ari>) -> Result<Self, AriError> {
        let divisible = match cols {
            0 => items.is_empty(),
            c => items.len() as u64 % c == 0,
        };
        if !divisible {
            return Err(AriError::at(ErrorCode::TableShape, Pos::default()));
        }
        Ok(Self { cols, items })
    }

    /// Column count.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> u64 {
        self.cols
    }

    /// Row count.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> u64 {
        match self.cols {
            0 => 0,
            c => self.items.len() as u64 / c,
        }
    }

    /// Row-major flat values.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[Ari] {
        &self.items
    }
}

/// An execution set: a nonce plus target ARIs.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecSet {
    /// Correlation nonce (typically UVAST, BYTESTR, or null).
    pub nonce: Box<Ari>,
    /// The execution targets.
    pub targets: Vec<Ari>,
}

/// A report set: a nonce, reference timepoint, and report entries.
#[derive(Debug, Clone, PartialEq)]
pub struct RptSet {
    /// Correlation nonce.
    pub nonce: Box<Ari>,
    /// Reference timepoint for the contained reports.
    pub ref_time: DtnTime,
    /// The report entries.
    pub reports: Vec<Report>,
}

/// One report within a report set.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// The source that generated the report.
    pub source: Ari,
    /// Offset of the report from the set's reference time.
    pub rel_time: DtnTime,
    /// The report items.
    pub items: Vec<Ari>,
}

/// One side of a reference identity: symbolic, numeric, or both.
///
/// A reference is fully resolved when both its namespace and object carry
/// [`IdSeg::Both`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdSeg {
    /// Symbolic form only.
    Name(String),
    /// Numeric enumerator only.
    Num(i64),
    /// Both forms, from catalog resolution.
    Both(String, i64),
}

impl IdSeg {
    /// The symbolic form, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(n) | Self::Both(n, _) => Some(n),
            Self::Num(_) => None,
        }
    }

    /// The numeric form, if present.
    #[must_use]
    pub const fn num(&self) -> Option<i64> {
        match self {
            Self::Num(n) | Self::Both(_, n) => Some(*n),
            Self::Name(_) => None,
        }
    }
}

/// A reference to an ADM-defined object, optionally parameterized.
#[derive(Debug, Clone, PartialEq)]
pub struct RefAri {
    /// The namespace, absent for path-local references.
    pub ns: Option<IdSeg>,
    /// The kind of the referenced object.
    pub obj_type: ObjType,
    /// The object identity within its namespace table.
    pub obj: IdSeg,
    /// Ordered parameters; `None` is distinct from an empty list.
    pub params: Option<Vec<Ari>>,
}

impl RefAri {
    /// Returns `true` when both namespace and object carry symbolic and
    /// numeric forms.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self.ns, Some(IdSeg::Both(..))) && matches!(self.obj, IdSeg::Both(..))
    }
}

#[cfg(test)]
mod tests {
    use super::{Ari, IntLit, IntType, Table};

    #[test]
    fn integer_equality_is_width_aware() {
        assert_ne!(Ari::uint(1), Ari::int(1));
        assert_ne!(Ari::uint(1), Ari::uvast(1));
        assert_ne!(Ari::vast(1), Ari::int(1));
        assert_eq!(Ari::uvast(1), Ari::uvast(1));
    }

    #[test]
    fn integer_range_is_enforced() {
        assert!(IntLit::new(IntType::Int16, 32_767).is_ok());
        assert!(IntLit::new(IntType::Int16, 32_768).is_err());
        assert!(IntLit::new(IntType::Int, 32_768).is_ok());
        assert!(IntLit::new(IntType::Byte, -1).is_err());
        assert!(IntLit::new(IntType::Uvast, i128::from(u64::MAX)).is_ok());
        assert!(IntLit::new(IntType::Uvast, i128::from(u64::MAX) + 1).is_err());
    }

    #[test]
    fn table_shape_is_enforced() {
        let four = vec![Ari::vast(1), Ari::vast(2), Ari::vast(3), Ari::vast(4)];
        let t = Table::new(2, four.clone()).unwrap();
        assert_eq!(t.rows(), 2);
        assert!(Table::new(3, four).is_err());
        assert!(Table::new(0, vec![]).is_ok());
        assert!(Table::new(0, vec![Ari::vast(1)]).is_err());
    }
}
