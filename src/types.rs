//! The closed AMM type registries: literal-type codes and object-type codes.
//!
//! Both code spaces are fixed at build time and constitute the authoritative
//! enumeration used by the text and binary codecs. Name matching is ASCII
//! case-insensitive; canonical emission is upper-case.

/// CBOR tag wrapped around every encoded ARI except the bare `undefined`.
pub const TAG_ARI: u64 = 140;

/// Literal-type codes: the primitive and container value variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LitType {
    /// The null value.
    Null = 0,
    /// Boolean.
    Bool = 1,
    /// Unsigned 8-bit integer.
    Byte = 2,
    /// Signed 8-bit integer.
    Int8 = 3,
    /// Signed 16-bit integer.
    Int16 = 4,
    /// Unsigned 16-bit integer.
    Uint16 = 5,
    /// Signed 32-bit integer.
    Int = 6,
    /// Unsigned 32-bit integer.
    Uint = 7,
    /// Signed 64-bit integer.
    Vast = 8,
    /// Unsigned 64-bit integer.
    Uvast = 9,
    /// IEEE 754 binary32.
    Real32 = 10,
    /// IEEE 754 binary64.
    Real64 = 11,
    /// UTF-8 text string.
    TextStr = 12,
    /// Opaque octets.
    ByteStr = 13,
    /// Absolute timepoint, DTN epoch.
    Tp = 14,
    /// Relative timedelta.
    Td = 15,
    /// Interned identifier.
    Label = 16,
    /// Embedded opaque CBOR item.
    Cbor = 17,
    /// Array container: ordered ARI sequence.
    Ac = 18,
    /// Array map: ARI-to-ARI mapping, key order preserved.
    Am = 19,
    /// Table: column count plus row-major values.
    Tbl = 20,
    /// Execution set: nonce plus target ARIs.
    ExecSet = 21,
    /// Report set: nonce, reference time, report entries.
    RptSet = 22,
}

const LIT_TABLE: [(LitType, &str); 23] = [
    (LitType::Null, "NULL"),
    (LitType::Bool, "BOOL"),
    (LitType::Byte, "BYTE"),
    (LitType::Int8, "INT8"),
    (LitType::Int16, "INT16"),
    (LitType::Uint16, "UINT16"),
    (LitType::Int, "INT"),
    (LitType::Uint, "UINT"),
    (LitType::Vast, "VAST"),
    (LitType::Uvast, "UVAST"),
    (LitType::Real32, "REAL32"),
    (LitType::Real64, "REAL64"),
    (LitType::TextStr, "TEXTSTR"),
    (LitType::ByteStr, "BYTESTR"),
    (LitType::Tp, "TP"),
    (LitType::Td, "TD"),
    (LitType::Label, "LABEL"),
    (LitType::Cbor, "CBOR"),
    (LitType::Ac, "AC"),
    (LitType::Am, "AM"),
    (LitType::Tbl, "TBL"),
    (LitType::ExecSet, "EXECSET"),
    (LitType::RptSet, "RPTSET"),
];

impl LitType {
    /// The wire enumerator for this type.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look up a literal type by wire enumerator.
    #[must_use]
    pub fn from_code(code: u64) -> Option<Self> {
        u8::try_from(code)
            .ok()
            .and_then(|c| LIT_TABLE.get(usize::from(c)).map(|(t, _)| *t))
    }

    /// Look up a literal type by name, ASCII case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        LIT_TABLE
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(t, _)| *t)
    }

    /// The canonical upper-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        LIT_TABLE[self as usize].1
    }

    /// Returns `true` for the container variants (AC, AM, TBL, EXECSET, RPTSET).
    #[inline]
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            Self::Ac | Self::Am | Self::Tbl | Self::ExecSet | Self::RptSet
        )
    }

    /// Returns `true` for the non-container variants.
    #[inline]
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        !self.is_container()
    }
}

/// Object-type codes: the kinds of ADM-defined objects.
///
/// Ordering follows the AMP draft object table, with IDENT in the retired
/// metadata slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ObjType {
    /// Constant value.
    Const = 0,
    /// Control (command) object.
    Ctrl = 1,
    /// Externally defined data.
    Edd = 2,
    /// Macro.
    Mac = 3,
    /// Operator.
    Oper = 4,
    /// Report template.
    Rptt = 5,
    /// State-based rule.
    Sbr = 6,
    /// Table template.
    Tblt = 7,
    /// Time-based rule.
    Tbr = 8,
    /// Variable.
    Var = 9,
    /// Identity object.
    Ident = 10,
}

const OBJ_TABLE: [(ObjType, &str); 11] = [
    (ObjType::Const, "CONST"),
    (ObjType::Ctrl, "CTRL"),
    (ObjType::Edd, "EDD"),
    (ObjType::Mac, "MAC"),
    (ObjType::Oper, "OPER"),
    (ObjType::Rptt, "RPTT"),
    (ObjType::Sbr, "SBR"),
    (ObjType::Tblt, "TBLT"),
    (ObjType::Tbr, "TBR"),
    (ObjType::Var, "VAR"),
    (ObjType::Ident, "IDENT"),
];

impl ObjType {
    /// The wire enumerator for this object type.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look up an object type by wire enumerator.
    #[must_use]
    pub fn from_code(code: u64) -> Option<Self> {
        u8::try_from(code)
            .ok()
            .and_then(|c| OBJ_TABLE.get(usize::from(c)).map(|(t, _)| *t))
    }

    /// Look up an object type by name, ASCII case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        OBJ_TABLE
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(t, _)| *t)
    }

    /// The canonical upper-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        OBJ_TABLE[self as usize].1
    }

    /// Number of object-type slots in a catalog table.
    pub(crate) const COUNT: usize = OBJ_TABLE.len();
}

/// A declared AMM type in a parameter or value signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmType {
    /// A specific literal type.
    Lit(LitType),
    /// Any object reference of the given kind.
    Obj(ObjType),
    /// Any AMM value.
    Any,
}

impl AmmType {
    /// Look up a declared type by name across both code spaces.
    ///
    /// `ARI` and `ANY` (the original signature wildcards) map to [`AmmType::Any`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("ARI") || name.eq_ignore_ascii_case("ANY") {
            return Some(Self::Any);
        }
        LitType::from_name(name)
            .map(Self::Lit)
            .or_else(|| ObjType::from_name(name).map(Self::Obj))
    }
}

#[cfg(test)]
mod tests {
    use super::{LitType, ObjType};

    #[test]
    fn lit_codes_are_bijective() {
        for code in 0..=22u64 {
            let ty = LitType::from_code(code).unwrap();
            assert_eq!(u64::from(ty.code()), code);
            assert_eq!(LitType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(LitType::from_code(23), None);
    }

    #[test]
    fn obj_codes_are_bijective() {
        for code in 0..=10u64 {
            let ty = ObjType::from_code(code).unwrap();
            assert_eq!(u64::from(ty.code()), code);
            assert_eq!(ObjType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(ObjType::from_code(11), None);
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        assert_eq!(LitType::from_name("uvast"), Some(LitType::Uvast));
        assert_eq!(LitType::from_name("TeXtStR"), Some(LitType::TextStr));
        assert_eq!(ObjType::from_name("ctrl"), Some(ObjType::Ctrl));
        assert_eq!(LitType::from_name("FLOAT"), None);
    }
}
