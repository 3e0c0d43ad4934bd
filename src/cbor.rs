//! The ARI binary codec over CBOR.
//!
//! Wire layout: the outer item is tag [`TAG_ARI`] over an array, except the
//! bare `undefined` value which is CBOR `undefined` alone. A literal is the
//! two-element array `[literal-type-code, payload]`; a reference is
//! `[namespace, object-type-code, object-name, params?]`. Nested values keep
//! the same shapes, untagged for literal wrappers, except that null,
//! booleans, text and byte strings (whose CBOR major type is unambiguous)
//! encode natively. Integer widths always travel in the literal-type code,
//! never in the CBOR head.

use crate::ari::{Ari, ExecSet, IdSeg, IntLit, IntType, Label, Lit, RefAri, Report, RptSet, Table};
use crate::dtntime::DtnTime;
use crate::error::{AriError, ErrorCode};
use crate::types::{LitType, ObjType, TAG_ARI};
use crate::wire::{Item, Reader, Writer};

/// Encode one ARI to its canonical CBOR bytes.
///
/// Encoding is deterministic: the same AST always yields the same bytes.
///
/// # Errors
///
/// Returns an error for values outside the wire's numeric range.
pub fn encode(ari: &Ari) -> Result<Vec<u8>, AriError> {
    let mut w = Writer::new();
    match ari {
        Ari::Undefined => w.undefined(),
        Ari::Lit(lit) => {
            w.tag(TAG_ARI);
            encode_lit_wrapped(&mut w, lit)?;
        }
        Ari::Ref(r) => {
            w.tag(TAG_ARI);
            encode_ref(&mut w, r)?;
        }
    }
    Ok(w.into_vec())
}

/// Decode one ARI from CBOR bytes, rejecting trailing input.
///
/// # Errors
///
/// Returns a decode error with the byte offset of the failure; integer range
/// and table shape violations surface as type errors.
pub fn decode(bytes: &[u8]) -> Result<Ari, AriError> {
    let mut r = Reader::new(bytes);
    let ari = decode_root(&mut r)?;
    if !r.eof() {
        return Err(AriError::new(ErrorCode::TrailingBytes, r.pos()));
    }
    Ok(ari)
}

/// Decode one ARI, leaving the reader positioned after it.
pub(crate) fn decode_root(r: &mut Reader<'_>) -> Result<Ari, AriError> {
    let (item, off) = r.item()?;
    match item {
        Item::Undefined => Ok(Ari::Undefined),
        Item::Tag(TAG_ARI) => decode_tag_body(r),
        _ => Err(AriError::new(ErrorCode::MissingAriTag, off)),
    }
}

fn encode_nested(w: &mut Writer, ari: &Ari) -> Result<(), AriError> {
    match ari {
        Ari::Undefined => w.undefined(),
        Ari::Lit(Lit::Null) => w.null(),
        Ari::Lit(Lit::Bool(v)) => w.bool(*v),
        Ari::Lit(Lit::TextStr(s)) => w.text(s),
        Ari::Lit(Lit::ByteStr(b)) => w.bytes(b),
        Ari::Lit(lit) => encode_lit_wrapped(w, lit)?,
        Ari::Ref(r) => {
            w.tag(TAG_ARI);
            encode_ref(w, r)?;
        }
    }
    Ok(())
}

fn encode_lit_wrapped(w: &mut Writer, lit: &Lit) -> Result<(), AriError> {
    w.array(2);
    w.uint(u64::from(lit.lit_type().code()));
    encode_lit_payload(w, lit)
}

fn encode_lit_payload(w: &mut Writer, lit: &Lit) -> Result<(), AriError> {
    match lit {
        Lit::Null => w.null(),
        Lit::Bool(v) => w.bool(*v),
        Lit::Int(il) => w.int(il.value())?,
        Lit::Real32(v) => w.f64(f64::from(*v)),
        Lit::Real64(v) => w.f64(*v),
        Lit::TextStr(s) => w.text(s),
        Lit::ByteStr(b) => w.bytes(b),
        Lit::Tp(t) | Lit::Td(t) => encode_time(w, *t)?,
        Lit::Label(Label::Text(s)) => w.text(s),
        Lit::Label(Label::Int(v)) => w.int(i128::from(*v))?,
        Lit::Cbor(raw) => w.bytes(raw),
        Lit::Ac(items) => {
            w.array(items.len());
            for item in items {
                encode_nested(w, item)?;
            }
        }
        Lit::Am(entries) => {
            w.map(entries.len());
            for (k, v) in entries {
                encode_nested(w, k)?;
                encode_nested(w, v)?;
            }
        }
        Lit::Tbl(table) => {
            w.array(1 + table.items().len());
            w.uint(table.cols());
            for item in table.items() {
                encode_nested(w, item)?;
            }
        }
        Lit::ExecSet(es) => {
            w.array(1 + es.targets.len());
            encode_nested(w, &es.nonce)?;
            for target in &es.targets {
                encode_nested(w, target)?;
            }
        }
        Lit::RptSet(rs) => {
            w.array(2 + rs.reports.len());
            encode_nested(w, &rs.nonce)?;
            encode_time(w, rs.ref_time)?;
            for report in &rs.reports {
                w.array(3);
                encode_nested(w, &report.source)?;
                encode_time(w, report.rel_time)?;
                w.array(report.items.len());
                for item in &report.items {
                    encode_nested(w, item)?;
                }
            }
        }
    }
    Ok(())
}

/// Integer seconds, or the decimal-fraction pair `[exp, mantissa]`.
fn encode_time(w: &mut Writer, t: DtnTime) -> Result<(), AriError> {
    if t.is_whole_secs() {
        w.int(i128::from(t.secs()))
    } else {
        let (exp, mant) = t.to_decfrac()?;
        w.array(2);
        w.int(i128::from(exp))?;
        w.int(i128::from(mant))
    }
}

fn encode_ref(w: &mut Writer, r: &RefAri) -> Result<(), AriError> {
    w.array(3 + usize::from(r.params.is_some()));
    match &r.ns {
        None => w.null(),
        Some(seg) => encode_seg(w, seg)?,
    }
    w.uint(u64::from(r.obj_type.code()));
    encode_seg(w, &r.obj)?;
    if let Some(params) = &r.params {
        w.array(params.len());
        for param in params {
            encode_nested(w, param)?;
        }
    }
    Ok(())
}

/// The numeric side wins when a segment carries both identity forms.
fn encode_seg(w: &mut Writer, seg: &IdSeg) -> Result<(), AriError> {
    match seg {
        IdSeg::Num(n) | IdSeg::Both(_, n) => w.int(i128::from(*n)),
        IdSeg::Name(name) => {
            w.text(name);
            Ok(())
        }
    }
}

/// Decode the array following an ARI tag: a literal wrapper or a reference.
fn decode_tag_body(r: &mut Reader<'_>) -> Result<Ari, AriError> {
    let (item, off) = r.item()?;
    let Item::Array(len) = item else {
        return Err(AriError::new(ErrorCode::WrongItemType, off));
    };
    match len {
        2 => {
            let (code, code_off) = r.int()?;
            let code = u64::try_from(code)
                .map_err(|_| AriError::new(ErrorCode::UnknownLitTypeCode, code_off))?;
            let ty = LitType::from_code(code)
                .ok_or_else(|| AriError::new(ErrorCode::UnknownLitTypeCode, code_off))?;
            Ok(Ari::Lit(decode_lit_payload(r, ty)?))
        }
        3 | 4 => decode_ref_body(r, len),
        _ => Err(AriError::new(ErrorCode::BadAriArrayLength, off)),
    }
}

fn decode_nested(r: &mut Reader<'_>) -> Result<Ari, AriError> {
    let (item, off) = r.item()?;
    match item {
        Item::Undefined => Ok(Ari::Undefined),
        Item::Null => Ok(Ari::Lit(Lit::Null)),
        Item::True => Ok(Ari::Lit(Lit::Bool(true))),
        Item::False => Ok(Ari::Lit(Lit::Bool(false))),
        Item::Text(len) => Ok(Ari::Lit(Lit::TextStr(r.text_payload(len, off)?.to_owned()))),
        Item::Bytes(len) => Ok(Ari::Lit(Lit::ByteStr(r.bytes_payload(len, off)?.to_vec()))),
        // Foreign encoders may leave context-typed primitives bare; take the
        // 64-bit default widths.
        Item::Uint(v) => Ok(default_int(i128::from(v), off)?),
        Item::Nint(n) => Ok(default_int(-1 - i128::from(n), off)?),
        Item::F64(v) => Ok(Ari::Lit(Lit::Real64(v))),
        Item::Array(2) => {
            let (code, code_off) = r.int()?;
            let code = u64::try_from(code)
                .map_err(|_| AriError::new(ErrorCode::UnknownLitTypeCode, code_off))?;
            let ty = LitType::from_code(code)
                .ok_or_else(|| AriError::new(ErrorCode::UnknownLitTypeCode, code_off))?;
            Ok(Ari::Lit(decode_lit_payload(r, ty)?))
        }
        Item::Tag(TAG_ARI) => decode_tag_body(r),
        _ => Err(AriError::new(ErrorCode::WrongItemType, off)),
    }
}

fn default_int(v: i128, off: usize) -> Result<Ari, AriError> {
    let ty = if i64::try_from(v).is_ok() {
        IntType::Vast
    } else {
        IntType::Uvast
    };
    IntLit::new(ty, v)
        .map(|il| Ari::Lit(Lit::Int(il)))
        .map_err(|e| AriError::new(e.code, off))
}

#[allow(clippy::too_many_lines)]
fn decode_lit_payload(r: &mut Reader<'_>, ty: LitType) -> Result<Lit, AriError> {
    if let Some(int_ty) = IntType::from_lit_type(ty) {
        let (v, off) = r.int()?;
        return IntLit::new(int_ty, v)
            .map(Lit::Int)
            .map_err(|e| AriError::new(e.code, off));
    }

    match ty {
        LitType::Null => {
            let (item, off) = r.item()?;
            if item == Item::Null {
                Ok(Lit::Null)
            } else {
                Err(AriError::new(ErrorCode::WrongItemType, off))
            }
        }
        LitType::Bool => {
            let (item, off) = r.item()?;
            match item {
                Item::True => Ok(Lit::Bool(true)),
                Item::False => Ok(Lit::Bool(false)),
                _ => Err(AriError::new(ErrorCode::WrongItemType, off)),
            }
        }
        LitType::Real32 => {
            let (item, off) = r.item()?;
            match item {
                Item::F64(v) => Ok(Lit::Real32(v as f32)),
                _ => Err(AriError::new(ErrorCode::WrongItemType, off)),
            }
        }
        LitType::Real64 => {
            let (item, off) = r.item()?;
            match item {
                Item::F64(v) => Ok(Lit::Real64(v)),
                _ => Err(AriError::new(ErrorCode::WrongItemType, off)),
            }
        }
        LitType::TextStr => {
            let (item, off) = r.item()?;
            match item {
                Item::Text(len) => Ok(Lit::TextStr(r.text_payload(len, off)?.to_owned())),
                _ => Err(AriError::new(ErrorCode::WrongItemType, off)),
            }
        }
        LitType::ByteStr => {
            let (item, off) = r.item()?;
            match item {
                Item::Bytes(len) => Ok(Lit::ByteStr(r.bytes_payload(len, off)?.to_vec())),
                _ => Err(AriError::new(ErrorCode::WrongItemType, off)),
            }
        }
        LitType::Tp => Ok(Lit::Tp(decode_time(r)?)),
        LitType::Td => Ok(Lit::Td(decode_time(r)?)),
        LitType::Label => {
            let (item, off) = r.item()?;
            match item {
                Item::Text(len) => Ok(Lit::Label(Label::Text(
                    r.text_payload(len, off)?.to_owned(),
                ))),
                Item::Uint(v) => {
                    let v = i64::try_from(v)
                        .map_err(|_| AriError::new(ErrorCode::IntegerOutOfRange, off))?;
                    Ok(Lit::Label(Label::Int(v)))
                }
                Item::Nint(n) => {
                    let v = i64::try_from(-1 - i128::from(n))
                        .map_err(|_| AriError::new(ErrorCode::IntegerOutOfRange, off))?;
                    Ok(Lit::Label(Label::Int(v)))
                }
                _ => Err(AriError::new(ErrorCode::WrongItemType, off)),
            }
        }
        LitType::Cbor => {
            // The embedded item stays opaque and bit-exact, including any
            // tags this codec does not know.
            let (item, off) = r.item()?;
            match item {
                Item::Bytes(len) => Ok(Lit::Cbor(r.bytes_payload(len, off)?.to_vec())),
                _ => Err(AriError::new(ErrorCode::WrongItemType, off)),
            }
        }
        LitType::Ac => {
            let (item, off) = r.item()?;
            let Item::Array(len) = item else {
                return Err(AriError::new(ErrorCode::WrongItemType, off));
            };
            let mut items = Vec::with_capacity(len.min(64));
            for _ in 0..len {
                items.push(decode_nested(r)?);
            }
            Ok(Lit::Ac(items))
        }
        LitType::Am => {
            let (item, off) = r.item()?;
            let Item::Map(len) = item else {
                return Err(AriError::new(ErrorCode::WrongItemType, off));
            };
            let mut entries: Vec<(Ari, Ari)> = Vec::with_capacity(len.min(64));
            for _ in 0..len {
                let key_off = r.pos();
                let key = decode_nested(r)?;
                let value = decode_nested(r)?;
                if entries.iter().any(|(k, _)| *k == key) {
                    return Err(AriError::new(ErrorCode::DuplicateMapKey, key_off));
                }
                entries.push((key, value));
            }
            Ok(Lit::Am(entries))
        }
        LitType::Tbl => {
            let (item, off) = r.item()?;
            let Item::Array(len) = item else {
                return Err(AriError::new(ErrorCode::WrongItemType, off));
            };
            if len == 0 {
                return Err(AriError::new(ErrorCode::BadAriArrayLength, off));
            }
            let (cols, cols_off) = r.int()?;
            let cols = u64::try_from(cols)
                .map_err(|_| AriError::new(ErrorCode::IntegerOutOfRange, cols_off))?;
            let mut items = Vec::with_capacity((len - 1).min(64));
            for _ in 0..len - 1 {
                items.push(decode_nested(r)?);
            }
            Table::new(cols, items)
                .map(Lit::Tbl)
                .map_err(|e| AriError::new(e.code, off))
        }
        LitType::ExecSet => {
            let (item, off) = r.item()?;
            let Item::Array(len) = item else {
                return Err(AriError::new(ErrorCode::WrongItemType, off));
            };
            if len == 0 {
                return Err(AriError::new(ErrorCode::BadAriArrayLength, off));
            }
            let nonce = Box::new(decode_nested(r)?);
            let mut targets = Vec::with_capacity((len - 1).min(64));
            for _ in 0..len - 1 {
                targets.push(decode_nested(r)?);
            }
            Ok(Lit::ExecSet(ExecSet { nonce, targets }))
        }
        LitType::RptSet => {
            let (item, off) = r.item()?;
            let Item::Array(len) = item else {
                return Err(AriError::new(ErrorCode::WrongItemType, off));
            };
            if len < 2 {
                return Err(AriError::new(ErrorCode::BadAriArrayLength, off));
            }
            let nonce = Box::new(decode_nested(r)?);
            let ref_time = decode_time(r)?;
            let mut reports = Vec::with_capacity((len - 2).min(64));
            for _ in 0..len - 2 {
                reports.push(decode_report(r)?);
            }
            Ok(Lit::RptSet(RptSet {
                nonce,
                ref_time,
                reports,
            }))
        }
        // Integer widths were handled above.
        _ => unreachable!("integer literal type fell through"),
    }
}

fn decode_report(r: &mut Reader<'_>) -> Result<Report, AriError> {
    let (item, off) = r.item()?;
    let Item::Array(3) = item else {
        return Err(AriError::new(ErrorCode::WrongItemType, off));
    };
    let source = decode_nested(r)?;
    let rel_time = decode_time(r)?;
    let (items_head, items_off) = r.item()?;
    let Item::Array(n) = items_head else {
        return Err(AriError::new(ErrorCode::WrongItemType, items_off));
    };
    let mut items = Vec::with_capacity(n.min(64));
    for _ in 0..n {
        items.push(decode_nested(r)?);
    }
    Ok(Report {
        source,
        rel_time,
        items,
    })
}

fn decode_time(r: &mut Reader<'_>) -> Result<DtnTime, AriError> {
    let (item, off) = r.item()?;
    match item {
        Item::Uint(v) => {
            let secs = i64::try_from(v)
                .map_err(|_| AriError::new(ErrorCode::TimeOutOfRange, off))?;
            Ok(DtnTime::from_secs(secs))
        }
        Item::Nint(n) => {
            let secs = i64::try_from(-1 - i128::from(n))
                .map_err(|_| AriError::new(ErrorCode::TimeOutOfRange, off))?;
            Ok(DtnTime::from_secs(secs))
        }
        Item::Array(2) => {
            let (exp, exp_off) = r.int()?;
            let exp = i32::try_from(exp)
                .map_err(|_| AriError::new(ErrorCode::TimeOutOfRange, exp_off))?;
            let (mant, mant_off) = r.int()?;
            let mant = i64::try_from(mant)
                .map_err(|_| AriError::new(ErrorCode::TimeOutOfRange, mant_off))?;
            DtnTime::from_decfrac(exp, mant).map_err(|e| AriError::new(e.code, off))
        }
        _ => Err(AriError::new(ErrorCode::WrongItemType, off)),
    }
}

fn decode_ref_body(r: &mut Reader<'_>, len: usize) -> Result<Ari, AriError> {
    let (ns_item, ns_off) = r.item()?;
    let ns = match ns_item {
        Item::Null => None,
        Item::Uint(v) => Some(IdSeg::Num(
            i64::try_from(v).map_err(|_| AriError::new(ErrorCode::IntegerOutOfRange, ns_off))?,
        )),
        Item::Nint(n) => Some(IdSeg::Num(
            i64::try_from(-1 - i128::from(n))
                .map_err(|_| AriError::new(ErrorCode::IntegerOutOfRange, ns_off))?,
        )),
        Item::Text(tlen) => Some(IdSeg::Name(r.text_payload(tlen, ns_off)?.to_owned())),
        _ => return Err(AriError::new(ErrorCode::WrongItemType, ns_off)),
    };

    let (ty_code, ty_off) = r.int()?;
    let obj_type = u64::try_from(ty_code)
        .ok()
        .and_then(ObjType::from_code)
        .ok_or_else(|| AriError::new(ErrorCode::UnknownObjTypeCode, ty_off))?;

    let (obj_item, obj_off) = r.item()?;
    let obj = match obj_item {
        Item::Uint(v) => IdSeg::Num(
            i64::try_from(v).map_err(|_| AriError::new(ErrorCode::IntegerOutOfRange, obj_off))?,
        ),
        Item::Nint(n) => IdSeg::Num(
            i64::try_from(-1 - i128::from(n))
                .map_err(|_| AriError::new(ErrorCode::IntegerOutOfRange, obj_off))?,
        ),
        Item::Text(tlen) => IdSeg::Name(r.text_payload(tlen, obj_off)?.to_owned()),
        _ => return Err(AriError::new(ErrorCode::WrongItemType, obj_off)),
    };

    let params = if len == 4 {
        let (p_item, p_off) = r.item()?;
        let Item::Array(n) = p_item else {
            return Err(AriError::new(ErrorCode::WrongItemType, p_off));
        };
        let mut items = Vec::with_capacity(n.min(64));
        for _ in 0..n {
            items.push(decode_nested(r)?);
        }
        Some(items)
    } else {
        None
    };

    Ok(Ari::Ref(Box::new(RefAri {
        ns,
        obj_type,
        obj,
        params,
    })))
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use crate::ari::{Ari, IdSeg, Lit, RefAri, Table};
    use crate::error::{ErrorCode, ErrorKind};
    use crate::types::ObjType;

    #[test]
    fn undefined_is_bare_cbor_undefined() {
        assert_eq!(encode(&Ari::Undefined).unwrap(), vec![0xf7]);
        assert_eq!(decode(&[0xf7]).unwrap(), Ari::Undefined);
    }

    #[test]
    fn empty_ac_layout() {
        let bytes = encode(&Ari::Lit(Lit::Ac(vec![]))).unwrap();
        // tag 140, [AC-code, []]
        assert_eq!(bytes, vec![0xd8, 0x8c, 0x82, 0x12, 0x80]);
        assert_eq!(decode(&bytes).unwrap(), Ari::Lit(Lit::Ac(vec![])));
    }

    #[test]
    fn integer_width_survives_the_wire() {
        for ari in [Ari::uint(2), Ari::uvast(2), Ari::int(2), Ari::vast(2)] {
            let bytes = encode(&ari).unwrap();
            assert_eq!(decode(&bytes).unwrap(), ari);
        }
        // Same numeric value, different widths, different bytes.
        assert_ne!(encode(&Ari::uint(2)).unwrap(), encode(&Ari::uvast(2)).unwrap());
    }

    #[test]
    fn reference_with_numeric_identity() {
        let ari = Ari::Ref(Box::new(RefAri {
            ns: Some(IdSeg::Num(5)),
            obj_type: ObjType::Ctrl,
            obj: IdSeg::Num(6),
            params: Some(vec![Ari::uvast(25_000), Ari::uint(2)]),
        }));
        let bytes = encode(&ari).unwrap();
        assert_eq!(decode(&bytes).unwrap(), ari);
    }

    #[test]
    fn tbl_shape_is_checked_at_decode() {
        let good = Ari::Lit(Lit::Tbl(
            Table::new(2, vec![Ari::vast(1), Ari::vast(2), Ari::vast(3), Ari::vast(4)]).unwrap(),
        ));
        let mut bytes = encode(&good).unwrap();
        assert_eq!(decode(&bytes).unwrap(), good);

        // Corrupt the column count from 2 to 3: flat length 4 is no longer
        // divisible.
        let cols_idx = bytes.len() - 13;
        assert_eq!(bytes[cols_idx], 0x02);
        bytes[cols_idx] = 0x03;
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.code, ErrorCode::TableShape);
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn truncated_params_report_end_offset() {
        let ari = Ari::Ref(Box::new(RefAri {
            ns: Some(IdSeg::Num(5)),
            obj_type: ObjType::Ctrl,
            obj: IdSeg::Num(6),
            params: Some(vec![Ari::uvast(1_685_728_970)]),
        }));
        let bytes = encode(&ari).unwrap();
        let cut = &bytes[..bytes.len() - 2];
        let err = decode(cut).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedEof);
        assert_eq!(err.pos.offset, cut.len());
    }

    #[test]
    fn unknown_codes_are_hard_errors() {
        // [99, null] under the ARI tag: unknown literal-type code.
        let bytes = [0xd8, 0x8c, 0x82, 0x18, 0x63, 0xf6];
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownLitTypeCode);

        // [5, 99, 0]: unknown object-type code.
        let bytes = [0xd8, 0x8c, 0x83, 0x05, 0x18, 0x63, 0x00];
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownObjTypeCode);
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = encode(&Ari::uint(1)).unwrap();
        bytes.push(0x00);
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.code, ErrorCode::TrailingBytes);
    }
}
