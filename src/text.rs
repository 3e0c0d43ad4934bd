//! The ARI text codec: URI grammar parsing and canonical unparsing.
//!
//! The parser is a hand-written recursive-descent layer over [`crate::lexer`]
//! with single-token lookahead. It normalizes identifiers to the registry's
//! canonical casing, rejects unknown literal-type names (a closed set), and
//! produces unresolved references for unknown namespaces and object names so
//! the transcoder can surface those as resolution failures.

use core::fmt::Write as _;

use crate::ari::{Ari, ExecSet, IdSeg, IntLit, IntType, Label, Lit, RefAri, Report, RptSet, Table};
use crate::dtntime::DtnTime;
use crate::error::{AriError, ErrorCode, Pos};
use crate::lexer::{pct_encode_into, Lexer, TokKind, Token, TypeName};
use crate::types::LitType;

/// Parse one textual ARI.
///
/// # Errors
///
/// Returns a lexical, syntax, or type error with the position of the
/// offending input.
pub fn parse(src: &str) -> Result<Ari, AriError> {
    let mut p = Parser {
        lx: Lexer::new(src),
    };
    let ari = p.parse_after_prefix(true)?;
    let tok = p.lx.next()?;
    if tok.kind != TokKind::End {
        return Err(AriError::at(ErrorCode::TrailingText, tok.pos));
    }
    Ok(ari)
}

/// Unparse an ARI to its canonical text form.
#[must_use]
pub fn unparse(ari: &Ari) -> String {
    let mut out = String::new();
    write_ari(&mut out, ari, false);
    out
}

struct Parser<'a> {
    lx: Lexer<'a>,
}

impl Parser<'_> {
    /// Parse an ARI, optionally consuming a leading `ari:` scheme prefix.
    fn parse_after_prefix(&mut self, allow_prefix: bool) -> Result<Ari, AriError> {
        if allow_prefix && self.lx.peek()?.kind == TokKind::AriPrefix {
            self.lx.next()?;
        }
        if self.lx.peek()?.kind == TokKind::Slash {
            self.lx.next()?;
            self.parse_ssp()
        } else {
            // Bare literal without a path, e.g. `ari:true`.
            self.parse_value()
        }
    }

    /// Parse the scheme-specific part after its leading `/`.
    fn parse_ssp(&mut self) -> Result<Ari, AriError> {
        let tok = self.lx.peek()?.clone();
        match tok.kind {
            // `//OBJTYPE.name` — reference with an empty namespace segment.
            TokKind::Slash => {
                self.lx.next()?;
                self.parse_ref_tail(None)
            }
            TokKind::TypeDot(TypeName::Obj(_)) => self.parse_ref_tail(None),
            // `!<enum>/...` — enumerator-qualified namespace.
            TokKind::Bang => {
                self.lx.next()?;
                let num = self.expect_int()?;
                self.expect(&TokKind::Slash)?;
                self.parse_ref_tail(Some(IdSeg::Num(num)))
            }
            TokKind::Int(v) => {
                self.lx.next()?;
                if self.lx.peek()?.kind == TokKind::Slash {
                    self.lx.next()?;
                    let num = i64::try_from(v)
                        .map_err(|_| AriError::at(ErrorCode::IntegerOutOfRange, tok.pos))?;
                    self.parse_ref_tail(Some(IdSeg::Num(num)))
                } else {
                    untyped_int(v, tok.pos)
                }
            }
            TokKind::Name(ref name) => {
                self.lx.next()?;
                if self.lx.peek()?.kind == TokKind::Slash {
                    self.lx.next()?;
                    self.parse_ref_tail(Some(IdSeg::Name(name.clone())))
                } else {
                    self.name_value(name, &tok)
                }
            }
            _ => self.parse_value(),
        }
    }

    /// Parse `OBJTYPE.name[(params)]`.
    fn parse_ref_tail(&mut self, ns: Option<IdSeg>) -> Result<Ari, AriError> {
        let tok = self.lx.next()?;
        let TokKind::TypeDot(TypeName::Obj(obj_type)) = tok.kind else {
            return Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos));
        };

        let id_tok = self.lx.next()?;
        let obj = match id_tok.kind {
            TokKind::Name(name) => IdSeg::Name(name),
            TokKind::Int(v) => IdSeg::Num(
                i64::try_from(v)
                    .map_err(|_| AriError::at(ErrorCode::IntegerOutOfRange, id_tok.pos))?,
            ),
            _ => return Err(AriError::at(ErrorCode::UnexpectedToken, id_tok.pos)),
        };

        let params = if self.lx.peek()?.kind == TokKind::LParen {
            self.lx.next()?;
            Some(self.parse_list_until_rparen()?)
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

    fn parse_list_until_rparen(&mut self) -> Result<Vec<Ari>, AriError> {
        let mut items = Vec::new();
        if self.lx.peek()?.kind == TokKind::RParen {
            self.lx.next()?;
            return Ok(items);
        }
        loop {
            items.push(self.parse_value()?);
            let tok = self.lx.next()?;
            match tok.kind {
                TokKind::Comma => {}
                TokKind::RParen => return Ok(items),
                TokKind::End => return Err(AriError::at(ErrorCode::UnexpectedEnd, tok.pos)),
                _ => return Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos)),
            }
        }
    }

    /// Parse any value position: a nested full ARI, a reference path, or a
    /// literal.
    fn parse_value(&mut self) -> Result<Ari, AriError> {
        let tok = self.lx.peek()?.clone();
        match tok.kind {
            TokKind::AriPrefix => {
                self.lx.next()?;
                self.parse_after_prefix(false)
            }
            TokKind::Slash => {
                self.lx.next()?;
                self.parse_ssp()
            }
            TokKind::TypeDot(TypeName::Lit(ty)) => {
                self.lx.next()?;
                self.typed_scalar(ty, tok.pos)
            }
            TokKind::TypeDot(TypeName::Obj(_)) => self.parse_ref_tail(None),
            TokKind::Int(v) => {
                self.lx.next()?;
                untyped_int(v, tok.pos)
            }
            TokKind::Real(v) => {
                self.lx.next()?;
                Ok(Ari::Lit(Lit::Real64(v)))
            }
            TokKind::TStr(ref s) => {
                self.lx.next()?;
                Ok(Ari::Lit(Lit::TextStr(s.clone())))
            }
            TokKind::BStr(ref b) => {
                self.lx.next()?;
                Ok(Ari::Lit(Lit::ByteStr(b.clone())))
            }
            TokKind::Name(ref name) => {
                self.lx.next()?;
                self.name_value(name, &tok)
            }
            TokKind::End => Err(AriError::at(ErrorCode::UnexpectedEnd, tok.pos)),
            _ => Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos)),
        }
    }

    /// Interpret a bare name in value position: keyword literal or container.
    fn name_value(&mut self, name: &str, tok: &Token) -> Result<Ari, AriError> {
        if name.eq_ignore_ascii_case("true") {
            return Ok(Ari::Lit(Lit::Bool(true)));
        }
        if name.eq_ignore_ascii_case("false") {
            return Ok(Ari::Lit(Lit::Bool(false)));
        }
        if name.eq_ignore_ascii_case("null") {
            return Ok(Ari::Lit(Lit::Null));
        }
        if name.eq_ignore_ascii_case("undefined") {
            return Ok(Ari::Undefined);
        }
        if self.lx.peek()?.kind == TokKind::LParen {
            if let Some(ty) = LitType::from_name(name).filter(|t| t.is_container()) {
                self.lx.next()?;
                return self.parse_container(ty, tok.pos);
            }
        }
        // A dotted word that is not a registered type reads as a bad literal
        // type name; everything else is a stray identifier.
        if name.contains('.') {
            Err(AriError::at(ErrorCode::UnknownTypeName, tok.pos))
        } else {
            Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos))
        }
    }

    /// Parse a `TYPE.value` scalar for a literal type.
    fn typed_scalar(&mut self, ty: LitType, pos: Pos) -> Result<Ari, AriError> {
        if let Some(int_ty) = IntType::from_lit_type(ty) {
            let v_tok = self.lx.next()?;
            let TokKind::Int(v) = v_tok.kind else {
                return Err(AriError::at(ErrorCode::BadLiteralValue, v_tok.pos));
            };
            let lit = IntLit::new(int_ty, v)
                .map_err(|e| AriError::at(e.code, v_tok.pos))?;
            return Ok(Ari::Lit(Lit::Int(lit)));
        }

        match ty {
            LitType::Bool => {
                let v_tok = self.lx.next()?;
                match v_tok.kind {
                    TokKind::Name(ref n) if n.eq_ignore_ascii_case("true") => {
                        Ok(Ari::Lit(Lit::Bool(true)))
                    }
                    TokKind::Name(ref n) if n.eq_ignore_ascii_case("false") => {
                        Ok(Ari::Lit(Lit::Bool(false)))
                    }
                    _ => Err(AriError::at(ErrorCode::BadLiteralValue, v_tok.pos)),
                }
            }
            LitType::Real32 => {
                let (raw, seg_pos) = self.lx.raw_segment()?;
                let v: f32 = normalize_float(&raw)
                    .parse()
                    .map_err(|_| AriError::at(ErrorCode::BadLiteralValue, seg_pos))?;
                Ok(Ari::Lit(Lit::Real32(v)))
            }
            LitType::Real64 => {
                let (raw, seg_pos) = self.lx.raw_segment()?;
                let v: f64 = normalize_float(&raw)
                    .parse()
                    .map_err(|_| AriError::at(ErrorCode::BadLiteralValue, seg_pos))?;
                Ok(Ari::Lit(Lit::Real64(v)))
            }
            LitType::TextStr => {
                let v_tok = self.lx.next()?;
                let TokKind::TStr(s) = v_tok.kind else {
                    return Err(AriError::at(ErrorCode::BadLiteralValue, v_tok.pos));
                };
                Ok(Ari::Lit(Lit::TextStr(s)))
            }
            LitType::ByteStr => {
                let v_tok = self.lx.next()?;
                let TokKind::BStr(b) = v_tok.kind else {
                    return Err(AriError::at(ErrorCode::BadLiteralValue, v_tok.pos));
                };
                Ok(Ari::Lit(Lit::ByteStr(b)))
            }
            LitType::Tp => {
                let (raw, seg_pos) = self.lx.raw_segment()?;
                let t = DtnTime::parse_tp(&raw).map_err(|e| AriError::at(e.code, seg_pos))?;
                Ok(Ari::Lit(Lit::Tp(t)))
            }
            LitType::Td => {
                let (raw, seg_pos) = self.lx.raw_segment()?;
                let t = DtnTime::parse_td(&raw).map_err(|e| AriError::at(e.code, seg_pos))?;
                Ok(Ari::Lit(Lit::Td(t)))
            }
            LitType::Label => {
                let v_tok = self.lx.next()?;
                match v_tok.kind {
                    TokKind::Name(n) => Ok(Ari::Lit(Lit::Label(Label::Text(n)))),
                    TokKind::Int(v) => {
                        let v = i64::try_from(v).map_err(|_| {
                            AriError::at(ErrorCode::IntegerOutOfRange, v_tok.pos)
                        })?;
                        Ok(Ari::Lit(Lit::Label(Label::Int(v))))
                    }
                    _ => Err(AriError::at(ErrorCode::BadLiteralValue, v_tok.pos)),
                }
            }
            LitType::Cbor => {
                let v_tok = self.lx.next()?;
                let TokKind::BStr(b) = v_tok.kind else {
                    return Err(AriError::at(ErrorCode::BadLiteralValue, v_tok.pos));
                };
                Ok(Ari::Lit(Lit::Cbor(b)))
            }
            // Containers use the call form, never `TYPE.`.
            _ => Err(AriError::at(ErrorCode::UnexpectedToken, pos)),
        }
    }

    /// Parse a container body after its opening parenthesis.
    fn parse_container(&mut self, ty: LitType, pos: Pos) -> Result<Ari, AriError> {
        match ty {
            LitType::Ac => Ok(Ari::Lit(Lit::Ac(self.parse_list_until_rparen()?))),
            LitType::Am => self.parse_am(),
            LitType::Tbl => self.parse_tbl(pos),
            LitType::ExecSet => self.parse_execset(),
            LitType::RptSet => self.parse_rptset(),
            _ => Err(AriError::at(ErrorCode::UnexpectedToken, pos)),
        }
    }

    fn parse_am(&mut self) -> Result<Ari, AriError> {
        let mut entries: Vec<(Ari, Ari)> = Vec::new();
        if self.lx.peek()?.kind == TokKind::RParen {
            self.lx.next()?;
            return Ok(Ari::Lit(Lit::Am(entries)));
        }
        loop {
            let key_pos = self.lx.here();
            let key = self.parse_value()?;
            self.expect(&TokKind::Eq)?;
            let value = self.parse_value()?;
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(AriError::at(ErrorCode::DuplicateMapKey, key_pos));
            }
            entries.push((key, value));
            let tok = self.lx.next()?;
            match tok.kind {
                TokKind::Comma => {}
                TokKind::RParen => return Ok(Ari::Lit(Lit::Am(entries))),
                _ => return Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos)),
            }
        }
    }

    fn parse_tbl(&mut self, pos: Pos) -> Result<Ari, AriError> {
        self.expect_key("c")?;
        self.expect(&TokKind::Eq)?;
        let cols_tok = self.lx.next()?;
        let TokKind::Int(cols) = cols_tok.kind else {
            return Err(AriError::at(ErrorCode::UnexpectedToken, cols_tok.pos));
        };
        let cols = u64::try_from(cols)
            .map_err(|_| AriError::at(ErrorCode::IntegerOutOfRange, cols_tok.pos))?;

        let mut items = Vec::new();
        loop {
            let tok = self.lx.next()?;
            match tok.kind {
                TokKind::RParen => break,
                TokKind::Semi => {
                    // One row of `cols` comma-separated items.
                    loop {
                        items.push(self.parse_value()?);
                        if self.lx.peek()?.kind == TokKind::Comma {
                            self.lx.next()?;
                        } else {
                            break;
                        }
                    }
                }
                _ => return Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos)),
            }
        }
        let table = Table::new(cols, items).map_err(|e| AriError::at(e.code, pos))?;
        Ok(Ari::Lit(Lit::Tbl(table)))
    }

    fn parse_execset(&mut self) -> Result<Ari, AriError> {
        self.expect_key("n")?;
        self.expect(&TokKind::Eq)?;
        let nonce = self.parse_value()?;
        let mut targets = Vec::new();
        let tok = self.lx.next()?;
        match tok.kind {
            TokKind::RParen => {}
            TokKind::Semi => loop {
                targets.push(self.parse_value()?);
                let sep = self.lx.next()?;
                match sep.kind {
                    TokKind::Comma => {}
                    TokKind::RParen => break,
                    _ => return Err(AriError::at(ErrorCode::UnexpectedToken, sep.pos)),
                }
            },
            _ => return Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos)),
        }
        Ok(Ari::Lit(Lit::ExecSet(ExecSet {
            nonce: Box::new(nonce),
            targets,
        })))
    }

    fn parse_rptset(&mut self) -> Result<Ari, AriError> {
        self.expect_key("n")?;
        self.expect(&TokKind::Eq)?;
        let nonce = self.parse_value()?;
        self.expect(&TokKind::Semi)?;
        self.expect_key("r")?;
        self.expect(&TokKind::Eq)?;
        let (raw, seg_pos) = self.lx.raw_segment()?;
        let ref_time = DtnTime::parse_tp(&raw).map_err(|e| AriError::at(e.code, seg_pos))?;

        let mut reports = Vec::new();
        loop {
            let tok = self.lx.next()?;
            match tok.kind {
                TokKind::RParen => break,
                TokKind::Semi => reports.push(self.parse_report()?),
                _ => return Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos)),
            }
        }
        Ok(Ari::Lit(Lit::RptSet(RptSet {
            nonce: Box::new(nonce),
            ref_time,
            reports,
        })))
    }

    /// One `(t=<td>;s=<source>[;items])` report entry.
    fn parse_report(&mut self) -> Result<Report, AriError> {
        self.expect(&TokKind::LParen)?;
        self.expect_key("t")?;
        self.expect(&TokKind::Eq)?;
        let (raw, seg_pos) = self.lx.raw_segment()?;
        let rel_time = DtnTime::parse_td(&raw).map_err(|e| AriError::at(e.code, seg_pos))?;
        self.expect(&TokKind::Semi)?;
        self.expect_key("s")?;
        self.expect(&TokKind::Eq)?;
        let source = self.parse_value()?;

        let mut items = Vec::new();
        let tok = self.lx.next()?;
        match tok.kind {
            TokKind::RParen => {}
            TokKind::Semi => loop {
                items.push(self.parse_value()?);
                let sep = self.lx.next()?;
                match sep.kind {
                    TokKind::Comma => {}
                    TokKind::RParen => break,
                    _ => return Err(AriError::at(ErrorCode::UnexpectedToken, sep.pos)),
                }
            },
            _ => return Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos)),
        }
        Ok(Report {
            source,
            rel_time,
            items,
        })
    }

    fn expect(&mut self, kind: &TokKind) -> Result<(), AriError> {
        let tok = self.lx.next()?;
        if tok.kind == *kind {
            Ok(())
        } else if tok.kind == TokKind::End {
            Err(AriError::at(ErrorCode::UnexpectedEnd, tok.pos))
        } else {
            Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos))
        }
    }

    /// Expect a one-letter structural key such as the `c` of `TBL(c=...)`.
    fn expect_key(&mut self, key: &str) -> Result<(), AriError> {
        let tok = self.lx.next()?;
        match tok.kind {
            TokKind::Name(ref n) if n.eq_ignore_ascii_case(key) => Ok(()),
            _ => Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos)),
        }
    }

    fn expect_int(&mut self) -> Result<i64, AriError> {
        let tok = self.lx.next()?;
        let TokKind::Int(v) = tok.kind else {
            return Err(AriError::at(ErrorCode::UnexpectedToken, tok.pos));
        };
        i64::try_from(v).map_err(|_| AriError::at(ErrorCode::IntegerOutOfRange, tok.pos))
    }
}

/// Default typing for a bare integer: VAST, widening to UVAST when needed.
fn untyped_int(v: i128, pos: Pos) -> Result<Ari, AriError> {
    if i64::try_from(v).is_ok() {
        Ok(Ari::Lit(Lit::Int(IntLit::new_unchecked(IntType::Vast, v))))
    } else if u64::try_from(v).is_ok() {
        Ok(Ari::Lit(Lit::Int(IntLit::new_unchecked(IntType::Uvast, v))))
    } else {
        Err(AriError::at(ErrorCode::IntegerOutOfRange, pos))
    }
}

/// Map Rust float syntax corner spellings onto `f32`/`f64` parsing.
fn normalize_float(raw: &str) -> &str {
    match raw {
        "Infinity" | "infinity" | "INFINITY" => "inf",
        "-Infinity" | "-infinity" | "-INFINITY" => "-inf",
        "+Infinity" | "+infinity" | "+INFINITY" => "+inf",
        other => other,
    }
}

fn write_ari(out: &mut String, ari: &Ari, nested: bool) {
    match ari {
        Ari::Undefined => {
            if nested {
                out.push_str("undefined");
            } else {
                out.push_str("ari:/undefined");
            }
        }
        Ari::Lit(lit) => {
            if !nested {
                out.push_str("ari:/");
            }
            write_lit(out, lit);
        }
        // Nested references keep the full scheme form so parameter lists
        // stay unambiguous.
        Ari::Ref(r) => {
            out.push_str("ari:");
            write_ref(out, r);
        }
    }
}

fn write_lit(out: &mut String, lit: &Lit) {
    match lit {
        Lit::Null => out.push_str("null"),
        Lit::Bool(true) => out.push_str("true"),
        Lit::Bool(false) => out.push_str("false"),
        Lit::Int(il) => match il.ty() {
            IntType::Vast => {
                let _ = write!(out, "{}", il.value());
            }
            ty => {
                let _ = write!(out, "{}.{}", ty.lit_type().name(), il.value());
            }
        },
        Lit::Real32(v) => {
            out.push_str("REAL32.");
            if v.is_nan() {
                out.push_str("NaN");
            } else if v.is_infinite() {
                out.push_str(if *v < 0.0 { "-Infinity" } else { "Infinity" });
            } else {
                // Shortest form for the 32-bit value itself, so reparsing as
                // f32 restores the exact bits.
                let _ = write!(out, "{v:?}");
            }
        }
        Lit::Real64(v) => write_f64(out, *v),
        Lit::TextStr(s) => {
            out.push('"');
            pct_encode_into(out, s);
            out.push('"');
        }
        Lit::ByteStr(b) => {
            let _ = write!(out, "h'{}'", hex::encode(b));
        }
        Lit::Tp(t) => {
            let _ = write!(out, "TP.{t}");
        }
        Lit::Td(t) => {
            let _ = write!(out, "TD.{t}");
        }
        Lit::Label(Label::Text(name)) => {
            out.push_str("LABEL.");
            pct_encode_into(out, name);
        }
        Lit::Label(Label::Int(v)) => {
            let _ = write!(out, "LABEL.{v}");
        }
        Lit::Cbor(b) => {
            let _ = write!(out, "CBOR.h'{}'", hex::encode(b));
        }
        Lit::Ac(items) => {
            out.push_str("AC(");
            write_list(out, items);
            out.push(')');
        }
        Lit::Am(entries) => {
            out.push_str("AM(");
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_ari(out, k, true);
                out.push('=');
                write_ari(out, v, true);
            }
            out.push(')');
        }
        Lit::Tbl(table) => {
            let _ = write!(out, "TBL(c={}", table.cols());
            if table.cols() > 0 {
                for row in table.items().chunks(table.cols() as usize) {
                    out.push(';');
                    write_list(out, row);
                }
            }
            out.push(')');
        }
        Lit::ExecSet(es) => {
            out.push_str("EXECSET(n=");
            write_ari(out, &es.nonce, true);
            if !es.targets.is_empty() {
                out.push(';');
                write_list(out, &es.targets);
            }
            out.push(')');
        }
        Lit::RptSet(rs) => {
            out.push_str("RPTSET(n=");
            write_ari(out, &rs.nonce, true);
            let _ = write!(out, ";r={}", rs.ref_time);
            for report in &rs.reports {
                let _ = write!(out, ";(t={};s=", report.rel_time);
                write_ari(out, &report.source, true);
                if !report.items.is_empty() {
                    out.push(';');
                    write_list(out, &report.items);
                }
                out.push(')');
            }
            out.push(')');
        }
    }
}

fn write_list(out: &mut String, items: &[Ari]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_ari(out, item, true);
    }
}

/// Shortest round-trip float form with the grammar's Infinity/NaN spellings.
fn write_f64(out: &mut String, v: f64) {
    if v.is_nan() {
        out.push_str("NaN");
    } else if v.is_infinite() {
        out.push_str(if v < 0.0 { "-Infinity" } else { "Infinity" });
    } else {
        let _ = write!(out, "{v:?}");
    }
}

fn write_ref(out: &mut String, r: &RefAri) {
    out.push('/');
    match &r.ns {
        Some(seg) => {
            write_seg(out, seg);
        }
        None => {
            // Path-local reference: `//` keeps the namespace slot visible.
            out.push('/');
        }
    }
    if r.ns.is_some() {
        out.push('/');
    }
    out.push_str(r.obj_type.name());
    out.push('.');
    // Object enumerators are plain integers; only namespaces take the `!`
    // qualifier.
    match &r.obj {
        IdSeg::Name(name) | IdSeg::Both(name, _) => pct_encode_into(out, name),
        IdSeg::Num(num) => {
            let _ = write!(out, "{num}");
        }
    }
    if let Some(params) = &r.params {
        out.push('(');
        write_list(out, params);
        out.push(')');
    }
}

fn write_seg(out: &mut String, seg: &IdSeg) {
    match seg {
        IdSeg::Name(name) | IdSeg::Both(name, _) => pct_encode_into(out, name),
        IdSeg::Num(num) => {
            let _ = write!(out, "!{num}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, unparse};
    use crate::ari::{Ari, IdSeg, Lit};
    use crate::error::{ErrorCode, ErrorKind};

    #[test]
    fn canonical_reference_roundtrip() {
        let src = "ari:/IANA:ion_admin/CTRL.node_contact_add(UVAST.1685728970,UINT.2)";
        let ari = parse(src).unwrap();
        assert_eq!(unparse(&ari), src);
    }

    #[test]
    fn case_is_normalized_to_registry_form() {
        let ari = parse("ari:/iana:ion_admin/ctrl.node_contact_add").unwrap();
        let Ari::Ref(r) = &ari else { panic!("not a reference") };
        assert_eq!(r.obj.name(), Some("node_contact_add"));
        assert_eq!(
            unparse(&ari),
            "ari:/iana:ion_admin/CTRL.node_contact_add"
        );
    }

    #[test]
    fn enum_qualified_namespace() {
        let ari = parse("ari:/!18/EDD.3").unwrap();
        let Ari::Ref(r) = &ari else { panic!("not a reference") };
        assert_eq!(r.ns, Some(IdSeg::Num(18)));
        assert_eq!(r.obj, IdSeg::Num(3));
        assert_eq!(unparse(&ari), "ari:/!18/EDD.3");
    }

    #[test]
    fn bare_literals_stay_bare() {
        for src in ["true", "false", "null", "1.5", "-4", "\"hi\""] {
            let ari = parse(src).unwrap();
            let canon = unparse(&ari);
            assert_eq!(canon, format!("ari:/{src}"));
            assert_eq!(parse(&canon).unwrap(), ari);
        }
    }

    #[test]
    fn syntax_error_has_position() {
        let err = parse("ari:/namespace/hello((").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.pos.offset > 0);
        assert_eq!(err.pos.line, 1);
    }

    #[test]
    fn unknown_literal_type_is_rejected() {
        let err = parse("ari:/FLOAT.10").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTypeName);
    }

    #[test]
    fn stray_word_is_rejected() {
        let err = parse("ari:hello").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedToken);
    }

    #[test]
    fn empty_ac() {
        let ari = parse("ari:/AC()").unwrap();
        assert_eq!(ari, Ari::Lit(Lit::Ac(vec![])));
        assert_eq!(unparse(&ari), "ari:/AC()");
    }
}
