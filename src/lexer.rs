//! Tokenizer for the ARI text form.
//!
//! Recognizes the lexical categories of the URI grammar with RFC 3986
//! percent-decoding applied inside identifier segments and quoted text
//! strings. Every token carries the position of its first byte.

use base64::Engine as _;

use crate::error::{AriError, ErrorCode, Pos};
use crate::types::{LitType, ObjType};

/// A type name in either code space, recognized before a `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeName {
    Lit(LitType),
    Obj(ObjType),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokKind {
    /// The `ari:` scheme prefix.
    AriPrefix,
    Slash,
    Comma,
    Semi,
    LParen,
    RParen,
    Eq,
    Bang,
    /// A registry type name immediately followed by `.` (the dot is consumed).
    TypeDot(TypeName),
    Int(i128),
    Real(f64),
    /// Percent-decoded identifier-like segment (may contain `:` and `.`).
    Name(String),
    /// Percent-decoded quoted text string.
    TStr(String),
    /// Decoded byte string (`h'..'`, `b64'..'`, or raw `'..'`).
    BStr(Vec<u8>),
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokKind,
    pub pos: Pos,
}

/// Characters that terminate a name segment or a raw value segment.
fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'/' | b'(' | b')' | b'[' | b']' | b',' | b';' | b'=' | b'\'' | b'"'
    ) || b.is_ascii_whitespace()
}

pub(crate) struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    peeked: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            peeked: None,
        }
    }

    /// Position of the next unconsumed byte.
    pub(crate) fn here(&self) -> Pos {
        if let Some(tok) = &self.peeked {
            tok.pos
        } else {
            Pos::text(self.pos, self.line, self.col)
        }
    }

    fn bump(&mut self) -> Option<u8> {
        let b = *self.src.get(self.pos)?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn rest(&self) -> &'a [u8] {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek_byte(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.bump();
        }
    }

    /// Look at the next token without consuming it.
    pub(crate) fn peek(&mut self) -> Result<&Token, AriError> {
        if self.peeked.is_none() {
            let tok = self.lex()?;
            self.peeked = Some(tok);
        }
        Ok(self.peeked.as_ref().map_or_else(|| unreachable!(), |t| t))
    }

    /// Consume and return the next token.
    pub(crate) fn next(&mut self) -> Result<Token, AriError> {
        if let Some(tok) = self.peeked.take() {
            return Ok(tok);
        }
        self.lex()
    }

    /// Consume raw characters up to the next delimiter, without tokenizing.
    ///
    /// Used for TP/TD values, whose ISO 8601 forms do not tokenize. Must not
    /// be called with a token already peeked.
    pub(crate) fn raw_segment(&mut self) -> Result<(String, Pos), AriError> {
        debug_assert!(self.peeked.is_none());
        self.skip_ws();
        let pos = Pos::text(self.pos, self.line, self.col);
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if is_delimiter(b) {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            return Err(AriError::at(ErrorCode::UnexpectedEnd, pos));
        }
        let raw = core::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| AriError::at(ErrorCode::BadPercentUtf8, pos))?;
        Ok((pct_decode(raw, pos)?, pos))
    }

    fn lex(&mut self) -> Result<Token, AriError> {
        self.skip_ws();
        let pos = Pos::text(self.pos, self.line, self.col);
        let Some(b) = self.peek_byte() else {
            return Ok(Token {
                kind: TokKind::End,
                pos,
            });
        };

        let kind = match b {
            b'/' => self.single(TokKind::Slash),
            b',' => self.single(TokKind::Comma),
            b';' => self.single(TokKind::Semi),
            b'(' => self.single(TokKind::LParen),
            b')' => self.single(TokKind::RParen),
            b'=' => self.single(TokKind::Eq),
            b'!' => self.single(TokKind::Bang),
            b'"' => self.lex_tstr(pos)?,
            b'\'' => {
                self.bump();
                TokKind::BStr(self.lex_bstr_body(None, pos)?)
            }
            b'+' | b'-' | b'0'..=b'9' | b'.' => self.lex_number(pos)?,
            _ if b.is_ascii_alphabetic() || b == b'%' => self.lex_wordish(pos)?,
            _ => return Err(AriError::at(ErrorCode::IllegalCharacter, pos)),
        };
        Ok(Token { kind, pos })
    }

    fn single(&mut self, kind: TokKind) -> TokKind {
        self.bump();
        kind
    }

    fn lex_tstr(&mut self, pos: Pos) -> Result<TokKind, AriError> {
        self.bump();
        let start = self.pos;
        loop {
            match self.peek_byte() {
                Some(b'"') => break,
                Some(_) => {
                    self.bump();
                }
                None => return Err(AriError::at(ErrorCode::UnterminatedString, pos)),
            }
        }
        let raw = core::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| AriError::at(ErrorCode::BadPercentUtf8, pos))?;
        let decoded = pct_decode(raw, pos)?;
        self.bump();
        Ok(TokKind::TStr(decoded))
    }

    fn lex_bstr_body(&mut self, enc: Option<&str>, pos: Pos) -> Result<Vec<u8>, AriError> {
        let start = self.pos;
        loop {
            match self.peek_byte() {
                Some(b'\'') => break,
                Some(_) => {
                    self.bump();
                }
                None => return Err(AriError::at(ErrorCode::UnterminatedBytes, pos)),
            }
        }
        let raw = core::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| AriError::at(ErrorCode::BadBase16, pos))?;
        self.bump();

        match enc {
            None => Ok(raw.as_bytes().to_vec()),
            Some("h") => hex::decode(raw.replace(char::is_whitespace, ""))
                .map_err(|_| AriError::at(ErrorCode::BadBase16, pos)),
            Some("b64") => {
                let trimmed: String = raw.chars().filter(|c| *c != '=').collect();
                base64::engine::general_purpose::STANDARD_NO_PAD
                    .decode(trimmed)
                    .map_err(|_| AriError::at(ErrorCode::BadBase64, pos))
            }
            Some(_) => Err(AriError::at(ErrorCode::UnsupportedBytesEncoding, pos)),
        }
    }

    fn lex_number(&mut self, pos: Pos) -> Result<TokKind, AriError> {
        let start = self.pos;
        if matches!(self.peek_byte(), Some(b'+' | b'-')) {
            self.bump();
        }

        // Signed Infinity / NaN.
        if self
            .rest()
            .get(..8)
            .is_some_and(|s| s.eq_ignore_ascii_case(b"infinity"))
        {
            self.bump_n(8);
            let neg = self.src[start] == b'-';
            return Ok(TokKind::Real(if neg {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }));
        }

        let radix_prefix = self.rest().get(..2).map(<[u8]>::to_ascii_lowercase);
        if matches!(radix_prefix.as_deref(), Some(b"0x" | b"0b")) {
            let hex = radix_prefix.as_deref() == Some(b"0x");
            self.bump_n(2);
            let digits_start = self.pos;
            while self
                .peek_byte()
                .is_some_and(|b| if hex { b.is_ascii_hexdigit() } else { matches!(b, b'0' | b'1') })
            {
                self.bump();
            }
            if self.pos == digits_start {
                return Err(AriError::at(ErrorCode::BadIntegerToken, pos));
            }
            let digits = core::str::from_utf8(&self.src[digits_start..self.pos]).unwrap_or("");
            let mag = i128::from_str_radix(digits, if hex { 16 } else { 2 })
                .map_err(|_| AriError::at(ErrorCode::BadIntegerToken, pos))?;
            let neg = self.src[start] == b'-';
            return Ok(TokKind::Int(if neg { -mag } else { mag }));
        }

        let mut saw_dot = false;
        let mut saw_exp = false;
        while let Some(b) = self.peek_byte() {
            match b {
                b'0'..=b'9' => {
                    self.bump();
                }
                b'.' if !saw_dot && !saw_exp => {
                    saw_dot = true;
                    self.bump();
                }
                b'e' | b'E' if !saw_exp => {
                    saw_exp = true;
                    self.bump();
                    if matches!(self.peek_byte(), Some(b'+' | b'-')) {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
        let text = core::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| AriError::at(ErrorCode::BadIntegerToken, pos))?;
        if text.is_empty() || text == "+" || text == "-" || text == "." {
            return Err(AriError::at(ErrorCode::BadIntegerToken, pos));
        }
        if saw_dot || saw_exp {
            let v: f64 = text
                .parse()
                .map_err(|_| AriError::at(ErrorCode::BadRealToken, pos))?;
            Ok(TokKind::Real(v))
        } else {
            let v: i128 = text
                .parse()
                .map_err(|_| AriError::at(ErrorCode::BadIntegerToken, pos))?;
            Ok(TokKind::Int(v))
        }
    }

    /// Byte-string prefixes, `TYPE.` forms, `Infinity`/`NaN`, or a plain name.
    fn lex_wordish(&mut self, pos: Pos) -> Result<TokKind, AriError> {
        let rest = self.rest();

        // `ari:` scheme prefix.
        if rest
            .get(..4)
            .is_some_and(|s| s.eq_ignore_ascii_case(b"ari:"))
        {
            self.bump_n(4);
            return Ok(TokKind::AriPrefix);
        }

        // Byte-string encoding prefixes.
        for prefix in ["h", "b32", "h32", "b64"] {
            let plen = prefix.len();
            let matches_prefix = rest
                .get(..plen)
                .is_some_and(|s| s.eq_ignore_ascii_case(prefix.as_bytes()))
                && rest.get(plen) == Some(&b'\'');
            if matches_prefix {
                self.bump_n(plen + 1);
                return Ok(TokKind::BStr(self.lex_bstr_body(
                    Some(&prefix.to_ascii_lowercase()),
                    pos,
                )?));
            }
        }

        // A registry type name directly followed by a dot.
        let ident_len = rest
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count();
        if rest.get(ident_len) == Some(&b'.') {
            let ident = core::str::from_utf8(&rest[..ident_len]).unwrap_or("");
            let ty = LitType::from_name(ident)
                .map(TypeName::Lit)
                .or_else(|| ObjType::from_name(ident).map(TypeName::Obj));
            if let Some(ty) = ty {
                self.bump_n(ident_len + 1);
                return Ok(TokKind::TypeDot(ty));
            }
        }

        // Plain name segment, percent-decoded.
        let seg_len = rest.iter().take_while(|b| !is_delimiter(**b)).count();
        let raw = core::str::from_utf8(&rest[..seg_len])
            .map_err(|_| AriError::at(ErrorCode::BadPercentUtf8, pos))?;
        self.bump_n(seg_len);

        if raw.eq_ignore_ascii_case("infinity") {
            return Ok(TokKind::Real(f64::INFINITY));
        }
        if raw.eq_ignore_ascii_case("nan") {
            return Ok(TokKind::Real(f64::NAN));
        }
        Ok(TokKind::Name(pct_decode(raw, pos)?))
    }
}

/// Decode RFC 3986 `%XX` escapes and validate the result as UTF-8.
pub(crate) fn pct_decode(raw: &str, pos: Pos) -> Result<String, AriError> {
    if !raw.contains('%') {
        return Ok(raw.to_string());
    }
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).copied();
            let lo = bytes.get(i + 2).copied();
            let (Some(hi), Some(lo)) = (hi, lo) else {
                return Err(AriError::at(ErrorCode::BadPercentEscape, pos));
            };
            let decode = |c: u8| (c as char).to_digit(16);
            let (Some(hi), Some(lo)) = (decode(hi), decode(lo)) else {
                return Err(AriError::at(ErrorCode::BadPercentEscape, pos));
            };
            out.push((hi * 16 + lo) as u8);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| AriError::at(ErrorCode::BadPercentUtf8, pos))
}

/// Percent-encode the bytes that cannot appear raw inside a URI segment of
/// the ARI grammar. Non-ASCII is escaped bytewise per RFC 3986.
pub(crate) fn pct_encode_into(out: &mut String, text: &str) {
    for b in text.bytes() {
        let needs_escape = b <= 0x20
            || b >= 0x7f
            || matches!(
                b,
                b'%' | b'"' | b'\'' | b'(' | b')' | b'[' | b']' | b',' | b';' | b'=' | b'/'
            );
        if needs_escape {
            out.push('%');
            out.push(char::from_digit(u32::from(b >> 4), 16).unwrap_or('0').to_ascii_uppercase());
            out.push(char::from_digit(u32::from(b & 0xf), 16).unwrap_or('0').to_ascii_uppercase());
        } else {
            out.push(char::from(b));
        }
    }
}
