//! The transcoder facade: decode, resolve, emit.
//!
//! Drives the full pipeline between the text and binary forms, consulting an
//! ADM catalog for reference resolution. Stream framing follows the tool
//! conventions: one ARI per line for `text` and `cborhex`, concatenated CBOR
//! items for `cbor`.

use crate::ari::Ari;
use crate::catalog::AdmCatalog;
use crate::cbor;
use crate::error::{AriError, ErrorCode};
use crate::resolve::Resolver;
use crate::text;
use crate::wire::Reader;

/// An ARI encoding form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// URI text, one ARI per line.
    Text,
    /// Hexadecimal CBOR, one item per line, optional `0x` prefix.
    CborHex,
    /// Raw CBOR, concatenated items.
    Cbor,
}

impl Form {
    /// Parse a form name as used by the CLI flags.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "cborhex" => Some(Self::CborHex),
            "cbor" => Some(Self::Cbor),
            _ => None,
        }
    }
}

/// Transcoding pipeline over one catalog.
#[derive(Debug, Clone, Copy)]
pub struct Transcoder<'a> {
    catalog: &'a AdmCatalog,
    must_resolve: bool,
}

impl<'a> Transcoder<'a> {
    /// A transcoder over `catalog`.
    ///
    /// With `must_resolve`, any reference the catalog cannot resolve fails
    /// the pipeline; otherwise unresolved references flow through carrying
    /// whichever identity form the input supplied.
    #[must_use]
    pub const fn new(catalog: &'a AdmCatalog, must_resolve: bool) -> Self {
        Self {
            catalog,
            must_resolve,
        }
    }

    /// Decode a single ARI from `input` in `form`.
    ///
    /// # Errors
    ///
    /// Returns the codec's parse or decode error.
    pub fn decode(&self, input: &[u8], form: Form) -> Result<Ari, AriError> {
        match form {
            Form::Text => {
                let src = core::str::from_utf8(input)
                    .map_err(|e| AriError::new(ErrorCode::Utf8Invalid, e.valid_up_to()))?;
                text::parse(src.trim_end_matches(['\r', '\n']))
            }
            Form::CborHex => cbor::decode(&decode_hex_line(input)?),
            Form::Cbor => cbor::decode(input),
        }
    }

    /// Resolve references in `ari` against the catalog.
    ///
    /// # Errors
    ///
    /// Returns resolution, signature, or parameter type errors.
    pub fn resolve(&self, ari: &Ari) -> Result<Ari, AriError> {
        Resolver::new(self.catalog, self.must_resolve).resolve(ari)
    }

    /// Emit `ari` in `form`. Text output carries no trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error for values outside the binary wire's numeric range.
    pub fn emit(&self, ari: &Ari, form: Form) -> Result<Vec<u8>, AriError> {
        match form {
            Form::Text => Ok(text::unparse(ari).into_bytes()),
            Form::CborHex => Ok(hex::encode_upper(cbor::encode(ari)?).into_bytes()),
            Form::Cbor => cbor::encode(ari),
        }
    }

    /// Run the full decode -> resolve -> emit pipeline on one ARI.
    ///
    /// # Errors
    ///
    /// Returns the first pipeline error.
    pub fn transcode(&self, input: &[u8], inform: Form, outform: Form) -> Result<Vec<u8>, AriError> {
        let ari = self.decode(input, inform)?;
        let resolved = self.resolve(&ari)?;
        self.emit(&resolved, outform)
    }

    /// Split a whole input stream into per-ARI decodes.
    ///
    /// # Errors
    ///
    /// Fails fast on the first undecodable item.
    pub fn decode_stream(&self, input: &[u8], form: Form) -> Result<Vec<Ari>, AriError> {
        match form {
            Form::Text | Form::CborHex => {
                let src = core::str::from_utf8(input)
                    .map_err(|e| AriError::new(ErrorCode::Utf8Invalid, e.valid_up_to()))?;
                let mut out = Vec::new();
                for line in src.lines() {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    out.push(self.decode(line.as_bytes(), form)?);
                }
                Ok(out)
            }
            Form::Cbor => {
                let mut out = Vec::new();
                let mut r = Reader::new(input);
                while !r.eof() {
                    out.push(cbor::decode_root(&mut r)?);
                }
                Ok(out)
            }
        }
    }
}

/// Decode one `cborhex` line, accepting an optional `0x` prefix and interior
/// whitespace.
fn decode_hex_line(line: &[u8]) -> Result<Vec<u8>, AriError> {
    let src = core::str::from_utf8(line)
        .map_err(|e| AriError::new(ErrorCode::BadBase16, e.valid_up_to()))?;
    let trimmed = src.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).map_err(|_| AriError::new(ErrorCode::BadBase16, 0))
}

#[cfg(test)]
mod tests {
    use super::{Form, Transcoder};
    use crate::ari::Ari;
    use crate::catalog::AdmCatalog;

    #[test]
    fn text_to_cborhex_and_back() {
        let cat = AdmCatalog::new();
        let tc = Transcoder::new(&cat, false);
        let hex_out = tc
            .transcode(b"ari:/UINT.2", Form::Text, Form::CborHex)
            .unwrap();
        let text_out = tc
            .transcode(&hex_out, Form::CborHex, Form::Text)
            .unwrap();
        assert_eq!(text_out, b"ari:/UINT.2");
    }

    #[test]
    fn cborhex_accepts_0x_prefix() {
        let cat = AdmCatalog::new();
        let tc = Transcoder::new(&cat, false);
        let ari = tc.decode(b"0xF7", Form::CborHex).unwrap();
        assert_eq!(ari, Ari::Undefined);
    }

    #[test]
    fn cbor_stream_splits_concatenated_items() {
        let cat = AdmCatalog::new();
        let tc = Transcoder::new(&cat, false);
        let mut stream = tc.emit(&Ari::uint(1), Form::Cbor).unwrap();
        stream.extend(tc.emit(&Ari::Undefined, Form::Cbor).unwrap());
        let items = tc.decode_stream(&stream, Form::Cbor).unwrap();
        assert_eq!(items, vec![Ari::uint(1), Ari::Undefined]);
    }
}
