//! # ace-ari
//!
//! The **AMM CODEC Engine (ACE)**: translation of DTNMA Application Resource
//! Identifiers (ARIs) between their URI text form and their CBOR binary form,
//! validated against Application Data Model (ADM) catalogs.
//!
//! ## Structure
//!
//! - [`Ari`] is the in-memory value model: typed literals, containers, and
//!   object references with parameter lists.
//! - [`types`] holds the closed literal-type and object-type registries that
//!   both codecs dispatch on.
//! - [`text`] and [`cbor`] are the symmetric codecs; both obey exact
//!   round-trip laws (`parse(unparse(x)) = x`, `decode(encode(x)) = x`, and
//!   byte-deterministic encoding).
//! - [`AdmCatalog`] supplies namespace and object identities plus parameter
//!   signatures; [`Resolver`] fills in the missing symbolic or numeric side
//!   of references and checks signatures.
//! - [`Transcoder`] drives decode -> resolve -> emit across the
//!   [`Form`]s `text`, `cborhex`, and `cbor`.
//!
//! ## Design principles
//!
//! - **The AST is the value.** Values are immutable once parsed; every
//!   transformation produces a new tree.
//! - **Width lives in the type code.** CBOR cannot express integer widths,
//!   so `UINT.2` and `UVAST.2` stay distinct through the literal-type code
//!   that travels with every encoded literal.
//! - **The core never does I/O.** Parsing, encoding, and resolution are pure
//!   transformations; file loading belongs to [`adm_json`] and the `ace_ari`
//!   binary. A constructed catalog is immutable and shareable across
//!   threads.
//!
//! ## Safety
//!
//! This crate forbids `unsafe` code.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::module_name_repetitions
)]

pub mod adm_json;
mod ari;
mod catalog;
pub mod cbor;
mod dtntime;
mod error;
mod lexer;
mod resolve;
pub mod text;
mod transcode;
pub mod types;
mod wire;

pub use crate::ari::{Ari, ExecSet, IdSeg, IntLit, IntType, Label, Lit, RefAri, Report, RptSet, Table};
pub use crate::catalog::{Adm, AdmCatalog, ObjDescr, ParamSpec};
pub use crate::dtntime::DtnTime;
pub use crate::error::{AriError, ErrorCode, ErrorKind, Pos};
pub use crate::resolve::{lookup, Resolver};
pub use crate::transcode::{Form, Transcoder};
pub use crate::types::{AmmType, LitType, ObjType, TAG_ARI};
