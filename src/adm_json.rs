//! Loader for the on-disk ADM JSON format.
//!
//! The JSON describes one namespace: identity keys at the top level and one
//! array per object-type section (`"ctrl"`, `"edd"`, ...). Parameter
//! declarations carry a type name from the registry and an optional default
//! written as a text ARI.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::catalog::{Adm, AdmCatalog, ObjDescr, ParamSpec};
use crate::error::AriError;
use crate::text;
use crate::types::{AmmType, ObjType};

/// A failure while loading ADM JSON into a catalog.
#[derive(Debug)]
pub enum AdmLoadError {
    /// Filesystem failure.
    Io(std::io::Error),
    /// Malformed JSON or JSON not matching the ADM schema.
    Json(serde_json::Error),
    /// A declared parameter or value type name outside the registry.
    UnknownTypeName(String),
    /// A default value that does not parse as a text ARI, or a catalog
    /// collision.
    Ari(AriError),
}

impl fmt::Display for AdmLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "ADM file error: {err}"),
            Self::Json(err) => write!(f, "ADM JSON error: {err}"),
            Self::UnknownTypeName(name) => write!(f, "ADM declares unknown type name {name:?}"),
            Self::Ari(err) => write!(f, "ADM content error: {err}"),
        }
    }
}

impl std::error::Error for AdmLoadError {}

impl From<std::io::Error> for AdmLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for AdmLoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<AriError> for AdmLoadError {
    fn from(err: AriError) -> Self {
        Self::Ari(err)
    }
}

#[derive(Debug, Deserialize)]
struct ParmJson {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjJson {
    name: String,
    #[serde(rename = "enum")]
    obj_enum: i64,
    #[serde(default)]
    parmspec: Vec<ParmJson>,
    #[serde(default, rename = "type")]
    ty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdmJson {
    name: String,
    #[serde(default)]
    organization: Option<String>,
    #[serde(rename = "enum")]
    ns_enum: i64,
    #[serde(default)]
    version: Option<String>,

    #[serde(default, rename = "const")]
    const_: Vec<ObjJson>,
    #[serde(default)]
    ctrl: Vec<ObjJson>,
    #[serde(default)]
    edd: Vec<ObjJson>,
    #[serde(default)]
    mac: Vec<ObjJson>,
    #[serde(default)]
    oper: Vec<ObjJson>,
    #[serde(default)]
    rptt: Vec<ObjJson>,
    #[serde(default)]
    sbr: Vec<ObjJson>,
    #[serde(default)]
    tblt: Vec<ObjJson>,
    #[serde(default)]
    tbr: Vec<ObjJson>,
    #[serde(default)]
    var: Vec<ObjJson>,
    #[serde(default)]
    ident: Vec<ObjJson>,
}

fn type_of(name: &str) -> Result<AmmType, AdmLoadError> {
    AmmType::from_name(name).ok_or_else(|| AdmLoadError::UnknownTypeName(name.to_string()))
}

fn convert_obj(json: ObjJson) -> Result<ObjDescr, AdmLoadError> {
    let mut params = Vec::with_capacity(json.parmspec.len());
    for p in json.parmspec {
        let ty = type_of(&p.ty)?;
        let default = match p.default {
            Some(src) => Some(text::parse(&src)?),
            None => None,
        };
        params.push(ParamSpec {
            name: p.name,
            ty,
            default,
        });
    }
    let mut obj = ObjDescr::new(&json.name, json.obj_enum).with_params(params);
    obj.value_type = json.ty.as_deref().map(type_of).transpose()?;
    Ok(obj)
}

/// Parse one ADM from its JSON text.
///
/// # Errors
///
/// Returns an error for malformed JSON, unknown type names, unparseable
/// default values, or duplicate object identities.
pub fn adm_from_json(src: &str) -> Result<Adm, AdmLoadError> {
    let json: AdmJson = serde_json::from_str(src)?;
    let mut adm = Adm::new(&json.name, json.ns_enum);
    if let Some(org) = &json.organization {
        adm = adm.with_org(org);
    }
    if let Some(version) = &json.version {
        adm = adm.with_version(version);
    }

    let sections: [(ObjType, Vec<ObjJson>); 11] = [
        (ObjType::Const, json.const_),
        (ObjType::Ctrl, json.ctrl),
        (ObjType::Edd, json.edd),
        (ObjType::Mac, json.mac),
        (ObjType::Oper, json.oper),
        (ObjType::Rptt, json.rptt),
        (ObjType::Sbr, json.sbr),
        (ObjType::Tblt, json.tblt),
        (ObjType::Tbr, json.tbr),
        (ObjType::Var, json.var),
        (ObjType::Ident, json.ident),
    ];
    for (ty, objs) in sections {
        for obj in objs {
            adm.add_object(ty, convert_obj(obj)?)?;
        }
    }
    Ok(adm)
}

/// Load every `*.json` ADM in a directory into the catalog.
///
/// # Errors
///
/// Returns the first filesystem, parse, or collision error; ADMs installed
/// before the failure stay installed.
pub fn load_dir(catalog: &mut AdmCatalog, dir: &Path) -> Result<usize, AdmLoadError> {
    let mut count = 0;
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort();
    for path in entries {
        let src = fs::read_to_string(&path)?;
        catalog.add_adm(adm_from_json(&src)?)?;
        count += 1;
    }
    Ok(count)
}
