//! Reference resolution against an ADM catalog.
//!
//! A resolver walks an AST and, for every object reference it can find in the
//! catalog, fills in the missing symbolic or numeric identity side and checks
//! the parameter list against the declared signature. Values are immutable,
//! so resolution produces a new AST.

use crate::ari::{Ari, ExecSet, IdSeg, Lit, RefAri, Report, RptSet, Table};
use crate::catalog::{Adm, AdmCatalog, ObjDescr};
use crate::error::{AriError, ErrorCode};
use crate::types::AmmType;

/// Walks ASTs and resolves references against one catalog.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    catalog: &'a AdmCatalog,
    must_resolve: bool,
}

impl<'a> Resolver<'a> {
    /// A resolver over `catalog`.
    ///
    /// With `must_resolve`, unknown namespaces and objects become errors;
    /// otherwise unknown references pass through unresolved. Resolution fills
    /// both identity sides, so one pass serves either output form.
    #[must_use]
    pub const fn new(catalog: &'a AdmCatalog, must_resolve: bool) -> Self {
        Self {
            catalog,
            must_resolve,
        }
    }

    /// Resolve every reference in `ari`, returning the rewritten AST.
    ///
    /// # Errors
    ///
    /// Returns resolution, signature, or parameter type errors; positions are
    /// not meaningful for in-memory values and stay at zero.
    pub fn resolve(&self, ari: &Ari) -> Result<Ari, AriError> {
        match ari {
            Ari::Undefined => Ok(Ari::Undefined),
            Ari::Lit(lit) => Ok(Ari::Lit(self.resolve_lit(lit)?)),
            Ari::Ref(r) => self.resolve_ref(r),
        }
    }

    fn resolve_lit(&self, lit: &Lit) -> Result<Lit, AriError> {
        match lit {
            Lit::Ac(items) => Ok(Lit::Ac(self.resolve_all(items)?)),
            Lit::Am(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    out.push((self.resolve(k)?, self.resolve(v)?));
                }
                Ok(Lit::Am(out))
            }
            Lit::Tbl(table) => {
                let items = self.resolve_all(table.items())?;
                // Shape was validated at construction and is preserved.
                Table::new(table.cols(), items).map(Lit::Tbl)
            }
            Lit::ExecSet(es) => Ok(Lit::ExecSet(ExecSet {
                nonce: Box::new(self.resolve(&es.nonce)?),
                targets: self.resolve_all(&es.targets)?,
            })),
            Lit::RptSet(rs) => {
                let mut reports = Vec::with_capacity(rs.reports.len());
                for report in &rs.reports {
                    reports.push(Report {
                        source: self.resolve(&report.source)?,
                        rel_time: report.rel_time,
                        items: self.resolve_all(&report.items)?,
                    });
                }
                Ok(Lit::RptSet(RptSet {
                    nonce: Box::new(self.resolve(&rs.nonce)?),
                    ref_time: rs.ref_time,
                    reports,
                }))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_all(&self, items: &[Ari]) -> Result<Vec<Ari>, AriError> {
        items.iter().map(|item| self.resolve(item)).collect()
    }

    fn resolve_ref(&self, r: &RefAri) -> Result<Ari, AriError> {
        let params = match &r.params {
            Some(items) => Some(self.resolve_all(items)?),
            None => None,
        };

        let Some(ns) = &r.ns else {
            // Path-local references carry no namespace to resolve.
            if self.must_resolve {
                return Err(AriError::new(ErrorCode::UnknownNamespace, 0));
            }
            return Ok(Ari::Ref(Box::new(RefAri {
                ns: None,
                obj_type: r.obj_type,
                obj: r.obj.clone(),
                params,
            })));
        };

        let Some(adm) = self.catalog.resolve_namespace(ns) else {
            if self.must_resolve {
                return Err(AriError::new(ErrorCode::UnknownNamespace, 0));
            }
            return Ok(pass_through(r, params));
        };
        let Some(obj) = adm.find_object(r.obj_type, &r.obj) else {
            if self.must_resolve {
                return Err(AriError::new(ErrorCode::UnknownObject, 0));
            }
            return Ok(pass_through(r, params));
        };

        let params = check_signature(obj, params)?;
        Ok(Ari::Ref(Box::new(RefAri {
            ns: Some(IdSeg::Both(adm.moniker(), adm.ns_enum())),
            obj_type: r.obj_type,
            obj: IdSeg::Both(obj.norm_name.clone(), obj.obj_enum),
            params,
        })))
    }
}

/// Keep an unresolvable reference as-is; both wire forms can carry either
/// identity side.
fn pass_through(r: &RefAri, params: Option<Vec<Ari>>) -> Ari {
    Ari::Ref(Box::new(RefAri {
        ns: r.ns.clone(),
        obj_type: r.obj_type,
        obj: r.obj.clone(),
        params,
    }))
}

/// Check arity and parameter types against a signature; substitute declared
/// defaults for absent trailing parameters.
fn check_signature(
    obj: &ObjDescr,
    params: Option<Vec<Ari>>,
) -> Result<Option<Vec<Ari>>, AriError> {
    let sig = &obj.params;
    let Some(mut given) = params else {
        // No parameter list at all: fine for empty signatures, otherwise
        // every declared parameter must have a default.
        if sig.is_empty() {
            return Ok(None);
        }
        if sig.iter().all(|p| p.default.is_some()) {
            let filled = sig
                .iter()
                .map(|p| p.default.clone().unwrap_or(Ari::Undefined))
                .collect();
            return Ok(Some(filled));
        }
        return Err(AriError::new(ErrorCode::ArityMismatch, 0));
    };

    if given.len() > sig.len() {
        return Err(AriError::new(ErrorCode::ArityMismatch, 0));
    }
    if given.len() < sig.len() {
        for spec in &sig[given.len()..] {
            match &spec.default {
                Some(default) => given.push(default.clone()),
                None => return Err(AriError::new(ErrorCode::ArityMismatch, 0)),
            }
        }
    }

    for (value, spec) in given.iter().zip(sig) {
        check_param_type(value, spec.ty)?;
    }
    Ok(Some(given))
}

/// A literal parameter must match a declared literal type exactly; references
/// and undefined values are accepted for any declaration, since their
/// produced type is not known here.
fn check_param_type(value: &Ari, declared: AmmType) -> Result<(), AriError> {
    match (value, declared) {
        (_, AmmType::Any | AmmType::Obj(_)) => Ok(()),
        (Ari::Undefined | Ari::Ref(_), AmmType::Lit(_)) => Ok(()),
        (Ari::Lit(lit), AmmType::Lit(ty)) => {
            if lit.lit_type() == ty {
                Ok(())
            } else {
                Err(AriError::new(ErrorCode::ParamTypeMismatch, 0))
            }
        }
    }
}

/// Resolve the catalog adm/object pair for a reference, for callers that
/// need the descriptor rather than a rewritten AST.
#[must_use]
pub fn lookup<'a>(catalog: &'a AdmCatalog, r: &RefAri) -> Option<(&'a Adm, &'a ObjDescr)> {
    let ns = r.ns.as_ref()?;
    let adm = catalog.resolve_namespace(ns)?;
    let obj = adm.find_object(r.obj_type, &r.obj)?;
    Some((adm, obj))
}

#[cfg(test)]
mod tests {
    use super::Resolver;
    use crate::ari::{Ari, IdSeg, RefAri};
    use crate::catalog::{Adm, AdmCatalog, ObjDescr, ParamSpec};
    use crate::error::{ErrorCode, ErrorKind};
    use crate::types::{AmmType, LitType, ObjType};

    fn catalog() -> AdmCatalog {
        let mut adm = Adm::new("ion_admin", 5).with_org("IANA");
        adm.add_object(
            ObjType::Ctrl,
            ObjDescr::new("node_contact_add", 6).with_params(vec![
                ParamSpec::new("start", AmmType::Lit(LitType::Uvast)),
                ParamSpec::new("stop", AmmType::Lit(LitType::Uvast)),
            ]),
        )
        .unwrap();
        let mut cat = AdmCatalog::new();
        cat.add_adm(adm).unwrap();
        cat
    }

    fn reference(params: Option<Vec<Ari>>) -> Ari {
        Ari::Ref(Box::new(RefAri {
            ns: Some(IdSeg::Name("IANA:ion_admin".into())),
            obj_type: ObjType::Ctrl,
            obj: IdSeg::Name("node_contact_add".into()),
            params,
        }))
    }

    #[test]
    fn fills_both_identity_sides() {
        let cat = catalog();
        let resolver = Resolver::new(&cat, true);
        let out = resolver
            .resolve(&reference(Some(vec![Ari::uvast(1), Ari::uvast(2)])))
            .unwrap();
        let Ari::Ref(r) = out else { panic!("not a reference") };
        assert_eq!(r.ns, Some(IdSeg::Both("IANA:ion_admin".into(), 5)));
        assert_eq!(r.obj, IdSeg::Both("node_contact_add".into(), 6));
        assert!(r.is_resolved());
    }

    #[test]
    fn arity_mismatch_is_a_signature_error() {
        let cat = catalog();
        let resolver = Resolver::new(&cat, true);
        let err = resolver
            .resolve(&reference(Some(vec![Ari::uvast(1)])))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ArityMismatch);
        assert_eq!(err.kind(), ErrorKind::Signature);
    }

    #[test]
    fn param_type_mismatch_is_a_type_error() {
        let cat = catalog();
        let resolver = Resolver::new(&cat, true);
        let err = resolver
            .resolve(&reference(Some(vec![Ari::uvast(1), Ari::uint(2)])))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ParamTypeMismatch);
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn unknown_namespace_soft_and_hard() {
        let cat = catalog();
        let unknown = Ari::Ref(Box::new(RefAri {
            ns: Some(IdSeg::Name("nowhere".into())),
            obj_type: ObjType::Ctrl,
            obj: IdSeg::Name("x".into()),
            params: None,
        }));

        let lenient = Resolver::new(&cat, false);
        assert_eq!(lenient.resolve(&unknown).unwrap(), unknown);

        let strict = Resolver::new(&cat, true);
        let err = strict.resolve(&unknown).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownNamespace);
        assert_eq!(err.kind(), ErrorKind::Resolution);
    }
}
