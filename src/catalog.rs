//! The ADM catalog: namespaces, their object tables, and parameter
//! signatures.
//!
//! A catalog is loaded once, then treated as read-only; codec invocations may
//! share one catalog handle across threads.

use std::collections::BTreeMap;

use crate::ari::{Ari, IdSeg};
use crate::error::{AriError, ErrorCode};
use crate::types::{AmmType, ObjType};

/// One declared parameter of an ADM object.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub ty: AmmType,
    /// Default substituted when the parameter is absent.
    pub default: Option<Ari>,
}

impl ParamSpec {
    /// A parameter with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: AmmType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }
}

/// One object within a namespace's object-type table.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjDescr {
    /// Normalized (lower-case) object name.
    pub norm_name: String,
    /// Enumerator within the `(namespace, object-type)` table.
    pub obj_enum: i64,
    /// Ordered parameter signature; empty for unparameterized objects.
    pub params: Vec<ParamSpec>,
    /// Declared type of the produced value, if the object has one.
    pub value_type: Option<AmmType>,
}

impl ObjDescr {
    /// An object with an empty signature.
    #[must_use]
    pub fn new(name: &str, obj_enum: i64) -> Self {
        Self {
            norm_name: name.to_ascii_lowercase(),
            obj_enum,
            params: Vec::new(),
            value_type: None,
        }
    }

    /// Attach a parameter signature.
    #[must_use]
    pub fn with_params(mut self, params: Vec<ParamSpec>) -> Self {
        self.params = params;
        self
    }
}

/// One Application Data Model: a namespace and its object tables.
#[derive(Debug, Clone)]
pub struct Adm {
    norm_name: String,
    org: Option<String>,
    ns_enum: i64,
    version: Option<String>,
    objects: [Vec<ObjDescr>; ObjType::COUNT],
}

impl Adm {
    /// A namespace with empty object tables.
    #[must_use]
    pub fn new(name: &str, ns_enum: i64) -> Self {
        Self {
            norm_name: name.to_ascii_lowercase(),
            org: None,
            ns_enum,
            version: None,
            objects: Default::default(),
        }
    }

    /// Set the organization moniker (the `ORG` of `ORG:module`).
    #[must_use]
    pub fn with_org(mut self, org: &str) -> Self {
        self.org = Some(org.to_string());
        self
    }

    /// Set the declared ADM version.
    #[must_use]
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Normalized namespace name (without the organization part).
    #[must_use]
    pub fn norm_name(&self) -> &str {
        &self.norm_name
    }

    /// Organization moniker, if declared.
    #[must_use]
    pub fn org(&self) -> Option<&str> {
        self.org.as_deref()
    }

    /// Namespace enumerator.
    #[must_use]
    pub const fn ns_enum(&self) -> i64 {
        self.ns_enum
    }

    /// Declared version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The namespace moniker used in canonical text: `ORG:name` or `name`.
    #[must_use]
    pub fn moniker(&self) -> String {
        match &self.org {
            Some(org) => format!("{org}:{}", self.norm_name),
            None => self.norm_name.clone(),
        }
    }

    /// Install one object into its object-type table.
    ///
    /// # Errors
    ///
    /// Returns `ObjectCollision` when the name or enumerator is already
    /// present in that table.
    pub fn add_object(&mut self, ty: ObjType, obj: ObjDescr) -> Result<(), AriError> {
        let table = &mut self.objects[ty as usize];
        if table
            .iter()
            .any(|o| o.norm_name == obj.norm_name || o.obj_enum == obj.obj_enum)
        {
            return Err(AriError::new(ErrorCode::ObjectCollision, 0));
        }
        table.push(obj);
        Ok(())
    }

    /// All objects of one type.
    #[must_use]
    pub fn objects_of(&self, ty: ObjType) -> &[ObjDescr] {
        &self.objects[ty as usize]
    }

    /// Find an object by symbolic name (case-insensitive) or enumerator.
    #[must_use]
    pub fn find_object(&self, ty: ObjType, id: &IdSeg) -> Option<&ObjDescr> {
        let table = &self.objects[ty as usize];
        match id {
            IdSeg::Name(name) => table
                .iter()
                .find(|o| o.norm_name.eq_ignore_ascii_case(name)),
            IdSeg::Num(num) => table.iter().find(|o| o.obj_enum == *num),
            IdSeg::Both(_, num) => table.iter().find(|o| o.obj_enum == *num),
        }
    }
}

/// An immutable set of installed ADMs with name and enumerator indexes.
#[derive(Debug, Default)]
pub struct AdmCatalog {
    adms: Vec<Adm>,
    by_name: BTreeMap<String, usize>,
    by_enum: BTreeMap<i64, usize>,
}

impl AdmCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of installed namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adms.len()
    }

    /// Returns `true` when no namespaces are installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adms.is_empty()
    }

    /// Install a namespace.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceCollision` when the moniker or enumerator is already
    /// installed.
    pub fn add_adm(&mut self, adm: Adm) -> Result<(), AriError> {
        if self.by_name.contains_key(adm.norm_name()) || self.by_enum.contains_key(&adm.ns_enum()) {
            return Err(AriError::new(ErrorCode::NamespaceCollision, 0));
        }
        let idx = self.adms.len();
        self.by_name.insert(adm.norm_name().to_string(), idx);
        self.by_enum.insert(adm.ns_enum(), idx);
        self.adms.push(adm);
        Ok(())
    }

    /// Resolve a namespace by moniker.
    ///
    /// Accepts both the bare module name and the `ORG:module` form; matching
    /// is ASCII case-insensitive on the module part.
    #[must_use]
    pub fn by_name(&self, moniker: &str) -> Option<&Adm> {
        let module = moniker.rsplit(':').next().unwrap_or(moniker);
        self.by_name
            .get(&module.to_ascii_lowercase())
            .map(|&idx| &self.adms[idx])
    }

    /// Resolve a namespace by enumerator.
    #[must_use]
    pub fn by_enum(&self, ns_enum: i64) -> Option<&Adm> {
        self.by_enum.get(&ns_enum).map(|&idx| &self.adms[idx])
    }

    /// Resolve a namespace by either identity form.
    #[must_use]
    pub fn resolve_namespace(&self, id: &IdSeg) -> Option<&Adm> {
        match id {
            IdSeg::Name(name) => self.by_name(name),
            IdSeg::Num(num) | IdSeg::Both(_, num) => self.by_enum(*num),
        }
    }

    /// Resolve an object within a namespace.
    #[must_use]
    pub fn resolve_object<'a>(&self, adm: &'a Adm, ty: ObjType, id: &IdSeg) -> Option<&'a ObjDescr> {
        adm.find_object(ty, id)
    }

    /// The declared parameter signature of an object.
    #[must_use]
    pub fn signature_of<'a>(&self, obj: &'a ObjDescr) -> &'a [ParamSpec] {
        &obj.params
    }

    /// Iterate over the installed namespaces.
    pub fn iter(&self) -> impl Iterator<Item = &Adm> {
        self.adms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Adm, AdmCatalog, ObjDescr};
    use crate::ari::IdSeg;
    use crate::error::ErrorCode;
    use crate::types::ObjType;

    fn sample() -> AdmCatalog {
        let mut adm = Adm::new("ion_admin", 5).with_org("IANA");
        adm.add_object(ObjType::Ctrl, ObjDescr::new("node_contact_add", 6))
            .unwrap();
        let mut cat = AdmCatalog::new();
        cat.add_adm(adm).unwrap();
        cat
    }

    #[test]
    fn lookup_by_both_identities() {
        let cat = sample();
        let adm = cat.by_name("IANA:ion_admin").unwrap();
        assert_eq!(adm.ns_enum(), 5);
        assert_eq!(cat.by_name("ION_ADMIN").unwrap().ns_enum(), 5);
        assert_eq!(cat.by_enum(5).unwrap().norm_name(), "ion_admin");
        assert!(cat.by_enum(6).is_none());
    }

    #[test]
    fn object_lookup_by_name_and_enum() {
        let cat = sample();
        let adm = cat.by_enum(5).unwrap();
        let by_name = adm
            .find_object(ObjType::Ctrl, &IdSeg::Name("NODE_CONTACT_ADD".into()))
            .unwrap();
        assert_eq!(by_name.obj_enum, 6);
        assert!(adm
            .find_object(ObjType::Ctrl, &IdSeg::Num(6))
            .is_some());
        assert!(adm.find_object(ObjType::Edd, &IdSeg::Num(6)).is_none());
    }

    #[test]
    fn collisions_are_rejected() {
        let mut cat = sample();
        let err = cat.add_adm(Adm::new("ion_admin", 9)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NamespaceCollision);
        let err = cat.add_adm(Adm::new("other", 5)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NamespaceCollision);

        let mut adm = Adm::new("x", 1);
        adm.add_object(ObjType::Edd, ObjDescr::new("a", 0)).unwrap();
        let err = adm
            .add_object(ObjType::Edd, ObjDescr::new("A", 1))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ObjectCollision);
    }
}
