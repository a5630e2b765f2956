use std::fmt;

/// A namespaced resource name, written `namespace/name`.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ResourceId {
    pub namespace: String,
    pub name: String,
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid name {0:?}: expected 'namespace/name'")]
pub struct NameError(String);

// === impl ResourceId ===

impl ResourceId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parses a qualified `namespace/name`. Both parts must be non-empty.
    pub fn parse(qualified: &str) -> Result<Self, NameError> {
        match qualified.split_once('/') {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(ns, name))
            }
            _ => Err(NameError(qualified.to_string())),
        }
    }

    /// Parses `name`, qualifying it with `namespace` when it has no namespace of its own.
    pub fn parse_in(namespace: &str, name: &str) -> Result<Self, NameError> {
        if name.contains('/') {
            Self::parse(name)
        } else if name.is_empty() {
            Err(NameError(name.to_string()))
        } else {
            Ok(Self::new(namespace, name))
        }
    }

    pub fn of<T>(resource: &T) -> Self
    where
        T: kube::Resource,
    {
        use kube::ResourceExt;
        Self::new(resource.namespace().unwrap_or_default(), resource.name_any())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl std::str::FromStr for ResourceId {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
