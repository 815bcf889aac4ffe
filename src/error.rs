use crate::resolve::FlagKind;

/// Structural problems found while loading a document.
/// Every variant is fatal to the load; no partial document is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error("document root must be an object, found {0}")]
    RootNotObject(&'static str),

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("`{field}` must be {expected}, found {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("`{field}` of `{action}` has {found} entries, expected {expected}")]
    ArityMismatch {
        action: String,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("`{action}` names {found} parameters; vector actions take 2 or 3")]
    UnsupportedArity { action: String, found: usize },

    #[error("`{action}` of type `{kind}` must name a single parameter")]
    ShapeMismatch { action: String, kind: String },

    #[error("parameter `{0}` collides with a reserved toggle name")]
    ReservedName(String),

    #[error("parameter `{0}` is named by more than one action")]
    DuplicateName(String),
}

/// Reasons an edit was not written into the document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("no parameter named `{0}`")]
    SlotNotFound(String),

    #[error("`{name}` has no {flag} flag")]
    NotApplicable { name: String, flag: FlagKind },

    #[error("{flag} of `{name}` cannot take that value")]
    ValueMismatch { name: String, flag: FlagKind },

    #[error("{value} is reserved for derived components and cannot be entered for `{name}`")]
    ReservedSentinel { name: String, value: f64 },

    #[error("`{0}` is derived from its paired axis and cannot be set directly")]
    DerivedComponent(String),
}
