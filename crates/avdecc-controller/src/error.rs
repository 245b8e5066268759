use thiserror::Error;

/// Errors surfaced by the controlled-entity read surface.
///
/// A fatal enumeration error is deliberately *not* an error kind here:
/// it is reflected through
/// [`ControlledEntity::got_fatal_enumeration_error`](crate::ControlledEntity::got_fatal_enumeration_error)
/// and keeps the entity un-advertised, which makes the model read as
/// absent ([`NotSupported`](Self::NotSupported)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntityError {
    /// The entity does not advertise AEM support, so it has no
    /// descriptor tree to read.
    #[error("entity model not supported by the entity")]
    NotSupported,

    /// No configuration with that index exists in the tree.
    #[error("invalid configuration index")]
    InvalidConfigurationIndex,

    /// No descriptor with that index exists in the configuration.
    #[error("invalid descriptor index")]
    InvalidDescriptorIndex,

    /// The entity declares no locale to resolve strings against.
    #[error("entity has no locale")]
    InvalidLocaleName,

    /// Internal consistency failure; indicates a bug, not a protocol
    /// condition.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

/// Errors raised while producing the JSON dump of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    /// The entity advertises AEM but its tree was never built, so there
    /// is nothing faithful to dump.
    #[error("entity has no model to serialize")]
    NotSupported,

    /// The dump references a descriptor absent from the tree.
    #[error("dump references an invalid descriptor index")]
    InvalidDescriptorIndex,

    #[error("serialization failed: {0}")]
    Internal(String),
}

/// Errors raised while loading an entity back from a JSON dump.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeserializationError {
    /// The dump was produced by a format version this build does not
    /// understand.
    #[error("unsupported dump version {0}")]
    UnsupportedDumpVersion(u32),

    #[error("malformed dump: {0}")]
    Parse(String),

    /// The dump parsed but lacks data required to rebuild the entity.
    #[error("dump is missing required information: {0}")]
    MissingInformation(&'static str),
}
