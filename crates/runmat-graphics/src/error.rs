use thiserror::Error;

/// Broad failure classes, used by front ends to decide how to surface an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Lookup,
    Structural,
    Callback,
    Toolkit,
    Usage,
}

#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("set: invalid value for {object} property \"{property}\" (value = {value}): {reason}")]
    InvalidValue {
        object: String,
        property: String,
        value: String,
        reason: String,
        candidates: Vec<String>,
    },
    #[error("{object}: unknown property \"{name}\"")]
    UnknownProperty { object: String, name: String },
    #[error("{object}: ambiguous property name \"{name}\"; possible matches: {}", .matches.join(", "))]
    AmbiguousProperty {
        object: String,
        name: String,
        matches: Vec<String>,
    },
    #[error("invalid graphics handle ({0})")]
    InvalidHandle(String),
    #[error("set: \"{property}\" is a read-only {object} property")]
    ReadOnly { object: String, property: String },
    #[error("{0}")]
    Structural(String),
    #[error("addproperty: a property named \"{name}\" already exists")]
    PropertyExists { name: String },
    #[error("invalid default property \"{0}\"")]
    InvalidDefault(String),
    #[error("error executing {callback} for handle {handle}: {message}")]
    Callback {
        handle: String,
        callback: String,
        message: String,
    },
    #[error("{toolkit} toolkit: {message}")]
    Toolkit { toolkit: String, message: String },
    #[error("{builtin}: {message}")]
    Usage {
        builtin: &'static str,
        message: String,
    },
    #[error("waitfor: interrupted")]
    Interrupted,
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

pub type GraphicsResult<T> = Result<T, GraphicsError>;

impl GraphicsError {
    pub fn structural(message: impl Into<String>) -> Self {
        GraphicsError::Structural(message.into())
    }

    pub fn usage(builtin: &'static str, message: impl Into<String>) -> Self {
        GraphicsError::Usage {
            builtin,
            message: message.into(),
        }
    }

    pub fn invalid_handle(value: f64) -> Self {
        GraphicsError::InvalidHandle(crate::value::format_short_g(value))
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            GraphicsError::InvalidValue { .. } | GraphicsError::InvalidDefault(_) => {
                ErrorClass::Validation
            }
            GraphicsError::UnknownProperty { .. }
            | GraphicsError::AmbiguousProperty { .. }
            | GraphicsError::InvalidHandle(_) => ErrorClass::Lookup,
            GraphicsError::ReadOnly { .. }
            | GraphicsError::Structural(_)
            | GraphicsError::PropertyExists { .. } => ErrorClass::Structural,
            GraphicsError::Callback { .. } => ErrorClass::Callback,
            GraphicsError::Toolkit { .. } | GraphicsError::Io { .. } => ErrorClass::Toolkit,
            GraphicsError::Usage { .. } | GraphicsError::Interrupted => ErrorClass::Usage,
        }
    }

    /// Stable identifier suitable for `MException`-style error ids.
    pub fn identifier(&self) -> &'static str {
        match self {
            GraphicsError::InvalidValue { .. } => "RunMat:GraphicsInvalidValue",
            GraphicsError::UnknownProperty { .. } => "RunMat:GraphicsUnknownProperty",
            GraphicsError::AmbiguousProperty { .. } => "RunMat:GraphicsAmbiguousProperty",
            GraphicsError::InvalidHandle(_) => "RunMat:GraphicsInvalidHandle",
            GraphicsError::ReadOnly { .. } => "RunMat:GraphicsReadOnlyProperty",
            GraphicsError::Structural(_) => "RunMat:GraphicsStructure",
            GraphicsError::PropertyExists { .. } => "RunMat:GraphicsPropertyExists",
            GraphicsError::InvalidDefault(_) => "RunMat:GraphicsInvalidDefault",
            GraphicsError::Callback { .. } => "RunMat:GraphicsCallback",
            GraphicsError::Toolkit { .. } => "RunMat:GraphicsToolkit",
            GraphicsError::Usage { .. } => "RunMat:GraphicsUsage",
            GraphicsError::Interrupted => "RunMat:interrupt",
            GraphicsError::Io { .. } => "RunMat:GraphicsIo",
        }
    }

    /// Legal alternatives attached to enumerated-value and abbreviation errors.
    pub fn candidates(&self) -> &[String] {
        match self {
            GraphicsError::InvalidValue { candidates, .. } => candidates,
            GraphicsError::AmbiguousProperty { matches, .. } => matches,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_lists_matches() {
        let err = GraphicsError::AmbiguousProperty {
            object: "axes".into(),
            name: "x".into(),
            matches: vec!["xlim".into(), "xtick".into()],
        };
        assert_eq!(err.class(), ErrorClass::Lookup);
        assert!(err.to_string().contains("xlim, xtick"));
        assert_eq!(err.candidates().len(), 2);
    }

    #[test]
    fn identifiers_are_namespaced() {
        let err = GraphicsError::structural("delete: cannot delete root object");
        assert_eq!(err.identifier(), "RunMat:GraphicsStructure");
        assert_eq!(err.class(), ErrorClass::Structural);
    }
}
