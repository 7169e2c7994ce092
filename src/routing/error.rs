//! Registration and declaration error types.

use thiserror::Error;

/// A route declaration was rejected while building the route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Templates are absolute paths.
    #[error("route template {template:?} must start with '/'")]
    MissingLeadingSlash { template: String },

    /// A `:` segment without a name.
    #[error("route template {template:?} has an unnamed parameter segment")]
    EmptyParameterName { template: String },

    /// Catch-all segments are not part of the contract.
    #[error("route template {template:?} uses a wildcard segment, which is not supported")]
    WildcardSegment { template: String },

    /// Every route must allow at least one method.
    #[error("route {template:?} declares no methods")]
    EmptyMethods { template: String },

    /// Method name is not a valid HTTP token.
    #[error("route {template:?} declares invalid method {method:?}")]
    InvalidMethod { template: String, method: String },

    /// Two templates with the same segment structure.
    #[error("route {template:?} conflicts with previously registered route {existing:?}")]
    Conflict { template: String, existing: String },

    /// The worker's routes were already registered.
    #[error("routes were already registered for this worker")]
    AlreadyRegistered,
}

/// A dynamically shaped route declaration could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("route declaration must be a mapping of path to methods, found {found}")]
    NotAMapping { found: &'static str },

    #[error("route declaration entry {index} must be a [path, methods] pair")]
    MalformedPair { index: usize },

    #[error("route declaration entry {index} has a non-string path ({found})")]
    PathNotString { index: usize, found: &'static str },

    #[error("methods for route {template:?} must be a list, found {found}")]
    MethodsNotAList { template: String, found: &'static str },

    #[error("route {template:?} has a non-string method ({found})")]
    MethodNotString { template: String, found: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistrationError::Conflict {
            template: "/hello/:name".into(),
            existing: "/hello/:target".into(),
        };
        assert!(err.to_string().contains("/hello/:target"));

        let err = DeclarationError::PathNotString { index: 2, found: "number" };
        assert_eq!(
            err.to_string(),
            "route declaration entry 2 has a non-string path (number)"
        );
    }
}
