//! Route declarations and the compiled route table.
//!
//! # Responsibilities
//! - Carry a worker's route declarations (template -> methods)
//! - Validate and compile them into an immutable `RouteTable`
//! - Detect conflicting templates at registration time
//!
//! # Design Decisions
//! - Built once per worker, read-only afterwards (shared via Arc, no locks)
//! - Patterns are stored in precedence order: fewer parameter segments
//!   first, registration order otherwise
//! - The first invalid declaration aborts registration

use serde_json::Value;

use crate::routing::error::{DeclarationError, RegistrationError};
use crate::routing::pattern::RoutePattern;

/// Ordered route declarations returned from a worker's init hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDeclarations {
    entries: Vec<(String, Vec<String>)>,
}

impl RouteDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a template with its allowed methods.
    pub fn route<I, S>(mut self, template: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(template, methods);
        self
    }

    pub fn push<I, S>(&mut self, template: impl Into<String>, methods: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push((template.into(), methods.into_iter().map(Into::into).collect()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(template, methods)| (template.as_str(), methods.as_slice()))
    }
}

/// Reads declarations from loosely typed data.
///
/// Accepts an object (`{"/ping": ["GET"]}`), a list of `[path, methods]`
/// pairs, or `null` for "no routes".
impl TryFrom<&Value> for RouteDeclarations {
    type Error = DeclarationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let mut declarations = RouteDeclarations::new();
        match value {
            Value::Null => {}
            Value::Object(map) => {
                for (template, methods) in map {
                    declarations.push(template.clone(), method_names(template, methods)?);
                }
            }
            Value::Array(pairs) => {
                for (index, pair) in pairs.iter().enumerate() {
                    let (path, methods) = match pair.as_array().map(Vec::as_slice) {
                        Some([path, methods]) => (path, methods),
                        _ => return Err(DeclarationError::MalformedPair { index }),
                    };
                    let template = path.as_str().ok_or(DeclarationError::PathNotString {
                        index,
                        found: kind(path),
                    })?;
                    declarations.push(template, method_names(template, methods)?);
                }
            }
            other => return Err(DeclarationError::NotAMapping { found: kind(other) }),
        }
        Ok(declarations)
    }
}

fn method_names(template: &str, methods: &Value) -> Result<Vec<String>, DeclarationError> {
    let list = methods.as_array().ok_or_else(|| DeclarationError::MethodsNotAList {
        template: template.to_string(),
        found: kind(methods),
    })?;

    list.iter()
        .map(|m| {
            m.as_str()
                .map(str::to_string)
                .ok_or_else(|| DeclarationError::MethodNotString {
                    template: template.to_string(),
                    found: kind(m),
                })
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// Immutable set of compiled route patterns.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    /// Sorted by precedence.
    patterns: Vec<RoutePattern>,
}

impl RouteTable {
    /// Compile declarations into a table.
    pub fn register(declarations: &RouteDeclarations) -> Result<Self, RegistrationError> {
        let mut patterns: Vec<RoutePattern> = Vec::with_capacity(declarations.len());

        for (template, methods) in declarations.iter() {
            let pattern = RoutePattern::parse(template, methods)?;
            if let Some(existing) = patterns.iter().find(|p| p.same_shape(&pattern)) {
                return Err(RegistrationError::Conflict {
                    template: template.to_string(),
                    existing: existing.template().to_string(),
                });
            }
            patterns.push(pattern);
        }

        // Stable: registration order survives within equal parameter counts.
        patterns.sort_by_key(RoutePattern::param_count);

        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns in match precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &RoutePattern> {
        self.patterns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_example_routes() {
        let declarations = RouteDeclarations::new()
            .route("/", ["GET"])
            .route("/ping", ["GET"])
            .route("/hello/:target", ["GET"]);

        let table = RouteTable::register(&declarations).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_precedence_order() {
        let declarations = RouteDeclarations::new()
            .route("/:a/:b", ["GET"])
            .route("/hello/:target", ["GET"])
            .route("/:x/world", ["GET"])
            .route("/hello/world", ["GET"]);

        let table = RouteTable::register(&declarations).unwrap();
        let order: Vec<&str> = table.iter().map(RoutePattern::template).collect();
        assert_eq!(
            order,
            vec!["/hello/world", "/hello/:target", "/:x/world", "/:a/:b"]
        );
    }

    #[test]
    fn test_conflicting_shapes_rejected() {
        let declarations = RouteDeclarations::new()
            .route("/hello/:target", ["GET"])
            .route("/hello/:name", ["POST"]);

        let err = RouteTable::register(&declarations).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::Conflict {
                template: "/hello/:name".into(),
                existing: "/hello/:target".into(),
            }
        );
    }

    #[test]
    fn test_trailing_slash_is_same_shape() {
        let declarations = RouteDeclarations::new()
            .route("/ping", ["GET"])
            .route("/ping/", ["GET"]);
        assert!(matches!(
            RouteTable::register(&declarations),
            Err(RegistrationError::Conflict { .. })
        ));
    }

    #[test]
    fn test_empty_methods_rejected() {
        let declarations = RouteDeclarations::new().route("/ping", Vec::<String>::new());
        assert!(matches!(
            RouteTable::register(&declarations),
            Err(RegistrationError::EmptyMethods { .. })
        ));
    }

    #[test]
    fn test_declarations_from_json_object_keep_order() {
        let value = json!({
            "/": ["GET"],
            "/ping": ["GET", "HEAD"],
            "/hello/:target": ["GET"]
        });
        let declarations = RouteDeclarations::try_from(&value).unwrap();
        let templates: Vec<&str> = declarations.iter().map(|(t, _)| t).collect();
        assert_eq!(templates, vec!["/", "/ping", "/hello/:target"]);
    }

    #[test]
    fn test_declarations_from_json_rejects_bad_shapes() {
        assert_eq!(
            RouteDeclarations::try_from(&json!([[42, ["GET"]]])),
            Err(DeclarationError::PathNotString { index: 0, found: "number" })
        );
        assert_eq!(
            RouteDeclarations::try_from(&json!({"/ping": "GET"})),
            Err(DeclarationError::MethodsNotAList {
                template: "/ping".into(),
                found: "string"
            })
        );
        assert_eq!(
            RouteDeclarations::try_from(&json!({"/ping": [1]})),
            Err(DeclarationError::MethodNotString {
                template: "/ping".into(),
                found: "number"
            })
        );
        assert_eq!(
            RouteDeclarations::try_from(&json!("routes")),
            Err(DeclarationError::NotAMapping { found: "string" })
        );
        assert_eq!(
            RouteDeclarations::try_from(&json!([["/ping"]])),
            Err(DeclarationError::MalformedPair { index: 0 })
        );
        assert!(RouteDeclarations::try_from(&Value::Null).unwrap().is_empty());
    }
}
