//! Output schemas for structured analysis.
//!
//! One `OutputSchema` serves both ends of a structured call: `describe()`
//! renders the literal shape embedded in the instruction, and `validate()`
//! checks the parsed model output against that same shape.

use std::fmt::Write as _;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// The shape of a single value.
///
/// Deserializes from `{"type": "string"}`, `{"type": "number", "min": 0, "max": 100}`,
/// `{"type": "array", "items": {...}}`, `{"type": "object", "fields": [...]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaNode {
    String,
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Boolean,
    Array {
        items: Box<SchemaNode>,
    },
    Object {
        fields: Vec<Field>,
    },
}

impl SchemaNode {
    pub fn bounded(min: f64, max: f64) -> Self {
        SchemaNode::Number {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn array_of(items: SchemaNode) -> Self {
        SchemaNode::Array {
            items: Box::new(items),
        }
    }

    pub fn object(fields: Vec<Field>) -> Self {
        SchemaNode::Object { fields }
    }

    pub fn strings() -> Self {
        Self::array_of(SchemaNode::String)
    }
}

/// A required, named member of an object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub node: SchemaNode,
}

impl Field {
    pub fn new(name: &str, node: SchemaNode) -> Self {
        Self {
            name: name.to_string(),
            node,
        }
    }
}

/// A JSON object schema. Every declared field is required and undeclared
/// fields are rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputSchema {
    pub fields: Vec<Field>,
}

/// The first place a value departs from its schema.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: {problem}")]
pub struct SchemaViolation {
    pub path: String,
    pub problem: String,
}

impl OutputSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Every field name at every nesting level, in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_names(&self.fields, &mut names);
        names
    }

    /// Renders the schema as a JSON-like template, e.g.
    ///
    /// ```text
    /// {
    ///   "score": number (0-100),
    ///   "keywords": {
    ///     "present": [string]
    ///   }
    /// }
    /// ```
    pub fn describe(&self) -> String {
        let mut out = String::new();
        write_object(&mut out, &self.fields, 0);
        out
    }

    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        match value {
            Value::Object(map) => validate_object(&self.fields, map, "$"),
            other => Err(violation("$", format!("expected object, found {}", kind_of(other)))),
        }
    }
}

fn collect_names<'a>(fields: &'a [Field], names: &mut Vec<&'a str>) {
    for field in fields {
        names.push(&field.name);
        collect_node_names(&field.node, names);
    }
}

fn collect_node_names<'a>(node: &'a SchemaNode, names: &mut Vec<&'a str>) {
    match node {
        SchemaNode::Object { fields } => collect_names(fields, names),
        SchemaNode::Array { items } => collect_node_names(items, names),
        _ => {}
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

fn indent(out: &mut String, level: usize) {
    out.push_str(&"  ".repeat(level));
}

fn write_object(out: &mut String, fields: &[Field], level: usize) {
    out.push_str("{\n");
    for (i, field) in fields.iter().enumerate() {
        indent(out, level + 1);
        let _ = write!(out, "\"{}\": ", field.name);
        write_node(out, &field.node, level + 1);
        if i + 1 < fields.len() {
            out.push(',');
        }
        out.push('\n');
    }
    indent(out, level);
    out.push('}');
}

fn write_node(out: &mut String, node: &SchemaNode, level: usize) {
    match node {
        SchemaNode::String => out.push_str("string"),
        SchemaNode::Boolean => out.push_str("boolean"),
        SchemaNode::Number { min, max } => {
            out.push_str("number");
            match (min, max) {
                (Some(min), Some(max)) => {
                    let _ = write!(out, " ({min}-{max})");
                }
                (Some(min), None) => {
                    let _ = write!(out, " (>= {min})");
                }
                (None, Some(max)) => {
                    let _ = write!(out, " (<= {max})");
                }
                (None, None) => {}
            }
        }
        SchemaNode::Array { items } => match items.as_ref() {
            SchemaNode::Object { fields } => {
                out.push_str("[\n");
                indent(out, level + 1);
                write_object(out, fields, level + 1);
                out.push('\n');
                indent(out, level);
                out.push(']');
            }
            scalar => {
                out.push('[');
                write_node(out, scalar, level);
                out.push(']');
            }
        },
        SchemaNode::Object { fields } => write_object(out, fields, level),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

fn violation(path: &str, problem: impl Into<String>) -> SchemaViolation {
    SchemaViolation {
        path: path.to_string(),
        problem: problem.into(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn validate_object(
    fields: &[Field],
    map: &Map<String, Value>,
    path: &str,
) -> Result<(), SchemaViolation> {
    for field in fields {
        let field_path = format!("{path}.{}", field.name);
        let value = map
            .get(&field.name)
            .ok_or_else(|| violation(&field_path, "missing required field"))?;
        validate_node(&field.node, value, &field_path)?;
    }

    if let Some(extra) = map
        .keys()
        .find(|key| !fields.iter().any(|field| &field.name == *key))
    {
        return Err(violation(&format!("{path}.{extra}"), "undeclared field"));
    }

    Ok(())
}

fn validate_node(node: &SchemaNode, value: &Value, path: &str) -> Result<(), SchemaViolation> {
    let mismatch = |expected: &str| {
        violation(path, format!("expected {expected}, found {}", kind_of(value)))
    };

    match node {
        SchemaNode::String => value.as_str().map(|_| ()).ok_or_else(|| mismatch("string")),
        SchemaNode::Boolean => value.as_bool().map(|_| ()).ok_or_else(|| mismatch("boolean")),
        SchemaNode::Number { min, max } => {
            let n = value.as_f64().ok_or_else(|| mismatch("number"))?;
            if min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max) {
                return Err(violation(path, format!("{n} is out of bounds")));
            }
            Ok(())
        }
        SchemaNode::Array { items } => {
            let elements = value.as_array().ok_or_else(|| mismatch("array"))?;
            for (i, element) in elements.iter().enumerate() {
                validate_node(items, element, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        SchemaNode::Object { fields } => {
            let map = value.as_object().ok_or_else(|| mismatch("object"))?;
            validate_object(fields, map, path)
        }
    }
}
