use crate::statics;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, de};

/// Represents a number that can preserve distinction between I64, U64, and F64 for round-tripping.
/// The runtime reads some flags as integers and others as floats, so the shape must survive a save.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNumber {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl ConfigNumber {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigNumber::I64(v) => Some(*v),
            ConfigNumber::U64(v) => i64::try_from(*v).ok(),
            ConfigNumber::F64(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            ConfigNumber::I64(v) => *v as f64,
            ConfigNumber::U64(v) => *v as f64,
            ConfigNumber::F64(v) => *v,
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, ConfigNumber::F64(_))
    }

    fn write(&self, out: &mut String) {
        match self {
            ConfigNumber::I64(v) => out.push_str(&v.to_string()),
            ConfigNumber::U64(v) => out.push_str(&v.to_string()),
            ConfigNumber::F64(v) => {
                if v.is_nan() {
                    out.push_str("NaN");
                } else if v.is_infinite() {
                    if v.is_sign_negative() {
                        out.push_str("-Infinity");
                    } else {
                        out.push_str("Infinity");
                    }
                } else {
                    let mut buf = ryu::Buffer::new();
                    out.push_str(buf.format(*v));
                }
            }
        }
    }
}

/// Text conventions of a document on disk, reused when it is regenerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub newline: &'static str,
    pub indent: String,
    pub trailing_newline: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            newline: statics::NL_LF,
            indent: statics::DEFAULT_INDENT.to_string(),
            trailing_newline: false,
        }
    }
}

/// A value of the configuration document (JSON, parsed leniently as JSON5).
/// Objects keep insertion order so untouched keys are written back where they were.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(ConfigNumber),
    String(String),
    Array(Vec<ConfigValue>),
    Object(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn as_object(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<ConfigValue>> {
        match self {
            ConfigValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&ConfigNumber> {
        match self {
            ConfigValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_object().and_then(|m| m.get(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.as_object_mut().and_then(|m| m.get_mut(key))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Number(_) => "number",
            ConfigValue::String(_) => "string",
            ConfigValue::Array(_) => "array",
            ConfigValue::Object(_) => "object",
        }
    }

    pub fn int(v: i64) -> Self {
        ConfigValue::Number(ConfigNumber::I64(v))
    }

    pub fn float(v: f64) -> Self {
        ConfigValue::Number(ConfigNumber::F64(v))
    }

    pub fn parse(text: &str) -> anyhow::Result<ConfigValue> {
        Ok(json5::from_str::<ConfigValue>(text)?)
    }

    /// Serialize in the style configuration writers produce:
    /// - one member or element per line, indented by `layout.indent`
    /// - `"key": value` with a single space
    /// - empty arrays and objects stay on one line (`[]`, `{}`)
    pub fn to_pretty(&self, layout: &Layout) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0, layout);
        if layout.trailing_newline {
            out.push_str(layout.newline);
        }
        out
    }

    pub fn to_compact(&self) -> String {
        let mut out = String::new();
        self.write_compact(&mut out);
        out
    }

    fn write_pretty(&self, out: &mut String, depth: usize, layout: &Layout) {
        match self {
            ConfigValue::Array(values) => {
                out.push('[');
                if values.is_empty() {
                    out.push(']');
                    return;
                }
                out.push_str(layout.newline);
                for (i, v) in values.iter().enumerate() {
                    push_indent(out, &layout.indent, depth + 1);
                    v.write_pretty(out, depth + 1, layout);
                    if i + 1 != values.len() {
                        out.push(',');
                    }
                    out.push_str(layout.newline);
                }
                push_indent(out, &layout.indent, depth);
                out.push(']');
            }
            ConfigValue::Object(map) => {
                out.push('{');
                if map.is_empty() {
                    out.push('}');
                    return;
                }
                out.push_str(layout.newline);
                for (i, (k, v)) in map.iter().enumerate() {
                    push_indent(out, &layout.indent, depth + 1);
                    write_escaped_string(out, k);
                    out.push_str(": ");
                    v.write_pretty(out, depth + 1, layout);
                    if i + 1 != map.len() {
                        out.push(',');
                    }
                    out.push_str(layout.newline);
                }
                push_indent(out, &layout.indent, depth);
                out.push('}');
            }
            scalar => scalar.write_compact(out),
        }
    }

    fn write_compact(&self, out: &mut String) {
        match self {
            ConfigValue::Null => out.push_str("null"),
            ConfigValue::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
            ConfigValue::Number(n) => n.write(out),
            ConfigValue::String(s) => write_escaped_string(out, s),
            ConfigValue::Array(values) => {
                out.push('[');
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    v.write_compact(out);
                }
                out.push(']');
            }
            ConfigValue::Object(map) => {
                out.push('{');
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_escaped_string(out, k);
                    out.push_str(": ");
                    v.write_compact(out);
                }
                out.push('}');
            }
        }
    }
}

fn push_indent(out: &mut String, unit: &str, depth: usize) {
    for _ in 0..depth {
        out.push_str(unit);
    }
}

fn write_escaped_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write as _;
                write!(out, "\\u{:04x}", c as u32).ok();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = ConfigValue;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a JSON value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ConfigValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ConfigValue::Null)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(ConfigValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(ConfigValue::Number(ConfigNumber::I64(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                // Keep small positives signed so edits and re-encodes agree on the variant.
                Ok(ConfigValue::Number(match i64::try_from(v) {
                    Ok(v) => ConfigNumber::I64(v),
                    Err(_) => ConfigNumber::U64(v),
                }))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(ConfigValue::Number(ConfigNumber::F64(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(ConfigValue::String(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(ConfigValue::String(v))
            }

            fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element::<ConfigValue>()? {
                    values.push(value);
                }
                Ok(ConfigValue::Array(values))
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut values = IndexMap::new();
                while let Some((key, value)) = map.next_entry::<String, ConfigValue>()? {
                    values.insert(key, value);
                }
                Ok(ConfigValue::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}
