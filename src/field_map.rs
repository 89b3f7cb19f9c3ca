//! Declarative field maps.
//!
//! The admin API is inconsistent about key casing: the same endpoint family
//! emits `productName` from one controller and `ProductName` from another,
//! and some pages use short names (`id`, `name`) for the same logical field.
//! A [`FieldMap`] lists every canonical field once, with the aliases to try
//! in priority order and the default to use when none of them is present.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a canonical field holds, which decides its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Numeric id or foreign key. Defaults to `null`.
    Reference,
    /// Free text. Defaults to `""`.
    Text,
    /// Boolean flag. Defaults to `false`.
    Flag,
    /// ISO-8601 timestamp. Defaults to `null`.
    Timestamp,
    /// Anything else (amounts, nested objects). Defaults to `null`.
    Value,
}

impl FieldKind {
    pub fn default_value(self) -> Value {
        match self {
            FieldKind::Text => Value::String(String::new()),
            FieldKind::Flag => Value::Bool(false),
            FieldKind::Reference | FieldKind::Timestamp | FieldKind::Value => Value::Null,
        }
    }
}

/// One canonical field and the server keys it can arrive under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    canonical: String,
    kind: FieldKind,
    aliases: Vec<String>,
    write_key: Option<String>,
}

impl FieldSpec {
    fn new(canonical: &str, kind: FieldKind) -> Self {
        Self {
            canonical: canonical.to_string(),
            kind,
            aliases: casing_variants(canonical),
            write_key: None,
        }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Server keys in the order they are tried. The canonical name is always
    /// first, which keeps normalization stable under re-application.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Key used when sending this field back to the server.
    pub fn write_key(&self) -> &str {
        self.write_key.as_deref().unwrap_or(&self.canonical)
    }

    fn push_alias(&mut self, key: &str) {
        if !self.aliases.iter().any(|a| a == key) {
            self.aliases.push(key.to_string());
        }
    }

    /// First alias holding a non-null value wins.
    fn resolve<'a>(&self, raw: &'a Map<String, Value>) -> Option<&'a Value> {
        self.aliases
            .iter()
            .filter_map(|key| raw.get(key))
            .find(|v| !v.is_null())
    }
}

/// `productName` -> `ProductName`.
pub fn pascal_case(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `ProductName` -> `productName`.
pub fn camel_case(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn casing_variants(canonical: &str) -> Vec<String> {
    let mut out = vec![canonical.to_string()];
    for variant in [camel_case(canonical), pascal_case(canonical)] {
        if !out.contains(&variant) {
            out.push(variant);
        }
    }
    out
}

/// Ordered set of canonical fields for one resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: Vec<FieldSpec>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(server_key, canonical_key)` pairs, kept in priority
    /// order. Fields created this way are [`FieldKind::Value`]; use
    /// [`FieldMap::with_kind`] to give them a typed default.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        pairs
            .iter()
            .fold(Self::new(), |map, (server, canonical)| map.alias(canonical, server))
    }

    /// Add a canonical field, or change the kind of an existing one.
    pub fn field(mut self, canonical: &str, kind: FieldKind) -> Self {
        match self.spec_mut(canonical) {
            Some(spec) => spec.kind = kind,
            None => self.fields.push(FieldSpec::new(canonical, kind)),
        }
        self
    }

    pub fn reference(self, canonical: &str) -> Self {
        self.field(canonical, FieldKind::Reference)
    }

    pub fn text(self, canonical: &str) -> Self {
        self.field(canonical, FieldKind::Text)
    }

    pub fn flag(self, canonical: &str) -> Self {
        self.field(canonical, FieldKind::Flag)
    }

    pub fn timestamp(self, canonical: &str) -> Self {
        self.field(canonical, FieldKind::Timestamp)
    }

    pub fn value(self, canonical: &str) -> Self {
        self.field(canonical, FieldKind::Value)
    }

    pub fn with_kind(self, canonical: &str, kind: FieldKind) -> Self {
        self.field(canonical, kind)
    }

    /// Accept `server_key` as a lower-priority spelling of `canonical`.
    pub fn alias(mut self, canonical: &str, server_key: &str) -> Self {
        if self.spec_mut(canonical).is_none() {
            self.fields.push(FieldSpec::new(canonical, FieldKind::Value));
        }
        if let Some(spec) = self.spec_mut(canonical) {
            spec.push_alias(server_key);
        }
        self
    }

    /// Send `canonical` back to the server as `server_key`.
    pub fn write_as(mut self, canonical: &str, server_key: &str) -> Self {
        if let Some(spec) = self.spec_mut(canonical) {
            spec.write_key = Some(server_key.to_string());
        }
        self
    }

    /// Send every field back in PascalCase (the .NET controllers bind either,
    /// but the product and store pages always posted PascalCase).
    pub fn pascal_writes(mut self) -> Self {
        for spec in &mut self.fields {
            spec.write_key = Some(pascal_case(&spec.canonical));
        }
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, canonical: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.canonical == canonical)
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.get(canonical).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn spec_mut(&mut self, canonical: &str) -> Option<&mut FieldSpec> {
        self.fields.iter_mut().find(|f| f.canonical == canonical)
    }

    /// Map a raw server record onto the canonical shape.
    ///
    /// Total: every canonical field is present in the output, either with
    /// the first non-null alias value or with its kind's default. Keys the
    /// map does not know are dropped.
    pub fn normalize(&self, raw: &Map<String, Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|spec| {
                let value = spec
                    .resolve(raw)
                    .cloned()
                    .unwrap_or_else(|| spec.kind.default_value());
                (spec.canonical.clone(), value)
            })
            .collect()
    }

    /// Map a canonical payload onto server key names for a write request.
    /// Keys the map does not know are passed through untouched.
    pub fn denormalize(&self, payload: &Map<String, Value>) -> Map<String, Value> {
        let mut out: Map<String, Value> = payload
            .iter()
            .filter(|(key, _)| !self.contains(key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for spec in &self.fields {
            if let Some(value) = payload.get(&spec.canonical) {
                out.insert(spec.write_key().to_string(), value.clone());
            }
        }
        out
    }
}
