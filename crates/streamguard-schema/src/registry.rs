use std::collections::{BTreeMap, HashMap};
use std::fs::{File, Metadata};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::catalog::BUILTIN;
use crate::config::RegistryConfig;
use crate::descriptor::SchemaDescriptor;
use crate::error::{Result, SchemaError};

const SCHEMA_SUFFIX: &str = ".schema.json";
const MAX_NAME_LEN: usize = 64;

/// Append-only mapping from payload family to an ordered list of schemas.
///
/// Schema names are unique across the registry, so a descriptor belongs to
/// exactly one family. The registry is read-only once built and can be
/// shared across threads.
pub struct SchemaRegistry {
    families: BTreeMap<String, Vec<Arc<SchemaDescriptor>>>,
    by_name: HashMap<String, Entry>,
    config: RegistryConfig,
}

struct Entry {
    family: String,
    descriptor: Arc<SchemaDescriptor>,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            families: BTreeMap::new(),
            by_name: HashMap::new(),
            config,
        }
    }

    /// Registry holding the built-in catalog.
    pub fn builtin() -> Result<Self> {
        Self::builtin_with_config(RegistryConfig::default())
    }

    /// Built-in catalog compiled with explicit config.
    pub fn builtin_with_config(config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);
        registry.extend_embedded(BUILTIN)?;
        Ok(registry)
    }

    /// Load from embedded `(family, name, schema)` triples.
    pub fn from_embedded(schemas: &[(&str, &str, &str)]) -> Result<Self> {
        let mut registry = Self::new();
        registry.extend_embedded(schemas)?;
        Ok(registry)
    }

    /// Register every embedded `(family, name, schema)` triple.
    pub fn extend_embedded(&mut self, schemas: &[(&str, &str, &str)]) -> Result<()> {
        for (family, name, schema) in schemas {
            self.register(family, name, schema)?;
        }
        Ok(())
    }

    /// Register a schema from a JSON string.
    pub fn register(
        &mut self,
        family: &str,
        name: &str,
        schema_json: &str,
    ) -> Result<Arc<SchemaDescriptor>> {
        let schema: Value = serde_json::from_str(schema_json)?;
        self.register_value(family, name, &schema)
    }

    /// Register a schema from a parsed JSON document.
    pub fn register_value(
        &mut self,
        family: &str,
        name: &str,
        schema: &Value,
    ) -> Result<Arc<SchemaDescriptor>> {
        validate_name("schema", name)?;
        validate_name("family", family)?;
        self.ensure_unregistered(name)?;

        let descriptor = Arc::new(self.compile(name, schema.clone())?);
        self.insert(family, Arc::clone(&descriptor))?;
        Ok(descriptor)
    }

    /// Add an already compiled descriptor to a family.
    pub fn insert(&mut self, family: &str, descriptor: Arc<SchemaDescriptor>) -> Result<()> {
        validate_name("family", family)?;
        validate_name("schema", descriptor.name())?;
        self.ensure_unregistered(descriptor.name())?;

        tracing::debug!(family, schema = descriptor.name(), "registered schema");
        self.families
            .entry(family.to_string())
            .or_default()
            .push(Arc::clone(&descriptor));
        self.by_name.insert(
            descriptor.name().to_string(),
            Entry {
                family: family.to_string(),
                descriptor,
            },
        );
        Ok(())
    }

    /// Load schemas from `<path>/<family>/<name>.schema.json`.
    pub fn from_directory(path: &Path) -> Result<Self> {
        Self::from_directory_with_config(path, RegistryConfig::default())
    }

    /// Load schemas from a directory tree with explicit config.
    pub fn from_directory_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);
        registry.load_directory(path)?;
        Ok(registry)
    }

    /// Add every schema found under `<path>/<family>/` to this registry.
    ///
    /// The whole tree is read and compiled before anything is inserted, so
    /// a failed load leaves the registry unchanged.
    pub fn load_directory(&mut self, path: &Path) -> Result<usize> {
        let staged = self.stage_directory(path)?;
        let loaded = staged.len();

        for (family, descriptor) in staged {
            self.insert(&family, descriptor)?;
        }

        tracing::debug!(path = %path.display(), loaded, "loaded schema directory");
        Ok(loaded)
    }

    fn stage_directory(&self, path: &Path) -> Result<Vec<(String, Arc<SchemaDescriptor>)>> {
        let mut staged: Vec<(String, Arc<SchemaDescriptor>)> = Vec::new();
        let mut staged_names: HashMap<String, String> = HashMap::new();

        for family_dir in sorted_entries(path)? {
            let family_name = file_name_of(&family_dir);
            let metadata = symlink_metadata(&family_dir)?;
            if metadata.file_type().is_symlink() {
                return Err(SchemaError::LoadFailed(format!(
                    "refusing to follow family symlink: {family_name}"
                )));
            }
            if !metadata.is_dir() {
                continue;
            }
            validate_name("family", &family_name)?;

            for schema_path in sorted_entries(&family_dir)? {
                let file_name = file_name_of(&schema_path);
                let Some(schema_name) = file_name.strip_suffix(SCHEMA_SUFFIX) else {
                    continue;
                };

                let path_metadata = symlink_metadata(&schema_path)?;
                if path_metadata.file_type().is_symlink() {
                    return Err(SchemaError::LoadFailed(format!(
                        "refusing to load schema symlink: {family_name}/{file_name}"
                    )));
                }
                if !path_metadata.is_file() {
                    continue;
                }

                if staged.len() >= self.config.max_schemas_from_directory {
                    return Err(SchemaError::LoadFailed(format!(
                        "schema count exceeds configured max ({})",
                        self.config.max_schemas_from_directory
                    )));
                }

                validate_name("schema", schema_name)?;
                self.ensure_unregistered(schema_name)?;
                if let Some(family) = staged_names.get(schema_name) {
                    return Err(SchemaError::DuplicateSchema {
                        name: schema_name.to_string(),
                        family: family.clone(),
                    });
                }

                let content = read_schema_file(&schema_path, &path_metadata, &self.config)?;
                let schema: Value = serde_json::from_str(&content)?;
                let descriptor = self.compile(schema_name, schema)?;

                staged_names.insert(schema_name.to_string(), family_name.clone());
                staged.push((family_name.clone(), Arc::new(descriptor)));
            }
        }

        Ok(staged)
    }

    /// Look up a descriptor by name.
    pub fn descriptor(&self, name: &str) -> Option<&Arc<SchemaDescriptor>> {
        self.by_name.get(name).map(|entry| &entry.descriptor)
    }

    /// Look up a descriptor by name, failing when it is absent.
    pub fn require(&self, name: &str) -> Result<&Arc<SchemaDescriptor>> {
        self.descriptor(name)
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))
    }

    /// Descriptors of a family in registration order.
    pub fn family(&self, family: &str) -> &[Arc<SchemaDescriptor>] {
        self.families.get(family).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Registered family names, sorted.
    pub fn families(&self) -> Vec<&str> {
        self.families.keys().map(String::as_str).collect()
    }

    /// True when `descriptor` is the schema registered under its name in `family`.
    pub fn contains(&self, family: &str, descriptor: &SchemaDescriptor) -> bool {
        self.by_name.get(descriptor.name()).is_some_and(|entry| {
            entry.family == family
                && (std::ptr::eq(entry.descriptor.as_ref(), descriptor)
                    || entry.descriptor.as_ref() == descriptor)
        })
    }

    /// Family the descriptor is registered in.
    pub fn family_of(&self, descriptor: &SchemaDescriptor) -> Option<&str> {
        self.by_name
            .get(descriptor.name())
            .filter(|entry| entry.descriptor.as_ref() == descriptor)
            .map(|entry| entry.family.as_str())
    }

    /// Total number of registered schemas.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn compile(&self, name: &str, mut schema: Value) -> Result<SchemaDescriptor> {
        if self.config.strict_mode {
            apply_strict_mode(&mut schema);
        }
        SchemaDescriptor::from_value(name, schema)
    }

    fn ensure_unregistered(&self, name: &str) -> Result<()> {
        match self.by_name.get(name) {
            Some(entry) => Err(SchemaError::DuplicateSchema {
                name: name.to_string(),
                family: entry.family.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let families: BTreeMap<&str, Vec<&str>> = self
            .families
            .iter()
            .map(|(family, schemas)| {
                (
                    family.as_str(),
                    schemas.iter().map(|schema| schema.name()).collect(),
                )
            })
            .collect();
        f.debug_struct("SchemaRegistry")
            .field("families", &families)
            .field("config", &self.config)
            .finish()
    }
}

fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .bytes()
            .next()
            .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'.' | b'_' | b'-'));

    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", dir.display())))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn symlink_metadata(path: &Path) -> Result<Metadata> {
    std::fs::symlink_metadata(path)
        .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))
}

fn read_schema_file(path: &Path, path_metadata: &Metadata, config: &RegistryConfig) -> Result<String> {
    let file = File::open(path).map_err(|err| {
        SchemaError::LoadFailed(format!("failed opening schema {}: {err}", path.display()))
    })?;
    let opened_metadata = file
        .metadata()
        .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;

    #[cfg(unix)]
    {
        if !same_file_identity(path_metadata, &opened_metadata) {
            return Err(SchemaError::LoadFailed(format!(
                "schema file changed during load: {}",
                path.display()
            )));
        }
    }
    #[cfg(not(unix))]
    let _ = path_metadata;

    let max_bytes = config.max_schema_file_size;
    if opened_metadata.len() > max_bytes as u64 {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large ({} bytes): {}",
            opened_metadata.len(),
            path.display()
        )));
    }

    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| {
            SchemaError::LoadFailed(format!("failed reading schema {}: {err}", path.display()))
        })?;
    if content.len() > max_bytes {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large while reading: {}",
            path.display()
        )));
    }

    Ok(content)
}

#[cfg(unix)]
fn same_file_identity(path_metadata: &Metadata, opened_metadata: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    path_metadata.dev() == opened_metadata.dev() && path_metadata.ino() == opened_metadata.ino()
}

const SUBSCHEMA_MAPS: [&str; 5] = [
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

const SUBSCHEMA_SINGLES: [&str; 11] = [
    "propertyNames",
    "additionalProperties",
    "unevaluatedProperties",
    "items",
    "contains",
    "additionalItems",
    "unevaluatedItems",
    "not",
    "if",
    "then",
    "else",
];

const SUBSCHEMA_LISTS: [&str; 4] = ["prefixItems", "allOf", "anyOf", "oneOf"];

const OBJECT_KEYWORDS: [&str; 8] = [
    "properties",
    "patternProperties",
    "additionalProperties",
    "unevaluatedProperties",
    "required",
    "dependentRequired",
    "dependentSchemas",
    "propertyNames",
];

/// Close every object subschema that leaves `additionalProperties` unset.
fn apply_strict_mode(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if is_object_schema(map) && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            strict_children(map);
        }
        Value::Array(items) => items.iter_mut().for_each(apply_strict_mode),
        _ => {}
    }
}

fn strict_children(map: &mut Map<String, Value>) {
    for key in SUBSCHEMA_MAPS {
        if let Some(Value::Object(children)) = map.get_mut(key) {
            children.values_mut().for_each(apply_strict_mode);
        }
    }
    for key in SUBSCHEMA_SINGLES.iter().chain(SUBSCHEMA_LISTS.iter()) {
        if let Some(child) = map.get_mut(*key) {
            apply_strict_mode(child);
        }
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind == "object"),
        _ => OBJECT_KEYWORDS.iter().any(|keyword| map.contains_key(*keyword)),
    }
}
