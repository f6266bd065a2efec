use crate::graph::Node;
use ahash::{AHashMap, AHashSet};
use std::fmt;

/// UI type names that the execution backend knows under a different name.
const DEFAULT_RENAMES: &[(&str, &str)] = &[
    ("openai-advanced", "openai/advanced"),
    ("gemini-advanced", "gemini/advanced"),
    ("video-summary", "video_summary"),
];

/// Maps user-facing node types to canonical backend types. Unlisted types pass through.
#[derive(Debug, Clone)]
pub struct TypeRenames {
    table: AHashMap<String, String>,
}

impl Default for TypeRenames {
    fn default() -> Self {
        let table = DEFAULT_RENAMES
            .iter()
            .map(|(ui, backend)| (ui.to_string(), backend.to_string()))
            .collect();
        Self { table }
    }
}

impl TypeRenames {
    pub fn insert(&mut self, ui_type: &str, backend_type: &str) {
        self.table
            .insert(ui_type.to_string(), backend_type.to_string());
    }

    pub fn canonical<'s>(&'s self, ui_type: &'s str) -> &'s str {
        self.table.get(ui_type).map(String::as_str).unwrap_or(ui_type)
    }
}

/// Counts how many instances of each canonical type have been seen so far, and remembers
/// every backend id it has handed out.
///
/// The counter is a plain value: callers thread it through resolution explicitly, so two
/// compilations never share numbering.
#[derive(Debug, Clone, Default)]
pub struct TypeInstanceCounter {
    counts: AHashMap<String, u32>,
    issued: AHashSet<String>,
}

impl TypeInstanceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more instance of `canonical` and returns its identity.
    ///
    /// A type name can itself look like a numbered instance (`openai_2`), so the ordinal
    /// keeps climbing until the resulting backend id has not been issued yet.
    pub fn next(&mut self, canonical: &str) -> InstanceId {
        let count = self.counts.entry(canonical.to_string()).or_insert(0);
        *count += 1;
        let mut instance = InstanceId {
            canonical: canonical.to_string(),
            ordinal: *count,
        };
        while self.issued.contains(&instance.backend_id()) {
            instance.ordinal += 1;
        }
        self.issued.insert(instance.backend_id());
        instance
    }

    pub fn count(&self, canonical: &str) -> u32 {
        self.counts.get(canonical).copied().unwrap_or(0)
    }
}

/// The `ordinal`-th instance (1-based) of a canonical node type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceId {
    pub canonical: String,
    pub ordinal: u32,
}

impl InstanceId {
    /// `""` for the first instance, `"_N"` afterwards.
    pub fn suffix(&self) -> String {
        if self.ordinal > 1 {
            format!("_{}", self.ordinal)
        } else {
            String::new()
        }
    }

    /// The disambiguated identifier used to key this instance's configuration.
    pub fn backend_id(&self) -> String {
        format!("{}{}", self.canonical, self.suffix())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.canonical, self.suffix())
    }
}

/// Assigns an `InstanceId` to each node, counting in the given (execution) order.
pub fn resolve_identities(
    order: &[&Node],
    renames: &TypeRenames,
    counter: &mut TypeInstanceCounter,
) -> Vec<InstanceId> {
    order
        .iter()
        .map(|node| counter.next(renames.canonical(&node.node_type)))
        .collect()
}
