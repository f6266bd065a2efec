use super::identity::InstanceId;
use super::node_config::NodeConfig;
use crate::graph::{GraphIndex, Node};
use crate::plan::{ConfigurationPayload, PlanStep};
use ahash::AHashMap;
use serde_json::{Map, Value};

/// Input handles that pull a control node's value into an executable node, and the
/// parameter key each one is reported under.
pub const INPUT_SLOTS: &[(&str, &str)] = &[
    ("input", "input_value"),
    ("prompt", "prompt_value"),
    ("context", "context_value"),
    ("userPrompt", "user_prompt_value"),
    ("systemInstruction", "system_instruction_value"),
];

/// Steps and payload produced from one walk over the scheduled nodes.
#[derive(Debug, Clone)]
pub struct Flattened {
    pub steps: Vec<PlanStep>,
    pub payload: ConfigurationPayload,
}

/// Resolves every scheduled node's parameters and builds both payload shapes.
///
/// `order` and `identities` are parallel: `identities[i]` belongs to `order[i]`.
pub fn flatten(index: &GraphIndex<'_>, order: &[&Node], identities: &[InstanceId]) -> Flattened {
    let mut steps = Vec::with_capacity(order.len());
    let mut payload = ConfigurationPayload::default();

    for (node, instance) in order.iter().zip(identities) {
        let config = NodeConfig::from_data(&instance.canonical, &node.data);

        let mut params = slot_values(index, node);
        params.extend(config.params());

        config.write_legacy_keys(&instance.suffix(), &mut payload.api_keys);

        let backend_id = instance.backend_id();
        if !params.is_empty() {
            payload.node_params.insert(backend_id.clone(), params.clone());
        }

        steps.push(PlanStep {
            node_id: node.id.clone(),
            node_type: node.node_type.clone(),
            canonical_type: instance.canonical.clone(),
            backend_id,
            params,
        });
    }

    Flattened { steps, payload }
}

/// Collects values wired into `node`'s recognised input slots.
///
/// When several edges feed the same handle the last one in edge order wins. Only control
/// nodes provide values here; an executable source, or a blank value, leaves the slot
/// empty.
pub fn slot_values(index: &GraphIndex<'_>, node: &Node) -> Map<String, Value> {
    let mut resolved: AHashMap<&'static str, Option<String>> = AHashMap::new();

    for edge in index.incoming(&node.id) {
        let Some(handle) = edge.target_handle.as_deref() else {
            continue;
        };
        let Some((_, param_key)) = INPUT_SLOTS.iter().find(|(slot, _)| *slot == handle) else {
            continue;
        };
        let value = index
            .node(&edge.source)
            .filter(|source| source.role().is_control())
            .and_then(Node::scalar_value)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string);
        resolved.insert(*param_key, value);
    }

    resolved
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), Value::String(v))))
        .collect()
}

/// The user query: the string value of the first input node on the canvas.
pub fn user_query(index: &GraphIndex<'_>) -> String {
    index
        .nodes()
        .iter()
        .find(|node| node.is_query_input())
        .and_then(|node| node.scalar_value())
        .unwrap_or_default()
        .to_string()
}
