//! Field-level sanitization of untrusted node/edge JSON.

use serde_json::{Map, Value};

use crate::graph::{Edge, EdgeId, Node, NodeData, NodeId, NodeVariant, Position};

/// Payload keys the engine models explicitly; everything else is kept in
/// `NodeData::extra`. `hiddenChildCount` is derived and always dropped.
const KNOWN_DATA_KEYS: &[&str] = &[
    "label",
    "level",
    "collapsed",
    "hiddenChildCount",
    "order",
    "color",
    "status",
    "description",
    "emoji",
];

/// Ids may arrive as strings or numbers.
fn read_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn read_f64(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| v.is_finite())
}

/// Build a node from untrusted JSON. `None` when it has no usable id.
pub fn sanitize_node(raw: &Value, placeholder_label: &str) -> Option<Node> {
    let obj = raw.as_object()?;
    let id = read_id(obj.get("id"))?;

    let variant = obj
        .get("type")
        .and_then(Value::as_str)
        .map(NodeVariant::from_tag)
        .unwrap_or_default();

    let position = obj
        .get("position")
        .and_then(Value::as_object)
        .map(|p| {
            Position::new(
                read_f64(p.get("x")).unwrap_or(0.0),
                read_f64(p.get("y")).unwrap_or(0.0),
            )
        })
        .unwrap_or_default();

    let empty = Map::new();
    let data = obj.get("data").and_then(Value::as_object).unwrap_or(&empty);

    let label = read_string(data, "label")
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| placeholder_label.to_string());
    let level = data
        .get("level")
        .and_then(Value::as_u64)
        .and_then(|l| u32::try_from(l).ok())
        .unwrap_or(0);

    let extra: Map<String, Value> = data
        .iter()
        .filter(|(key, _)| !KNOWN_DATA_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(Node {
        id: NodeId(id),
        variant,
        position,
        data: NodeData {
            label,
            level,
            collapsed: data.get("collapsed").and_then(Value::as_bool).unwrap_or(false),
            hidden_child_count: None,
            order: data.get("order").and_then(Value::as_i64),
            color: read_string(data, "color"),
            status: read_string(data, "status"),
            description: read_string(data, "description"),
            emoji: read_string(data, "emoji"),
            extra,
        },
        style: obj.get("style").cloned().unwrap_or(Value::Null),
        width: read_f64(obj.get("width")),
        height: read_f64(obj.get("height")),
        hidden: false,
    })
}

/// Build an edge from untrusted JSON. `None` without both endpoints.
/// Handles are left for the caller to normalize.
pub fn sanitize_edge(raw: &Value) -> Option<Edge> {
    let obj = raw.as_object()?;
    let source = NodeId(read_id(obj.get("source"))?);
    let target = NodeId(read_id(obj.get("target"))?);

    let id = read_id(obj.get("id"))
        .map(EdgeId)
        .unwrap_or_else(|| EdgeId::between(&source, &target));

    let mut edge = Edge::link(source, target);
    edge.id = id;
    edge.kind = obj.get("type").and_then(Value::as_str).map(str::to_string);
    edge.data = obj.get("data").cloned().unwrap_or(Value::Null);
    edge.style = obj.get("style").cloned().unwrap_or(Value::Null);
    edge.animated = obj.get("animated").and_then(Value::as_bool).unwrap_or(false);
    Some(edge)
}
