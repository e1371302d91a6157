use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::expr::{Expr, Node};

/// Compound-value form of an expression graph, as sent to the compute
/// service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encoded {
    pub result: String,
    pub values: BTreeMap<String, Value>,
}

impl Encoded {
    /// Value stored under `id`.
    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn result_value(&self) -> Option<&Value> {
        self.value(&self.result)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Expr {
    pub fn encode(&self) -> Encoded {
        Encoder::encode(self)
    }
}

/// Encodes graphs with common subexpression elimination.
///
/// Ids are assigned in post-order; two structurally equal nodes get the same
/// id even when they are different allocations.
#[derive(Default)]
pub struct Encoder {
    values: BTreeMap<String, Value>,
    by_content: HashMap<String, String>,
    by_ptr: HashMap<*const Node, String>,
}

impl Encoder {
    pub fn encode(expr: &Expr) -> Encoded {
        let mut encoder = Self::default();
        let result = encoder.id_of(expr);
        log::trace!("encoded graph into {} values", encoder.values.len());
        Encoded {
            result,
            values: encoder.values,
        }
    }

    fn reference(&mut self, expr: &Expr) -> Value {
        json!({ "valueReference": self.id_of(expr) })
    }

    fn id_of(&mut self, expr: &Expr) -> String {
        if let Some(id) = self.by_ptr.get(&expr.ptr()) {
            return id.clone();
        }
        let value = match expr.node() {
            Node::Constant(value) => json!({ "constantValue": value }),
            Node::Argument(name) => json!({ "argumentReference": name }),
            Node::Invocation { function, args } => {
                let arguments: Map<String, Value> = args
                    .iter()
                    .map(|(name, arg)| (name.clone(), self.reference(arg)))
                    .collect();
                json!({
                    "functionInvocationValue": {
                        "functionName": function,
                        "arguments": arguments,
                    }
                })
            }
            Node::Array(items) => {
                let values: Vec<Value> = items.iter().map(|item| self.reference(item)).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Node::Dictionary(entries) => {
                let values: Map<String, Value> = entries
                    .iter()
                    .map(|(key, entry)| (key.clone(), self.reference(entry)))
                    .collect();
                json!({ "dictionaryValue": { "values": values } })
            }
            Node::Function { arguments, body } => {
                let body = self.id_of(body);
                json!({
                    "functionDefinitionValue": {
                        "argumentNames": arguments,
                        "body": body,
                    }
                })
            }
        };
        let content = value.to_string();
        let id = match self.by_content.get(&content) {
            Some(id) => id.clone(),
            None => {
                let id = self.values.len().to_string();
                self.values.insert(id.clone(), value);
                self.by_content.insert(content, id.clone());
                id
            }
        };
        self.by_ptr.insert(expr.ptr(), id.clone());
        id
    }
}
