//! WASM entry points for browser use.
//!
//! Every function takes JSON strings and returns a plain JS object tagged with
//! `status`: `ok` with a `result`, or `errors` with a list of compiler errors.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::connection::{ConnectionCheck, is_valid_connection};
use crate::error::CompilerError;
use crate::import::ImportOptions;
use crate::parse::types::NodeKind;
use crate::simulate::SimulationRequest;

/// Parse a topology and run graph validation.
#[wasm_bindgen]
pub fn validate_graph_json(json: &str) -> JsValue {
    to_js(&match crate::parse::parse(json) {
        Ok(topology) => Response::ok(crate::validate::validate_graph(&topology.nodes, &topology.edges)),
        Err(errors) => Response::errors(errors),
    })
}

/// Gate for the editor before it creates an edge.
#[wasm_bindgen]
pub fn check_connection(source_type: &str, target_type: &str) -> JsValue {
    let check = match (NodeKind::parse(source_type), NodeKind::parse(target_type)) {
        (Some(source), Some(target)) => is_valid_connection(source, target),
        (None, _) => unknown_kind(source_type),
        (_, None) => unknown_kind(target_type),
    };
    to_js(&check)
}

fn unknown_kind(name: &str) -> ConnectionCheck {
    ConnectionCheck {
        valid: false,
        reason: Some(format!("Unknown node type '{}'", name)),
    }
}

/// Compile a topology into one document per server group.
#[wasm_bindgen]
pub fn export_config_json(json: &str) -> JsValue {
    to_js(&match crate::parse::parse(json) {
        Ok(t) => Response::ok(crate::lower::export_config(&t.nodes, &t.edges, &t.servers)),
        Err(errors) => Response::errors(errors),
    })
}

/// Compile a simple-mode graph into `client.json` (+ relay documents).
#[wasm_bindgen]
pub fn export_simple_json(json: &str) -> JsValue {
    to_js(&match crate::parse::parse_simple(json) {
        Ok(graph) => Response::ok(crate::lower::simple::export_simple(&graph)),
        Err(errors) => Response::errors(errors),
    })
}

/// Lift a wire document into a graph. `options_json` may be empty for defaults.
#[wasm_bindgen]
pub fn import_config_json(json: &str, options_json: &str) -> JsValue {
    let options = if options_json.trim().is_empty() {
        ImportOptions::default()
    } else {
        match serde_json::from_str::<ImportOptions>(options_json) {
            Ok(o) => o,
            Err(e) => {
                return to_js(&Response::<()>::errors(vec![CompilerError::parse(
                    "P003",
                    format!("Failed to parse import options JSON: {}", e),
                )]));
            }
        }
    };

    to_js(&match crate::import::import_xray_config(json, &options) {
        Ok(result) => Response::ok(result),
        Err(e) => Response::errors(vec![e.into()]),
    })
}

#[wasm_bindgen]
pub fn import_project_json(json: &str) -> JsValue {
    to_js(&match crate::import::import_project(json) {
        Ok(project) => Response::ok(project),
        Err(e) => Response::errors(vec![e.into()]),
    })
}

/// Trace one request through the topology.
#[wasm_bindgen]
pub fn simulate_json(topology_json: &str, request_json: &str) -> JsValue {
    let topology = match crate::parse::parse(topology_json) {
        Ok(t) => t,
        Err(errors) => return to_js(&Response::<()>::errors(errors)),
    };
    let request = match serde_json::from_str::<SimulationRequest>(request_json) {
        Ok(r) => r,
        Err(e) => {
            return to_js(&Response::<()>::errors(vec![CompilerError::parse(
                "P004",
                format!("Failed to parse simulation request JSON: {}", e),
            )]));
        }
    };

    to_js(&Response::ok(crate::simulate::run_simulation(
        &request,
        &topology.nodes,
        &topology.edges,
    )))
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

/// Maps go out as plain objects, not JS `Map`s.
fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    node_id: Option<String>,
}

impl From<CompilerError> for ErrorDto {
    fn from(e: CompilerError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            node_id: e.node_id,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Response<T> {
    Ok { result: T },
    Errors { errors: Vec<ErrorDto> },
}

impl<T> Response<T> {
    fn ok(result: T) -> Self {
        Response::Ok { result }
    }

    fn errors(errors: Vec<CompilerError>) -> Self {
        Response::Errors {
            errors: errors.into_iter().map(ErrorDto::from).collect(),
        }
    }
}
