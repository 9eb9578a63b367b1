//! Wire-format document: the JSON configuration consumed by the proxy runtime.
//!
//! Produced by the forward compiler, parsed back by the reverse compiler.
//! Optional blocks are omitted rather than emitted as null or empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parse::types::{GrpcSettings, RealitySettings, TlsSettings, WsSettings, XhttpSettings};

// =============================================================================
// TOP-LEVEL DOCUMENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XrayConfig {
    #[serde(default)]
    pub log: XrayLog,
    #[serde(default)]
    pub inbounds: Vec<XrayInbound>,
    #[serde(default)]
    pub outbounds: Vec<XrayOutbound>,
    #[serde(default)]
    pub routing: XrayRouting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XrayLog {
    pub loglevel: String,
}

impl Default for XrayLog {
    fn default() -> Self {
        XrayLog {
            loglevel: "warning".into(),
        }
    }
}

// =============================================================================
// INBOUNDS / OUTBOUNDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayInbound {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub listen: String,
    pub port: u16,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub settings: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sniffing: Option<Sniffing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_settings: Option<StreamSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sniffing {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dest_override: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayOutbound {
    #[serde(default)]
    pub tag: String,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub settings: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_settings: Option<StreamSettings>,
}

/// `network` is the wire name (`tcp`, never `raw`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSettings {
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default = "default_security")]
    pub security: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_settings: Option<WsSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_settings: Option<GrpcSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xhttp_settings: Option<XhttpSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_settings: Option<TlsSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality_settings: Option<RealitySettings>,
}

fn default_network() -> String {
    "tcp".into()
}

fn default_security() -> String {
    "none".into()
}

// =============================================================================
// ROUTING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayRouting {
    #[serde(default = "default_domain_strategy")]
    pub domain_strategy: String,
    #[serde(default)]
    pub rules: Vec<FieldRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub balancers: Vec<XrayBalancer>,
}

impl Default for XrayRouting {
    fn default() -> Self {
        XrayRouting {
            domain_strategy: default_domain_strategy(),
            rules: Vec::new(),
            balancers: Vec::new(),
        }
    }
}

fn default_domain_strategy() -> String {
    "AsIs".into()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    #[serde(rename = "type", default = "default_rule_type")]
    pub rule_type: String,
    /// Present only on imported documents; never emitted by the compiler.
    #[serde(default, skip_serializing)]
    pub rule_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_tag: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balancer_tag: Option<String>,
}

fn default_rule_type() -> String {
    "field".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayBalancer {
    pub tag: String,
    #[serde(default)]
    pub selector: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyBlock {
    #[serde(rename = "type")]
    pub strategy_type: String,
}
