//! Terminal and proxy outbound nodes → wire outbounds.

use serde_json::{Value, json};

use super::inbound::DEFAULT_SS_METHOD;
use crate::ir::types::{StreamSettings, XrayOutbound};
use crate::parse::graph::TopologyGraph;
use crate::parse::types::{
    GraphNode, ProxyOutboundConfig, ProxyProtocol, Server, TerminalOutboundConfig, TerminalProtocol,
};

/// Address a proxy outbound dials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub address: String,
    pub port: u32,
}

pub fn lower_terminal(config: &TerminalOutboundConfig) -> XrayOutbound {
    let settings = match config.protocol {
        TerminalProtocol::Freedom => json!({ "domainStrategy": "UseIP" }),
        TerminalProtocol::Blackhole => json!({ "response": { "type": "none" } }),
        TerminalProtocol::Dns => json!({}),
    };
    XrayOutbound {
        tag: config.tag.clone(),
        protocol: config.protocol.as_str().to_string(),
        settings,
        stream_settings: None,
    }
}

/// `fallback` fills in whichever of address/port the node leaves blank.
pub fn lower_proxy(
    config: &ProxyOutboundConfig,
    fallback: Option<&Endpoint>,
    stream: Option<StreamSettings>,
) -> XrayOutbound {
    let address = match config.server_address.trim() {
        "" => fallback.map(|e| e.address.clone()).unwrap_or_default(),
        a => a.to_string(),
    };
    let port = match config.server_port {
        0 => fallback.map(|e| e.port).unwrap_or(0),
        p => p,
    };
    let port = u16::try_from(port).unwrap_or(0);

    XrayOutbound {
        tag: config.tag.clone(),
        protocol: config.protocol.as_str().to_string(),
        settings: proxy_settings(config, &address, port),
        stream_settings: stream,
    }
}

fn proxy_settings(config: &ProxyOutboundConfig, address: &str, port: u16) -> Value {
    let id = config.id.clone().unwrap_or_default();
    let password = config.password.clone().unwrap_or_default();

    match config.protocol {
        ProxyProtocol::Vless => json!({
            "vnext": [{
                "address": address,
                "port": port,
                "users": [{ "id": id, "encryption": "none" }],
            }]
        }),
        ProxyProtocol::Vmess => json!({
            "vnext": [{
                "address": address,
                "port": port,
                "users": [{ "id": id, "security": "auto" }],
            }]
        }),
        ProxyProtocol::Trojan => json!({
            "servers": [{ "address": address, "port": port, "password": password }]
        }),
        ProxyProtocol::Shadowsocks => {
            let method = config
                .method
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(DEFAULT_SS_METHOD);
            json!({
                "servers": [{
                    "address": address,
                    "port": port,
                    "method": method,
                    "password": password,
                }]
            })
        }
        ProxyProtocol::Socks | ProxyProtocol::Http => json!({
            "servers": [{ "address": address, "port": port }]
        }),
    }
}

/// Host and port of the inbound a proxy chains into over a cross-group edge,
/// when that inbound sits on a known server.
pub fn chained_endpoint(node_id: &str, graph: &TopologyGraph<'_>, servers: &[Server]) -> Option<Endpoint> {
    graph
        .outgoing(node_id)
        .iter()
        .filter(|e| graph.is_cross_group(e))
        .find_map(|e| {
            let GraphNode::Inbound(inbound) = graph.target_of(e)? else {
                return None;
            };
            let server_id = inbound.server_id.as_deref()?;
            let server = servers.iter().find(|s| s.id == server_id)?;
            let host = server.host.trim();
            (!host.is_empty()).then(|| Endpoint {
                address: host.to_string(),
                port: inbound.data.port,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(protocol: ProxyProtocol) -> ProxyOutboundConfig {
        ProxyOutboundConfig {
            tag: "out".into(),
            protocol,
            server_address: String::new(),
            server_port: 0,
            id: None,
            password: None,
            method: None,
            transport: None,
        }
    }

    #[test]
    fn terminal_settings() {
        let out = lower_terminal(&TerminalOutboundConfig {
            tag: "block".into(),
            protocol: TerminalProtocol::Blackhole,
        });
        assert_eq!(out.settings, json!({"response": {"type": "none"}}));
    }

    #[test]
    fn vless_vnext() {
        let mut c = proxy(ProxyProtocol::Vless);
        c.server_address = "1.2.3.4".into();
        c.server_port = 443;
        c.id = Some("uuid".into());
        let out = lower_proxy(&c, None, None);
        assert_eq!(
            out.settings,
            json!({"vnext": [{"address": "1.2.3.4", "port": 443, "users": [{"id": "uuid", "encryption": "none"}]}]})
        );
    }

    #[test]
    fn fallback_fills_blank_fields_only() {
        let mut c = proxy(ProxyProtocol::Trojan);
        c.server_port = 8443;
        let fallback = Endpoint {
            address: "edge.example".into(),
            port: 443,
        };
        let out = lower_proxy(&c, Some(&fallback), None);
        assert_eq!(
            out.settings,
            json!({"servers": [{"address": "edge.example", "port": 8443, "password": ""}]})
        );
    }
}
