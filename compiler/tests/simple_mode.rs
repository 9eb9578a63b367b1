//! Integration tests for the single-user (simple mode) compiler.

use serde_json::json;
use xray_graph::lower::simple::export_simple;
use xray_graph::parse::parse_simple;

const GRAPH: &str = include_str!("fixtures/simple_graph.json");

#[test]
fn client_and_relay_documents() {
    let graph = parse_simple(GRAPH).unwrap();
    let results = export_simple(&graph);
    let names: Vec<&str> = results.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["client.json", "server-relay.json"]);
}

#[test]
fn client_listens_locally_and_routes_by_rules() {
    let graph = parse_simple(GRAPH).unwrap();
    let client = serde_json::to_value(&export_simple(&graph)[0].config).unwrap();

    assert_eq!(
        client["inbounds"],
        json!([
            {
                "tag": "socks-in",
                "listen": "127.0.0.1",
                "port": 10808,
                "protocol": "socks",
                "settings": { "auth": "noauth", "udp": true },
                "sniffing": { "enabled": true, "destOverride": ["http", "tls"] }
            },
            {
                "tag": "http-in",
                "listen": "127.0.0.1",
                "port": 10809,
                "protocol": "http",
                "settings": {},
                "sniffing": { "enabled": true, "destOverride": ["http", "tls"] }
            }
        ])
    );

    let outbound_tags: Vec<&str> = client["outbounds"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|o| o["tag"].as_str())
        .collect();
    assert_eq!(outbound_tags, vec!["relay", "exit", "direct", "block"]);
    assert_eq!(
        client["outbounds"][0]["streamSettings"],
        json!({ "network": "tcp", "security": "tls", "tlsSettings": { "serverName": "relay.example.net" } })
    );

    assert_eq!(
        client["routing"]["rules"],
        json!([
            { "type": "field", "domain": ["geosite:category-ads"], "outboundTag": "block" },
            { "type": "field", "ip": ["geoip:private"], "outboundTag": "direct" }
        ])
    );
}

#[test]
fn relay_forwards_to_the_chained_server() {
    let graph = parse_simple(GRAPH).unwrap();
    let relay = serde_json::to_value(&export_simple(&graph)[1].config).unwrap();

    assert_eq!(relay["inbounds"][0]["tag"], "relay-in");
    assert_eq!(relay["inbounds"][0]["port"], 443);
    assert_eq!(
        relay["inbounds"][0]["settings"],
        json!({
            "clients": [{ "id": "b831381d-6324-4d53-ad4f-8cda48b30811", "email": "" }],
            "decryption": "none"
        })
    );
    assert_eq!(
        relay["outbounds"][0],
        json!({
            "tag": "exit",
            "protocol": "trojan",
            "settings": { "servers": [{ "address": "exit.example.net", "port": 8443, "password": "hunter2" }] }
        })
    );
    assert_eq!(
        relay["routing"]["rules"],
        json!([{ "type": "field", "inboundTag": ["relay-in"], "outboundTag": "exit" }])
    );
}

#[test]
fn defaults_without_user_node() {
    let graph = parse_simple(r#"{"nodes": [{"id": "net", "nodeType": "internet", "data": {}}]}"#).unwrap();
    let results = export_simple(&graph);
    assert_eq!(results.len(), 1);
    let client = &results[0].config;
    assert_eq!(client.inbounds[0].port, 10808);
    assert_eq!(client.inbounds[1].port, 10809);
    assert_eq!(client.outbounds[0].tag, "direct");
}

#[test]
fn direct_is_added_when_no_internet_node_exists() {
    let graph = parse_simple(
        r#"{"nodes": [{"id": "s", "nodeType": "server",
            "data": {"tag": "proxy", "protocol": "trojan", "address": "a.example.net", "port": 443, "password": "pw"}}]}"#,
    )
    .unwrap();
    let client = &export_simple(&graph)[0].config;
    let tags: Vec<&str> = client.outbounds.iter().map(|o| o.tag.as_str()).collect();
    assert_eq!(tags, vec!["proxy", "direct"]);
    assert_eq!(client.outbounds[1].protocol, "freedom");
}

#[test]
fn malformed_graph_is_a_parse_error() {
    let errors = parse_simple(r#"{"nodes": [{"id": "x", "nodeType": "satellite", "data": {}}]}"#).unwrap_err();
    assert_eq!(errors[0].code, "P002");
}
