//! `inbound` node → wire inbound.

use serde_json::{Map, Value, json};

use crate::ir::types::{Sniffing, StreamSettings, XrayInbound};
use crate::parse::types::{InboundConfig, InboundProtocol, InboundUser};

pub const DEFAULT_LISTEN: &str = "0.0.0.0";
pub const DEFAULT_SS_METHOD: &str = "aes-256-gcm";

pub fn lower_inbound(config: &InboundConfig, stream: Option<StreamSettings>) -> XrayInbound {
    let listen = match config.listen.trim() {
        "" => DEFAULT_LISTEN.to_string(),
        l => l.to_string(),
    };

    XrayInbound {
        tag: config.tag.clone(),
        listen,
        port: u16::try_from(config.port).unwrap_or(0),
        protocol: config.protocol.as_str().to_string(),
        settings: inbound_settings(config),
        sniffing: config.sniffing.map(|enabled| Sniffing {
            enabled,
            dest_override: if enabled {
                vec!["http".into(), "tls".into()]
            } else {
                Vec::new()
            },
        }),
        stream_settings: stream,
    }
}

fn inbound_settings(config: &InboundConfig) -> Value {
    match config.protocol {
        InboundProtocol::Vless => json!({
            "clients": id_clients(&config.users),
            "decryption": "none",
        }),
        InboundProtocol::Vmess => json!({ "clients": id_clients(&config.users) }),
        InboundProtocol::Trojan => json!({ "clients": password_clients(&config.users) }),
        InboundProtocol::Shadowsocks => {
            let mut settings = Map::new();
            let method = config
                .method
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(DEFAULT_SS_METHOD);
            settings.insert("method".into(), json!(method));
            if let Some(password) = config.users.iter().find_map(|u| u.password.as_deref()) {
                settings.insert("password".into(), json!(password));
            }
            settings.insert("network".into(), json!("tcp,udp"));
            Value::Object(settings)
        }
        InboundProtocol::Socks => {
            let accounts = accounts(&config.users);
            if accounts.is_empty() {
                json!({ "auth": "noauth", "udp": true })
            } else {
                json!({ "auth": "password", "accounts": accounts, "udp": true })
            }
        }
        InboundProtocol::Http => {
            let accounts = accounts(&config.users);
            if accounts.is_empty() {
                json!({})
            } else {
                json!({ "accounts": accounts })
            }
        }
        InboundProtocol::DokodemoDoor => json!({ "network": "tcp,udp" }),
    }
}

fn client(user: &InboundUser, key: &str, secret: &str) -> Value {
    let mut c = Map::new();
    c.insert(key.into(), json!(secret));
    c.insert("email".into(), json!(user.email));
    if let Some(level) = user.level {
        c.insert("level".into(), json!(level));
    }
    Value::Object(c)
}

fn id_clients(users: &[InboundUser]) -> Vec<Value> {
    users
        .iter()
        .filter_map(|u| u.id.as_deref().map(|id| client(u, "id", id)))
        .collect()
}

fn password_clients(users: &[InboundUser]) -> Vec<Value> {
    users
        .iter()
        .filter_map(|u| u.password.as_deref().map(|pw| client(u, "password", pw)))
        .collect()
}

fn accounts(users: &[InboundUser]) -> Vec<Value> {
    users
        .iter()
        .filter_map(|u| {
            u.password
                .as_deref()
                .map(|pw| json!({ "user": u.email, "pass": pw }))
        })
        .collect()
}
