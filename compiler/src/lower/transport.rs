//! Transport building shared by inbounds, proxy outbounds and simple mode.
//!
//! Precedence: cross-group edge transport, then the node's inline transport,
//! then bare `tcp`/`none` (which emits no `streamSettings` at all).

use crate::ir::types::StreamSettings;
use crate::parse::types::{
    TransportNetwork, TransportSecurity, TransportSettings,
};

pub fn stream_settings(transport: Option<&TransportSettings>) -> Option<StreamSettings> {
    let t = transport.filter(|t| !t.is_bare())?;

    Some(StreamSettings {
        network: t.network.wire_name().to_string(),
        security: t.security.as_str().to_string(),
        ws_settings: t.ws_settings.clone().filter(|_| t.network == TransportNetwork::Ws),
        grpc_settings: t.grpc_settings.clone().filter(|_| t.network == TransportNetwork::Grpc),
        xhttp_settings: t.xhttp_settings.clone().filter(|_| t.network == TransportNetwork::Xhttp),
        tls_settings: t.tls_settings.clone().filter(|_| t.security == TransportSecurity::Tls),
        reality_settings: t
            .reality_settings
            .clone()
            .filter(|_| t.security == TransportSecurity::Reality),
    })
}

/// Inverse of `stream_settings`. Unknown network or security names fall back to
/// `raw`/`none`.
pub fn lift_stream_settings(stream: Option<&StreamSettings>) -> Option<TransportSettings> {
    let s = stream?;
    let transport = TransportSettings {
        network: TransportNetwork::from_wire(&s.network).unwrap_or_default(),
        security: TransportSecurity::from_wire(&s.security).unwrap_or_default(),
        ws_settings: s.ws_settings.clone(),
        grpc_settings: s.grpc_settings.clone(),
        xhttp_settings: s.xhttp_settings.clone(),
        tls_settings: s.tls_settings.clone(),
        reality_settings: s.reality_settings.clone(),
    };
    (!transport.is_bare()).then_some(transport)
}

/// First edge transport wins over the inline one.
pub fn pick<'a>(
    edge_transports: impl IntoIterator<Item = &'a TransportSettings>,
    inline: Option<&'a TransportSettings>,
) -> Option<&'a TransportSettings> {
    edge_transports.into_iter().next().or(inline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::{TlsSettings, WsSettings};

    #[test]
    fn bare_transport_emits_nothing() {
        assert!(stream_settings(None).is_none());
        assert!(stream_settings(Some(&TransportSettings::default())).is_none());
    }

    #[test]
    fn raw_goes_out_as_tcp_and_unrelated_blocks_are_dropped() {
        let t = TransportSettings {
            network: TransportNetwork::Raw,
            security: TransportSecurity::Tls,
            ws_settings: Some(WsSettings {
                path: Some("/ignored".into()),
                host: None,
            }),
            tls_settings: Some(TlsSettings {
                server_name: Some("example.com".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let s = stream_settings(Some(&t)).unwrap();
        assert_eq!(s.network, "tcp");
        assert_eq!(s.security, "tls");
        assert!(s.ws_settings.is_none());
        assert!(s.tls_settings.is_some());
    }

    #[test]
    fn edge_transport_wins() {
        let edge = TransportSettings {
            network: TransportNetwork::Ws,
            ..Default::default()
        };
        let inline = TransportSettings {
            network: TransportNetwork::Grpc,
            ..Default::default()
        };
        let picked = pick(Some(&edge), Some(&inline)).unwrap();
        assert_eq!(picked.network, TransportNetwork::Ws);
        let picked = pick(None, Some(&inline)).unwrap();
        assert_eq!(picked.network, TransportNetwork::Grpc);
    }

    #[test]
    fn lift_is_inverse() {
        let t = TransportSettings {
            network: TransportNetwork::Ws,
            security: TransportSecurity::None,
            ws_settings: Some(WsSettings {
                path: Some("/ws".into()),
                host: None,
            }),
            ..Default::default()
        };
        let lifted = lift_stream_settings(stream_settings(Some(&t)).as_ref()).unwrap();
        assert_eq!(lifted, t);
    }
}
