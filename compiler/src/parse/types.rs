//! Rust types for the editor's topology JSON.
//!
//! These types are the serde target for the node/edge lists the editor hands to
//! validation, compilation and simulation, and for the project envelope.
//! SYNC NOTE: When a node kind or a config field changes here, review the
//! exhaustive matches in `validate`, `lower`, `import` and `simulate`.

use serde::{Deserialize, Serialize};

/// Edges without an explicit priority sort after every prioritized edge.
pub const DEFAULT_PRIORITY: u32 = 999;

// =============================================================================
// TOPOLOGY
// =============================================================================

/// The graph handed over by the editor: typed nodes, edges and the server records
/// that nodes may be grouped under.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub servers: Vec<Server>,
}

/// A host that nodes can be assigned to through `serverId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshInfo {
    #[serde(default)]
    pub user: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
}

fn default_ssh_port() -> u16 {
    22
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

// =============================================================================
// EDGES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub edge_type: EdgeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EdgeData>,
}

impl GraphEdge {
    pub fn priority(&self) -> u32 {
        self.data
            .as_ref()
            .and_then(|d| d.priority)
            .unwrap_or(DEFAULT_PRIORITY)
    }

    /// Edge-level transport. Takes precedence over any inline node transport.
    pub fn transport(&self) -> Option<&TransportSettings> {
        self.data.as_ref().and_then(|d| d.transport.as_ref())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    #[default]
    Default,
    Conditional,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportSettings>,
}

// =============================================================================
// TRANSPORT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportSettings {
    #[serde(default)]
    pub network: TransportNetwork,
    #[serde(default)]
    pub security: TransportSecurity,
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

impl TransportSettings {
    /// Plain TCP without any security layer; compiles to no `streamSettings` at all.
    pub fn is_bare(&self) -> bool {
        self.network == TransportNetwork::Raw && self.security == TransportSecurity::None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportNetwork {
    #[default]
    Raw,
    Ws,
    Grpc,
    Xhttp,
}

impl TransportNetwork {
    /// Name used in compiled documents. `raw` goes out as `tcp`.
    pub fn wire_name(&self) -> &'static str {
        match self {
            TransportNetwork::Raw => "tcp",
            TransportNetwork::Ws => "ws",
            TransportNetwork::Grpc => "grpc",
            TransportNetwork::Xhttp => "xhttp",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "tcp" | "raw" => Some(TransportNetwork::Raw),
            "ws" => Some(TransportNetwork::Ws),
            "grpc" => Some(TransportNetwork::Grpc),
            "xhttp" => Some(TransportNetwork::Xhttp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportSecurity {
    #[default]
    None,
    Tls,
    Reality,
}

impl TransportSecurity {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportSecurity::None => "none",
            TransportSecurity::Tls => "tls",
            TransportSecurity::Reality => "reality",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "" | "none" => Some(TransportSecurity::None),
            "tls" => Some(TransportSecurity::Tls),
            "reality" => Some(TransportSecurity::Reality),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_mode: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XhttpSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_insecure: Option<bool>,
}

/// Client-side fields (`publicKey`, `shortId`, `serverName`) and the server-side
/// counterparts (`privateKey`, `shortIds`, `serverNames`, `dest`) share one struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealitySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spider_x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
}

// =============================================================================
// GRAPH NODE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeType", rename_all = "kebab-case")]
pub enum GraphNode {
    Device(NodeBase<DeviceConfig>),
    Inbound(NodeBase<InboundConfig>),
    Routing(NodeBase<RoutingConfig>),
    Balancer(NodeBase<BalancerConfig>),
    OutboundTerminal(NodeBase<TerminalOutboundConfig>),
    OutboundProxy(NodeBase<ProxyOutboundConfig>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeBase<C> {
    pub id: String,
    #[serde(default)]
    pub position: Position,
    pub data: C,
    /// Weak grouping reference to a `Server`; only used for partitioning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
}

impl<C> NodeBase<C> {
    pub fn new(id: impl Into<String>, data: C) -> Self {
        NodeBase {
            id: id.into(),
            position: Position::default(),
            data,
            server_id: None,
        }
    }
}

/// Discriminant of `GraphNode`, usable without a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Device,
    Inbound,
    Routing,
    Balancer,
    OutboundTerminal,
    OutboundProxy,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Device => "device",
            NodeKind::Inbound => "inbound",
            NodeKind::Routing => "routing",
            NodeKind::Balancer => "balancer",
            NodeKind::OutboundTerminal => "outbound-terminal",
            NodeKind::OutboundProxy => "outbound-proxy",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "device" => Some(NodeKind::Device),
            "inbound" => Some(NodeKind::Inbound),
            "routing" => Some(NodeKind::Routing),
            "balancer" => Some(NodeKind::Balancer),
            "outbound-terminal" => Some(NodeKind::OutboundTerminal),
            "outbound-proxy" => Some(NodeKind::OutboundProxy),
            _ => None,
        }
    }

    pub fn is_outbound(&self) -> bool {
        matches!(self, NodeKind::OutboundTerminal | NodeKind::OutboundProxy)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            GraphNode::Device(n) => &n.id,
            GraphNode::Inbound(n) => &n.id,
            GraphNode::Routing(n) => &n.id,
            GraphNode::Balancer(n) => &n.id,
            GraphNode::OutboundTerminal(n) => &n.id,
            GraphNode::OutboundProxy(n) => &n.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            GraphNode::Device(_) => NodeKind::Device,
            GraphNode::Inbound(_) => NodeKind::Inbound,
            GraphNode::Routing(_) => NodeKind::Routing,
            GraphNode::Balancer(_) => NodeKind::Balancer,
            GraphNode::OutboundTerminal(_) => NodeKind::OutboundTerminal,
            GraphNode::OutboundProxy(_) => NodeKind::OutboundProxy,
        }
    }

    /// Identity tag. Devices carry none.
    pub fn tag(&self) -> Option<&str> {
        match self {
            GraphNode::Device(_) => None,
            GraphNode::Inbound(n) => Some(&n.data.tag),
            GraphNode::Routing(n) => Some(&n.data.tag),
            GraphNode::Balancer(n) => Some(&n.data.tag),
            GraphNode::OutboundTerminal(n) => Some(&n.data.tag),
            GraphNode::OutboundProxy(n) => Some(&n.data.tag),
        }
    }

    pub fn server_id(&self) -> Option<&str> {
        let server_id = match self {
            GraphNode::Device(n) => &n.server_id,
            GraphNode::Inbound(n) => &n.server_id,
            GraphNode::Routing(n) => &n.server_id,
            GraphNode::Balancer(n) => &n.server_id,
            GraphNode::OutboundTerminal(n) => &n.server_id,
            GraphNode::OutboundProxy(n) => &n.server_id,
        };
        server_id.as_deref().filter(|s| !s.is_empty())
    }

    pub fn position_mut(&mut self) -> &mut Position {
        match self {
            GraphNode::Device(n) => &mut n.position,
            GraphNode::Inbound(n) => &mut n.position,
            GraphNode::Routing(n) => &mut n.position,
            GraphNode::Balancer(n) => &mut n.position,
            GraphNode::OutboundTerminal(n) => &mut n.position,
            GraphNode::OutboundProxy(n) => &mut n.position,
        }
    }

    /// Tag if non-empty, else the node id. Used in human-facing messages.
    pub fn display_name(&self) -> &str {
        match self.tag() {
            Some(tag) if !tag.trim().is_empty() => tag,
            _ => self.id(),
        }
    }
}

// =============================================================================
// NODE CONFIGS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    #[serde(default)]
    pub label: String,
    pub connection_type: ConnectionType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Tun2socks,
    Socks,
    Http,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Tun2socks => "tun2socks",
            ConnectionType::Socks => "socks",
            ConnectionType::Http => "http",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundConfig {
    #[serde(default)]
    pub tag: String,
    pub protocol: InboundProtocol,
    #[serde(default)]
    pub listen: String,
    #[serde(default)]
    pub port: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sniffing: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<InboundUser>,
    /// Shadowsocks cipher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Legacy inline transport; edge-level transport wins when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundUser {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InboundProtocol {
    Http,
    Socks,
    Vless,
    Vmess,
    Trojan,
    Shadowsocks,
    DokodemoDoor,
}

impl InboundProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            InboundProtocol::Http => "http",
            InboundProtocol::Socks => "socks",
            InboundProtocol::Vless => "vless",
            InboundProtocol::Vmess => "vmess",
            InboundProtocol::Trojan => "trojan",
            InboundProtocol::Shadowsocks => "shadowsocks",
            InboundProtocol::DokodemoDoor => "dokodemo-door",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "http" => Some(InboundProtocol::Http),
            "socks" => Some(InboundProtocol::Socks),
            "vless" => Some(InboundProtocol::Vless),
            "vmess" => Some(InboundProtocol::Vmess),
            "trojan" => Some(InboundProtocol::Trojan),
            "shadowsocks" => Some(InboundProtocol::Shadowsocks),
            "dokodemo-door" => Some(InboundProtocol::DokodemoDoor),
            _ => None,
        }
    }
}

impl From<ProxyProtocol> for InboundProtocol {
    fn from(protocol: ProxyProtocol) -> Self {
        match protocol {
            ProxyProtocol::Http => InboundProtocol::Http,
            ProxyProtocol::Socks => InboundProtocol::Socks,
            ProxyProtocol::Vless => InboundProtocol::Vless,
            ProxyProtocol::Vmess => InboundProtocol::Vmess,
            ProxyProtocol::Trojan => InboundProtocol::Trojan,
            ProxyProtocol::Shadowsocks => InboundProtocol::Shadowsocks,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    #[serde(default)]
    pub tag: String,
    #[serde(flatten)]
    pub predicates: RulePredicates,
}

/// Match predicates of a routing rule. Shared by routing nodes and simple-mode
/// `rules` nodes, and interpreted by `crate::rules`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePredicates {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocol: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_tag: Option<String>,
}

impl RulePredicates {
    pub fn port_spec(&self) -> Option<&str> {
        non_blank(&self.port)
    }

    pub fn network_spec(&self) -> Option<&str> {
        non_blank(&self.network)
    }

    pub fn inbound_tag_spec(&self) -> Option<&str> {
        non_blank(&self.inbound_tag)
    }

    /// No predicate of any category is set: the rule matches everything.
    pub fn is_catch_all(&self) -> bool {
        self.domain.is_empty()
            && self.ip.is_empty()
            && self.protocol.is_empty()
            && self.port_spec().is_none()
            && self.network_spec().is_none()
            && self.inbound_tag_spec().is_none()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancerConfig {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub strategy: BalancerStrategy,
    #[serde(default)]
    pub selector: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BalancerStrategy {
    #[default]
    Random,
    LeastPing,
    RoundRobin,
}

impl BalancerStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalancerStrategy::Random => "random",
            BalancerStrategy::LeastPing => "leastPing",
            BalancerStrategy::RoundRobin => "roundRobin",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "random" => Some(BalancerStrategy::Random),
            "leastPing" => Some(BalancerStrategy::LeastPing),
            "roundRobin" => Some(BalancerStrategy::RoundRobin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalOutboundConfig {
    #[serde(default)]
    pub tag: String,
    pub protocol: TerminalProtocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalProtocol {
    Freedom,
    Blackhole,
    Dns,
}

impl TerminalProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalProtocol::Freedom => "freedom",
            TerminalProtocol::Blackhole => "blackhole",
            TerminalProtocol::Dns => "dns",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "freedom" => Some(TerminalProtocol::Freedom),
            "blackhole" => Some(TerminalProtocol::Blackhole),
            "dns" => Some(TerminalProtocol::Dns),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyOutboundConfig {
    #[serde(default)]
    pub tag: String,
    pub protocol: ProxyProtocol,
    #[serde(default)]
    pub server_address: String,
    #[serde(default)]
    pub server_port: u32,
    /// UUID for vless/vmess.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Password for trojan/shadowsocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Shadowsocks cipher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Legacy inline transport; edge-level transport wins when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyProtocol {
    Http,
    Socks,
    Vless,
    Vmess,
    Trojan,
    Shadowsocks,
}

impl ProxyProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Socks => "socks",
            ProxyProtocol::Vless => "vless",
            ProxyProtocol::Vmess => "vmess",
            ProxyProtocol::Trojan => "trojan",
            ProxyProtocol::Shadowsocks => "shadowsocks",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "http" => Some(ProxyProtocol::Http),
            "socks" => Some(ProxyProtocol::Socks),
            "vless" => Some(ProxyProtocol::Vless),
            "vmess" => Some(ProxyProtocol::Vmess),
            "trojan" => Some(ProxyProtocol::Trojan),
            "shadowsocks" => Some(ProxyProtocol::Shadowsocks),
            _ => None,
        }
    }
}

// =============================================================================
// SIMPLE MODE
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleGraph {
    #[serde(default)]
    pub nodes: Vec<SimpleNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeType", rename_all = "kebab-case")]
pub enum SimpleNode {
    User(NodeBase<UserConfig>),
    Server(NodeBase<SimpleServerConfig>),
    Internet(NodeBase<InternetConfig>),
    Block(NodeBase<BlockConfig>),
    Rules(NodeBase<RoutingConfig>),
}

impl SimpleNode {
    pub fn id(&self) -> &str {
        match self {
            SimpleNode::User(n) => &n.id,
            SimpleNode::Server(n) => &n.id,
            SimpleNode::Internet(n) => &n.id,
            SimpleNode::Block(n) => &n.id,
            SimpleNode::Rules(n) => &n.id,
        }
    }

    /// Outbound tag for nodes that compile to an outbound.
    pub fn outbound_tag(&self) -> Option<&str> {
        match self {
            SimpleNode::Server(n) => Some(&n.data.tag),
            SimpleNode::Internet(n) => Some(&n.data.tag),
            SimpleNode::Block(n) => Some(&n.data.tag),
            SimpleNode::User(_) | SimpleNode::Rules(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    #[serde(default = "default_socks_port")]
    pub socks_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_port: Option<u16>,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            socks_port: default_socks_port(),
            http_port: Some(10809),
        }
    }
}

fn default_socks_port() -> u16 {
    10808
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleServerConfig {
    #[serde(default)]
    pub tag: String,
    pub protocol: ProxyProtocol,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub port: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternetConfig {
    #[serde(default = "default_direct_tag")]
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    #[serde(default = "default_block_tag")]
    pub tag: String,
}

fn default_direct_tag() -> String {
    "direct".into()
}

fn default_block_tag() -> String {
    "block".into()
}

// =============================================================================
// PROJECT ENVELOPE
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectMode {
    #[default]
    Simple,
    Infrastructure,
}

/// The tool's own project file: graph, servers and bookkeeping metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub version: String,
    pub name: String,
    pub mode: ProjectMode,
    pub servers: Vec<Server>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: ProjectMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}
