//! Session identity and lifecycle state.

use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

/// Identity of one broker session.
///
/// Every event coming back from a transport is tagged with the id of the
/// session that produced it, so callbacks that arrive after teardown can be
/// told apart from the live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random session id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form for logs and the dashboard.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection status shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl LifecycleState {
    /// Capitalised display label.
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Disconnected => "Disconnected",
            LifecycleState::Connecting => "Connecting",
            LifecycleState::Connected => "Connected",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Generate a unique client identity from a prefix.
///
/// Brokers kick an existing connection when a second one presents the same
/// client id, so each session gets its own.
pub fn generate_client_id(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &suffix[..12])
}

/// One broker connection, owned by the connection manager.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    client_id: String,
    endpoint: String,
    topics: Vec<String>,
    subscribed: BTreeSet<String>,
    state: LifecycleState,
    connects: u32,
}

impl Session {
    /// Create a session in the `Connecting` state.
    pub fn new(client_id: String, endpoint: String, topics: Vec<String>) -> Self {
        Self {
            id: SessionId::new(),
            client_id,
            endpoint,
            topics,
            subscribed: BTreeSet::new(),
            state: LifecycleState::Connecting,
            connects: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The fixed topic set requested on every connect.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Topics the broker has acknowledged on the current connection.
    pub fn subscribed(&self) -> &BTreeSet<String> {
        &self.subscribed
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Number of successful connects, including reconnects.
    pub fn connects(&self) -> u32 {
        self.connects
    }

    pub(crate) fn set_state(&mut self, state: LifecycleState) {
        self.state = state;
    }

    pub(crate) fn mark_connected(&mut self) {
        self.state = LifecycleState::Connected;
        self.connects += 1;
        self.subscribed.clear();
    }

    pub(crate) fn mark_subscribed(&mut self, topic: &str) {
        self.subscribed.insert(topic.to_string());
    }

    pub(crate) fn mark_lost(&mut self, state: LifecycleState) {
        self.state = state;
        self.subscribed.clear();
    }
}
