//! MQTT over WebSocket.
//!
//! Each session gets its own `rumqttc` client and an event-loop task on the
//! current tokio runtime. The task translates broker packets into
//! [`TransportEvent`]s and owns the reconnect policy: after any failure it
//! reports `Error` and `Offline`, waits the fixed reconnect interval, reports
//! `Reconnecting` and polls again.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rumqttc::{
    AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, SubscribeReasonCode,
    Transport,
};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{SessionId, TransportEvent, TransportEventKind};
use crate::error::TransportError;
use crate::ports::{BrokerSession, BrokerTransport, ConnectOptions, EventSender};

/// Capacity of the client request queue (subscribe/disconnect requests).
const REQUEST_CAPACITY: usize = 32;

/// Broker transport backed by `rumqttc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MqttTransport;

impl MqttTransport {
    pub fn new() -> Self {
        Self
    }
}

/// Build client options for a `ws://` or `wss://` endpoint.
fn mqtt_options(options: &ConnectOptions) -> Result<MqttOptions, TransportError> {
    let url = Url::parse(&options.endpoint)
        .map_err(|e| TransportError::Connect(format!("{}: {}", options.endpoint, e)))?;
    let port = url.port_or_known_default().ok_or_else(|| {
        TransportError::Connect(format!("{}: no port for scheme", options.endpoint))
    })?;

    // rumqttc panics on sub-second keep-alives
    if !options.keep_alive.is_zero() && options.keep_alive < Duration::from_secs(1) {
        return Err(TransportError::Connect(format!(
            "keep-alive must be at least 1s, got {}ms",
            options.keep_alive.as_millis()
        )));
    }

    // For WebSocket transports rumqttc takes the whole URL as the host.
    let mut mqtt = MqttOptions::new(options.client_id.clone(), options.endpoint.clone(), port);
    mqtt.set_clean_session(options.clean_session);
    mqtt.set_keep_alive(options.keep_alive);

    match url.scheme() {
        "ws" => {
            mqtt.set_transport(Transport::Ws);
        }
        "wss" => {
            mqtt.set_transport(Transport::wss_with_default_config());
        }
        other => {
            return Err(TransportError::Connect(format!(
                "unsupported scheme {}",
                other
            )))
        }
    }

    Ok(mqtt)
}

impl BrokerTransport for MqttTransport {
    fn connect(
        &self,
        options: ConnectOptions,
        events: EventSender,
    ) -> Result<Box<dyn BrokerSession>, TransportError> {
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        let mqtt = mqtt_options(&options)?;
        let (client, eventloop) = AsyncClient::new(mqtt, REQUEST_CAPACITY);

        let shared = Arc::new(SessionShared {
            pending: Mutex::new(VecDeque::new()),
            closing: AtomicBool::new(false),
        });

        let worker = EventLoopWorker {
            session: options.session,
            events,
            shared: shared.clone(),
            connect_timeout: options.connect_timeout,
            reconnect_interval: options.reconnect_interval,
            inflight: HashMap::new(),
        };

        debug!(
            session = %options.session,
            endpoint = %options.endpoint,
            "Spawning broker event loop"
        );
        let task = runtime.spawn(worker.run(eventloop));

        Ok(Box::new(MqttSession {
            client,
            shared,
            task: Some(task),
        }))
    }
}

/// State shared between a session handle and its event-loop task.
struct SessionShared {
    /// Topics whose SUBSCRIBE has been queued but not yet sent, oldest first.
    pending: Mutex<VecDeque<String>>,
    /// Set by a graceful close; the loop exits at the next DISCONNECT or error.
    closing: AtomicBool,
}

struct EventLoopWorker {
    session: SessionId,
    events: EventSender,
    shared: Arc<SessionShared>,
    connect_timeout: Duration,
    reconnect_interval: Duration,
    /// Packet id of each sent SUBSCRIBE, awaiting its SUBACK
    inflight: HashMap<u16, String>,
}

impl EventLoopWorker {
    fn emit(&self, kind: TransportEventKind) {
        // Receiver gone means the feed was dropped; nothing left to report to.
        let _ = self.events.send(TransportEvent::new(self.session, kind));
    }

    fn closing(&self) -> bool {
        self.shared.closing.load(Ordering::Acquire)
    }

    async fn run(mut self, mut eventloop: EventLoop) {
        let mut connected_once = false;

        loop {
            let polled = if connected_once {
                eventloop.poll().await.map_err(|e| e.to_string())
            } else {
                match tokio::time::timeout(self.connect_timeout, eventloop.poll()).await {
                    Ok(result) => result.map_err(|e| e.to_string()),
                    Err(_) => Err(format!(
                        "connect timed out after {}ms",
                        self.connect_timeout.as_millis()
                    )),
                }
            };

            match polled {
                Ok(event) => {
                    if let Event::Incoming(Packet::ConnAck(_)) = &event {
                        connected_once = true;
                    }
                    if !self.on_event(event) {
                        break;
                    }
                }
                Err(reason) => {
                    if self.closing() {
                        self.emit(TransportEventKind::Closed);
                        break;
                    }
                    warn!(session = %self.session, error = %reason, "Broker connection lost");
                    self.forget_subscribes();
                    self.emit(TransportEventKind::Error(reason));
                    self.emit(TransportEventKind::Offline);
                    tokio::time::sleep(self.reconnect_interval).await;
                    self.emit(TransportEventKind::Reconnecting);
                }
            }
        }

        debug!(session = %self.session, "Broker event loop finished");
    }

    /// Drop SUBSCRIBE bookkeeping of a lost connection. The manager issues
    /// fresh requests for the full topic set on the next CONNACK.
    fn forget_subscribes(&mut self) {
        self.inflight.clear();
        self.shared.pending.lock().clear();
    }

    /// Handle one event. Returns `false` when the loop should stop.
    fn on_event(&mut self, event: Event) -> bool {
        match event {
            Event::Incoming(Packet::ConnAck(ack)) => {
                info!(session = %self.session, session_present = ack.session_present, "CONNACK");
                self.emit(TransportEventKind::Connected);
            }
            Event::Incoming(Packet::Publish(publish)) => {
                self.emit(TransportEventKind::Message {
                    topic: publish.topic,
                    payload: publish.payload,
                });
            }
            Event::Outgoing(Outgoing::Subscribe(pkid)) => {
                if let Some(topic) = self.shared.pending.lock().pop_front() {
                    self.inflight.insert(pkid, topic);
                }
            }
            Event::Incoming(Packet::SubAck(ack)) => {
                let Some(topic) = self.inflight.remove(&ack.pkid) else {
                    debug!(pkid = ack.pkid, "SUBACK for unknown packet id");
                    return true;
                };
                let failed = ack
                    .return_codes
                    .iter()
                    .any(|code| matches!(code, SubscribeReasonCode::Failure));
                if failed {
                    self.emit(TransportEventKind::SubscribeFailed {
                        topic,
                        reason: "broker refused subscription".to_string(),
                    });
                } else {
                    self.emit(TransportEventKind::Subscribed { topic });
                }
            }
            Event::Outgoing(Outgoing::Disconnect) => {
                if self.closing() {
                    self.emit(TransportEventKind::Closed);
                    return false;
                }
            }
            Event::Incoming(Packet::Disconnect) => {
                debug!(session = %self.session, "Broker sent DISCONNECT");
            }
            _ => {}
        }
        true
    }
}

/// Handle to one rumqttc session.
struct MqttSession {
    client: AsyncClient,
    shared: Arc<SessionShared>,
    task: Option<JoinHandle<()>>,
}

impl BrokerSession for MqttSession {
    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        if self.task.is_none() {
            return Err(TransportError::Closed);
        }

        let mut pending = self.shared.pending.lock();
        pending.push_back(topic.to_string());
        if let Err(e) = self.client.try_subscribe(topic, QoS::AtMostOnce) {
            pending.pop_back();
            return Err(TransportError::Subscribe {
                topic: topic.to_string(),
                reason: e.to_string(),
            });
        }
        Ok(())
    }

    fn close(&mut self, force: bool) {
        let Some(task) = self.task.take() else {
            return;
        };

        if force {
            task.abort();
            return;
        }

        self.shared.closing.store(true, Ordering::Release);
        if let Err(e) = self.client.try_disconnect() {
            debug!(error = %e, "DISCONNECT could not be queued, aborting event loop");
            task.abort();
        }
    }
}

impl Drop for MqttSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
