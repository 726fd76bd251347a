use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use vt_core::{ConnectionId, IceCandidate, IceServerConfig, SdpType, SessionDescription};
use vt_peer::{PeerError, PeerTransport, TransportEvent, TransportFactory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    CreateOffer,
    CreateAnswer,
    SetLocal(SdpType),
    SetRemote(SdpType),
    AddCandidate(String),
    OpenDataChannel(String),
    Send(String),
    Close,
}

/// In-memory transport that records every call and lets the test inject
/// transport events.
pub struct MockTransport {
    pub peer: ConnectionId,
    pub ice_servers: Vec<IceServerConfig>,
    events: mpsc::Sender<TransportEvent>,
    calls: Mutex<Vec<TransportCall>>,
    local: Mutex<Option<SessionDescription>>,
    gathered: Mutex<Vec<String>>,
    rejected: Mutex<Vec<String>>,
    fail_offers: bool,
}

impl MockTransport {
    pub fn new(
        peer: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
        events: mpsc::Sender<TransportEvent>,
    ) -> Self {
        Self {
            peer,
            ice_servers,
            events,
            calls: Mutex::new(Vec::new()),
            local: Mutex::new(None),
            gathered: Mutex::new(Vec::new()),
            rejected: Mutex::new(Vec::new()),
            fail_offers: false,
        }
    }

    /// A transport whose `create_offer` always errors.
    pub fn failing_offers(
        peer: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
        events: mpsc::Sender<TransportEvent>,
    ) -> Self {
        Self {
            fail_offers: true,
            ..Self::new(peer, ice_servers, events)
        }
    }

    /// `add_ice_candidate` errors for this candidate line and leaves it unapplied.
    pub fn reject_candidate(&self, candidate: &str) {
        self.rejected.lock().unwrap().push(candidate.to_string());
    }

    /// Standalone transport plus the receiving end of its event channel.
    pub fn standalone(peer: &str) -> (Arc<Self>, mpsc::Receiver<TransportEvent>) {
        let (tx, rx) = mpsc::channel(64);
        (Arc::new(Self::new(ConnectionId::from(peer), Vec::new(), tx)), rx)
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn applied_candidates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::AddCandidate(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn sent(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Send(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, call: &TransportCall) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }

    pub async fn emit(&self, event: TransportEvent) {
        self.events.send(event).await.unwrap();
    }

    /// Simulates gathering one local candidate.
    pub async fn gather(&self, candidate: &str) {
        self.gathered.lock().unwrap().push(candidate.to_string());
        self.emit(TransportEvent::LocalCandidate(IceCandidate::new(candidate)))
            .await;
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn description(&self, sdp_type: SdpType) -> SessionDescription {
        let sdp = format!("v=0\r\ns=mock-{}\r\n", self.peer);
        match sdp_type {
            SdpType::Offer => SessionDescription::offer(sdp),
            SdpType::Answer => SessionDescription::answer(sdp),
        }
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_offer(&self) -> Result<SessionDescription, PeerError> {
        self.record(TransportCall::CreateOffer);
        if self.fail_offers {
            return Err(PeerError::Transport("offer rejected".to_string()));
        }
        Ok(self.description(SdpType::Offer))
    }

    async fn create_answer(&self) -> Result<SessionDescription, PeerError> {
        self.record(TransportCall::CreateAnswer);
        Ok(self.description(SdpType::Answer))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), PeerError> {
        self.record(TransportCall::SetLocal(desc.sdp_type));
        *self.local.lock().unwrap() = Some(desc);
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), PeerError> {
        self.record(TransportCall::SetRemote(desc.sdp_type));
        Ok(())
    }

    async fn local_description(&self) -> Option<SessionDescription> {
        let mut desc = self.local.lock().unwrap().clone()?;
        for candidate in self.gathered.lock().unwrap().iter() {
            desc.sdp.push_str(&format!("a={candidate}\r\n"));
        }
        Some(desc)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), PeerError> {
        if self.rejected.lock().unwrap().contains(&candidate.candidate) {
            return Err(PeerError::Transport(format!(
                "malformed candidate {}",
                candidate.candidate
            )));
        }
        self.record(TransportCall::AddCandidate(candidate.candidate));
        Ok(())
    }

    async fn open_data_channel(&self, label: &str) -> Result<(), PeerError> {
        self.record(TransportCall::OpenDataChannel(label.to_string()));
        Ok(())
    }

    async fn send(&self, payload: &str) -> Result<(), PeerError> {
        self.record(TransportCall::Send(payload.to_string()));
        Ok(())
    }

    async fn close(&self) -> Result<(), PeerError> {
        self.record(TransportCall::Close);
        Ok(())
    }
}

/// Factory handing each created [`MockTransport`] back to the test.
pub struct MockTransportFactory {
    created: mpsc::UnboundedSender<Arc<MockTransport>>,
    fail_offers: bool,
}

impl MockTransportFactory {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Arc<MockTransport>>) {
        let (created, rx) = mpsc::unbounded_channel();
        let factory = Self {
            created,
            fail_offers: false,
        };
        (Arc::new(factory), rx)
    }

    /// Every transport it creates fails `create_offer`.
    pub fn failing_offers() -> (Arc<Self>, mpsc::UnboundedReceiver<Arc<MockTransport>>) {
        let (created, rx) = mpsc::unbounded_channel();
        let factory = Self {
            created,
            fail_offers: true,
        };
        (Arc::new(factory), rx)
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn create(
        &self,
        peer: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>, PeerError> {
        let transport = if self.fail_offers {
            MockTransport::failing_offers(peer, ice_servers, events)
        } else {
            MockTransport::new(peer, ice_servers, events)
        };
        let transport = Arc::new(transport);
        let _ = self.created.send(transport.clone());
        Ok(transport)
    }
}
