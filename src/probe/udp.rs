//! UDP probe - sends a minimal DNS query and waits for any answer

use crate::probe::socket::resolve;
use crate::probe::{Probe, ProbeError, ProbeOutcome};
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::debug;

/// DNS port
pub const DNS_PORT: u16 = 53;

/// Name asked for in every query
pub const QUERY_NAME: &str = "example.com";

/// Largest classic DNS-over-UDP message
const MAX_REPLY: usize = 512;

const FLAG_RECURSION_DESIRED: u16 = 0x0100;
const QTYPE_A: u16 = 1;
const QCLASS_IN: u16 = 1;

/// Encode a standard recursive A/IN query for `name`
///
/// Header is 12 bytes big-endian: id, flags, qdcount=1, an/ns/ar=0.
pub fn encode_query(transaction_id: u16, name: &str) -> Vec<u8> {
    let mut packet = Vec::with_capacity(12 + name.len() + 6);
    packet.extend_from_slice(&transaction_id.to_be_bytes());
    packet.extend_from_slice(&FLAG_RECURSION_DESIRED.to_be_bytes());
    packet.extend_from_slice(&1u16.to_be_bytes());
    packet.extend_from_slice(&[0u8; 6]);

    for label in name.split('.').filter(|l| !l.is_empty()) {
        packet.push(label.len() as u8);
        packet.extend_from_slice(label.as_bytes());
    }
    packet.push(0);

    packet.extend_from_slice(&QTYPE_A.to_be_bytes());
    packet.extend_from_slice(&QCLASS_IN.to_be_bytes());
    packet
}

/// Transaction id of a reply, if it is long enough to carry a header
pub fn reply_id(reply: &[u8]) -> Option<u16> {
    if reply.len() < 12 {
        return None;
    }
    Some(u16::from_be_bytes([reply[0], reply[1]]))
}

/// Queries a DNS server over UDP and measures the round trip
#[derive(Debug, Clone)]
pub struct UdpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl UdpProbe {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port: DNS_PORT,
            timeout,
        }
    }

    /// Query a non-standard port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[async_trait]
impl Probe for UdpProbe {
    fn name(&self) -> &str {
        "udp"
    }

    async fn measure(&self) -> Result<ProbeOutcome, ProbeError> {
        let target = resolve(&self.host, self.port).await?;
        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        let transaction_id: u16 = rand::random();
        let query = encode_query(transaction_id, QUERY_NAME);

        let budget = self.timeout;
        let started = Instant::now();
        let len = timeout(budget, async {
            socket.send_to(&query, target).await?;
            let mut buf = [0u8; MAX_REPLY];
            let (len, from) = socket.recv_from(&mut buf).await?;
            debug!("{} byte UDP reply from {}", len, from);
            match reply_id(&buf[..len]) {
                Some(id) if id == transaction_id => Ok(len),
                Some(id) => Err(ProbeError::Protocol(format!(
                    "reply id {:#06x} does not match query id {:#06x}",
                    id, transaction_id
                ))),
                None => Err(ProbeError::Protocol(format!("{} byte reply is too short", len))),
            }
        })
        .await
        .map_err(|_| ProbeError::Timeout(budget.as_secs_f64()))??;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!("DNS reply of {} bytes in {:.1} ms", len, elapsed_ms);
        Ok(ProbeOutcome::reachable(elapsed_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_query_layout() {
        let packet = encode_query(0xBEEF, "example.com");

        assert_eq!(&packet[..12], &[0xBE, 0xEF, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&packet[12..25], b"\x07example\x03com\x00");
        assert_eq!(&packet[25..], &[0, 1, 0, 1]);
        assert_eq!(packet.len(), 29);
    }

    #[test]
    fn test_reply_id() {
        assert_eq!(reply_id(&encode_query(0x1234, "a.b")), Some(0x1234));
        assert_eq!(reply_id(&[0x12, 0x34]), None);
    }

    /// Fake DNS server answering with the query's header, optionally mangling the id
    async fn echo_server(mangle_id: bool) -> u16 {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            if let Ok((len, from)) = server.recv_from(&mut buf).await {
                if mangle_id {
                    buf[0] ^= 0xFF;
                }
                let _ = server.send_to(&buf[..len], from).await;
            }
        });
        port
    }

    #[tokio::test]
    async fn test_matching_reply_is_reachable() {
        let port = echo_server(false).await;
        let probe = UdpProbe::new("127.0.0.1", Duration::from_secs(1)).with_port(port);

        let outcome = probe.check().await;
        assert!(outcome.reachable);
    }

    #[tokio::test]
    async fn test_mismatched_reply_is_unreachable() {
        let port = echo_server(true).await;
        let probe = UdpProbe::new("127.0.0.1", Duration::from_secs(1)).with_port(port);

        assert!(matches!(probe.measure().await, Err(ProbeError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        // Bound but never answers
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = silent.local_addr().unwrap().port();

        let probe = UdpProbe::new("127.0.0.1", Duration::from_millis(200)).with_port(port);
        assert!(matches!(probe.measure().await, Err(ProbeError::Timeout(_))));
        drop(silent);
    }
}
