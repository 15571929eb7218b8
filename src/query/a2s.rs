//! Source engine `A2S_INFO` query over UDP
//!
//! ## Exchange
//!
//! ```text
//! client → FF FF FF FF 54 "Source Engine Query\0" [challenge]
//! server → FF FF FF FF 41 <challenge: 4 bytes>        (resend with challenge)
//! server → FF FF FF FF 49 <info payload>              (done)
//! ```
//!
//! Only single-packet info replies are understood. Split packets, the legacy
//! GoldSource reply and anything truncated are reported as malformed.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::{instrument, trace};

use crate::{Endpoint, ServerStatus, error::QueryError};

use super::StatusQuery;

const SINGLE_PACKET: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
const SPLIT_PACKET: [u8; 4] = [0xFE, 0xFF, 0xFF, 0xFF];

const A2S_INFO: u8 = 0x54;
const S2A_INFO: u8 = 0x49;
const S2C_CHALLENGE: u8 = 0x41;

const INFO_PAYLOAD: &[u8] = b"Source Engine Query\0";

const MAX_PACKET_SIZE: usize = 1400;

/// Challenged resends allowed after the first request.
const MAX_CHALLENGES: usize = 1;

/// Build an `A2S_INFO` request, optionally carrying a challenge.
pub fn info_request(challenge: Option<[u8; 4]>) -> Vec<u8> {
    let mut request = Vec::with_capacity(SINGLE_PACKET.len() + 1 + INFO_PAYLOAD.len() + 4);
    request.extend_from_slice(&SINGLE_PACKET);
    request.push(A2S_INFO);
    request.extend_from_slice(INFO_PAYLOAD);
    if let Some(challenge) = challenge {
        request.extend_from_slice(&challenge);
    }
    request
}

/// Decoded `S2A_INFO` payload (leading fields only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoResponse {
    pub protocol: u8,
    pub name: String,
    pub map: String,
    pub folder: String,
    pub game: String,
    pub app_id: i16,
    pub players: u8,
    pub max_players: u8,
}

impl From<InfoResponse> for ServerStatus {
    fn from(info: InfoResponse) -> Self {
        ServerStatus::new(info.name, info.players.into(), info.max_players.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoReply {
    Info(InfoResponse),
    Challenge([u8; 4]),
}

pub fn parse_reply(packet: &[u8]) -> Result<InfoReply, QueryError> {
    let mut reader = Reader::new(packet);

    let header: [u8; 4] = reader.array("header")?;
    if header == SPLIT_PACKET {
        return Err(QueryError::malformed("split packets are not supported"));
    }
    if header != SINGLE_PACKET {
        return Err(QueryError::malformed(format!("unexpected header {header:02x?}")));
    }

    match reader.u8("reply type")? {
        S2C_CHALLENGE => Ok(InfoReply::Challenge(reader.array("challenge")?)),
        S2A_INFO => {
            let info = InfoResponse {
                protocol: reader.u8("protocol")?,
                name: reader.cstring("name")?,
                map: reader.cstring("map")?,
                folder: reader.cstring("folder")?,
                game: reader.cstring("game")?,
                app_id: i16::from_le_bytes(reader.array("app id")?),
                players: reader.u8("players")?,
                max_players: reader.u8("max players")?,
            };
            Ok(InfoReply::Info(info))
        }
        other => Err(QueryError::malformed(format!("unexpected reply type 0x{other:02x}"))),
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8], QueryError> {
        let end = self.pos + len;
        let Some(bytes) = self.buf.get(self.pos..end) else {
            return Err(QueryError::malformed(format!("truncated at {field}")));
        };
        self.pos = end;
        Ok(bytes)
    }

    fn u8(&mut self, field: &str) -> Result<u8, QueryError> {
        Ok(self.take(1, field)?[0])
    }

    fn array<const N: usize>(&mut self, field: &str) -> Result<[u8; N], QueryError> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    fn cstring(&mut self, field: &str) -> Result<String, QueryError> {
        let rest = &self.buf[self.pos..];
        let Some(nul) = rest.iter().position(|b| *b == 0) else {
            return Err(QueryError::malformed(format!("unterminated {field}")));
        };
        let value = String::from_utf8_lossy(&rest[..nul]).into_owned();
        self.pos += nul + 1;
        Ok(value)
    }
}

/// `A2S_INFO` client
///
/// Every query opens its own socket; dropping the query future (timeout or
/// shutdown) closes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct A2sClient;

impl A2sClient {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self), fields(endpoint = %endpoint))]
    async fn exchange(&self, endpoint: Endpoint) -> Result<ServerStatus, QueryError> {
        let local: SocketAddr = if endpoint.address.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(endpoint.socket_addr()).await?;

        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        let mut request = info_request(None);

        for _ in 0..=MAX_CHALLENGES {
            socket.send(&request).await?;
            let len = socket.recv(&mut buf).await?;

            match parse_reply(&buf[..len])? {
                InfoReply::Info(info) => {
                    trace!(
                        "{}: {}/{} on {}",
                        info.name, info.players, info.max_players, info.map
                    );
                    return Ok(info.into());
                }
                InfoReply::Challenge(challenge) => {
                    trace!("answering challenge {challenge:02x?}");
                    request = info_request(Some(challenge));
                }
            }
        }

        Err(QueryError::malformed("server kept answering with challenges"))
    }
}

#[async_trait]
impl StatusQuery for A2sClient {
    async fn query(
        &self,
        endpoint: Endpoint,
        timeout: Duration,
    ) -> Result<ServerStatus, QueryError> {
        tokio::time::timeout(timeout, self.exchange(endpoint))
            .await
            .map_err(|_| QueryError::Timeout(timeout))?
    }
}
