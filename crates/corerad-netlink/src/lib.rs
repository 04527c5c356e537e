// # Netlink Interface Sources
//
// Linux implementations of the CoreRAD operating system boundaries:
//
// - `NetlinkAddressSource`: enumerates interface addresses with getifaddrs(3)
// - `NetlinkLinkStateSource`: streams RTM_NEWLINK/RTM_DELLINK events from an
//   rtnetlink socket subscribed to RTMGRP_LINK
//
// ## Platform Support
//
// Both types exist on every platform so the daemon builds everywhere, but
// outside Linux every operation returns an error.

use async_trait::async_trait;
use corerad_core::traits::{AddressSource, InterfaceAddr, LinkEventStream, LinkStateSource};
use corerad_core::{Error, Result};

/// Interface address enumeration via getifaddrs(3)
#[derive(Debug, Clone, Copy, Default)]
pub struct NetlinkAddressSource;

impl NetlinkAddressSource {
    pub fn new() -> Self {
        Self
    }
}

/// Link state events from rtnetlink
#[derive(Debug, Clone, Copy, Default)]
pub struct NetlinkLinkStateSource;

impl NetlinkLinkStateSource {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "linux")]
impl AddressSource for NetlinkAddressSource {
    fn addresses(&self, interface: &str) -> Result<Vec<InterfaceAddr>> {
        let addrs = nix::ifaddrs::getifaddrs()
            .map_err(|e| Error::address_source(format!("getifaddrs failed: {}", e)))?;

        let mut found = false;
        let mut out = Vec::new();
        for ifaddr in addrs.filter(|a| a.interface_name == interface) {
            found = true;
            if let Some(addr) = linux::interface_addr(&ifaddr) {
                out.push(addr);
            }
        }

        if !found {
            return Err(Error::address_source(format!(
                "interface {:?} does not exist",
                interface
            )));
        }

        Ok(out)
    }
}

#[cfg(not(target_os = "linux"))]
impl AddressSource for NetlinkAddressSource {
    fn addresses(&self, _interface: &str) -> Result<Vec<InterfaceAddr>> {
        Err(Error::address_source(
            "interface address enumeration is only supported on Linux",
        ))
    }
}

#[cfg(target_os = "linux")]
#[async_trait]
impl LinkStateSource for NetlinkLinkStateSource {
    async fn subscribe(&self) -> Result<LinkEventStream> {
        let socket = linux::LinkSocket::bind()?;
        let (tx, rx) = tokio::sync::mpsc::channel(64);

        tokio::spawn(linux::forward_events(socket, tx));

        Ok(Box::pin(tokio_stream::wrappers::ReceiverStream::new(rx)))
    }
}

#[cfg(not(target_os = "linux"))]
#[async_trait]
impl LinkStateSource for NetlinkLinkStateSource {
    async fn subscribe(&self) -> Result<LinkEventStream> {
        Err(Error::link_state("link state monitoring is only supported on Linux"))
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use corerad_core::traits::{InterfaceAddr, LinkEvent, LinkEventKind};
    use corerad_core::{Error, Result};
    use netlink_packet_core::{NetlinkMessage, NetlinkPayload};
    use netlink_packet_route::link::nlas::{Nla, State};
    use netlink_packet_route::{LinkMessage, RtnlMessage};
    use netlink_sys::{protocols::NETLINK_ROUTE, Socket, SocketAddr};
    use nix::ifaddrs::InterfaceAddress;
    use std::net::IpAddr;
    use tokio::io::unix::AsyncFd;
    use tokio::sync::mpsc;
    use tracing::{debug, trace};

    const RECV_BUFFER_SIZE: usize = 65536;

    /// Convert one getifaddrs entry; `None` for entries without an address
    pub(super) fn interface_addr(ifaddr: &InterfaceAddress) -> Option<InterfaceAddr> {
        let address = ifaddr.address.as_ref()?;

        if let Some(sin6) = address.as_sockaddr_in6() {
            let prefix_len = ifaddr
                .netmask
                .as_ref()
                .and_then(|m| m.as_sockaddr_in6())
                .map(|m| u128::from(m.ip()).count_ones() as u8)?;
            return Some(InterfaceAddr::ip(IpAddr::V6(sin6.ip()), prefix_len));
        }

        if let Some(sin) = address.as_sockaddr_in() {
            let prefix_len = ifaddr
                .netmask
                .as_ref()
                .and_then(|m| m.as_sockaddr_in())
                .map(|m| u32::from(m.ip()).count_ones() as u8)?;
            return Some(InterfaceAddr::ip(IpAddr::V4(sin.ip()), prefix_len));
        }

        Some(InterfaceAddr::Other(address.to_string()))
    }

    /// Non-blocking rtnetlink socket subscribed to link notifications
    pub(super) struct LinkSocket {
        inner: AsyncFd<Socket>,
        buffer: Vec<u8>,
    }

    impl LinkSocket {
        pub(super) fn bind() -> Result<Self> {
            let mut socket = Socket::new(NETLINK_ROUTE)
                .map_err(|e| Error::link_state(format!("failed to create netlink socket: {}", e)))?;

            socket
                .bind(&SocketAddr::new(0, libc::RTMGRP_LINK as u32))
                .map_err(|e| Error::link_state(format!("failed to bind netlink socket: {}", e)))?;

            socket
                .set_non_blocking(true)
                .map_err(|e| Error::link_state(format!("failed to set non-blocking mode: {}", e)))?;

            let inner = AsyncFd::new(socket)
                .map_err(|e| Error::link_state(format!("failed to register netlink socket: {}", e)))?;

            debug!("Netlink socket bound to RTMGRP_LINK");

            Ok(Self {
                inner,
                buffer: Vec::with_capacity(RECV_BUFFER_SIZE),
            })
        }

        /// Wait for the next datagram and decode the link events in it
        pub(super) async fn recv_events(&mut self) -> Result<Vec<LinkEvent>> {
            loop {
                let mut guard = self
                    .inner
                    .readable()
                    .await
                    .map_err(|e| Error::link_state(format!("netlink socket error: {}", e)))?;

                self.buffer.clear();
                let buffer = &mut self.buffer;
                match guard.try_io(|socket| socket.get_ref().recv(buffer, 0)) {
                    Ok(Ok(_)) => return parse_events(&self.buffer),
                    Ok(Err(e)) => {
                        return Err(Error::link_state(format!("netlink receive failed: {}", e)));
                    }
                    Err(_would_block) => continue,
                }
            }
        }
    }

    /// Pump events into `tx` until the receiver is dropped or the socket fails
    pub(super) async fn forward_events(mut socket: LinkSocket, tx: mpsc::Sender<Result<LinkEvent>>) {
        loop {
            let events = tokio::select! {
                _ = tx.closed() => return,
                events = socket.recv_events() => events,
            };

            match events {
                Ok(events) => {
                    for event in events {
                        if tx.send(Ok(event)).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            }
        }
    }

    pub(super) fn parse_events(buf: &[u8]) -> Result<Vec<LinkEvent>> {
        let mut events = Vec::new();
        let mut offset = 0;

        while offset < buf.len() {
            let msg = NetlinkMessage::<RtnlMessage>::deserialize(&buf[offset..])
                .map_err(|e| Error::link_state(format!("failed to parse netlink message: {}", e)))?;

            let len = msg.header.length as usize;
            if len == 0 {
                break;
            }
            // Netlink messages are 4-byte aligned.
            offset += (len + 3) & !3;

            if let Some(event) = link_event(&msg) {
                trace!(?event, "Decoded link event");
                events.push(event);
            }
        }

        Ok(events)
    }

    fn link_event(msg: &NetlinkMessage<RtnlMessage>) -> Option<LinkEvent> {
        match &msg.payload {
            NetlinkPayload::InnerMessage(RtnlMessage::NewLink(link)) => {
                let kind = match oper_state(link)? {
                    State::Up => LinkEventKind::Up,
                    _ => LinkEventKind::Down,
                };
                Some(LinkEvent::new(if_name(link)?, kind))
            }
            NetlinkPayload::InnerMessage(RtnlMessage::DelLink(link)) => {
                Some(LinkEvent::new(if_name(link)?, LinkEventKind::Removed))
            }
            _ => None,
        }
    }

    fn if_name(link: &LinkMessage) -> Option<String> {
        link.nlas.iter().find_map(|nla| match nla {
            Nla::IfName(name) => Some(name.clone()),
            _ => None,
        })
    }

    fn oper_state(link: &LinkMessage) -> Option<State> {
        link.nlas.iter().find_map(|nla| match nla {
            Nla::OperState(state) => Some(*state),
            _ => None,
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use netlink_packet_core::NetlinkHeader;

        fn encode(message: RtnlMessage) -> Vec<u8> {
            let mut msg = NetlinkMessage::new(NetlinkHeader::default(), NetlinkPayload::InnerMessage(message));
            msg.finalize();
            let mut buf = vec![0; msg.buffer_len()];
            msg.serialize(&mut buf);
            buf
        }

        fn link(name: &str, state: State) -> LinkMessage {
            let mut link = LinkMessage::default();
            link.nlas.push(Nla::IfName(name.to_string()));
            link.nlas.push(Nla::OperState(state));
            link
        }

        #[test]
        fn test_parse_link_events() {
            let mut buf = encode(RtnlMessage::NewLink(link("eth0", State::Up)));
            buf.extend(encode(RtnlMessage::NewLink(link("eth1", State::LowerLayerDown))));
            buf.extend(encode(RtnlMessage::DelLink(link("eth2", State::Down))));

            let events = parse_events(&buf).unwrap();
            assert_eq!(
                events,
                vec![
                    LinkEvent::new("eth0", LinkEventKind::Up),
                    LinkEvent::new("eth1", LinkEventKind::Down),
                    LinkEvent::new("eth2", LinkEventKind::Removed),
                ]
            );
        }

        #[test]
        fn test_parse_skips_links_without_state() {
            let mut link = LinkMessage::default();
            link.nlas.push(Nla::IfName("eth0".to_string()));

            let events = parse_events(&encode(RtnlMessage::NewLink(link))).unwrap();
            assert!(events.is_empty());
        }

        #[test]
        fn test_parse_garbage() {
            assert!(parse_events(&[0xff; 7]).is_err());
        }
    }
}
