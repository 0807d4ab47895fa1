//! Multi-telegram procedures on the whole chain.

use osplink_frame::{address, build_telegram, Header, Topology};
use osplink_transport::Status;
use tracing::debug;

use crate::station::Station;

const TID_RESET: u8 = 0x00;
const TID_INITBIDIR: u8 = 0x02;
const TID_INITLOOP: u8 = 0x03;
const TID_IDENTIFY: u8 = 0x07;

/// Response size of INITBIDIR/INITLOOP (temperature and status).
const INIT_RESPONSE_SIZE: usize = 4 + 2;
/// Response size of IDENTIFY (32-bit id).
const IDENTIFY_RESPONSE_SIZE: usize = 4 + 4;

/// Chain layout found by [`reset_init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    /// Address of the last node; nodes are numbered 1 up to this.
    pub last: u16,
    pub topology: Topology,
}

/// One node found by [`enumerate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub address: u16,
    pub id: u32,
}

/// Reset the chain and assign addresses.
///
/// Tries INITLOOP first; when that gets no valid answer the chain is reset
/// again and INITBIDIR is tried. The transport topology follows the
/// attempt that succeeded.
pub fn reset_init(station: &mut Station) -> Result<Chain, Status> {
    station.chain = None;
    let mut last_status = Status::Ok;
    for (topology, tid) in [(Topology::Loop, TID_INITLOOP), (Topology::Bidir, TID_INITBIDIR)] {
        let reset = build_telegram(address::BROADCAST, TID_RESET, &[], station.checksum);
        let status = station.transmit(&reset);
        if !status.is_ok() {
            return Err(status);
        }

        station.transport.set_topology(topology);
        let init = build_telegram(address::UNICAST_MIN, tid, &[], station.checksum);
        let (response, status) = station.transmit_receive(&init, Some(INIT_RESPONSE_SIZE));
        match Header::parse(&response) {
            Some(header) if status.is_ok() => {
                debug!(%topology, last = header.address, "chain initialized");
                let chain = Chain {
                    last: header.address,
                    topology,
                };
                station.chain = Some(chain);
                return Ok(chain);
            }
            _ => {
                debug!(%topology, %status, "init attempt failed");
                last_status = status;
            }
        }
    }
    Err(last_status)
}

/// Ask one node for its 32-bit identification word.
pub fn identify(station: &mut Station, addr: u16) -> Result<u32, Status> {
    let query = build_telegram(addr, TID_IDENTIFY, &[], station.checksum);
    let (response, status) = station.transmit_receive(&query, Some(IDENTIFY_RESPONSE_SIZE));
    if !status.is_ok() {
        return Err(status);
    }
    Ok(response[3..7]
        .iter()
        .fold(0u32, |id, &b| (id << 8) | u32::from(b)))
}

/// Reset the chain, then ask every node for its identity.
pub fn enumerate(station: &mut Station) -> Result<(Chain, Vec<Node>), (u16, Status)> {
    let chain = reset_init(station).map_err(|status| (0, status))?;
    let mut nodes = Vec::with_capacity(usize::from(chain.last));
    for addr in address::UNICAST_MIN..=chain.last {
        let id = identify(station, addr).map_err(|status| (addr, status))?;
        nodes.push(Node { address: addr, id });
    }
    Ok((chain, nodes))
}
