//! Procedures for SAID nodes: identity check, OTP access and the I2C bridge.
//!
//! A SAID may route one of its channels to an I2C bus. The bridge is
//! enabled by an OTP bit; once powered, I2C transfers are started with a
//! telegram and completed by polling the bridge configuration.

use osplink_frame::build_telegram;
use osplink_transport::Status;
use thiserror::Error;
use tracing::debug;

use crate::procedures::identify;
use crate::station::Station;

const TID_CUST: u8 = 0x13;
const TID_SETTESTPW: u8 = 0x15;
const TID_SETCURCHN: u8 = 0x51;
const TID_READOTP: u8 = 0x58;
const TID_SETOTP: u8 = 0x59;
const TID_READI2CCFG: u8 = 0x5A;
const TID_SETI2CCFG: u8 = 0x5B;
const TID_I2CREAD8: u8 = 0x5C;
const TID_I2CWRITE8: u8 = 0x5D;
const TID_READLAST: u8 = 0x5E;

/// Password value meaning "never configured".
pub const PASSWORD_UNSET: u64 = 0xFFFF_FFFF_FFFF;
/// Widest password (48 bits).
pub const PASSWORD_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// First byte of the customer OTP area.
pub const OTP_CUSTOMER_MIN: u8 = 0x0D;
/// Last byte of the customer OTP area.
pub const OTP_CUSTOMER_MAX: u8 = 0x1F;
/// Bytes returned by one READOTP.
pub const OTP_READ_SIZE: usize = 8;

const OTP_I2C_ADDR: u8 = 0x0D;
/// OTP bit at `OTP_I2C_ADDR` that enables the I2C bridge.
pub const OTP_I2C_BRIDGE_EN: u8 = 0x08;

/// Channel that carries the I2C bus, and its setcurchn flags to power it.
const I2C_CHANNEL: u8 = 0x02;
const I2C_CHANNEL_POWER: u8 = 0x04;

pub const I2C_FLAG_BUSY: u8 = 0x01;
pub const I2C_FLAG_NACK: u8 = 0x02;

/// Fastest speed code.
pub const I2C_SPEED_MAX: u8 = 1;
/// Slowest speed code.
pub const I2C_SPEED_MIN: u8 = 15;

/// Most bytes one I2C read or write moves.
pub const I2C_MAX_COUNT: usize = 8;
/// Data byte counts i2cwrite8 accepts.
pub const I2C_WRITE_COUNTS: [usize; 4] = [1, 2, 4, 6];

/// Polls of the bridge configuration before a transfer counts as hung.
const I2C_POLLS: usize = 4;

/// Why a SAID procedure failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SaidError {
    #[error("{0}")]
    Bus(Status),

    #[error("not_said")]
    NotSaid { id: u32 },

    #[error("no_i2c_bridge")]
    NoI2cBridge,

    #[error("i2c_nack")]
    I2cNack,

    #[error("i2c_timeout")]
    I2cTimeout,
}

impl From<Status> for SaidError {
    fn from(status: Status) -> Self {
        Self::Bus(status)
    }
}

pub type Result<T> = std::result::Result<T, SaidError>;

/// Whether an identification word belongs to a SAID.
pub fn is_said(id: u32) -> bool {
    id & 0xFFFF_FFF0 == 0x0000_0040
}

/// I2C bus frequency in Hz for a speed code.
pub fn speed_hz(speed: u8) -> u32 {
    1_000_000 / u32::from((speed & 0x0F).max(1))
}

/// Fastest speed code whose frequency does not exceed `hz`.
pub fn speed_for_hz(hz: i32) -> u8 {
    let mut speed = I2C_SPEED_MAX;
    while speed != I2C_SPEED_MIN && i64::from(hz) < i64::from(speed_hz(speed)) {
        speed += 1;
    }
    speed
}

/// Bridge configuration as returned by READI2CCFG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cConfig {
    pub flags: u8,
    pub speed: u8,
}

fn send(station: &mut Station, addr: u16, tid: u8, payload: &[u8]) -> Result<()> {
    let frame = build_telegram(addr, tid, payload, station.checksum);
    match station.transmit(&frame) {
        Status::Ok => Ok(()),
        status => Err(status.into()),
    }
}

/// Exchange one telegram and return the `size` payload bytes of its response.
fn query(
    station: &mut Station,
    addr: u16,
    tid: u8,
    payload: &[u8],
    size: usize,
) -> Result<Vec<u8>> {
    let frame = build_telegram(addr, tid, payload, station.checksum);
    let (response, status) =
        station.transmit_receive(&frame, Some(osplink_frame::MIN_TELEGRAM_SIZE + size));
    if !status.is_ok() {
        return Err(status.into());
    }
    let start = osplink_frame::HEADER_SIZE;
    Ok(response[start..start + size].to_vec())
}

/// Identify `addr` and fail unless it is a SAID.
pub fn require_said(station: &mut Station, addr: u16) -> Result<u32> {
    let id = identify(station, addr)?;
    if !is_said(id) {
        return Err(SaidError::NotSaid { id });
    }
    Ok(id)
}

/// Read eight OTP bytes starting at `otpaddr`.
pub fn read_otp(station: &mut Station, addr: u16, otpaddr: u8) -> Result<[u8; OTP_READ_SIZE]> {
    let bytes = query(station, addr, TID_READOTP, &[otpaddr], OTP_READ_SIZE)?;
    let mut otp = [0u8; OTP_READ_SIZE];
    otp.copy_from_slice(&bytes);
    Ok(otp)
}

/// The whole customer OTP area, `OTP_CUSTOMER_MIN` first.
pub fn dump_customer_otp(station: &mut Station, addr: u16) -> Result<Vec<u8>> {
    let len = usize::from(OTP_CUSTOMER_MAX - OTP_CUSTOMER_MIN) + 1;
    let mut area = Vec::with_capacity(len + OTP_READ_SIZE);
    let mut otpaddr = OTP_CUSTOMER_MIN;
    while area.len() < len {
        area.extend_from_slice(&read_otp(station, addr, otpaddr)?);
        otpaddr += OTP_READ_SIZE as u8;
    }
    area.truncate(len);
    Ok(area)
}

/// Write one byte of the OTP mirror.
///
/// Enters customer mode and sends the test password first; without the
/// password the node ignores the write.
pub fn write_otp(station: &mut Station, addr: u16, otpaddr: u8, data: u8) -> Result<()> {
    send(station, addr, TID_CUST, &[])?;
    let pw = (station.said_password & PASSWORD_MASK).to_be_bytes();
    send(station, addr, TID_SETTESTPW, &pw[2..])?;
    send(station, addr, TID_SETOTP, &[otpaddr, data])
}

/// Check that `addr` is a SAID with its I2C bridge enabled, then power the bus.
pub fn i2c_power(station: &mut Station, addr: u16) -> Result<()> {
    require_said(station, addr)?;
    let otp = read_otp(station, addr, OTP_I2C_ADDR)?;
    if otp[0] & OTP_I2C_BRIDGE_EN == 0 {
        return Err(SaidError::NoI2cBridge);
    }
    send(station, addr, TID_SETCURCHN, &[I2C_CHANNEL, I2C_CHANNEL_POWER])?;
    debug!(addr, "i2c bus powered");
    Ok(())
}

pub fn read_i2c_config(station: &mut Station, addr: u16) -> Result<I2cConfig> {
    let bytes = query(station, addr, TID_READI2CCFG, &[], 2)?;
    Ok(I2cConfig {
        flags: bytes[0],
        speed: bytes[1],
    })
}

/// Change the bus speed, keeping the current flags.
pub fn set_i2c_speed(station: &mut Station, addr: u16, speed: u8) -> Result<()> {
    let config = read_i2c_config(station, addr)?;
    send(station, addr, TID_SETI2CCFG, &[config.flags, speed])
}

/// Poll the bridge until the running transfer completes.
///
/// A NACK flag is cleared before it is reported so the next transfer
/// starts clean.
fn i2c_wait(station: &mut Station, addr: u16) -> Result<()> {
    for _ in 0..I2C_POLLS {
        let config = read_i2c_config(station, addr)?;
        if config.flags & I2C_FLAG_BUSY != 0 {
            continue;
        }
        if config.flags & I2C_FLAG_NACK != 0 {
            send(
                station,
                addr,
                TID_SETI2CCFG,
                &[config.flags & !I2C_FLAG_NACK, config.speed],
            )?;
            return Err(SaidError::I2cNack);
        }
        return Ok(());
    }
    Err(SaidError::I2cTimeout)
}

/// Read `count` (1..=8) bytes from register `raddr` of device `daddr7`.
pub fn i2c_read(
    station: &mut Station,
    addr: u16,
    daddr7: u8,
    raddr: u8,
    count: usize,
) -> Result<Vec<u8>> {
    let count = count.clamp(1, I2C_MAX_COUNT);
    send(station, addr, TID_I2CREAD8, &[daddr7, raddr, count as u8])?;
    i2c_wait(station, addr)?;
    // readlast right-aligns the bytes read
    let last = query(station, addr, TID_READLAST, &[], I2C_MAX_COUNT)?;
    Ok(last[I2C_MAX_COUNT - count..].to_vec())
}

/// Write `data` (1, 2, 4 or 6 bytes) to register `raddr` of device `daddr7`.
pub fn i2c_write(
    station: &mut Station,
    addr: u16,
    daddr7: u8,
    raddr: u8,
    data: &[u8],
) -> Result<()> {
    let mut payload = Vec::with_capacity(2 + data.len());
    payload.extend_from_slice(&[daddr7, raddr]);
    payload.extend_from_slice(data);
    send(station, addr, TID_I2CWRITE8, &payload)?;
    i2c_wait(station, addr)
}

/// Whether a device answers at `daddr7`. NACKs and hangs mean absent.
pub fn i2c_present(station: &mut Station, addr: u16, daddr7: u8) -> Result<bool> {
    match i2c_read(station, addr, daddr7, 0x00, 1) {
        Ok(_) => Ok(true),
        Err(SaidError::I2cNack | SaidError::I2cTimeout) => Ok(false),
        Err(err) => Err(err),
    }
}
