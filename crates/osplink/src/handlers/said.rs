use osplink_frame::{address, hex_bytes};
use osplink_shell::{is_prefix, is_quiet, out, outln, parse_dec, parse_hex, Shell};

use crate::said::{
    self, SaidError, I2C_MAX_COUNT, I2C_WRITE_COUNTS, OTP_CUSTOMER_MAX, OTP_CUSTOMER_MIN,
    PASSWORD_UNSET,
};
use crate::station::Station;

/// Hex digits of a 48-bit password.
const PASSWORD_DIGITS: usize = 12;

const LONG_HELP: &str = "\
SYNTAX: said i2c <addr> ( scan | freq [<freq>] | <rw> )
- checks <addr> is a SAID with I2C enabled (OTP), if so powers bus, then
- 'scan' scans for I2C devices on bus (<addr> 000 loops over entire chain)
- 'freq' gets or sets I2C bus frequency (in Hz)
- <rw> can be 'write <daddr7> <raddr> <data>...'
- this writes the <data> bytes to register <raddr> of i2c device <daddr7>
- <rw> can be 'read <daddr7> <raddr> [<count>]'
- this reads <count> bytes from register <raddr> of i2c device <daddr7>
SYNTAX: said otp <addr> [ <otpaddr> [ <data> ] ]
- read/writes OTP memory (customer area) of the SAID at address <addr>
- without optional arguments dumps OTP memory
- with <otpaddr> reads OTP location <otpaddr>
- with <data> writes <data> to OTP location <otpaddr>
SYNTAX: said password [ <pw> ]
- without optional argument shows the SAID test password
- with <pw> sets it (FFFFFFFFFFFF triggers warning when PW is needed)
NOTES:
- supports @-prefix to suppress output
- commands assume chain is initialized (e.g. 'osp resetinit')
- <addr> is a node address in hex (001..3EA, 000 for broadcast)
- <otpaddr> is an OTP address in hex (0D..1F)
- <daddr7> is a 7-bit I2C device address in hex (00..7F)
- <raddr> is an 8-bit I2C register address in hex (00..FF)
- <data> is an 8-bit argument in hex (00..FF)
";

pub fn register(shell: &mut Shell<Station>) -> osplink_shell::Result<usize> {
    shell.register(
        "said",
        main,
        "sends and receives SAID specific telegrams",
        LONG_HELP,
    )
}

fn main(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    if args.get(1).is_some_and(|sub| is_prefix("password", sub)) {
        return password(shell, station, args);
    }

    if station.chain.is_none() {
        outln!(shell, "WARNING: 'osp resetinit' must be run first");
    }

    let Some(&sub) = args.get(1) else {
        return outln!(shell, "ERROR: 'said' expects argument");
    };
    if is_prefix("i2c", sub) {
        i2c(shell, station, args);
    } else if is_prefix("otp", sub) {
        otp(shell, station, args);
    } else {
        outln!(shell, "ERROR: 'said' has unknown argument ('{sub}')");
    }
}

fn byte_arg(arg: &str) -> Option<u8> {
    parse_hex(arg).and_then(|v| u8::try_from(v).ok())
}

fn show_password(shell: &mut Shell<Station>, station: &Station) {
    outln!(shell, "stored password: {:012X}", station.said_password);
}

fn password(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let text = match args {
        [_, _] => return show_password(shell, station),
        [_, _, text] => *text,
        _ => return outln!(shell, "ERROR: 'password' has too many args"),
    };
    if text.len() > PASSWORD_DIGITS {
        return outln!(shell, "ERROR: password too long");
    }
    let mut pw = 0u64;
    for ch in text.chars() {
        match ch.to_digit(16) {
            Some(digit) => pw = pw * 16 + u64::from(digit),
            None => return outln!(shell, "ERROR: password expects hex chars, not '{ch}'"),
        }
    }
    station.said_password = pw;
    if !is_quiet(args) {
        show_password(shell, station);
    }
}

fn otp(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let Some(addr_arg) = args.get(2) else {
        return outln!(shell, "ERROR: 'otp' expects <addr> of SAID");
    };
    let Some(addr) = parse_hex(addr_arg)
        .filter(|&a| address::AddressClass::of(a) == address::AddressClass::Unicast)
    else {
        return outln!(
            shell,
            "ERROR: 'otp' expects <addr> {:03X}..{:03X}, not '{addr_arg}'",
            address::UNICAST_MIN,
            address::UNICAST_MAX
        );
    };

    match said::require_said(station, addr) {
        Ok(_) => {}
        Err(SaidError::NotSaid { id }) => {
            return outln!(shell, "ERROR: node {addr:03X} is not a SAID (id {id:08X})");
        }
        Err(err) => {
            return outln!(
                shell,
                "ERROR: identify({addr:03X}) failed ({err}) - forgot 'osp resetinit'?"
            );
        }
    }

    let Some(otpaddr_arg) = args.get(3) else {
        return otp_dump(shell, station, addr);
    };
    let Some(otpaddr) =
        byte_arg(otpaddr_arg).filter(|a| (OTP_CUSTOMER_MIN..=OTP_CUSTOMER_MAX).contains(a))
    else {
        return outln!(
            shell,
            "ERROR: 'otp' expects <otpaddr> {OTP_CUSTOMER_MIN:02X}..{OTP_CUSTOMER_MAX:02X}, not '{otpaddr_arg}'"
        );
    };

    let Some(data_arg) = args.get(4) else {
        return match said::read_otp(station, addr, otpaddr) {
            Ok(bytes) => outln!(
                shell,
                "SAID[{addr:03X}].OTP[{otpaddr:02X}] -> {:02X} (ok)",
                bytes[0]
            ),
            Err(err) => outln!(shell, "SAID[{addr:03X}].OTP[{otpaddr:02X}] -> -- ({err})"),
        };
    };
    let Some(data) = byte_arg(data_arg) else {
        return outln!(shell, "ERROR: illegal <data> '{data_arg}' (00..FF)");
    };
    if args.len() > 5 {
        return outln!(shell, "ERROR: 'otp' has too many args");
    }

    if station.said_password == PASSWORD_UNSET {
        outln!(shell, "WARNING: SAID password not set (see 'said password')");
    }
    let status = match said::write_otp(station, addr, otpaddr, data) {
        Ok(()) => "ok".to_string(),
        Err(err) => err.to_string(),
    };
    if !is_quiet(args) {
        outln!(shell, "SAID[{addr:03X}].OTP[{otpaddr:02X}] <- {data:02X} ({status})");
    }
}

fn otp_dump(shell: &mut Shell<Station>, station: &mut Station, addr: u16) {
    let area = match said::dump_customer_otp(station, addr) {
        Ok(area) => area,
        Err(err) => return outln!(shell, "ERROR: readotp({addr:03X}) failed ({err})"),
    };
    outln!(shell, "SAID[{addr:03X}].OTP");
    for (row, chunk) in area.chunks(said::OTP_READ_SIZE).enumerate() {
        let otpaddr = usize::from(OTP_CUSTOMER_MIN) + row * said::OTP_READ_SIZE;
        outln!(shell, "  {otpaddr:02X}: {}", hex_bytes(chunk));
    }
    let bridge = if area[0] & said::OTP_I2C_BRIDGE_EN != 0 {
        "enabled"
    } else {
        "disabled"
    };
    outln!(shell, "  i2c bridge: {bridge}");
}

fn i2c(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let Some(addr_arg) = args.get(2) else {
        return outln!(shell, "ERROR: i2c requires <addr>");
    };
    let Some(addr) = parse_hex(addr_arg)
        .filter(|&a| address::is_valid(a))
        .filter(|&a| address::AddressClass::of(a) != address::AddressClass::Multicast)
    else {
        return outln!(shell, "ERROR: illegal <addr> '{addr_arg}'");
    };

    let broadcast = addr == address::BROADCAST;
    if !broadcast {
        match said::i2c_power(station, addr) {
            Ok(()) => {}
            Err(SaidError::NotSaid { .. }) => {
                return outln!(shell, "ERROR: not a SAID at {addr:03X}");
            }
            Err(SaidError::NoI2cBridge) => {
                return outln!(shell, "ERROR: SAID at {addr:03X} has no I2C (OTP bit not set)");
            }
            Err(err) => {
                return outln!(
                    shell,
                    "ERROR: i2cpower({addr:03X}) failed ({err}) - forgot 'osp resetinit'?"
                );
            }
        }
    }

    let Some(&action) = args.get(3) else {
        return outln!(shell, "ERROR: 'i2c' expects 'scan', 'freq', 'write', or 'read'");
    };
    if is_prefix("scan", action) {
        if let Some(extra) = args.get(4) {
            return outln!(shell, "ERROR: 'scan' has unknown argument ('{extra}')");
        }
        let verbose = !is_quiet(args);
        if broadcast {
            scan_chain(shell, station, verbose);
        } else {
            scan_node(shell, station, addr, verbose);
        }
        return;
    }
    if broadcast {
        return outln!(shell, "ERROR: broadcast <addr> only allowed with 'scan'");
    }
    if is_prefix("freq", action) {
        freq(shell, station, args, addr);
    } else if is_prefix("write", action) {
        write(shell, station, args, addr);
    } else if is_prefix("read", action) {
        read(shell, station, args, addr);
    } else {
        outln!(shell, "ERROR: 'i2c' has unknown argument ('{action}')");
    }
}

/// Scan the bus of one (powered) SAID; returns the number of devices found.
fn scan_node(
    shell: &mut Shell<Station>,
    station: &mut Station,
    addr: u16,
    verbose: bool,
) -> usize {
    if verbose {
        outln!(shell, "SAID {addr:03X} has I2C (now powered)");
    }
    let mut count = 0;
    for daddr7 in 0..0x80u8 {
        if verbose && daddr7 % 16 == 0 {
            out!(shell, "  {daddr7:02x}: ");
        }
        match said::i2c_present(station, addr, daddr7) {
            Ok(true) => {
                out!(shell, "[{daddr7:02x}]");
                count += 1;
            }
            Ok(false) if verbose => out!(shell, " {daddr7:02x} "),
            Ok(false) => {}
            Err(err) => {
                outln!(shell, "ERROR: i2cread8({addr:03X}) failed ({err})");
                return 0;
            }
        }
        if verbose && daddr7 % 16 == 15 {
            outln!(shell);
        }
    }
    if !verbose && count > 0 {
        out!(shell, " ");
    }
    outln!(shell, "SAID {addr:03X} has {count} I2C devices");
    count
}

fn scan_chain(shell: &mut Shell<Station>, station: &mut Station, verbose: bool) {
    let last = station.chain.map_or(0, |chain| chain.last);
    let mut saids = 0;
    let mut devices = 0;
    for addr in address::UNICAST_MIN..=last {
        if said::i2c_power(station, addr).is_ok() {
            devices += scan_node(shell, station, addr, verbose);
            saids += 1;
            if verbose {
                outln!(shell);
            }
        }
    }
    outln!(shell, "total {saids} SAIDs have {devices} I2C devices");
}

fn show_freq(shell: &mut Shell<Station>, station: &mut Station, addr: u16) {
    match said::read_i2c_config(station, addr) {
        Ok(config) => outln!(
            shell,
            "said({addr:03X}).i2c.freq {} Hz (speed {})",
            said::speed_hz(config.speed),
            config.speed
        ),
        Err(err) => outln!(shell, "ERROR: readi2ccfg({addr:03X}) failed ({err})"),
    }
}

fn freq(shell: &mut Shell<Station>, station: &mut Station, args: &[&str], addr: u16) {
    let hz_arg = match args {
        [_, _, _, _] => return show_freq(shell, station, addr),
        [_, _, _, _, hz] => *hz,
        _ => return outln!(shell, "ERROR: 'freq' has too many args"),
    };
    let Some(hz) = parse_dec(hz_arg) else {
        return outln!(shell, "ERROR: 'freq' expects <freq>, not '{hz_arg}'");
    };
    let speed = said::speed_for_hz(hz);
    if let Err(err) = said::set_i2c_speed(station, addr, speed) {
        return outln!(shell, "ERROR: seti2ccfg({addr:03X}) failed ({err})");
    }
    if !is_quiet(args) {
        show_freq(shell, station, addr);
    }
}

fn write(shell: &mut Shell<Station>, station: &mut Station, args: &[&str], addr: u16) {
    let mut bytes = Vec::with_capacity(I2C_MAX_COUNT);
    for arg in &args[4..] {
        let Some(byte) = byte_arg(arg) else {
            return outln!(shell, "ERROR: 'write' expects 00..FF, not '{arg}'");
        };
        if bytes.len() == I2C_MAX_COUNT {
            return outln!(shell, "ERROR: 'write' has too many args");
        }
        bytes.push(byte);
    }
    let [daddr7, raddr, data @ ..] = bytes.as_slice() else {
        return outln!(shell, "ERROR: 'write' expects <daddr7> and <raddr>");
    };
    let (daddr7, raddr) = (*daddr7, *raddr);
    if daddr7 > 0x7F {
        return outln!(shell, "ERROR: 'write' expects <daddr7> to be 00..7F, not {daddr7:02X}");
    }
    if !I2C_WRITE_COUNTS.contains(&data.len()) {
        return outln!(
            shell,
            "ERROR: 'write' payload can only be 1, 2, 4, or 6 bytes (not {})",
            data.len()
        );
    }
    if let Err(err) = said::i2c_write(station, addr, daddr7, raddr, data) {
        return outln!(shell, "ERROR: write({addr:03X}) failed ({err})");
    }
    if !is_quiet(args) {
        outln!(
            shell,
            "said({addr:03X}).i2c.dev({daddr7:02X}).reg({raddr:02X}) {}",
            hex_bytes(data)
        );
    }
}

fn read(shell: &mut Shell<Station>, station: &mut Station, args: &[&str], addr: u16) {
    let Some(daddr_arg) = args.get(4) else {
        return outln!(shell, "ERROR: 'read' expects <daddr7>");
    };
    let Some(daddr7) = byte_arg(daddr_arg).filter(|&d| d <= 0x7F) else {
        return outln!(shell, "ERROR: 'read' expects <daddr7> 00..7F, not '{daddr_arg}'");
    };
    let Some(raddr_arg) = args.get(5) else {
        return outln!(shell, "ERROR: 'read' expects <raddr>");
    };
    let Some(raddr) = byte_arg(raddr_arg) else {
        return outln!(shell, "ERROR: 'read' expects <raddr> 00..FF, not '{raddr_arg}'");
    };
    let count = match args.get(6..).unwrap_or_default() {
        [] => 1,
        [count_arg] => match parse_hex(count_arg).map(usize::from) {
            Some(count @ 1..=I2C_MAX_COUNT) => count,
            _ => return outln!(shell, "ERROR: 'read' expects <count> 1..8, not '{count_arg}'"),
        },
        _ => return outln!(shell, "ERROR: 'read' has too many args"),
    };

    match said::i2c_read(station, addr, daddr7, raddr, count) {
        Ok(data) if is_quiet(args) => outln!(shell, "{}", hex_bytes(&data)),
        Ok(data) => outln!(
            shell,
            "said({addr:03X}).i2c.dev({daddr7:02X}).reg({raddr:02X}) {}",
            hex_bytes(&data)
        ),
        Err(err) => outln!(shell, "ERROR: read({addr:03X}) failed ({err})"),
    }
}

#[cfg(test)]
mod tests {
    use osplink_frame::{build_telegram, Checksum, Topology};

    use crate::procedures::Chain;
    use crate::said::{I2C_FLAG_NACK, PASSWORD_UNSET};
    use crate::testing::{session, session_with};

    fn reply(addr: u16, tid: u8, payload: &[u8]) -> Vec<u8> {
        build_telegram(addr, tid, payload, Checksum::Additive)
    }

    /// Responses that make `addr` a SAID with a powered I2C bridge.
    fn powered(addr: u16) -> Vec<Vec<u8>> {
        vec![
            reply(addr, 0x07, &[0x00, 0x00, 0x00, 0x40]),
            reply(addr, 0x58, &[0x08, 0, 0, 0, 0, 0, 0, 0]),
        ]
    }

    /// Responses for a full bus scan with devices at `present`.
    fn scan_responses(addr: u16, present: &[u8]) -> Vec<Vec<u8>> {
        let mut responses = Vec::new();
        for daddr7 in 0..0x80u8 {
            if present.contains(&daddr7) {
                responses.push(reply(addr, 0x5A, &[0x00, 10]));
                responses.push(reply(addr, 0x5E, &[0; 8]));
            } else {
                responses.push(reply(addr, 0x5A, &[I2C_FLAG_NACK, 10]));
            }
        }
        responses
    }

    #[test]
    fn password_show_and_set() {
        let (mut sh, mut st, out) = session();
        sh.add_str(&mut st, "said password\nsaid pass 0123456789ab\n@said p 1F\n");
        assert_eq!(
            out.take(),
            "stored password: FFFFFFFFFFFF\n>> stored password: 0123456789AB\n>> >> "
        );
        assert_eq!(st.said_password, 0x1F);

        sh.add_str(&mut st, "said p 0123456789ABC\nsaid p 12G4\nsaid p 1 2\n");
        assert_eq!(
            out.take(),
            "ERROR: password too long\n>> \
             ERROR: password expects hex chars, not 'G'\n>> \
             ERROR: 'password' has too many args\n>> "
        );
        assert_eq!(st.said_password, 0x1F);
    }

    #[test]
    fn warns_without_resetinit() {
        let (mut sh, mut st, out) = session();
        sh.add_str(&mut st, "said\nsaid frob\n");
        assert_eq!(
            out.take(),
            "WARNING: 'osp resetinit' must be run first\nERROR: 'said' expects argument\n>> \
             WARNING: 'osp resetinit' must be run first\nERROR: 'said' has unknown argument ('frob')\n>> "
        );
    }

    #[test]
    fn otp_read_and_write() {
        let said = reply(0x001, 0x07, &[0x00, 0x00, 0x00, 0x40]);
        let (mut sh, mut st, out) = session_with(vec![
            said.clone(),
            reply(0x001, 0x58, &[0x08, 0, 0, 0, 0, 0, 0, 0]),
            said.clone(),
            said,
        ]);
        st.chain = Some(Chain { last: 1, topology: Topology::Bidir });

        sh.add_str(&mut st, "said otp 001 0D\n");
        assert_eq!(out.take(), "SAID[001].OTP[0D] -> 08 (ok)\n>> ");

        sh.add_str(&mut st, "said otp 001 0D 08\n");
        assert_eq!(
            out.take(),
            "WARNING: SAID password not set (see 'said password')\n\
             SAID[001].OTP[0D] <- 08 (ok)\n>> "
        );
        assert_eq!(st.said_password, PASSWORD_UNSET);

        st.said_password = 0x1234;
        sh.add_str(&mut st, "@said otp 001 0E 01\n");
        assert_eq!(out.take(), ">> ");
        // identify + readotp, identify + cust + settestpw + setotp, and again
        assert_eq!(st.transport.counters().tx, 10);
    }

    #[test]
    fn otp_dump_prints_customer_area() {
        let (mut sh, mut st, out) = session_with(vec![
            reply(0x002, 0x07, &[0x00, 0x00, 0x00, 0x41]),
            reply(0x002, 0x58, &[0x08, 0x01, 0, 0, 0, 0, 0, 0]),
            reply(0x002, 0x58, &[0; 8]),
            reply(0x002, 0x58, &[0xAA, 0xBB, 0xCC, 0, 0, 0, 0, 0]),
        ]);
        st.chain = Some(Chain { last: 2, topology: Topology::Loop });
        sh.add_str(&mut st, "said otp 002\n");
        assert_eq!(
            out.take(),
            "SAID[002].OTP\n  \
             0D: 08 01 00 00 00 00 00 00\n  \
             15: 00 00 00 00 00 00 00 00\n  \
             1D: AA BB CC\n  \
             i2c bridge: enabled\n>> "
        );
    }

    #[test]
    fn otp_argument_errors() {
        let (mut sh, mut st, out) = session_with(vec![
            reply(0x001, 0x07, &[0x00, 0x00, 0x00, 0x50]),
            reply(0x001, 0x07, &[0x00, 0x00, 0x00, 0x40]),
        ]);
        st.chain = Some(Chain { last: 1, topology: Topology::Bidir });
        sh.add_str(
            &mut st,
            "said otp\nsaid otp 000\nsaid otp 001\nsaid otp 001 0C\nsaid otp 003\n",
        );
        assert_eq!(
            out.take(),
            "ERROR: 'otp' expects <addr> of SAID\n>> \
             ERROR: 'otp' expects <addr> 001..3EA, not '000'\n>> \
             ERROR: node 001 is not a SAID (id 00000050)\n>> \
             ERROR: 'otp' expects <otpaddr> 0D..1F, not '0C'\n>> \
             ERROR: identify(003) failed (no_response) - forgot 'osp resetinit'?\n>> "
        );
    }

    #[test]
    fn i2c_rejects_bad_addresses_and_nodes() {
        let (mut sh, mut st, out) = session_with(vec![
            reply(0x001, 0x07, &[0x00, 0x00, 0x00, 0x50]),
            reply(0x001, 0x07, &[0x00, 0x00, 0x00, 0x40]),
            reply(0x001, 0x58, &[0; 8]),
        ]);
        st.chain = Some(Chain { last: 1, topology: Topology::Bidir });
        sh.add_str(
            &mut st,
            "said i2c\nsaid i2c 3F1 scan\nsaid i2c 3EB scan\n\
             said i2c 001 scan\nsaid i2c 001 scan\nsaid i2c 000 freq\n",
        );
        assert_eq!(
            out.take(),
            "ERROR: i2c requires <addr>\n>> \
             ERROR: illegal <addr> '3F1'\n>> \
             ERROR: illegal <addr> '3EB'\n>> \
             ERROR: not a SAID at 001\n>> \
             ERROR: SAID at 001 has no I2C (OTP bit not set)\n>> \
             ERROR: broadcast <addr> only allowed with 'scan'\n>> "
        );
    }

    #[test]
    fn freq_show_and_set() {
        let mut responses = powered(0x001);
        responses.push(reply(0x001, 0x5A, &[0x00, 10]));
        responses.extend(powered(0x001));
        responses.push(reply(0x001, 0x5A, &[0x00, 10]));
        responses.push(reply(0x001, 0x5A, &[0x00, 3]));
        let (mut sh, mut st, out) = session_with(responses);
        st.chain = Some(Chain { last: 1, topology: Topology::Bidir });

        sh.add_str(&mut st, "said i2c 001 freq\n");
        assert_eq!(out.take(), "said(001).i2c.freq 100000 Hz (speed 10)\n>> ");

        sh.add_str(&mut st, "said i2c 001 freq 400000\n");
        assert_eq!(out.take(), "said(001).i2c.freq 333333 Hz (speed 3)\n>> ");
    }

    #[test]
    fn read_and_write_registers() {
        let mut responses = powered(0x001);
        responses.push(reply(0x001, 0x5A, &[0x00, 10]));
        responses.push(reply(0x001, 0x5E, &[0, 0, 0, 0, 0, 0x11, 0x22, 0x33]));
        responses.extend(powered(0x001));
        responses.push(reply(0x001, 0x5A, &[0x00, 10]));
        responses.extend(powered(0x001));
        responses.push(reply(0x001, 0x5A, &[I2C_FLAG_NACK, 10]));
        let (mut sh, mut st, out) = session_with(responses);
        st.chain = Some(Chain { last: 1, topology: Topology::Bidir });

        sh.add_str(&mut st, "said i2c 001 read 50 10 3\n");
        assert_eq!(out.take(), "said(001).i2c.dev(50).reg(10) 11 22 33\n>> ");

        sh.add_str(&mut st, "said i2c 001 write 50 10 AA BB\n");
        assert_eq!(out.take(), "said(001).i2c.dev(50).reg(10) AA BB\n>> ");

        sh.add_str(&mut st, "said i2c 001 read 51 00\n");
        assert_eq!(out.take(), "ERROR: read(001) failed (i2c_nack)\n>> ");
    }

    #[test]
    fn read_and_write_argument_errors() {
        let mut responses = Vec::new();
        for _ in 0..7 {
            responses.extend(powered(0x001));
        }
        let (mut sh, mut st, out) = session_with(responses);
        st.chain = Some(Chain { last: 1, topology: Topology::Bidir });
        sh.add_str(
            &mut st,
            "said i2c 001 read 80 00\n\
             said i2c 001 read 50 00 9\n\
             said i2c 001 write 50\n\
             said i2c 001 write 80 00 01\n\
             said i2c 001 write 50 00 01 02 03\n\
             said i2c 001 write 50 00 1 2 3 4 5 6 7\n\
             said i2c 001 hop\n",
        );
        assert_eq!(
            out.take(),
            "ERROR: 'read' expects <daddr7> 00..7F, not '80'\n>> \
             ERROR: 'read' expects <count> 1..8, not '9'\n>> \
             ERROR: 'write' expects <daddr7> and <raddr>\n>> \
             ERROR: 'write' expects <daddr7> to be 00..7F, not 80\n>> \
             ERROR: 'write' payload can only be 1, 2, 4, or 6 bytes (not 3)\n>> \
             ERROR: 'write' has too many args\n>> \
             ERROR: 'i2c' has unknown argument ('hop')\n>> "
        );
    }

    #[test]
    fn scan_single_node() {
        let mut responses = powered(0x001);
        responses.extend(scan_responses(0x001, &[0x50, 0x68]));
        let (mut sh, mut st, out) = session_with(responses);
        st.chain = Some(Chain { last: 1, topology: Topology::Bidir });

        sh.add_str(&mut st, "@said i2c 001 scan\n");
        assert_eq!(out.take(), "[50][68] SAID 001 has 2 I2C devices\n>> ");
    }

    #[test]
    fn verbose_scan_prints_grid() {
        let mut responses = powered(0x001);
        responses.extend(scan_responses(0x001, &[0x01]));
        let (mut sh, mut st, out) = session_with(responses);
        st.chain = Some(Chain { last: 1, topology: Topology::Bidir });

        sh.add_str(&mut st, "said i2c 001 scan\n");
        let text = out.take();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "SAID 001 has I2C (now powered)");
        assert!(lines[1].starts_with("  00:  00 [01] 02 "), "{}", lines[1]);
        assert!(lines[8].starts_with("  70: "));
        assert_eq!(lines[9], "SAID 001 has 1 I2C devices");
    }

    #[test]
    fn broadcast_scan_loops_over_chain() {
        let mut responses = powered(0x001);
        responses.extend(scan_responses(0x001, &[0x20]));
        // node 2 is not a SAID
        responses.push(reply(0x002, 0x07, &[0x00, 0x00, 0x00, 0x00]));
        let (mut sh, mut st, out) = session_with(responses);
        st.chain = Some(Chain { last: 2, topology: Topology::Loop });

        sh.add_str(&mut st, "@said i2c 000 scan\n");
        assert_eq!(
            out.take(),
            "[20] SAID 001 has 1 I2C devices\ntotal 1 SAIDs have 1 I2C devices\n>> "
        );
    }
}
