use osplink_frame::{
    address, build_telegram, hex_bytes, Topology, MAX_PAYLOAD_SIZE, MAX_TELEGRAM_SIZE,
    MIN_TELEGRAM_SIZE,
};
use osplink_shell::{is_prefix, is_quiet, outln, parse_hex, Shell};
use osplink_transport::Status;
use osplink_variants::{Exchange, ValidationContext};

use crate::procedures::{enumerate, reset_init};
use crate::station::{Station, TelegramLog};

/// Most matches `osp send` considers for a telegram key.
const SEND_MATCHES: usize = 8;
/// `osp info` asks for one more than it shows, to detect truncation.
const INFO_MATCHES: usize = 9;

const LONG_HELP: &str = "\
SYNTAX: osp
- shows dirmux, validate, count and log status
SYNTAX: osp dirmux [ bidir | loop ]
- without optional argument shows the direction mux
- with optional argument sets it to bi-directional or loop
SYNTAX: osp validate [ enable | disable ]
- without optional argument shows whether telegrams are validated
- with optional argument sets it
- validates telegrams entered with 'send'/'tx'/'trx'; invalid ones are sent anyhow
SYNTAX: osp count [ reset ]
- without optional argument shows how many telegrams were sent and received
- with 'reset', resets the counters to 0
SYNTAX: osp log [ none | args | tele ]
- without optional argument shows the log level, with argument sets it
- logs nothing, telegram name with args, or also the raw telegram bytes
SYNTAX: osp info [ <tele> ]
- without optional argument lists all known telegrams
- with argument, gives info on telegrams with <tele> in name (max 8)
SYNTAX: osp resetinit
- resets the chain and tries initloop, then initbidir (sets dirmux)
SYNTAX: osp enum
- enumerates all nodes in the chain (starts with resetinit)
SYNTAX: osp send <addr> <tele> <data>...
- high level send, with auto-fill for preamble, psi and crc
- sends telegram <tele> to node <addr> with optional <data>
- if <tele> has a response (see info), waits for and prints it
- 'osp send 001 initbidir' and 'osp send 001 02' both send A0 04 02 4B
SYNTAX: osp (tx|trx) <data>... [crc]
- low level send, pass preamble, psi and crc explicitly
- with 'crc' computes the checksum and appends it to the telegram
- 'tx' only sends, 'trx' also receives the response
- note that a 'c' as last <data> is treated as crc, not as 0C
NOTES:
- some commands use leading @ to suppress output
- <addr> is a node address in hex (1..3EA, 0 for broadcast, 3Fx for group)
- <tele> is either a 2 digit hex number, or a (partial) telegram name
- <data> is a (one-byte) argument in hex 00..FF
";

pub fn register(shell: &mut Shell<Station>) -> osplink_shell::Result<usize> {
    shell.register("osp", main, "send and receive OSP telegrams", LONG_HELP)
}

fn main(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let Some(&sub) = args.get(1) else {
        show_dirmux(shell, station);
        show_validate(shell, station);
        show_count(shell, station);
        show_log(shell, station);
        return;
    };

    if is_prefix("dirmux", sub) {
        dirmux(shell, station, args);
    } else if is_prefix("validate", sub) {
        validate(shell, station, args);
    } else if is_prefix("count", sub) {
        count(shell, station, args);
    } else if is_prefix("log", sub) {
        log(shell, station, args);
    } else if is_prefix("info", sub) {
        info(shell, station, args);
    } else if is_prefix("resetinit", sub) {
        resetinit(shell, station, args);
    } else if is_prefix("enum", sub) {
        enumerate_chain(shell, station, args);
    } else if is_prefix("send", sub) {
        send(shell, station, args);
    } else if is_prefix("tx", sub) || is_prefix("trx", sub) {
        trx(shell, station, args);
    } else {
        outln!(shell, "ERROR: unknown argument ('{sub}')");
    }
}

fn show_dirmux(shell: &mut Shell<Station>, station: &Station) {
    outln!(shell, "dirmux: {}", station.transport.topology());
}

fn show_validate(shell: &mut Shell<Station>, station: &Station) {
    let state = if station.validate { "enabled" } else { "disabled" };
    outln!(shell, "validate: {state}");
}

fn show_count(shell: &mut Shell<Station>, station: &Station) {
    let c = station.transport.counters();
    outln!(shell, "count: tx {} rx {}", c.tx, c.rx);
}

fn show_log(shell: &mut Shell<Station>, station: &Station) {
    outln!(shell, "log: {}", station.log);
}

fn dirmux(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let value = match args {
        [_, _] => return show_dirmux(shell, station),
        [_, _, value] => *value,
        _ => return outln!(shell, "ERROR: 'dirmux' has too many args"),
    };
    let topology = if is_prefix("bidir", value) {
        Topology::Bidir
    } else if is_prefix("loop", value) {
        Topology::Loop
    } else {
        return outln!(shell, "ERROR: 'dirmux' must have 'bidir' or 'loop'");
    };
    station.transport.set_topology(topology);
    if !is_quiet(args) {
        show_dirmux(shell, station);
    }
}

fn validate(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let value = match args {
        [_, _] => return show_validate(shell, station),
        [_, _, value] => *value,
        _ => return outln!(shell, "ERROR: 'validate' has too many args"),
    };
    station.validate = if is_prefix("enable", value) {
        true
    } else if is_prefix("disable", value) {
        false
    } else {
        return outln!(shell, "ERROR: 'validate' must have 'enable' or 'disable'");
    };
    if !is_quiet(args) {
        show_validate(shell, station);
    }
}

fn count(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    match args {
        [_, _] => return show_count(shell, station),
        [_, _, value] if is_prefix("reset", value) => station.transport.reset_counters(),
        [_, _, value] => return outln!(shell, "ERROR: 'count' may have 'reset' (not '{value}')"),
        _ => return outln!(shell, "ERROR: 'count' has too many args"),
    }
    if !is_quiet(args) {
        show_count(shell, station);
    }
}

fn log(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let value = match args {
        [_, _] => return show_log(shell, station),
        [_, _, value] => *value,
        _ => return outln!(shell, "ERROR: 'log' has too many args"),
    };
    station.log = if is_prefix("none", value) {
        TelegramLog::None
    } else if is_prefix("args", value) {
        TelegramLog::Args
    } else if is_prefix("tele", value) {
        TelegramLog::Tele
    } else {
        return outln!(shell, "ERROR: 'log' has 'none', 'args', or 'tele' (not '{value}')");
    };
    if !is_quiet(args) {
        show_log(shell, station);
    }
}

fn info(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let key = match args {
        [_, _] => return list_telegrams(shell, station),
        [_, _, key] => *key,
        _ => return outln!(shell, "ERROR: 'info' has too many args"),
    };
    let found = station.variants.resolve(key, INFO_MATCHES);
    if found.is_empty() {
        return outln!(shell, "ERROR: no <tele> found ('{key}')");
    }
    let shown = found.len().min(INFO_MATCHES - 1);
    for &index in &found[..shown] {
        for line in station.variants.describe(index) {
            outln!(shell, "{line}");
        }
        outln!(shell);
    }
    if shown < found.len() {
        outln!(shell, "WARNING: too many matches (list truncated)");
    }
}

fn list_telegrams(shell: &mut Shell<Station>, station: &Station) {
    let names: Vec<String> = station
        .variants
        .named()
        .map(|(_, v)| format!("{:02X}/{:<16}", v.tid, v.display_name()))
        .collect();
    for row in names.chunks(4) {
        outln!(shell, "{}", row.join(" ").trim_end());
    }
}

fn resetinit(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    if args.len() != 2 {
        return outln!(shell, "ERROR: too many arguments");
    }
    match reset_init(station) {
        Ok(chain) if !is_quiet(args) => {
            outln!(shell, "resetinit: last {:03X} {}", chain.last, chain.topology);
        }
        Ok(_) => {}
        Err(status) => outln!(shell, "resetinit: failed ({status})"),
    }
}

fn enumerate_chain(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    if args.len() != 2 {
        return outln!(shell, "ERROR: too many arguments");
    }
    match enumerate(station) {
        Ok((chain, nodes)) => {
            for node in &nodes {
                outln!(
                    shell,
                    "N{:03X} {:04X}_{:04X}",
                    node.address,
                    node.id >> 16,
                    node.id & 0xFFFF
                );
            }
            outln!(shell, "enum: {} nodes ({})", nodes.len(), chain.topology);
        }
        Err((0, status)) => outln!(shell, "resetinit: failed ({status})"),
        Err((addr, status)) => outln!(shell, "ERROR: identify {addr:03X} failed ({status})"),
    }
}

fn send(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let [_, _, addr_arg, key, data @ ..] = args else {
        return outln!(shell, "ERROR: expected <addr> <tele> <data>...");
    };
    if data.len() > MAX_PAYLOAD_SIZE {
        return outln!(shell, "ERROR: too many <data>");
    }
    let Some(addr) = parse_hex(addr_arg).filter(|&a| address::is_valid(a)) else {
        return outln!(shell, "ERROR: illegal <addr> '{addr_arg}'");
    };
    let candidates = station.variants.resolve(key, SEND_MATCHES);
    let Some(selection) = station.variants.pick(&candidates, data.len()) else {
        return outln!(shell, "ERROR: no <tele> '{key}' found");
    };
    let mut payload = Vec::with_capacity(data.len());
    for arg in data {
        match parse_hex(arg).and_then(|b| u8::try_from(b).ok()) {
            Some(byte) => payload.push(byte),
            None => return outln!(shell, "ERROR: illegal <data> '{arg}'"),
        }
    }

    let variant = &station.variants.variants()[selection.index];
    let tid = variant.tid;
    let has_info = variant.has_info();
    let expected = variant
        .has_response()
        .then(|| MIN_TELEGRAM_SIZE + usize::from(variant.response_size));
    let frame = build_telegram(addr, tid, &payload, station.checksum);

    if station.validate {
        let ctx = ValidationContext {
            checksum: station.checksum,
            exchange: None,
            topology: Some(station.transport.topology()),
            variant: Some(selection.index),
        };
        let findings = station.variants.validate(&frame, &ctx);
        for finding in &findings {
            outln!(shell, "validate: {finding}");
        }
        let others: Vec<String> = selection
            .alternates
            .iter()
            .map(|&i| &station.variants.variants()[i])
            .filter(|v| v.tid != tid)
            .map(|v| v.label())
            .collect();
        if !findings.is_empty() && !others.is_empty() {
            outln!(shell, "validate: '{key}' also matches {}", others.join(" "));
        }
    }

    if !is_quiet(args) {
        outln!(shell, "tx {}", hex_bytes(&frame));
    }
    if has_info && expected.is_none() {
        let status = station.transmit(&frame);
        print_rx(shell, &[], status);
    } else {
        let (response, status) = station.transmit_receive(&frame, expected);
        print_rx(shell, &response, status);
    }
}

fn trx(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let receive = args[1].as_bytes().get(1) == Some(&b'r');
    let data = &args[2..];
    if data.len() > MAX_TELEGRAM_SIZE {
        return outln!(shell, "ERROR: too many <data>");
    }

    let mut frame = Vec::with_capacity(data.len());
    for (i, arg) in data.iter().enumerate() {
        if i + 1 == data.len() && is_prefix("crc", arg) {
            frame.push(station.checksum.compute(&frame));
            continue;
        }
        match parse_hex(arg).and_then(|b| u8::try_from(b).ok()) {
            Some(byte) => frame.push(byte),
            None => return outln!(shell, "ERROR: illegal <data> '{arg}'"),
        }
    }

    if station.validate {
        let ctx = ValidationContext {
            checksum: station.checksum,
            exchange: Some(if receive {
                Exchange::SendReceive
            } else {
                Exchange::SendOnly
            }),
            topology: Some(station.transport.topology()),
            variant: None,
        };
        for finding in station.variants.validate(&frame, &ctx) {
            outln!(shell, "validate: {finding}");
        }
    }

    if !is_quiet(args) {
        outln!(shell, "tx {}", hex_bytes(&frame));
    }
    if receive {
        let (response, status) = station.transmit_receive(&frame, None);
        print_rx(shell, &response, status);
    } else {
        let status = station.transmit(&frame);
        print_rx(shell, &[], status);
    }
}

fn print_rx(shell: &mut Shell<Station>, response: &[u8], status: Status) {
    if response.is_empty() {
        outln!(shell, "rx none {status}");
    } else {
        outln!(shell, "rx {} {status}", hex_bytes(response));
    }
}
