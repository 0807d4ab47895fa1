//! Compiled-in OSP telegram knowledge base.
//!
//! One row per known telegram variant, plus an empty row for every
//! identifier nothing is known about, so the table covers 00..7F
//! without gaps. Rows must stay ordered by tid.

use std::borrow::Cow;

use crate::variant::{Casting, SizeMask, TelegramVariant};

/// Static form of a [`TelegramVariant`], built with `const fn`s.
#[derive(Debug, Clone, Copy)]
pub struct Row {
    tid: u8,
    name: Option<&'static str>,
    casting: Casting,
    sizes: SizeMask,
    response_size: u8,
    tele_args: Option<&'static str>,
    resp_args: Option<&'static str>,
    description: Option<&'static str>,
}

impl Row {
    const fn serial(self) -> Self {
        Self {
            casting: Casting::Serial,
            ..self
        }
    }

    const fn args(self, tele_args: &'static str) -> Self {
        Self {
            tele_args: Some(tele_args),
            ..self
        }
    }

    const fn response(self, size: u8, resp_args: &'static str) -> Self {
        Self {
            response_size: size,
            resp_args: Some(resp_args),
            ..self
        }
    }
}

impl From<Row> for TelegramVariant {
    fn from(row: Row) -> Self {
        Self {
            tid: row.tid,
            name: row.name.map(Cow::Borrowed),
            casting: row.casting,
            sizes: row.sizes,
            response_size: row.response_size,
            tele_args: row.tele_args.map(Cow::Borrowed),
            resp_args: row.resp_args.map(Cow::Borrowed),
            description: row.description.map(Cow::Borrowed),
        }
    }
}

const fn tele(tid: u8, name: &'static str, sizes: SizeMask, description: &'static str) -> Row {
    Row {
        tid,
        name: Some(name),
        casting: Casting::Unicast,
        sizes,
        response_size: 0,
        tele_args: None,
        resp_args: None,
        description: Some(description),
    }
}

const fn none(tid: u8) -> Row {
    Row {
        tid,
        name: None,
        casting: Casting::Unicast,
        sizes: SizeMask::EMPTY,
        response_size: 0,
        tele_args: None,
        resp_args: None,
        description: None,
    }
}

const P0: SizeMask = SizeMask::size(0);
const P1: SizeMask = SizeMask::size(1);
const P2: SizeMask = SizeMask::size(2);
const P3: SizeMask = SizeMask::size(3);
const P6: SizeMask = SizeMask::size(6);
const P8: SizeMask = SizeMask::size(8);

/// The OSP telegram set for RGBI and SAID nodes.
pub static TELEGRAMS: &[Row] = &[
    // 00..1F: chain management
    tele(0x00, "reset", P0, "Resets the addressed nodes to their power-on state; addresses, setup and PWM settings are lost."),
    tele(0x01, "clrerror", P0, "Clears the error flags of the addressed nodes so that they can leave the failsafe state."),
    tele(0x02, "initbidir", P0, "Assigns consecutive addresses to all nodes, starting at the addressed one; the last node responds back over the chain (bidirectional).")
        .serial()
        .response(2, "temp stat"),
    tele(0x03, "initloop", P0, "Assigns consecutive addresses to all nodes, starting at the addressed one; the last node responds via the loop back wire.")
        .serial()
        .response(2, "temp stat"),
    tele(0x04, "gosleep", P0, "Switches the addressed nodes to sleep; LEDs off and PWM stopped."),
    tele(0x05, "goactive", P0, "Switches the addressed nodes to active; PWM generators start driving the LEDs."),
    tele(0x06, "godeepsleep", P0, "Switches the addressed nodes to deep sleep; only a wake-up on the serial line is detected."),
    tele(0x07, "identify", P0, "Returns the identification word of the node, telling its product type and revision.")
        .response(4, "id(4)"),
    tele(0x08, "p4errbidir", P0, "Pings the chain for the first node with an error flag set (bidirectional).")
        .serial()
        .response(2, "temp stat"),
    tele(0x09, "p4errloop", P0, "Pings the chain for the first node with an error flag set (loop).")
        .serial()
        .response(2, "temp stat"),
    tele(0x0A, "asktinfo", P0, "Collects the highest temperature of all nodes in the chain.")
        .serial()
        .response(2, "temp stat"),
    tele(0x0B, "askvinfo", P0, "Collects the lowest supply voltage of all nodes in the chain.")
        .serial()
        .response(2, "volt stat"),
    tele(0x0C, "readmult", P0, "Returns the multicast group membership mask of the node.")
        .response(2, "groups(2)"),
    tele(0x0D, "setmult", P2, "Sets the multicast group membership mask of the node; bit n makes the node respond to group address 3Fn.")
        .args("groups(2)"),
    none(0x0E),
    tele(0x0F, "sync", P0, "Makes all nodes apply their pending PWM settings at once (synchronized update)."),
    none(0x10),
    tele(0x11, "idle", P0, "Keeps the communication going without any effect on node state."),
    tele(0x12, "foundry", P0, "Enters the foundry test mode; only for production test."),
    tele(0x13, "cust", P0, "Enters customer mode, which unlocks OTP programming."),
    tele(0x14, "burn", P0, "Burns the OTP mirror into the one-time programmable memory; needs customer mode."),
    tele(0x15, "settestpw", P6, "Stores the 48-bit test password; OTP writes in customer mode need it.")
        .args("pw(6)"),
    none(0x16),
    none(0x17),
    none(0x18),
    none(0x19),
    none(0x1A),
    none(0x1B),
    none(0x1C),
    none(0x1D),
    none(0x1E),
    none(0x1F),
    // 20..3F: status request twins of 00..1F
    none(0x20),
    tele(0x21, "clrerror_sr", P0, "Clears the error flags like clrerror and returns the resulting status.")
        .response(1, "stat"),
    none(0x22),
    none(0x23),
    tele(0x24, "gosleep_sr", P0, "Switches to sleep like gosleep and returns the resulting status.")
        .response(1, "stat"),
    tele(0x25, "goactive_sr", P0, "Switches to active like goactive and returns the resulting status.")
        .response(1, "stat"),
    tele(0x26, "godeepsleep_sr", P0, "Switches to deep sleep like godeepsleep and returns the resulting status.")
        .response(1, "stat"),
    none(0x27),
    none(0x28),
    none(0x29),
    none(0x2A),
    none(0x2B),
    none(0x2C),
    tele(0x2D, "setmult_sr", P2, "Sets the multicast group mask like setmult and returns the resulting status.")
        .args("groups(2)")
        .response(1, "stat"),
    none(0x2E),
    none(0x2F),
    none(0x30),
    none(0x31),
    none(0x32),
    none(0x33),
    none(0x34),
    none(0x35),
    none(0x36),
    none(0x37),
    none(0x38),
    none(0x39),
    none(0x3A),
    none(0x3B),
    none(0x3C),
    none(0x3D),
    none(0x3E),
    none(0x3F),
    // 40..5F: node configuration
    tele(0x40, "readstat", P0, "Returns the status byte of the node: state and error flags.")
        .response(1, "stat"),
    none(0x41),
    tele(0x42, "readtempstat", P0, "Returns the die temperature and the status byte of the node.")
        .response(2, "temp stat"),
    none(0x43),
    tele(0x44, "readcomst", P0, "Returns the physical layer status (LVDS, EOL, CAN, MCU) of both serial ports.")
        .response(1, "com"),
    none(0x45),
    tele(0x46, "readledst", P0, "Returns the open and short detection flags of all LED channels.")
        .response(1, "ledst"),
    none(0x47),
    tele(0x48, "readtemp", P0, "Returns the raw die temperature reading.")
        .response(1, "temp"),
    none(0x49),
    tele(0x4A, "readotth", P0, "Returns the over-temperature thresholds and hysteresis.")
        .response(3, "otth(3)"),
    tele(0x4B, "setotth", P3, "Sets the over-temperature thresholds and hysteresis.")
        .args("otth(3)"),
    tele(0x4C, "readsetup", P0, "Returns the setup flags: PWM speed, temperature compensation, CRC and error masks.")
        .response(1, "flags"),
    tele(0x4D, "setsetup", P1, "Sets the setup flags: PWM speed, temperature compensation, CRC and error masks.")
        .args("flags"),
    tele(0x4E, "readpwm", P0, "Returns the PWM settings of the red, green and blue channel of an RGBI node.")
        .response(6, "red(2) green(2) blue(2)"),
    tele(0x4E, "readpwmchn", P1, "Returns the PWM settings of the three drivers of channel chn of a SAID node.")
        .args("chn")
        .response(6, "red(2) green(2) blue(2)"),
    tele(0x4F, "setpwm", P6, "Sets the PWM settings of the red, green and blue channel of an RGBI node.")
        .args("red(2) green(2) blue(2)"),
    tele(0x4F, "setpwmchn", P8, "Sets the PWM settings of the three drivers of channel chn of a SAID node; ff is a filler byte.")
        .args("chn ff red(2) green(2) blue(2)"),
    tele(0x50, "readcurchn", P1, "Returns the current level and flags of channel chn of a SAID node.")
        .args("chn")
        .response(2, "flags cur"),
    tele(0x51, "setcurchn", P2, "Sets the current level and flags of channel chn of a SAID node.")
        .args("chn cur"),
    none(0x52),
    none(0x53),
    none(0x54),
    none(0x55),
    none(0x56),
    none(0x57),
    tele(0x58, "readotp", P1, "Returns eight bytes of OTP memory starting at otpaddr.")
        .args("otpaddr")
        .response(8, "data(8)"),
    tele(0x59, "setotp", SizeMask::range(2, 8), "Writes up to seven bytes into the OTP mirror starting at otpaddr.")
        .args("otpaddr data(1..7)"),
    tele(0x5A, "readi2ccfg", P0, "Returns the I2C bridge configuration: flags and bus speed.")
        .response(2, "flags speed"),
    tele(0x5B, "seti2ccfg", P2, "Sets the I2C bridge configuration: flags and bus speed.")
        .args("flags speed"),
    tele(0x5C, "i2cread8", P3, "Reads count bytes from register raddr of I2C device daddr7; fetch them with readlast.")
        .args("daddr7 raddr count"),
    tele(0x5D, "i2cwrite8", SizeMask::range(3, 8), "Writes data bytes to register raddr of I2C device daddr7.")
        .args("daddr7 raddr data(1..6)"),
    tele(0x5E, "readlast", P0, "Returns the bytes collected by the last I2C read.")
        .response(8, "data(8)"),
    none(0x5F),
    // 60..7F: status request twins of 40..5F
    none(0x60),
    none(0x61),
    none(0x62),
    none(0x63),
    none(0x64),
    none(0x65),
    none(0x66),
    none(0x67),
    none(0x68),
    none(0x69),
    none(0x6A),
    tele(0x6B, "setotth_sr", P3, "Sets the over-temperature thresholds like setotth and returns the resulting status.")
        .args("otth(3)")
        .response(1, "stat"),
    none(0x6C),
    tele(0x6D, "setsetup_sr", P1, "Sets the setup flags like setsetup and returns the resulting status.")
        .args("flags")
        .response(1, "stat"),
    none(0x6E),
    tele(0x6F, "setpwm_sr", P6, "Sets the PWM settings like setpwm and returns the resulting status.")
        .args("red(2) green(2) blue(2)")
        .response(1, "stat"),
    tele(0x6F, "setpwmchn_sr", P8, "Sets the channel PWM settings like setpwmchn and returns the resulting status.")
        .args("chn ff red(2) green(2) blue(2)")
        .response(1, "stat"),
    none(0x70),
    tele(0x71, "setcurchn_sr", P2, "Sets the channel current like setcurchn and returns the resulting status.")
        .args("chn cur")
        .response(1, "stat"),
    none(0x72),
    none(0x73),
    none(0x74),
    none(0x75),
    none(0x76),
    none(0x77),
    none(0x78),
    tele(0x79, "setotp_sr", SizeMask::range(2, 8), "Writes the OTP mirror like setotp and returns the resulting status.")
        .args("otpaddr data(1..7)")
        .response(1, "stat"),
    none(0x7A),
    tele(0x7B, "seti2ccfg_sr", P2, "Sets the I2C bridge configuration like seti2ccfg and returns the resulting status.")
        .args("flags speed")
        .response(1, "stat"),
    tele(0x7C, "i2cread8_sr", P3, "Starts an I2C read like i2cread8 and returns the resulting status.")
        .args("daddr7 raddr count")
        .response(1, "stat"),
    tele(0x7D, "i2cwrite8_sr", SizeMask::range(3, 8), "Starts an I2C write like i2cwrite8 and returns the resulting status.")
        .args("daddr7 raddr data(1..6)")
        .response(1, "stat"),
    none(0x7E),
    none(0x7F),
];

/// The compiled-in table as owned variants.
pub fn builtin_variants() -> Vec<TelegramVariant> {
    TELEGRAMS.iter().copied().map(TelegramVariant::from).collect()
}
