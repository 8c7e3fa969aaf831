//! EV3 firmware byte codes and parameter encodings used by direct commands.

// ---- Command / reply types ----
pub const DIRECT_COMMAND_REPLY: u8 = 0x00;
pub const DIRECT_COMMAND_NO_REPLY: u8 = 0x80;
pub const DIRECT_REPLY: u8 = 0x02;
pub const DIRECT_REPLY_ERROR: u8 = 0x04;

// ---- Opcodes ----
pub const OP_UI_WRITE: u8 = 0x82;
pub const OP_KEEP_ALIVE: u8 = 0x90;
pub const OP_SOUND: u8 = 0x94;
pub const OP_INPUT_DEVICE: u8 = 0x99;
pub const OP_OUTPUT_STOP: u8 = 0xA3;
pub const OP_OUTPUT_SPEED: u8 = 0xA5;
pub const OP_OUTPUT_START: u8 = 0xA6;

// ---- Sub-codes ----
pub const UI_WRITE_LED: u8 = 0x1B;
pub const SOUND_BREAK: u8 = 0x00;
pub const SOUND_TONE: u8 = 0x01;
pub const INPUT_DEVICE_READY_SI: u8 = 0x1D;

// ---- Parameter prefixes ----
pub const LC1: u8 = 0x81;
pub const LC2: u8 = 0x82;
pub const LC4: u8 = 0x83;
const GV0: u8 = 0x60;

/// Daisy-chain layer of the brick the PC talks to.
pub const LAYER_MASTER: u8 = 0;

/// Parameter as the firmware reads it from the byte code stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Short constant, -31..=31, packed into one byte.
    Lc0(i8),
    Lc1(i8),
    Lc2(i16),
    Lc4(i32),
    /// Global variable reference (reply slot), index < 32.
    Gv0(u8),
}

impl Param {
    /// Smallest constant encoding that can carry `v`.
    pub fn constant(v: i32) -> Self {
        match v {
            -31..=31 => Param::Lc0(v as i8),
            -128..=127 => Param::Lc1(v as i8),
            -32768..=32767 => Param::Lc2(v as i16),
            _ => Param::Lc4(v),
        }
    }

    pub fn encode_into(self, out: &mut Vec<u8>) {
        match self {
            Param::Lc0(v) => out.push((v as u8) & 0x3F),
            Param::Lc1(v) => {
                out.push(LC1);
                out.push(v as u8);
            }
            Param::Lc2(v) => {
                out.push(LC2);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Param::Lc4(v) => {
                out.push(LC4);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Param::Gv0(idx) => out.push(GV0 | (idx & 0x1F)),
        }
    }
}
