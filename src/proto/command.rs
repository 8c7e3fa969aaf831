use super::bytecode::{DIRECT_COMMAND_NO_REPLY, DIRECT_COMMAND_REPLY, Param};

/// Bytes preceding the sub-command once the 2-byte length prefix is removed:
/// counter (2), type (1), variable allocation (2), opcode (1).
#[cfg(test)]
pub const BASIC_MESSAGE_BYTE_OFFSET: usize = 6;

/// Size of the little-endian length prefix of every packet.
pub const LENGTH_PREFIX: usize = 2;

/// One direct command packet under construction.
///
/// A packet carries one or more opcodes; the header is written at
/// [`Ev3Command::into_bytes`] time so the length field covers everything.
#[derive(Debug, Clone)]
pub struct Ev3Command {
    counter: u16,
    reply: bool,
    globals: u16,
    body: Vec<u8>,
}

impl Ev3Command {
    pub fn no_reply(counter: u16) -> Self {
        Self {
            counter,
            reply: false,
            globals: 0,
            body: Vec::with_capacity(16),
        }
    }

    /// Command expecting a reply carrying `globals` bytes of global variables.
    pub fn with_reply(counter: u16, globals: u16) -> Self {
        Self {
            counter,
            reply: true,
            globals: globals & 0x03FF,
            body: Vec::with_capacity(16),
        }
    }

    pub fn expects_reply(&self) -> bool {
        self.reply
    }

    pub fn op(mut self, opcode: u8) -> Self {
        self.body.push(opcode);
        self
    }

    /// Raw sub-code byte (sub-codes are written without a prefix).
    pub fn sub(mut self, code: u8) -> Self {
        self.body.push(code);
        self
    }

    pub fn param(mut self, p: Param) -> Self {
        p.encode_into(&mut self.body);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        // no local variables: bits 10..15 stay zero
        let alloc: u16 = self.globals;
        let len = (self.body.len() + 5) as u16;
        let mut out = Vec::with_capacity(LENGTH_PREFIX + len as usize);
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&self.counter.to_le_bytes());
        out.push(if self.reply {
            DIRECT_COMMAND_REPLY
        } else {
            DIRECT_COMMAND_NO_REPLY
        });
        out.extend_from_slice(&alloc.to_le_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}

/// Hex dump for logs and `--dry-run`.
pub fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        let _ = write!(s, "{:02X}", b);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::super::bytecode::*;
    use super::*;

    #[test]
    fn header_layout() {
        let pkt = Ev3Command::no_reply(0x0102)
            .op(OP_UI_WRITE)
            .sub(UI_WRITE_LED)
            .param(Param::Lc1(4))
            .into_bytes();
        assert_eq!(
            pkt,
            vec![0x09, 0x00, 0x02, 0x01, 0x80, 0x00, 0x00, 0x82, 0x1B, 0x81, 0x04]
        );
        // opcode sits right before the basic offset once the length is stripped
        assert_eq!(pkt[LENGTH_PREFIX + BASIC_MESSAGE_BYTE_OFFSET - 1], OP_UI_WRITE);
    }

    #[test]
    fn reply_header_carries_global_allocation() {
        let pkt = Ev3Command::with_reply(7, 4)
            .op(OP_INPUT_DEVICE)
            .into_bytes();
        assert_eq!(&pkt[..8], &[0x06, 0x00, 0x07, 0x00, 0x00, 0x04, 0x00, 0x99]);
    }

    #[test]
    fn length_covers_everything_after_prefix() {
        let pkt = Ev3Command::no_reply(0)
            .op(OP_SOUND)
            .sub(SOUND_TONE)
            .param(Param::Lc0(13))
            .param(Param::Lc2(440))
            .param(Param::Lc2(500))
            .into_bytes();
        let declared = u16::from_le_bytes([pkt[0], pkt[1]]) as usize;
        assert_eq!(declared, pkt.len() - LENGTH_PREFIX);
    }

    #[test]
    fn hex_dump() {
        assert_eq!(hex(&[0x00, 0xAB, 0x7]), "00 AB 07");
        assert_eq!(hex(&[]), "");
    }
}
