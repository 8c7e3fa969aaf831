use super::bytecode::{DIRECT_REPLY, DIRECT_REPLY_ERROR};
use super::command::LENGTH_PREFIX;
use crate::error::{Ev3Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectReply {
    pub counter: u16,
    pub status: ReplyStatus,
    /// Global variable bytes, in allocation order.
    pub payload: Vec<u8>,
}

impl DirectReply {
    /// Decode one length-prefixed reply frame.
    pub fn parse(frame: &[u8]) -> Result<Self> {
        // length (2) + counter (2) + type (1)
        if frame.len() < LENGTH_PREFIX + 3 {
            return Err(Ev3Error::ShortReply(frame.len()));
        }
        let declared = u16::from_le_bytes([frame[0], frame[1]]) as usize;
        let actual = frame.len() - LENGTH_PREFIX;
        if declared != actual {
            return Err(Ev3Error::LengthMismatch { declared, actual });
        }
        let counter = u16::from_le_bytes([frame[2], frame[3]]);
        let status = match frame[4] {
            DIRECT_REPLY => ReplyStatus::Ok,
            DIRECT_REPLY_ERROR => ReplyStatus::Error,
            other => return Err(Ev3Error::UnknownReplyType(other)),
        };
        Ok(Self {
            counter,
            status,
            payload: frame[5..].to_vec(),
        })
    }

    /// Check that this answers message `counter` and that the brick accepted it.
    pub fn expect_ok(self, counter: u16) -> Result<Self> {
        if self.counter != counter {
            return Err(Ev3Error::CounterMismatch {
                expected: counter,
                got: self.counter,
            });
        }
        match self.status {
            ReplyStatus::Ok => Ok(self),
            ReplyStatus::Error => Err(Ev3Error::ReplyError(self.counter)),
        }
    }

    pub fn f32_at(&self, offset: usize) -> Result<f32> {
        let bytes = self
            .payload
            .get(offset..offset + 4)
            .ok_or(Ev3Error::ShortReply(self.payload.len()))?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(counter: u16, ty: u8, payload: &[u8]) -> Vec<u8> {
        let len = (payload.len() + 3) as u16;
        let mut v = len.to_le_bytes().to_vec();
        v.extend_from_slice(&counter.to_le_bytes());
        v.push(ty);
        v.extend_from_slice(payload);
        v
    }

    #[test]
    fn parse_ok_reply_with_float() {
        let f = frame(3, DIRECT_REPLY, &42.5f32.to_le_bytes());
        let r = DirectReply::parse(&f).unwrap().expect_ok(3).unwrap();
        assert_eq!(r.status, ReplyStatus::Ok);
        assert_eq!(r.f32_at(0).unwrap(), 42.5);
    }

    #[test]
    fn error_reply_is_reported() {
        let f = frame(9, DIRECT_REPLY_ERROR, &[0, 0, 0, 0]);
        let r = DirectReply::parse(&f).unwrap();
        assert!(matches!(r.expect_ok(9), Err(Ev3Error::ReplyError(9))));
    }

    #[test]
    fn test_error_cases() {
        assert!(matches!(
            DirectReply::parse(&[0x03, 0x00, 0x01]),
            Err(Ev3Error::ShortReply(3))
        ));

        let mut f = frame(1, DIRECT_REPLY, &[1, 2]);
        f.push(0xFF);
        assert!(matches!(
            DirectReply::parse(&f),
            Err(Ev3Error::LengthMismatch { declared: 5, actual: 6 })
        ));

        assert!(matches!(
            DirectReply::parse(&frame(1, 0x55, &[])),
            Err(Ev3Error::UnknownReplyType(0x55))
        ));

        let r = DirectReply::parse(&frame(2, DIRECT_REPLY, &[])).unwrap();
        assert!(matches!(
            r.clone().expect_ok(5),
            Err(Ev3Error::CounterMismatch { expected: 5, got: 2 })
        ));
        assert!(matches!(r.f32_at(0), Err(Ev3Error::ShortReply(0))));
    }
}
