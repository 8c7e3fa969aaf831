use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::error::{Ev3Error, Result};
use crate::proto::bytecode::*;
use crate::proto::command::{Ev3Command, hex};
use crate::proto::reply::DirectReply;
use crate::sensor::SensorKind;

pub const MAX_FREQUENCY_HZ: u32 = 10_000;
/// Duration travels as a signed 16-bit constant.
pub const MAX_DURATION_MS: u32 = i16::MAX as u32;
pub const MAX_VOLUME_LEVEL: u32 = 13;
pub const MAX_SPEED: i32 = 100;

/// Built-in LED patterns of the brick buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedStatus {
    Off = 0,
    Green = 1,
    Red = 2,
    Orange = 3,
    GreenFlash = 4,
    RedFlash = 5,
    OrangeFlash = 6,
    GreenPulse = 7,
    RedPulse = 8,
    OrangePulse = 9,
}

impl From<LedStatus> for u8 {
    fn from(s: LedStatus) -> u8 {
        s as u8
    }
}

impl FromStr for LedStatus {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "off" => Ok(LedStatus::Off),
            "green" => Ok(LedStatus::Green),
            "red" => Ok(LedStatus::Red),
            "orange" => Ok(LedStatus::Orange),
            "green-flash" => Ok(LedStatus::GreenFlash),
            "red-flash" => Ok(LedStatus::RedFlash),
            "orange-flash" => Ok(LedStatus::OrangeFlash),
            "green-pulse" => Ok(LedStatus::GreenPulse),
            "red-pulse" => Ok(LedStatus::RedPulse),
            "orange-pulse" => Ok(LedStatus::OrangePulse),
            _ => Err(()),
        }
    }
}

/// Set of motor outputs A..D as the firmware bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorPorts(u8);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MotorPortsError {
    #[error("no motor port given")]
    Empty,
    #[error("invalid motor port {0:?} (expected A-D)")]
    BadPort(char),
}

impl MotorPorts {
    pub const A: MotorPorts = MotorPorts(0x01);
    pub const B: MotorPorts = MotorPorts(0x02);
    pub const C: MotorPorts = MotorPorts(0x04);
    pub const D: MotorPorts = MotorPorts(0x08);
    pub const ALL: MotorPorts = MotorPorts(0x0F);

    pub fn mask(self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for MotorPorts {
    type Output = MotorPorts;
    fn bitor(self, rhs: MotorPorts) -> MotorPorts {
        MotorPorts(self.0 | rhs.0)
    }
}

impl FromStr for MotorPorts {
    type Err = MotorPortsError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(MotorPorts::ALL);
        }
        let mut mask = 0u8;
        for c in s.chars().filter(|c| !matches!(c, ',' | ' ' | '+')) {
            let port = match c.to_ascii_uppercase() {
                'A' => MotorPorts::A,
                'B' => MotorPorts::B,
                'C' => MotorPorts::C,
                'D' => MotorPorts::D,
                other => return Err(MotorPortsError::BadPort(other)),
            };
            mask |= port.mask();
        }
        if mask == 0 {
            return Err(MotorPortsError::Empty);
        }
        Ok(MotorPorts(mask))
    }
}

/// Device volume level 0..=13 for a percentage; any audible percentage maps
/// to at least level 1.
pub fn volume_level(percent: u32) -> u8 {
    let percent = percent.min(100);
    ((percent * MAX_VOLUME_LEVEL).div_ceil(100)) as u8
}

/// Driver for one EV3 brick speaking direct commands over `C`.
pub struct LegoEv3<C: Connection> {
    conn: C,
    counter: u16,
    initialised: bool,
}

impl<C: Connection> LegoEv3<C> {
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            counter: 0,
            initialised: false,
        }
    }

    pub fn initialise(&mut self) {
        self.counter = 0;
        self.initialised = true;
        info!("ev3 initialised");
    }

    #[cfg(test)]
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn into_connection(self) -> C {
        self.conn
    }

    /// Play a tone. Returns `false` when the tone is inaudible (zero duration
    /// or volume) and nothing was sent.
    pub fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32, volume_percent: u32) -> Result<bool> {
        self.ensure_initialised()?;
        if duration_ms == 0 || volume_percent == 0 {
            warn!(frequency_hz, duration_ms, volume_percent, "tone suppressed");
            return Ok(false);
        }
        let hz = frequency_hz.min(MAX_FREQUENCY_HZ);
        let ms = duration_ms.min(MAX_DURATION_MS);
        let level = volume_level(volume_percent);

        let cmd = Ev3Command::no_reply(self.counter)
            .op(OP_SOUND)
            .sub(SOUND_TONE)
            .param(Param::Lc0(level as i8))
            .param(Param::Lc2(hz as i16))
            .param(Param::Lc2(ms as i16));
        self.send(cmd)?;
        info!(hz, ms, level, "tone");
        Ok(true)
    }

    pub fn set_led(&mut self, status: u8) -> Result<()> {
        self.ensure_initialised()?;
        let cmd = Ev3Command::no_reply(self.counter)
            .op(OP_UI_WRITE)
            .sub(UI_WRITE_LED)
            .param(Param::Lc1(status as i8));
        self.send(cmd)?;
        info!(status, "led");
        Ok(())
    }

    /// Set speed on `ports` and start them; speed is clamped to -100..=100.
    pub fn move_motor_speed(&mut self, ports: MotorPorts, speed: i32) -> Result<()> {
        self.ensure_initialised()?;
        let speed = speed.clamp(-MAX_SPEED, MAX_SPEED);
        let cmd = Ev3Command::no_reply(self.counter)
            .op(OP_OUTPUT_SPEED)
            .param(Param::Lc0(LAYER_MASTER as i8))
            .param(Param::Lc0(ports.mask() as i8))
            .param(Param::Lc1(speed as i8))
            .op(OP_OUTPUT_START)
            .param(Param::Lc0(LAYER_MASTER as i8))
            .param(Param::Lc0(ports.mask() as i8));
        self.send(cmd)?;
        info!(ports = ports.mask(), speed, "motor speed");
        Ok(())
    }

    pub fn stop_motor(&mut self, ports: MotorPorts, brake: bool) -> Result<()> {
        self.ensure_initialised()?;
        let cmd = Ev3Command::no_reply(self.counter)
            .op(OP_OUTPUT_STOP)
            .param(Param::Lc0(LAYER_MASTER as i8))
            .param(Param::Lc0(ports.mask() as i8))
            .param(Param::Lc0(brake as i8));
        self.send(cmd)?;
        info!(ports = ports.mask(), brake, "motor stop");
        Ok(())
    }

    /// Coast every output and cut any playing sound.
    pub fn stop_all(&mut self) -> Result<()> {
        self.ensure_initialised()?;
        let cmd = Ev3Command::no_reply(self.counter)
            .op(OP_OUTPUT_STOP)
            .param(Param::Lc0(LAYER_MASTER as i8))
            .param(Param::Lc0(MotorPorts::ALL.mask() as i8))
            .param(Param::Lc0(0))
            .op(OP_SOUND)
            .sub(SOUND_BREAK);
        self.send(cmd)?;
        info!("stop all");
        Ok(())
    }

    pub fn keep_alive(&mut self, minutes: u8) -> Result<()> {
        self.ensure_initialised()?;
        let cmd = Ev3Command::no_reply(self.counter)
            .op(OP_KEEP_ALIVE)
            .param(Param::constant(minutes as i32));
        self.send(cmd)
    }

    /// Read one SI value from input `port` (1..=4).
    pub fn read_sensor(&mut self, port: u8, kind: SensorKind) -> Result<f32> {
        self.ensure_initialised()?;
        if !(1..=4).contains(&port) {
            return Err(Ev3Error::InvalidPort(port));
        }
        let (ty, mode) = kind.type_mode();
        let counter = self.counter;
        let cmd = Ev3Command::with_reply(counter, 4)
            .op(OP_INPUT_DEVICE)
            .sub(INPUT_DEVICE_READY_SI)
            .param(Param::Lc0(LAYER_MASTER as i8))
            .param(Param::Lc0((port - 1) as i8))
            .param(Param::constant(ty as i32))
            .param(Param::Lc0(mode as i8))
            .param(Param::Lc0(1))
            .param(Param::Gv0(0));
        self.send(cmd)?;

        let reply = loop {
            let reply = DirectReply::parse(&self.conn.receive()?)?;
            // late answer to an earlier, timed-out request
            let age = counter.wrapping_sub(reply.counter);
            if age != 0 && age < 0x8000 {
                warn!(expected = counter, got = reply.counter, "stale reply dropped");
                continue;
            }
            break reply;
        };
        let value = reply.expect_ok(counter)?.f32_at(0)?;
        debug!(port, %kind, value, "sensor");
        Ok(value)
    }

    fn ensure_initialised(&self) -> Result<()> {
        if self.initialised {
            Ok(())
        } else {
            Err(Ev3Error::NotInitialised)
        }
    }

    fn send(&mut self, cmd: Ev3Command) -> Result<()> {
        let reply = cmd.expects_reply();
        let bytes = cmd.into_bytes();
        debug!(counter = self.counter, reply, bytes = %hex(&bytes), "send");
        self.conn.send(&bytes)?;
        self.counter = self.counter.wrapping_add(1);
        Ok(())
    }
}
