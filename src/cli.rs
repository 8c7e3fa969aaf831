use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};

use crate::ev3::{LedStatus, MotorPorts};
use crate::sensor::SensorKind;

#[derive(Parser, Debug, Clone)]
#[command(name = "ev3-direct", about = "Drive a LEGO EV3 brick with direct commands")]
pub struct Cli {
    /// Log every packet (same as RUST_LOG=debug)
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Play a tone on the brick speaker
    Tone(ToneOpts),
    /// Set the button LED pattern
    Led(LedOpts),
    /// Run motors at a given speed
    Motor(MotorOpts),
    /// Stop motors (all outputs and sound when no ports are given)
    Stop(StopOpts),
    /// Read a sensor value
    Sensor(SensorOpts),
    /// Reset the brick's sleep timer
    KeepAlive(KeepAliveOpts),
}

#[derive(Args, Debug, Clone)]
pub struct SerialOpts {
    /// Serial device path (Bluetooth RFCOMM or USB)
    #[arg(long, default_value = "/dev/rfcomm0")]
    pub dev: String,
    /// Baud rate
    #[arg(long, default_value_t = 115_200)]
    pub baud: u32,
    /// Read timeout for replies in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,
    /// Print encoded packets instead of sending them
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ToneOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Frequency in Hz (capped at 10000)
    #[arg(long, default_value_t = 440)]
    pub hz: u32,
    /// Duration in milliseconds (0 sends nothing)
    #[arg(long, default_value_t = 500)]
    pub ms: u32,
    /// Volume in percent (0 sends nothing)
    #[arg(long, default_value_t = 100)]
    pub volume: u32,
}

#[derive(Args, Debug, Clone)]
pub struct LedOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Pattern name (off, green, red-flash, orange-pulse, ...) or raw byte
    #[arg(long, value_parser = parse_led_status)]
    pub status: u8,
}

#[derive(Args, Debug, Clone)]
pub struct MotorOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Output ports, e.g. "A", "BC" or "all"
    #[arg(long)]
    pub ports: MotorPorts,
    /// Speed -100..=100
    #[arg(long, allow_hyphen_values = true)]
    pub speed: i32,
}

#[derive(Args, Debug, Clone)]
pub struct StopOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Output ports to stop; omit to stop everything
    #[arg(long)]
    pub ports: Option<MotorPorts>,
    /// Brake instead of coasting
    #[arg(long, default_value_t = false)]
    pub brake: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SensorOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Input port 1..=4
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub port: u8,
    /// Sensor kind (touch, color, infrared, ultrasonic, gyro, nxt-light, ...)
    #[arg(long)]
    pub kind: SensorKind,
    /// Number of readings
    #[arg(long, default_value_t = 1)]
    pub count: u32,
    /// Pause between readings in milliseconds
    #[arg(long, default_value_t = 100)]
    pub interval_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct KeepAliveOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Minutes until the brick may sleep
    #[arg(long, default_value_t = 30)]
    pub minutes: u8,
}

impl Cmd {
    pub fn serial(&self) -> &SerialOpts {
        match self {
            Cmd::Tone(o) => &o.ser,
            Cmd::Led(o) => &o.ser,
            Cmd::Motor(o) => &o.ser,
            Cmd::Stop(o) => &o.ser,
            Cmd::Sensor(o) => &o.ser,
            Cmd::KeepAlive(o) => &o.ser,
        }
    }
}

fn parse_led_status(s: &str) -> anyhow::Result<u8> {
    if let Ok(status) = s.parse::<LedStatus>() {
        return Ok(status.into());
    }
    let raw = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    raw.map_err(|_| anyhow!("led status must be a pattern name or a byte value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn led_status_names_and_bytes() {
        assert_eq!(parse_led_status("green-flash").unwrap(), 4);
        assert_eq!(parse_led_status("7").unwrap(), 7);
        assert_eq!(parse_led_status("0x04").unwrap(), 4);
        assert!(parse_led_status("purple").is_err());
        assert!(parse_led_status("300").is_err());
    }

    #[test]
    fn parse_tone_subcommand() {
        let cli = Cli::parse_from([
            "ev3-direct", "tone", "--hz", "16000", "--ms", "2000", "--volume", "25", "--dry-run",
        ]);
        match cli.cmd {
            Cmd::Tone(o) => {
                assert_eq!(o.hz, 16000);
                assert_eq!(o.ms, 2000);
                assert_eq!(o.volume, 25);
                assert!(o.ser.dry_run);
                assert_eq!(o.ser.dev, "/dev/rfcomm0");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn parse_motor_and_sensor() {
        let cli = Cli::parse_from(["ev3-direct", "motor", "--ports", "BC", "--speed", "-50"]);
        match cli.cmd {
            Cmd::Motor(o) => {
                assert_eq!(o.ports, MotorPorts::B | MotorPorts::C);
                assert_eq!(o.speed, -50);
            }
            _ => panic!("wrong variant"),
        }

        let cli = Cli::parse_from(["ev3-direct", "-v", "sensor", "--port", "3", "--kind", "gyro"]);
        assert!(cli.verbose);
        match cli.cmd {
            Cmd::Sensor(o) => {
                assert_eq!(o.port, 3);
                assert_eq!(o.kind, SensorKind::Gyro);
                assert_eq!(o.count, 1);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_error_cases() {
        assert!(Cli::try_parse_from(["ev3-direct", "sensor", "--port", "5", "--kind", "touch"]).is_err());
        assert!(Cli::try_parse_from(["ev3-direct", "sensor", "--port", "1", "--kind", "lava"]).is_err());
        assert!(Cli::try_parse_from(["ev3-direct", "motor", "--ports", "X", "--speed", "1"]).is_err());
    }
}
