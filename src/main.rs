use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod connection;
mod error;
mod ev3;
mod port;
mod proto;
mod sensor;

use cli::{Cli, Cmd};
use connection::{Connection, ConnectionLogger};
use error::Ev3Error;
use ev3::LegoEv3;
use port::{SerialConnection, open_port};
use proto::command::hex;

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let ser = args.cmd.serial().clone();
    if ser.dry_run {
        let mut ev3 = LegoEv3::new(ConnectionLogger::new());
        let res = run(&mut ev3, &args.cmd);
        for packet in ev3.into_connection().drain() {
            println!("{}", hex(&packet));
        }
        return res;
    }

    let port = open_port(&ser)?;
    info!(dev = %ser.dev, baud = ser.baud, "connected");
    let mut ev3 = LegoEv3::new(SerialConnection::new(port));
    run(&mut ev3, &args.cmd)
}

fn run<C: Connection>(ev3: &mut LegoEv3<C>, cmd: &Cmd) -> Result<()> {
    ev3.initialise();
    match cmd {
        Cmd::Tone(o) => {
            ev3.play_tone(o.hz, o.ms, o.volume).context("play tone")?;
        }
        Cmd::Led(o) => ev3.set_led(o.status).context("set led")?,
        Cmd::Motor(o) => ev3.move_motor_speed(o.ports, o.speed).context("motor speed")?,
        Cmd::Stop(o) => match o.ports {
            Some(ports) => ev3.stop_motor(ports, o.brake).context("stop motor")?,
            None => ev3.stop_all().context("stop all")?,
        },
        Cmd::Sensor(o) => {
            for i in 0..o.count {
                if i > 0 {
                    std::thread::sleep(Duration::from_millis(o.interval_ms));
                }
                // nothing answers a dry run; the request packet is all there is to show
                match ev3.read_sensor(o.port, o.kind) {
                    Ok(value) => println!("{}", value),
                    Err(Ev3Error::NoReply) if o.ser.dry_run => {}
                    Err(e) => {
                        return Err(e).with_context(|| format!("read {} on port {}", o.kind, o.port));
                    }
                }
            }
        }
        Cmd::KeepAlive(o) => ev3.keep_alive(o.minutes).context("keep alive")?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_sensor_sends_every_request() {
        let cli = Cli::parse_from([
            "ev3-direct", "sensor", "--port", "2", "--kind", "touch", "--count", "3",
            "--interval-ms", "0", "--dry-run",
        ]);
        let mut ev3 = LegoEv3::new(ConnectionLogger::new());
        run(&mut ev3, &cli.cmd).unwrap();

        let packets = ev3.into_connection().drain();
        assert_eq!(packets.len(), 3);
        for (i, p) in packets.iter().enumerate() {
            assert_eq!(&p[2..4], &(i as u16).to_le_bytes());
        }
    }

    #[test]
    fn missing_reply_fails_outside_dry_run() {
        let cli = Cli::parse_from(["ev3-direct", "sensor", "--port", "1", "--kind", "gyro"]);
        let mut ev3 = LegoEv3::new(ConnectionLogger::new());
        let err = run(&mut ev3, &cli.cmd).unwrap_err();
        assert!(matches!(err.downcast_ref::<Ev3Error>(), Some(Ev3Error::NoReply)));
    }
}
