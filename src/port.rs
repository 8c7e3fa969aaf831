use anyhow::Result;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::debug;

use crate::cli::SerialOpts;
use crate::connection::Connection;
use crate::error;
use crate::proto::command::{LENGTH_PREFIX, hex};

pub fn open_port(opts: &SerialOpts) -> Result<Box<dyn SerialPort>> {
    let builder = serialport::new(&opts.dev, opts.baud)
        .timeout(Duration::from_millis(opts.timeout_ms))
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None);

    builder
        .open()
        .map_err(|e| anyhow::anyhow!("open {}: {}", opts.dev, e))
}

/// Direct commands over a serial device (Bluetooth SPP/RFCOMM or USB CDC).
pub struct SerialConnection {
    port: Box<dyn SerialPort>,
}

impl SerialConnection {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl Connection for SerialConnection {
    fn send(&mut self, packet: &[u8]) -> error::Result<()> {
        self.port.write_all(packet)?;
        self.port.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> error::Result<Vec<u8>> {
        let mut len = [0u8; LENGTH_PREFIX];
        self.port.read_exact(&mut len)?;
        let body_len = u16::from_le_bytes(len) as usize;
        let mut frame = vec![0u8; LENGTH_PREFIX + body_len];
        frame[..LENGTH_PREFIX].copy_from_slice(&len);
        self.port.read_exact(&mut frame[LENGTH_PREFIX..])?;
        debug!(bytes = %hex(&frame), "received");
        Ok(frame)
    }
}
