//! Command output

use std::io::{self, Write};

use chase_driver::DriveCommand;
use serde::Serialize;

/// Destination for single-axis drive packets
pub trait CommandSink {
    fn send(&mut self, sequence: u32, command: DriveCommand) -> io::Result<()>;
}

/// Records packets in memory
impl CommandSink for Vec<(u32, DriveCommand)> {
    fn send(&mut self, sequence: u32, command: DriveCommand) -> io::Result<()> {
        self.push((sequence, command));
        Ok(())
    }
}

#[derive(Serialize)]
struct Packet {
    sequence: u32,
    forward: f64,
    rotation: f64,
}

/// Writes one JSON object per packet, flushing after each
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CommandSink for JsonLinesSink<W> {
    fn send(&mut self, sequence: u32, command: DriveCommand) -> io::Result<()> {
        let packet = Packet {
            sequence,
            forward: command.forward,
            rotation: command.rotation,
        };
        serde_json::to_writer(&mut self.writer, &packet)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
