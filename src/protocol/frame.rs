//! Fixed-length request and response frames.
//!
//! Outbound frames are always [`WRITE_LENGTH`] bytes with the command code in
//! byte 0. Inbound frames are always [`READ_LENGTH`] bytes with a reserved
//! zero in byte 0. Multi-byte fields are big-endian `u16`.

use byteorder::{BigEndian, ByteOrder};

use crate::protocol::commands::{Command, READ_LENGTH, WRITE_LENGTH};

/// A 64-byte command frame.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestFrame {
    command: Command,
    buf: [u8; WRITE_LENGTH],
}

impl RequestFrame {
    /// Zero-filled frame carrying only the command code.
    pub fn new(command: Command) -> Self {
        let mut buf = [0u8; WRITE_LENGTH];
        buf[0] = command.code();
        Self { command, buf }
    }

    /// Set a single byte field. Offset 0 is reserved for the command.
    pub fn with_u8(mut self, offset: usize, value: u8) -> Self {
        debug_assert!(offset > 0, "byte 0 holds the command code");
        self.buf[offset] = value;
        self
    }

    /// Set a big-endian 16-bit field at `offset..offset + 2`.
    pub fn with_u16(mut self, offset: usize, value: u16) -> Self {
        debug_assert!(offset > 0, "byte 0 holds the command code");
        BigEndian::write_u16(&mut self.buf[offset..offset + 2], value);
        self
    }

    /// Copy raw bytes starting at `offset`.
    pub fn with_bytes(mut self, offset: usize, bytes: &[u8]) -> Self {
        debug_assert!(offset > 0, "byte 0 holds the command code");
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn as_bytes(&self) -> &[u8; WRITE_LENGTH] {
        &self.buf
    }

    /// Read back a byte field.
    pub fn u8_at(&self, offset: usize) -> u8 {
        self.buf[offset]
    }

    /// Read back a big-endian 16-bit field.
    pub fn u16_at(&self, offset: usize) -> u16 {
        BigEndian::read_u16(&self.buf[offset..offset + 2])
    }
}

impl std::fmt::Debug for RequestFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Trailing zero padding is noise in logs.
        let used = self
            .buf
            .iter()
            .rposition(|&b| b != 0)
            .map_or(1, |last| last + 1);
        f.debug_struct("RequestFrame")
            .field("command", &self.command)
            .field("bytes", &format_args!("{:02X?}", &self.buf[..used]))
            .finish()
    }
}

/// A 16-byte response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame([u8; READ_LENGTH]);

impl ResponseFrame {
    pub fn new(buf: [u8; READ_LENGTH]) -> Self {
        Self(buf)
    }

    /// Unsigned byte at `offset`.
    pub fn u8_at(&self, offset: usize) -> u8 {
        self.0[offset]
    }

    /// Big-endian `u16` at `offset..offset + 2`.
    pub fn u16_at(&self, offset: usize) -> u16 {
        BigEndian::read_u16(&self.0[offset..offset + 2])
    }

    /// Consecutive single-byte fields starting at `offset`.
    pub fn bytes<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.0[offset..offset + N]);
        out
    }

    pub fn as_bytes(&self) -> &[u8; READ_LENGTH] {
        &self.0
    }
}
