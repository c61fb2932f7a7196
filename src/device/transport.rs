//! Report-level transport used by the request dispatcher.
//!
//! The device session only needs three primitives: write one report, read
//! one report, and drop any reports already queued by the OS. `HidDevice`
//! provides them over hidapi; tests use a recording mock.

use hidapi::HidDevice;

use crate::error::Result;

/// Default HID read timeout in milliseconds.
const READ_TIMEOUT_MS: i32 = 2000;

/// Report id prepended to writes. The device does not use numbered reports.
const HID_REPORT_ID: u8 = 0x00;

/// Scratch buffer size when draining queued reports.
const DRAIN_BUFFER_LENGTH: usize = 64;

/// Report-level I/O with a single device.
pub trait Transport {
    /// Write one outbound report.
    fn write(&mut self, report: &[u8]) -> Result<()>;

    /// Block for one inbound report, returning the number of bytes read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Discard any inbound reports that have not been read yet.
    fn clear_enqueued_reports(&mut self) -> Result<()>;
}

impl Transport for HidDevice {
    fn write(&mut self, report: &[u8]) -> Result<()> {
        let mut buf = Vec::with_capacity(report.len() + 1);
        buf.push(HID_REPORT_ID);
        buf.extend_from_slice(report);

        HidDevice::write(self, &buf)?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.read_timeout(buf, READ_TIMEOUT_MS)?)
    }

    fn clear_enqueued_reports(&mut self) -> Result<()> {
        let mut buf = [0u8; DRAIN_BUFFER_LENGTH];
        while self.read_timeout(&mut buf, 0)? > 0 {}
        Ok(())
    }
}
