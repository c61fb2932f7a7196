//! One request, one response.
//!
//! Every logical operation writes exactly one frame and then blocks for
//! exactly one response. Errors from the transport are returned as-is; no
//! command is ever retried because several (LED group clear in particular)
//! are not idempotent.

use log::{debug, trace};

use crate::device::transport::Transport;
use crate::error::{CommanderError, Result};
use crate::protocol::{READ_LENGTH, RequestFrame, ResponseFrame};

/// Request dispatcher owning the device transport.
#[derive(Debug)]
pub struct Dispatcher<T: Transport> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Drop stale reports, then write `frame` and read its response.
    pub fn execute(&mut self, frame: &RequestFrame) -> Result<ResponseFrame> {
        self.transport.clear_enqueued_reports()?;
        self.exchange(frame)
    }

    /// Write `frame` and read its response without clearing first.
    ///
    /// Only for back-to-back frames inside a programming sequence, where the
    /// previous response has already been consumed.
    pub fn execute_in_sequence(&mut self, frame: &RequestFrame) -> Result<ResponseFrame> {
        self.exchange(frame)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn exchange(&mut self, frame: &RequestFrame) -> Result<ResponseFrame> {
        debug!("-> {:?}", frame);
        self.transport.write(frame.as_bytes())?;

        let mut buf = [0u8; READ_LENGTH];
        let read = self.transport.read(&mut buf)?;
        if read < READ_LENGTH {
            return Err(CommanderError::ShortRead {
                expected: READ_LENGTH,
                actual: read,
            });
        }

        trace!("<- {:02X?}", buf);
        Ok(ResponseFrame::new(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::transport::mock::{Event, MockTransport};
    use crate::protocol::Command;

    #[test]
    fn test_execute_clears_then_exchanges() {
        let mut transport = MockTransport::new();
        transport.push_response(&[0x00, 0x08, 0x00]);
        let mut dispatcher = Dispatcher::new(transport);

        let resp = dispatcher
            .execute(&RequestFrame::new(Command::GetFirmwareVersion))
            .unwrap();
        assert_eq!(resp.u8_at(2), 0x08);

        let events = &dispatcher.transport().events;
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], Event::Clear);
        assert!(matches!(&events[1], Event::Write(bytes) if bytes.len() == 64 && bytes[0] == 0x02));
        assert_eq!(events[2], Event::Read);
    }

    #[test]
    fn test_in_sequence_skips_clear() {
        let mut dispatcher = Dispatcher::new(MockTransport::new());
        dispatcher
            .execute_in_sequence(&RequestFrame::new(Command::SetLedMode))
            .unwrap();

        let events = &dispatcher.transport().events;
        assert!(!events.contains(&Event::Clear));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_transport_error_propagates_without_read() {
        let mut dispatcher = Dispatcher::new(MockTransport::new().failing_on_write(0));
        let err = dispatcher
            .execute(&RequestFrame::new(Command::GetFanConfig))
            .unwrap_err();

        assert!(matches!(err, CommanderError::HidError(_)));
        assert!(!dispatcher.transport().events.contains(&Event::Read));
    }

    #[test]
    fn test_short_read_is_an_error() {
        let mut dispatcher = Dispatcher::new(MockTransport::new().with_short_reads());
        let err = dispatcher
            .execute(&RequestFrame::new(Command::GetFanConfig))
            .unwrap_err();

        assert!(matches!(
            err,
            CommanderError::ShortRead {
                expected: 16,
                actual: 0
            }
        ));
    }
}
