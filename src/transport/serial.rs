//! The serial endpoint the transport manager drives.

use crate::error::{Result, TelemetryError};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// One serial device the frames are written to.
///
/// Implementations report open/write failures as errors and keep `close`
/// infallible - a close failure has nothing useful to say to the caller and
/// must never mask the write failure that triggered it.
#[async_trait]
pub trait SerialEndpoint: Send {
    /// The endpoint identity for logs and notifications, e.g. "/dev/ttyUSB0".
    fn endpoint_name(&self) -> &str;

    /// Open the device. Idempotence is not required; the manager only calls
    /// this from the closed state.
    async fn open(&mut self) -> Result<()>;

    /// Write one already-terminated line. Fire-and-forget: no reply is ever
    /// read back from the device.
    async fn write_line(&mut self, line: &str) -> Result<()>;

    /// Release the device. Best-effort and callable in any state.
    async fn close(&mut self);
}

/// Production endpoint over a tokio-serial stream.
pub struct TokioSerialEndpoint {
    port_name: String,
    baud_rate: u32,
    stream: Option<SerialStream>,
}

impl TokioSerialEndpoint {
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            stream: None,
        }
    }
}

#[async_trait]
impl SerialEndpoint for TokioSerialEndpoint {
    fn endpoint_name(&self) -> &str {
        &self.port_name
    }

    async fn open(&mut self) -> Result<()> {
        let stream = tokio_serial::new(&self.port_name, self.baud_rate)
            .open_native_async()
            .map_err(|e| {
                TelemetryError::transport(format!("failed to open {}: {}", self.port_name, e))
            })?;
        self.stream = Some(stream);
        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| TelemetryError::transport("serial port is not open"))?;

        stream
            .write_all(line.as_bytes())
            .await
            .map_err(|e| TelemetryError::transport(format!("serial write failed: {}", e)))?;
        stream
            .flush()
            .await
            .map_err(|e| TelemetryError::transport(format!("serial flush failed: {}", e)))?;
        Ok(())
    }

    async fn close(&mut self) {
        // Dropping the stream releases the handle; tokio-serial has no
        // separate shutdown to fail.
        self.stream = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_before_open_fails_cleanly() {
        let mut endpoint = TokioSerialEndpoint::new("/dev/ttyUSB0", 115_200);
        let result = endpoint.write_line("CPU:0.0\n").await;
        assert!(matches!(result, Err(TelemetryError::Transport(_))));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut endpoint = TokioSerialEndpoint::new("/dev/ttyUSB0", 115_200);
        endpoint.close().await;
        endpoint.close().await;
        assert_eq!(endpoint.endpoint_name(), "/dev/ttyUSB0");
    }
}
