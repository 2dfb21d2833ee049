//! Audible alert sinks

use std::io::Write;

use super::AlertEvent;
use crate::error::{DashboardError, Result};

/// Something that can make a noise when an alert fires
#[cfg_attr(test, mockall::automock)]
pub trait AlertSound {
    fn play(&self, event: &AlertEvent) -> Result<()>;
}

/// Rings the terminal bell on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AlertSound for TerminalBell {
    fn play(&self, _event: &AlertEvent) -> Result<()> {
        let mut stderr = std::io::stderr().lock();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| DashboardError::Audio(e.to_string()))
    }
}

/// No-op sink used when sound is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSound;

impl AlertSound for SilentSound {
    fn play(&self, _event: &AlertEvent) -> Result<()> {
        Ok(())
    }
}
