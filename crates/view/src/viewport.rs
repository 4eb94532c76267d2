use serde::{Deserialize, Serialize};

use gantry_core::error::{GantryError, Result};
use gantry_core::model::span::Trace;

/// The currently visible time window, a sub-window of the trace duration.
/// `start < end` always holds: the projector divides by the viewport
/// duration, so a zero-width viewport is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    start_time_unix_nano: u64,
    end_time_unix_nano: u64,
}

impl Viewport {
    pub fn new(start_time_unix_nano: u64, end_time_unix_nano: u64) -> Result<Self> {
        if start_time_unix_nano >= end_time_unix_nano {
            return Err(GantryError::InvalidViewport(format!(
                "start {start_time_unix_nano} must be before end {end_time_unix_nano}"
            )));
        }
        Ok(Self {
            start_time_unix_nano,
            end_time_unix_nano,
        })
    }

    /// The full window of a built trace. Fails for a zero-duration root,
    /// which has no displayable window.
    pub fn full(trace: &Trace) -> Result<Self> {
        let root = trace.root_span();
        Self::new(root.start_time_unix_nano, root.end_time_unix_nano)
    }

    pub fn start_time_unix_nano(&self) -> u64 {
        self.start_time_unix_nano
    }

    pub fn end_time_unix_nano(&self) -> u64 {
        self.end_time_unix_nano
    }

    pub fn duration_nanos(&self) -> u64 {
        self.end_time_unix_nano - self.start_time_unix_nano
    }
}
