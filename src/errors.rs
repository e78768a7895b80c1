//! Error types raised by the capability layer.
//!
//! None of these abort a match: a [`CaptureError`] skips the current tick, an
//! [`InjectionError`] is logged and execution moves on, and [`Cancelled`] drains the
//! match to a finalized report.

/// The capture layer could not deliver a frame this tick.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// No frame was available (window minimized, device busy, ...).
    #[error("frame unavailable: {0}")]
    Unavailable(String),

    /// A frame was produced but its buffer does not match its declared size.
    #[error("malformed frame: expected {expected} pixels, got {actual}")]
    Malformed {
        /// `width * height` of the frame.
        expected: usize,
        /// Pixel count actually present.
        actual: usize,
    },
}

/// The input layer rejected an action.
#[derive(Debug, thiserror::Error)]
pub enum InjectionError {
    /// The device refused the event.
    #[error("input '{input}' rejected: {reason}")]
    Rejected {
        /// Human readable name of the event (`press w`, `fire`, ...).
        input: String,
        /// Why the device refused it.
        reason: String,
    },
}

/// Marker returned by waits interrupted by an operator abort.
///
/// Not an error in the usual sense: whoever receives it finalizes its work and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cancelled by operator")]
pub struct Cancelled;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(Cancelled.to_string(), "cancelled by operator");
        let rejected = InjectionError::Rejected {
            input: "press w".to_owned(),
            reason: "busy".to_owned(),
        };
        assert_eq!(rejected.to_string(), "input 'press w' rejected: busy");
        let malformed = CaptureError::Malformed {
            expected: 4,
            actual: 3,
        };
        assert_eq!(malformed.to_string(), "malformed frame: expected 4 pixels, got 3");
    }
}
