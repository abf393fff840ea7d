//! Standard error codes for kernel operations.

/// Errors a kernel primitive can report.
///
/// On the wire these are the negative status codes returned by `command` and
/// `subscribe`; a non-negative return is a success payload. [`decode_status`]
/// performs that split for raw bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// Generic failure condition
    Fail,
    /// Underlying system is busy; retry
    Busy,
    /// The state requested is already set
    Already,
    /// The component is powered down
    Off,
    /// Reservation required before use
    Reserve,
    /// An invalid parameter was passed
    Invalid,
    /// Parameter passed was too large
    Size,
    /// Operation canceled by a call
    Cancel,
    /// Memory required not available
    NoMem,
    /// Operation or command is unsupported
    NoSupport,
    /// Device does not exist
    NoDevice,
    /// Device is not physically installed
    Uninstalled,
    /// Packet transmission not acknowledged
    NoAck,
}

impl From<ErrorCode> for isize {
    fn from(err: ErrorCode) -> isize {
        match err {
            ErrorCode::Fail => -1,
            ErrorCode::Busy => -2,
            ErrorCode::Already => -3,
            ErrorCode::Off => -4,
            ErrorCode::Reserve => -5,
            ErrorCode::Invalid => -6,
            ErrorCode::Size => -7,
            ErrorCode::Cancel => -8,
            ErrorCode::NoMem => -9,
            ErrorCode::NoSupport => -10,
            ErrorCode::NoDevice => -11,
            ErrorCode::Uninstalled => -12,
            ErrorCode::NoAck => -13,
        }
    }
}

/// Split a raw kernel status into a success payload or an [`ErrorCode`].
///
/// Statuses are non-negative on success (the value is operation specific: a
/// handle, a count, or zero) and negative on failure. A negative status
/// outside the defined range decodes to [`ErrorCode::Fail`].
pub fn decode_status(status: isize) -> Result<u32, ErrorCode> {
    match status {
        s if s >= 0 => Ok(s as u32),
        -1 => Err(ErrorCode::Fail),
        -2 => Err(ErrorCode::Busy),
        -3 => Err(ErrorCode::Already),
        -4 => Err(ErrorCode::Off),
        -5 => Err(ErrorCode::Reserve),
        -6 => Err(ErrorCode::Invalid),
        -7 => Err(ErrorCode::Size),
        -8 => Err(ErrorCode::Cancel),
        -9 => Err(ErrorCode::NoMem),
        -10 => Err(ErrorCode::NoSupport),
        -11 => Err(ErrorCode::NoDevice),
        -12 => Err(ErrorCode::Uninstalled),
        -13 => Err(ErrorCode::NoAck),
        _ => Err(ErrorCode::Fail),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_status, ErrorCode};

    #[test]
    fn success_payload_passes_through() {
        assert_eq!(decode_status(0), Ok(0));
        assert_eq!(decode_status(42), Ok(42));
    }

    #[test]
    fn every_code_round_trips() {
        let codes = [
            ErrorCode::Fail,
            ErrorCode::Busy,
            ErrorCode::Already,
            ErrorCode::Off,
            ErrorCode::Reserve,
            ErrorCode::Invalid,
            ErrorCode::Size,
            ErrorCode::Cancel,
            ErrorCode::NoMem,
            ErrorCode::NoSupport,
            ErrorCode::NoDevice,
            ErrorCode::Uninstalled,
            ErrorCode::NoAck,
        ];
        for code in codes {
            assert_eq!(decode_status(isize::from(code)), Err(code));
        }
    }

    #[test]
    fn unknown_negative_status_is_fail() {
        assert_eq!(decode_status(-14), Err(ErrorCode::Fail));
        assert_eq!(decode_status(isize::MIN), Err(ErrorCode::Fail));
    }
}
