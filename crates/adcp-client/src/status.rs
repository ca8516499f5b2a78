use std::fmt;

/// Status byte reported by the instrument in every response.
///
/// Surfaced verbatim to callers; the client never reinterprets a non-OK
/// status as a transport fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    MessageTooShort,
    InvalidPrefix,
    InvalidCommand,
    TooFewArguments,
    NoMemory,
    NotEnabled,
    NoMeasurements,
    TooMuchMeasurements,
    MeasurementActive,
    NoSuchMeasurement,
    NoEnabledMeasurement,
    WrongArgument,
    FftNoMemory,
    FftInvalidLength,
    FftInvalidWindow,
    AdcReset,
    CalibrationTimeout,
    SomethingIsNotGood,
    WrongReferencePins,
    MessageTooLong,
    MessageTypeNotSupported,
    Unknown(u8),
}

impl StatusCode {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => StatusCode::Ok,
            0x01 => StatusCode::MessageTooShort,
            0x02 => StatusCode::InvalidPrefix,
            0x03 => StatusCode::InvalidCommand,
            0x04 => StatusCode::TooFewArguments,
            0x05 => StatusCode::NoMemory,
            0x06 => StatusCode::NotEnabled,
            0x07 => StatusCode::NoMeasurements,
            0x08 => StatusCode::TooMuchMeasurements,
            0x09 => StatusCode::MeasurementActive,
            0x0A => StatusCode::NoSuchMeasurement,
            0x0B => StatusCode::NoEnabledMeasurement,
            0x0C => StatusCode::WrongArgument,
            0x0D => StatusCode::FftNoMemory,
            0x0E => StatusCode::FftInvalidLength,
            0x0F => StatusCode::FftInvalidWindow,
            0x10 => StatusCode::AdcReset,
            0x11 => StatusCode::CalibrationTimeout,
            0x12 => StatusCode::SomethingIsNotGood,
            0x13 => StatusCode::WrongReferencePins,
            0x14 => StatusCode::MessageTooLong,
            0x15 => StatusCode::MessageTypeNotSupported,
            other => StatusCode::Unknown(other),
        }
    }

    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }

    /// The protocol's canonical name for this status.
    pub fn name(self) -> &'static str {
        match self {
            StatusCode::Ok => "RESPONSE_OK",
            StatusCode::MessageTooShort => "RESPONSE_MESSAGE_TOO_SHORT",
            StatusCode::InvalidPrefix => "RESPONSE_INVALID_PREFIX",
            StatusCode::InvalidCommand => "RESPONSE_INVALID_COMMAND",
            StatusCode::TooFewArguments => "RESPONSE_TOO_FEW_ARGUMENTS",
            StatusCode::NoMemory => "RESPONSE_NO_MEMORY",
            StatusCode::NotEnabled => "RESPONSE_NOT_ENABLED",
            StatusCode::NoMeasurements => "RESPONSE_NO_MEASUREMENTS",
            StatusCode::TooMuchMeasurements => "RESPONSE_TOO_MUCH_MEASUREMENTS",
            StatusCode::MeasurementActive => "RESPONSE_MEASUREMENT_ACTIVE",
            StatusCode::NoSuchMeasurement => "RESPONSE_NO_SUCH_MEASUREMENT",
            StatusCode::NoEnabledMeasurement => "RESPONSE_NO_ENABLED_MEASUREMENT",
            StatusCode::WrongArgument => "RESPONSE_WRONG_ARGUMENT",
            StatusCode::FftNoMemory => "RESPONSE_FFT_NO_MEMORY",
            StatusCode::FftInvalidLength => "RESPONSE_FFT_INVALID_LENGTH",
            StatusCode::FftInvalidWindow => "RESPONSE_FFT_INVALID_WINDOW",
            StatusCode::AdcReset => "RESPONSE_ADC_RESET",
            StatusCode::CalibrationTimeout => "RESPONSE_CALIBRATION_TIMEOUT",
            StatusCode::SomethingIsNotGood => "RESPONSE_SOMETHING_IS_NOT_GOOD",
            StatusCode::WrongReferencePins => "RESPONSE_WRONG_REFERENCE_PINS",
            StatusCode::MessageTooLong => "RESPONSE_MESSAGE_TOO_LONG",
            StatusCode::MessageTypeNotSupported => "RESPONSE_MESSAGE_TYPE_NOT_SUPPORTED",
            StatusCode::Unknown(_) => "RESPONSE_UNKNOWN",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Unknown(byte) => write!(f, "unknown status code {byte:#04x}"),
            other => f.write_str(other.name()),
        }
    }
}
