use std::collections::BTreeMap;
use std::fmt;

use adcp_wire::ScalarType;

use crate::error::{Result, StateError};

/// Size of the fixed global-state header.
pub const STATE_HEADER_SIZE: usize = 29;

/// Size of one per-measurement record.
pub const MEASUREMENT_RECORD_SIZE: usize = 9;

const SAMPLERATE_SPS: [f64; 16] = [
    2.5, 5.0, 10.0, 16.6, 20.0, 50.0, 60.0, 100.0, 400.0, 1200.0, 2400.0, 4800.0, 7200.0, 14400.0,
    19200.0, 38400.0,
];

/// The instrument's acquisition state, from flag bits 0-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Started {
    Idle,
    Running,
    Oneshot,
    Calibrating,
}

impl Started {
    fn from_flags(flags: u8) -> Self {
        match flags & 0x03 {
            0 => Started::Idle,
            1 => Started::Running,
            2 => Started::Oneshot,
            _ => Started::Calibrating,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Started::Idle => "Idle",
            Started::Running => "Running",
            Started::Oneshot => "Oneshot",
            Started::Calibrating => "Calibrating",
        }
    }
}

impl fmt::Display for Started {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Samplerate selector nibble.
///
/// The nibble always indexes the full 16-entry rate table, so unlike the
/// other selectors it has no unknown sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRate(u8);

impl SampleRate {
    fn from_nibble(nibble: u8) -> Self {
        SampleRate(nibble & 0x0F)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Samples per second.
    pub fn sps(self) -> f64 {
        SAMPLERATE_SPS[self.0 as usize]
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} SPS", self.sps())
    }
}

/// Digital filter selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Sinc1,
    Sinc2,
    Sinc3,
    Sinc4,
    Fir,
    Unknown(u8),
}

impl Filter {
    fn from_index(index: u8) -> Self {
        match index {
            0 => Filter::Sinc1,
            1 => Filter::Sinc2,
            2 => Filter::Sinc3,
            3 => Filter::Sinc4,
            4 => Filter::Fir,
            other => Filter::Unknown(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Filter::Sinc1 => "sinc1",
            Filter::Sinc2 => "sinc2",
            Filter::Sinc3 => "sinc3",
            Filter::Sinc4 => "sinc4",
            Filter::Fir => "FIR",
            Filter::Unknown(_) => "unknown filter",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Programmable gain amplifier setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pga {
    Gain(u16),
    Bypassed,
    Unknown(u8),
}

impl Pga {
    fn from_byte(byte: u8) -> Self {
        match byte {
            0..=5 => Pga::Gain(1 << byte),
            0xFF => Pga::Bypassed,
            other => Pga::Unknown(other),
        }
    }
}

impl fmt::Display for Pga {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pga::Gain(factor) => write!(f, "{factor}"),
            Pga::Bypassed => f.write_str("bypassed"),
            Pga::Unknown(byte) => write!(f, "unknown ({byte:#04x})"),
        }
    }
}

/// FFT window function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftWindow {
    Hann,
    Bartlett,
    Welch,
    Rectangular,
    Unknown(u8),
}

impl FftWindow {
    fn from_index(index: u8) -> Self {
        match index {
            0 => FftWindow::Hann,
            1 => FftWindow::Bartlett,
            2 => FftWindow::Welch,
            255 => FftWindow::Rectangular,
            other => FftWindow::Unknown(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FftWindow::Hann => "Hann",
            FftWindow::Bartlett => "Bartlett",
            FftWindow::Welch => "Welch",
            FftWindow::Rectangular => "Rectangular",
            FftWindow::Unknown(_) => "unknown window",
        }
    }
}

impl fmt::Display for FftWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One measurement's configuration, owned by its enclosing snapshot.
///
/// Record layout (9 bytes, little-endian):
/// `id u8 | input_mux u8 | enabled u8 | averaging u16 | fft_enabled u8 |
/// fft_length u16 | fft_window u8`. The input mux packs the negative pin in
/// the low nibble and the positive pin in the high nibble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementState {
    pub id: u8,
    pub positive_pin: u8,
    pub negative_pin: u8,
    pub enabled: bool,
    pub averaging: u16,
    pub fft_enabled: bool,
    pub fft_length: u16,
    pub fft_window: FftWindow,
}

impl MeasurementState {
    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MEASUREMENT_RECORD_SIZE {
            return Err(StateError::InsufficientData {
                needed: MEASUREMENT_RECORD_SIZE,
                got: bytes.len(),
            });
        }

        let input_mux = bytes[1];
        Ok(MeasurementState {
            id: bytes[0],
            positive_pin: (input_mux & 0xF0) >> 4,
            negative_pin: input_mux & 0x0F,
            enabled: bytes[2] != 0,
            averaging: u16::from_le_bytes([bytes[3], bytes[4]]),
            fft_enabled: bytes[5] != 0,
            fft_length: u16::from_le_bytes([bytes[6], bytes[7]]),
            fft_window: FftWindow::from_index(bytes[8]),
        })
    }
}

/// An immutable snapshot of the instrument's state.
///
/// Global header layout (29 bytes, little-endian):
/// `flags u8 | samplerate+filter u8 | pga u8 | v_ref u64 | ref_inputs u8 |
/// calibration_offset i64 | calibration_scale u64 | measurement_count u8`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub started: Started,
    pub internal_reference: bool,
    pub slow_connection: bool,
    pub adc_reset: bool,
    pub samplerate: SampleRate,
    pub filter: Filter,
    pub pga: Pga,
    /// Reference voltage in 10 nV units.
    pub v_ref: u64,
    pub v_ref_positive_pin: u8,
    pub v_ref_negative_pin: u8,
    pub calibration_offset: i64,
    pub calibration_scale: u64,
    measurements: BTreeMap<u8, MeasurementState>,
}

impl DeviceState {
    /// Decode a status payload into a snapshot.
    ///
    /// Requires the full fixed header plus exactly `measurement_count`
    /// measurement records; fails with `InsufficientData` otherwise.
    /// Out-of-table selector indices decode to their unknown sentinels
    /// rather than failing the snapshot.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < STATE_HEADER_SIZE {
            return Err(StateError::InsufficientData {
                needed: STATE_HEADER_SIZE,
                got: bytes.len(),
            });
        }

        let flags = bytes[0];
        let sr_filter = bytes[1];
        let ref_inputs = bytes[11];

        // Scalar fields go through the shared wire codec; lengths are
        // guaranteed by the header-size check above.
        let v_ref = ScalarType::U64.decode(&bytes[3..11]).unwrap_or_default() as u64;
        let calibration_offset = ScalarType::S64.decode(&bytes[12..20]).unwrap_or_default() as i64;
        let calibration_scale = ScalarType::U64.decode(&bytes[20..28]).unwrap_or_default() as u64;

        let measurement_count = bytes[28] as usize;
        let records = &bytes[STATE_HEADER_SIZE..];
        let needed = measurement_count * MEASUREMENT_RECORD_SIZE;
        if records.len() < needed {
            return Err(StateError::InsufficientData {
                needed: STATE_HEADER_SIZE + needed,
                got: bytes.len(),
            });
        }

        let mut measurements = BTreeMap::new();
        for record in records[..needed].chunks_exact(MEASUREMENT_RECORD_SIZE) {
            let measurement = MeasurementState::decode(record)?;
            measurements.insert(measurement.id, measurement);
        }

        Ok(DeviceState {
            started: Started::from_flags(flags),
            internal_reference: flags & 0x04 != 0,
            slow_connection: flags & 0x08 != 0,
            adc_reset: flags & 0x10 != 0,
            samplerate: SampleRate::from_nibble(sr_filter),
            filter: Filter::from_index((sr_filter & 0xF0) >> 4),
            pga: Pga::from_byte(bytes[2]),
            v_ref,
            v_ref_positive_pin: (ref_inputs & 0xF0) >> 4,
            v_ref_negative_pin: ref_inputs & 0x0F,
            calibration_offset,
            calibration_scale,
            measurements,
        })
    }

    /// Look up a measurement by id.
    pub fn measurement(&self, id: u8) -> Option<&MeasurementState> {
        self.measurements.get(&id)
    }

    /// All measurements, ordered by id.
    pub fn measurements(&self) -> impl Iterator<Item = &MeasurementState> {
        self.measurements.values()
    }

    pub fn measurement_count(&self) -> usize {
        self.measurements.len()
    }

    /// The calibration offset expressed in nanovolts.
    pub fn offset_error_nanovolts(&self) -> f64 {
        let v_ref_nv = self.v_ref as f64 * 10.0;
        v_ref_nv * -(self.calibration_offset as f64) / (1u64 << 24) as f64
    }

    /// The calibration scale expressed as a relative error (1.0 = +100 %).
    pub fn scale_error(&self) -> f64 {
        self.calibration_scale as f64 / 0x40_0000 as f64 - 1.0
    }

    /// The scale error rendered as percent above 1e-2 magnitude, ppm below.
    pub fn format_scale_error(&self) -> String {
        let error = self.scale_error();
        if error.abs() > 0.01 {
            format!("{:.2} %", error * 100.0)
        } else {
            format!("{:.2} ppm", error * 1e6)
        }
    }
}
