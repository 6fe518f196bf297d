//! SHT4xI-analog calibration kernel.
//!
//! Linear transfer functions from Figure 4 (page 8) of the Sensirion
//! SHT4xI-analog datasheet, 2024-07-03. The sensor outputs ratiometric
//! voltages, so every physical quantity is a linear function of the ratio
//! between a signal voltage and the supply voltage:
//!
//! ```text
//! RH [%]  = C1 + C2 * (Vrh / Vsupply)
//! T  [°C] = C3 + C4 * (Vt  / Vsupply)
//! T  [°F] = C5 + C6 * (Vt  / Vsupply)
//! ```
//!
//! [`calibrate`] is generic over the value type so the same formulas run on
//! plain `f64` samples and on distributional values supplied by an
//! [`UncertaintyBackend`](crate::uncertainty::UncertaintyBackend).

use std::ops::{Add, Div, Mul};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Datasheet constants
// ---------------------------------------------------------------------------

pub const CALIBRATION_C1: f64 = -12.5;
pub const CALIBRATION_C2: f64 = 125.0;
pub const CALIBRATION_C3: f64 = -66.875;
pub const CALIBRATION_C4: f64 = 218.75;
pub const CALIBRATION_C5: f64 = -88.375;
pub const CALIBRATION_C6: f64 = 393.75;

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Arithmetic needed by the calibration formulas.
///
/// Blanket-implemented, so `f64` and any external distributional type with
/// the same operators qualify automatically.
pub trait Calibratable:
    Copy + Div<Output = Self> + Mul<f64, Output = Self> + Add<f64, Output = Self>
{
}

impl<T> Calibratable for T where
    T: Copy + Div<Output = T> + Mul<f64, Output = T> + Add<f64, Output = T>
{
}

/// One draw of the three sensor voltages, in volts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample<T = f64> {
    /// Ratiometric humidity voltage.
    pub vrh: T,
    /// Ratiometric temperature voltage.
    pub vt: T,
    /// Supply voltage.
    pub vsupply: T,
}

/// A single calibrated physical quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputChannel {
    RelativeHumidity,
    TemperatureCelsius,
    TemperatureFahrenheit,
}

impl OutputChannel {
    /// Every channel, in index order.
    pub const ALL: [OutputChannel; 3] = [
        Self::RelativeHumidity,
        Self::TemperatureCelsius,
        Self::TemperatureFahrenheit,
    ];

    /// Number of channels; also the selector index meaning "all".
    pub const COUNT: usize = Self::ALL.len();

    /// 0-based index used on the command line and in JSON symbols.
    pub fn index(self) -> usize {
        match self {
            Self::RelativeHumidity => 0,
            Self::TemperatureCelsius => 1,
            Self::TemperatureFahrenheit => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable variable description.
    pub fn description(self) -> &'static str {
        match self {
            Self::RelativeHumidity => "Calibrated Relative Humidity",
            Self::TemperatureCelsius => "Calibrated Temperature (in Celsius)",
            Self::TemperatureFahrenheit => "Calibrated Temperature (in Fahrenheit)",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::RelativeHumidity => "%",
            Self::TemperatureCelsius => "Celsius",
            Self::TemperatureFahrenheit => "Fahrenheit",
        }
    }

    /// Offset and slope of the channel's transfer function.
    pub fn coefficients(self) -> (f64, f64) {
        match self {
            Self::RelativeHumidity => (CALIBRATION_C1, CALIBRATION_C2),
            Self::TemperatureCelsius => (CALIBRATION_C3, CALIBRATION_C4),
            Self::TemperatureFahrenheit => (CALIBRATION_C5, CALIBRATION_C6),
        }
    }

    /// Apply this channel's transfer function to one input sample.
    pub fn evaluate<T: Calibratable>(self, sample: &InputSample<T>) -> T {
        let (offset, slope) = self.coefficients();
        let signal = match self {
            Self::RelativeHumidity => sample.vrh,
            Self::TemperatureCelsius | Self::TemperatureFahrenheit => sample.vt,
        };
        (signal / sample.vsupply) * slope + offset
    }
}

impl std::fmt::Display for OutputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeHumidity => write!(f, "relative_humidity"),
            Self::TemperatureCelsius => write!(f, "temperature_celsius"),
            Self::TemperatureFahrenheit => write!(f, "temperature_fahrenheit"),
        }
    }
}

/// Which calibrated quantity (or all of them) a run computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputSelector {
    Single(OutputChannel),
    #[default]
    All,
}

impl OutputSelector {
    /// Selector index meaning "all outputs".
    pub const ALL_INDEX: usize = OutputChannel::COUNT;

    /// Parse a 0-based command-line index. [`Self::ALL_INDEX`] selects all.
    pub fn from_index(index: usize) -> Result<Self> {
        if index == Self::ALL_INDEX {
            return Ok(Self::All);
        }
        OutputChannel::from_index(index)
            .map(Self::Single)
            .ok_or(Error::SelectorOutOfRange {
                provided: index,
                max: Self::ALL_INDEX,
            })
    }

    pub fn index(self) -> usize {
        match self {
            Self::Single(channel) => channel.index(),
            Self::All => Self::ALL_INDEX,
        }
    }

    pub fn is_all(self) -> bool {
        matches!(self, Self::All)
    }

    /// Channels computed for this selector, in evaluation order.
    pub fn channels(self) -> &'static [OutputChannel] {
        match self {
            Self::Single(OutputChannel::RelativeHumidity) => &[OutputChannel::RelativeHumidity],
            Self::Single(OutputChannel::TemperatureCelsius) => &[OutputChannel::TemperatureCelsius],
            Self::Single(OutputChannel::TemperatureFahrenheit) => {
                &[OutputChannel::TemperatureFahrenheit]
            }
            Self::All => &OutputChannel::ALL,
        }
    }

    /// The channel written last; its value is the scalar calibrated value.
    pub fn last_channel(self) -> OutputChannel {
        match self {
            Self::Single(channel) => channel,
            Self::All => OutputChannel::TemperatureFahrenheit,
        }
    }
}

/// Calibrated values for the channels of one evaluation.
///
/// Slots are ordered by [`OutputChannel::index`]; channels outside the
/// selector stay empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratedOutputs<T = f64> {
    values: [Option<T>; OutputChannel::COUNT],
    latest: OutputChannel,
    value: T,
}

impl<T: Copy> CalibratedOutputs<T> {
    /// Outputs holding a single channel's value.
    pub fn single(channel: OutputChannel, value: T) -> Self {
        let mut values = [None; OutputChannel::COUNT];
        values[channel.index()] = Some(value);
        Self {
            values,
            latest: channel,
            value,
        }
    }

    pub fn get(&self, channel: OutputChannel) -> Option<T> {
        self.values[channel.index()]
    }

    /// Value of the channel written last.
    ///
    /// With [`OutputSelector::All`] this is only the Fahrenheit temperature;
    /// read the individual channels instead.
    pub fn calibrated_value(&self) -> T {
        self.value
    }

    pub fn latest_channel(&self) -> OutputChannel {
        self.latest
    }

    /// Populated `(channel, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputChannel, T)> + '_ {
        OutputChannel::ALL
            .iter()
            .filter_map(|&channel| self.get(channel).map(|v| (channel, v)))
    }

    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert every populated value, e.g. distributional values to their
    /// expected values.
    pub fn map<U: Copy>(&self, mut f: impl FnMut(T) -> U) -> CalibratedOutputs<U> {
        CalibratedOutputs {
            values: self.values.map(|v| v.map(&mut f)),
            latest: self.latest,
            value: f(self.value),
        }
    }
}

/// Run the calibration formulas for every channel in `selector`.
pub fn calibrate<T: Calibratable>(
    sample: &InputSample<T>,
    selector: OutputSelector,
) -> CalibratedOutputs<T> {
    let latest = selector.last_channel();
    let mut outputs = CalibratedOutputs::single(latest, latest.evaluate(sample));
    for &channel in selector.channels() {
        if channel != latest {
            outputs.values[channel.index()] = Some(channel.evaluate(sample));
        }
    }
    outputs
}
