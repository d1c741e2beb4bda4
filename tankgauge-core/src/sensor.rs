//! Distance Acquisition
//!
//! ## Overview
//!
//! Two time-of-flight ranging chips are supported behind one capability
//! trait: a one-shot variant that answers every read, and a long-range gated
//! variant that must be started, polled for data-ready, and have its
//! interrupt cleared after each measurement. Which one is present is
//! discovered once at bring-up by [`probe`].
//!
//! On top of the capability sits [`SensorReader`], which turns a burst of
//! raw samples into one trusted value:
//!
//! - ≥1 sample inside the validity window → **median** of the valid subset.
//!   The median shrugs off a single glitched sample where a mean would not.
//! - only out-of-window samples → **mean** of everything, flagged
//!   [`Reading::Questionable`] so the orchestrator can raise a diagnostic.
//! - nothing at all → [`Reading::Invalid`].
//!
//! Between samples the reader pauses long enough not to interrupt the
//! sensor's own ranging cycle.

use heapless::Vec;

use crate::constants::{
    DATA_READY_POLL_MS, DATA_READY_RETRIES, MIN_VALID_DISTANCE_CM, SAMPLE_PAUSE_MS, SENSOR_SAMPLES,
};
use crate::errors::SensorError;
use crate::time::Delay;

/// Outcome of one full sampling pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Median of the in-window samples (cm)
    Valid(f32),
    /// Mean of samples that all fell outside the validity window (cm);
    /// usable, but worth a diagnostic
    Questionable(f32),
    /// No samples could be obtained at all
    Invalid,
}

impl Reading {
    /// The measured value, if any.
    pub fn value(&self) -> Option<f32> {
        match *self {
            Reading::Valid(cm) | Reading::Questionable(cm) => Some(cm),
            Reading::Invalid => None,
        }
    }

    /// Whether this pass produced an in-window median.
    pub fn is_valid(&self) -> bool {
        matches!(self, Reading::Valid(_))
    }
}

/// Ranging capability: one aggregated-ready sample per call.
pub trait RangeSensor {
    /// Take one distance sample in centimeters
    fn sample(&mut self) -> Result<f32, SensorError>;

    /// Upper limit of the device's measuring range (cm)
    fn out_of_range_cm(&self) -> f32;
}

/// Raw hardware behind the one-shot variant: a blocking millimeter read.
pub trait RawRanger {
    /// Read one range measurement in millimeters
    fn range_mm(&mut self) -> Result<u16, SensorError>;
}

/// One measurement from the gated variant, with its status flag.
#[derive(Debug, Clone, Copy)]
pub struct RawSample {
    /// Measured range in millimeters
    pub range_mm: u16,
    /// Device range status; 0 means the measurement is trustworthy
    pub status: u8,
}

/// Raw hardware behind the gated variant.
///
/// The ranging protocol is stateful: start ranging, poll until a sample is
/// ready ([`nb::Result`] signals not-ready as `WouldBlock`), then clear the
/// interrupt before the next sample.
pub trait GatedRangingHw {
    /// Begin (or continue) ranging; idempotent
    fn start_ranging(&mut self) -> Result<(), SensorError>;

    /// Try to read the pending sample; `WouldBlock` until data-ready
    fn try_read(&mut self) -> nb::Result<RawSample, SensorError>;

    /// Acknowledge the sample so the device can produce the next one
    fn clear_interrupt(&mut self);
}

/// One-shot ranging chip (VL53L0X class).
pub struct OneShotRanger<R: RawRanger> {
    hw: R,
}

impl<R: RawRanger> OneShotRanger<R> {
    /// Wrap an initialized one-shot ranging device.
    pub fn new(hw: R) -> Self {
        Self { hw }
    }
}

impl<R: RawRanger> RangeSensor for OneShotRanger<R> {
    fn sample(&mut self) -> Result<f32, SensorError> {
        let mm = self.hw.range_mm()?;
        Ok(f32::from(mm) / 10.0)
    }

    fn out_of_range_cm(&self) -> f32 {
        crate::constants::ONESHOT_OUT_OF_RANGE_CM
    }
}

/// Gated long-range chip (VL53L1X class).
///
/// Owns the pause source used for the data-ready poll; the poll is bounded,
/// so one wedged measurement costs at most
/// `DATA_READY_RETRIES * DATA_READY_POLL_MS` before the sample is dropped.
pub struct GatedRanger<H: GatedRangingHw, D: Delay> {
    hw: H,
    delay: D,
}

impl<H: GatedRangingHw, D: Delay> GatedRanger<H, D> {
    /// Wrap an initialized gated ranging device.
    pub fn new(hw: H, delay: D) -> Self {
        Self { hw, delay }
    }
}

impl<H: GatedRangingHw, D: Delay> RangeSensor for GatedRanger<H, D> {
    fn sample(&mut self) -> Result<f32, SensorError> {
        self.hw.start_ranging()?;

        for _ in 0..DATA_READY_RETRIES {
            match self.hw.try_read() {
                Ok(raw) => {
                    // Acknowledge before judging the status flag so the
                    // device is never left holding a stale interrupt.
                    self.hw.clear_interrupt();
                    if raw.status != 0 {
                        return Err(SensorError::RangeStatus(raw.status));
                    }
                    return Ok(f32::from(raw.range_mm) / 10.0);
                }
                Err(nb::Error::WouldBlock) => self.delay.pause_ms(DATA_READY_POLL_MS),
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }

        Err(SensorError::NotReady)
    }

    fn out_of_range_cm(&self) -> f32 {
        crate::constants::GATED_OUT_OF_RANGE_CM
    }
}

/// Whichever ranging device the probe found.
pub enum ProbedSensor<A, B> {
    /// The preferred one-shot device answered
    Primary(A),
    /// Fell back to the gated long-range device
    Fallback(B),
}

impl<A: RangeSensor, B: RangeSensor> RangeSensor for ProbedSensor<A, B> {
    fn sample(&mut self) -> Result<f32, SensorError> {
        match self {
            ProbedSensor::Primary(s) => s.sample(),
            ProbedSensor::Fallback(s) => s.sample(),
        }
    }

    fn out_of_range_cm(&self) -> f32 {
        match self {
            ProbedSensor::Primary(s) => s.out_of_range_cm(),
            ProbedSensor::Fallback(s) => s.out_of_range_cm(),
        }
    }
}

/// Startup discovery: try the primary driver, fall back to the second.
///
/// Both constructors failing is the one sensor condition with no degraded
/// continuation; the caller converts it into a cycle-level fault.
pub fn probe<A, B, FA, FB>(primary: FA, fallback: FB) -> Result<ProbedSensor<A, B>, SensorError>
where
    A: RangeSensor,
    B: RangeSensor,
    FA: FnOnce() -> Result<A, SensorError>,
    FB: FnOnce() -> Result<B, SensorError>,
{
    match primary() {
        Ok(sensor) => Ok(ProbedSensor::Primary(sensor)),
        Err(e) => {
            log::warn!("primary sensor init failed ({}), probing fallback", e);
            match fallback() {
                Ok(sensor) => Ok(ProbedSensor::Fallback(sensor)),
                Err(e2) => {
                    log::error!("fallback sensor init failed ({})", e2);
                    Err(SensorError::NoDevice)
                }
            }
        }
    }
}

/// Optional battery gauge capability for the battery feed.
pub trait BatteryGauge {
    /// Current charge level in percent, if the gauge can answer
    fn read_percent(&mut self) -> Option<f32>;
}

/// Multi-sample reader implementing the median/mean/invalid policy.
#[derive(Debug, Clone, Copy)]
pub struct SensorReader {
    samples: usize,
}

impl Default for SensorReader {
    fn default() -> Self {
        Self {
            samples: SENSOR_SAMPLES,
        }
    }
}

impl SensorReader {
    /// Reader taking `samples` per pass (capped at [`SENSOR_SAMPLES`]).
    pub fn with_samples(samples: usize) -> Self {
        Self {
            samples: samples.clamp(1, SENSOR_SAMPLES),
        }
    }

    /// Take a full burst of samples and aggregate them into one [`Reading`].
    pub fn read<S: RangeSensor, D: Delay>(&self, sensor: &mut S, delay: &mut D) -> Reading {
        let mut all: Vec<f32, SENSOR_SAMPLES> = Vec::new();
        let mut valid: Vec<f32, SENSOR_SAMPLES> = Vec::new();
        let out_of_range = sensor.out_of_range_cm();

        for i in 0..self.samples {
            match sensor.sample() {
                Ok(cm) => {
                    let _ = all.push(cm);
                    if cm > MIN_VALID_DISTANCE_CM && cm < out_of_range {
                        // Round to the display resolution before taking the
                        // median so ties collapse instead of jittering.
                        let _ = valid.push(libm::roundf(cm * 10.0) / 10.0);
                    } else {
                        log::debug!("ignored out-of-window sample: {:.1}cm", cm);
                    }
                }
                Err(e) => log::debug!("sample {} failed: {}", i, e),
            }
            delay.pause_ms(SAMPLE_PAUSE_MS);
        }

        if !valid.is_empty() {
            valid
                .as_mut_slice()
                .sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
            let median = valid[valid.len() / 2];
            log::info!("distance: {:.1}cm ({} valid samples)", median, valid.len());
            Reading::Valid(median)
        } else if !all.is_empty() {
            let mean = all.iter().sum::<f32>() / all.len() as f32;
            log::warn!(
                "using mean of {} questionable readings: {:.1}cm",
                all.len(),
                mean
            );
            Reading::Questionable(mean)
        } else {
            log::error!("no distance readings obtained");
            Reading::Invalid
        }
    }
}
