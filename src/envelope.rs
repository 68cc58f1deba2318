//! Scheduled envelopes for triggered tones
//!
//! A tone's amplitude is described as a timeline of automation events on the
//! audio clock: an instantaneous set, then linear and exponential ramps
//! towards target values. The timeline can be evaluated at any instant, which
//! keeps the envelope sample-accurate no matter how blocks are sliced.

use crate::error::{CalmError, CalmResult};

/// One automation event, positioned on the audio clock (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Automation {
    /// Jump to `value` at `time`
    SetValue { time: f64, value: f32 },
    /// Ramp linearly from the previous event, arriving at `value` at `time`
    LinearRamp { time: f64, value: f32 },
    /// Ramp exponentially from the previous event, arriving at `value` at `time`
    ExponentialRamp { time: f64, value: f32 },
}

impl Automation {
    pub fn time(&self) -> f64 {
        match *self {
            Automation::SetValue { time, .. }
            | Automation::LinearRamp { time, .. }
            | Automation::ExponentialRamp { time, .. } => time,
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            Automation::SetValue { value, .. }
            | Automation::LinearRamp { value, .. }
            | Automation::ExponentialRamp { value, .. } => value,
        }
    }
}

/// Ordered automation timeline for a single parameter
#[derive(Debug, Clone)]
pub struct ParamTimeline {
    default_value: f32,
    events: Vec<Automation>,
}

impl ParamTimeline {
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            events: Vec::new(),
        }
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> CalmResult<&mut Self> {
        self.push(Automation::SetValue { time, value })
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) -> CalmResult<&mut Self> {
        self.push(Automation::LinearRamp { time, value })
    }

    /// Exponential ramps need strictly positive endpoints
    pub fn exponential_ramp_to_value_at_time(
        &mut self,
        value: f32,
        time: f64,
    ) -> CalmResult<&mut Self> {
        if value <= 0.0 {
            return Err(CalmError::InvalidTone(format!(
                "exponential ramp target must be positive, got {}",
                value
            )));
        }
        self.push(Automation::ExponentialRamp { time, value })
    }

    fn push(&mut self, event: Automation) -> CalmResult<&mut Self> {
        if !event.time().is_finite() {
            return Err(CalmError::InvalidTone(format!(
                "automation time must be finite, got {}",
                event.time()
            )));
        }
        if let Some(last) = self.events.last() {
            if event.time() < last.time() {
                return Err(CalmError::InvalidTone(format!(
                    "automation at {}s scheduled before previous event at {}s",
                    event.time(),
                    last.time()
                )));
            }
        }
        self.events.push(event);
        Ok(self)
    }

    pub fn events(&self) -> &[Automation] {
        &self.events
    }

    /// Time of the last scheduled event
    pub fn end_time(&self) -> Option<f64> {
        self.events.last().map(Automation::time)
    }

    /// Parameter value at `time`
    pub fn value_at(&self, time: f64) -> f32 {
        // Index of the first event strictly after `time`
        let next = self.events.partition_point(|e| e.time() <= time);

        let (start_time, start_value) = match next.checked_sub(1) {
            Some(i) => (self.events[i].time(), self.events[i].value()),
            None => (0.0, self.default_value),
        };

        match self.events.get(next) {
            Some(&Automation::LinearRamp { time: end, value }) => {
                let span = end - start_time;
                if span <= 0.0 {
                    return value;
                }
                let t = ((time - start_time) / span) as f32;
                start_value + (value - start_value) * t
            }
            Some(&Automation::ExponentialRamp { time: end, value }) => {
                let span = end - start_time;
                if span <= 0.0 || start_value <= 0.0 {
                    // A ramp from zero cannot be exponential; hold until it lands
                    return start_value;
                }
                let t = ((time - start_time) / span) as f32;
                start_value * (value / start_value).powf(t)
            }
            _ => start_value,
        }
    }
}

/// Attack/decay bell envelope built on a [`ParamTimeline`]
///
/// Holds at zero until `start`, rises linearly to `peak` over `attack`,
/// then falls exponentially to `floor` at `start + decay_target`.
pub fn bell_envelope(
    start: f64,
    attack: f32,
    decay_target: f32,
    peak: f32,
    floor: f32,
) -> CalmResult<ParamTimeline> {
    let mut timeline = ParamTimeline::new(0.0);
    timeline
        .set_value_at_time(0.0, start)?
        .linear_ramp_to_value_at_time(peak, start + attack as f64)?
        .exponential_ramp_to_value_at_time(floor, start + decay_target as f64)?;
    Ok(timeline)
}
