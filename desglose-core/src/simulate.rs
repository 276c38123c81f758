//! Simulated processing step: timed progress ticks and a random failure draw.
//!
//! Stands in for real statement processing when previewing the upload flow.

use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ProcessError, SettingsError};
use crate::processor::{ProgressHandle, Processor};
use crate::upload::FileRef;

pub const DEFAULT_FAILURE_MESSAGE: &str = "Error processing the PDF file";

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Pause before each progress report.
    pub tick_interval: Duration,
    /// Progress increment in percent.
    pub step: u8,
    /// Probability in `0.0..=1.0` that an item fails.
    pub failure_rate: f64,
    pub failure_message: String,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(150),
            step: 10,
            failure_rate: 0.1,
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(SettingsError::InvalidFailureRate(self.failure_rate));
        }
        if self.step == 0 || self.step > 100 {
            return Err(SettingsError::InvalidStep(self.step));
        }
        Ok(())
    }
}

pub struct SimulatedProcessor {
    settings: SimulationSettings,
    rng: Mutex<StdRng>,
}

impl SimulatedProcessor {
    pub fn new(settings: SimulationSettings) -> Result<Self, SettingsError> {
        Self::build(settings, StdRng::from_entropy())
    }

    /// Reproducible failure draws.
    pub fn with_seed(settings: SimulationSettings, seed: u64) -> Result<Self, SettingsError> {
        Self::build(settings, StdRng::seed_from_u64(seed))
    }

    fn build(settings: SimulationSettings, rng: StdRng) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings,
            rng: Mutex::new(rng),
        })
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    fn draw_failure(&self) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_bool(self.settings.failure_rate)
    }
}

impl Processor for SimulatedProcessor {
    type Output = ();

    async fn process(&self, _file: &FileRef, progress: ProgressHandle) -> Result<(), ProcessError> {
        let mut percent: u8 = 0;
        loop {
            tokio::time::sleep(self.settings.tick_interval).await;
            progress.report(percent);
            if percent >= 100 {
                break;
            }
            percent = percent.saturating_add(self.settings.step).min(100);
        }

        if self.draw_failure() {
            return Err(ProcessError::new(self.settings.failure_message.clone()));
        }
        Ok(())
    }
}
