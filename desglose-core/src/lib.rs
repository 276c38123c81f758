//! desglose-core: upload batch model and the sequential processing controller

pub mod controller;
pub mod error;
pub mod events;
pub mod navigation;
pub mod processor;
pub mod simulate;
pub mod upload;

pub use controller::{BatchSettings, UploadBatch};
pub use error::{ProcessError, SettingsError, UploadError};
pub use events::{AggregateCounts, BatchEvent, BatchSnapshot, BatchUpdate};
pub use navigation::{DEFAULT_REDIRECT_DELAY, Navigator, navigate_on_completion};
pub use processor::{ProgressHandle, Processor};
pub use simulate::{DEFAULT_FAILURE_MESSAGE, SimulatedProcessor, SimulationSettings};
pub use upload::{FileRef, UploadId, UploadItem, UploadStatus};
