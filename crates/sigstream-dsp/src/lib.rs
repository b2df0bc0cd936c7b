//! sigstream-dsp: Conditioning for fetched board data
//!
//! Detrending, IIR filtering, spectral estimation and the DataHandler
//! persistence/conditioning context.

pub mod detrend;
pub mod filters;
pub mod handler;
pub mod spectral;

pub use detrend::{detrend, Detrend};
pub use filters::{bandpass, highpass, lowpass, notch};
pub use handler::DataHandler;
pub use spectral::{band_power, psd, PowerSpectrum};
