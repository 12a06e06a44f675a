//! Location and speech capture behind capability traits.
//!
//! Capture never blocks a report: callers surface a [`CaptureError`] as a
//! warning and fall back to manual entry.

use std::fs;
use std::path::PathBuf;

use crate::error::ErrorCode;
use crate::model::{Language, Location};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Placeholder reverse geocode: the rounded coordinates plus the city.
    #[must_use]
    pub fn simulated_address(self) -> String {
        format!("{:.4}, {:.4} - Ahmedabad, Gujarat", self.lat, self.lng)
    }

    #[must_use]
    pub fn into_location(self, address: Option<String>) -> Location {
        Location {
            lat: self.lat,
            lng: self.lng,
            address: address.unwrap_or_else(|| self.simulated_address()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("{} is not available", .0)]
    Unavailable(&'static str),

    #[error("{} failed: {reason}", .capability)]
    Failed {
        capability: &'static str,
        reason: String,
    },
}

impl CaptureError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::CapabilityUnavailable
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

pub trait LocationProvider {
    /// # Errors
    ///
    /// [`CaptureError::Unavailable`] when the device has no position source.
    fn current_location(&self) -> Result<Coordinates, CaptureError>;
}

/// Reports a preset position, from flags or project config.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

impl LocationProvider for FixedLocation {
    fn current_location(&self) -> Result<Coordinates, CaptureError> {
        let Coordinates { lat, lng } = self.0;
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
            Ok(self.0)
        } else {
            Err(CaptureError::Failed {
                capability: "geolocation",
                reason: format!("coordinates out of range: {lat}, {lng}"),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn current_location(&self) -> Result<Coordinates, CaptureError> {
        Err(CaptureError::Unavailable("geolocation"))
    }
}

pub trait SpeechToText {
    fn is_supported(&self) -> bool;

    /// Single-shot recognition in `locale` (e.g. `hi-IN`).
    ///
    /// # Errors
    ///
    /// Unsupported provider or a failed recognition pass.
    fn recognize(&mut self, locale: &str) -> Result<String, CaptureError>;
}

/// Reads a pre-recorded transcript from disk.
#[derive(Debug, Clone)]
pub struct TranscriptFile {
    path: PathBuf,
}

impl TranscriptFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SpeechToText for TranscriptFile {
    fn is_supported(&self) -> bool {
        true
    }

    fn recognize(&mut self, locale: &str) -> Result<String, CaptureError> {
        tracing::debug!(path = %self.path.display(), locale, "reading transcript");
        let text = fs::read_to_string(&self.path).map_err(|e| CaptureError::Failed {
            capability: "speech recognition",
            reason: format!("{}: {e}", self.path.display()),
        })?;
        Ok(text.trim().to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl SpeechToText for Unsupported {
    fn is_supported(&self) -> bool {
        false
    }

    fn recognize(&mut self, _locale: &str) -> Result<String, CaptureError> {
        Err(CaptureError::Unavailable("speech recognition"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenState {
    #[default]
    Idle,
    Listening,
}

/// Voice dictation into a description buffer.
///
/// At most one recognition is outstanding; `start` while listening does
/// nothing. A result is appended to the buffer separated by a single space.
#[derive(Debug)]
pub struct SpeechSession<P> {
    provider: P,
    locale: &'static str,
    state: ListenState,
}

impl<P: SpeechToText> SpeechSession<P> {
    #[must_use]
    pub const fn new(provider: P, language: Language) -> Self {
        Self {
            provider,
            locale: language.speech_locale(),
            state: ListenState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ListenState {
        self.state
    }

    #[must_use]
    pub const fn is_listening(&self) -> bool {
        matches!(self.state, ListenState::Listening)
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.provider.is_supported()
    }

    /// # Errors
    ///
    /// [`CaptureError::Unavailable`] when the provider cannot recognize speech.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if !self.provider.is_supported() {
            return Err(CaptureError::Unavailable("speech recognition"));
        }
        if self.is_listening() {
            return Ok(());
        }
        self.state = ListenState::Listening;
        Ok(())
    }

    /// Finish listening and append whatever was recognized to `description`.
    /// Returns the transcript, empty if nothing was heard or not listening.
    ///
    /// # Errors
    ///
    /// Recognition failures. The session returns to idle either way and the
    /// buffer is untouched on error.
    pub fn stop(&mut self, description: &mut String) -> Result<String, CaptureError> {
        if !self.is_listening() {
            return Ok(String::new());
        }
        self.state = ListenState::Idle;
        let transcript = self.provider.recognize(self.locale)?;
        if !transcript.is_empty() {
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(&transcript);
        }
        Ok(transcript)
    }

    /// Start, recognize and append in one call.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start) and [`stop`](Self::stop).
    pub fn dictate(&mut self, description: &mut String) -> Result<String, CaptureError> {
        self.start()?;
        self.stop(description)
    }
}
