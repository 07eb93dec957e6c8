//! Short synthesized sound cues.
//!
//! Scenes queue [`Tone`]s on the context; the game hands them to [`AudioOut`]
//! after each hook returns. Without the `audio` feature, or without an output
//! device, tones are dropped.

use std::time::Duration;

/// A linear frequency sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub start_hz: f32,
    pub end_hz: f32,
    pub duration: Duration,
    pub gain: f32,
}

#[cfg(feature = "audio")]
pub struct AudioOut {
    // The stream must outlive every sink played through its handle.
    device: Option<(rodio::OutputStream, rodio::OutputStreamHandle)>,
}

#[cfg(feature = "audio")]
impl AudioOut {
    pub fn open(enabled: bool) -> Self {
        if !enabled {
            return Self::silent();
        }
        match rodio::OutputStream::try_default() {
            Ok(device) => {
                log::info!("audio output opened");
                Self {
                    device: Some(device),
                }
            }
            Err(err) => {
                log::warn!("no audio output, playing silently: {err}");
                Self::silent()
            }
        }
    }

    pub fn silent() -> Self {
        Self { device: None }
    }

    pub fn play(&self, tone: Tone) {
        use rodio::Source;

        let Some((_, handle)) = &self.device else {
            return;
        };
        let sink = match rodio::Sink::try_new(handle) {
            Ok(sink) => sink,
            Err(err) => {
                log::warn!("failed to open audio sink: {err}");
                return;
            }
        };
        let source = rodio::source::chirp(
            rodio::cpal::SampleRate(44_100),
            tone.start_hz,
            tone.end_hz,
            tone.duration,
        )
        .amplify(tone.gain);
        sink.append(source);
        sink.detach(); // Play in background
    }
}

#[cfg(not(feature = "audio"))]
pub struct AudioOut;

#[cfg(not(feature = "audio"))]
impl AudioOut {
    pub fn open(enabled: bool) -> Self {
        if enabled {
            log::debug!("built without the `audio` feature; sound cues are dropped");
        }
        AudioOut
    }

    pub fn silent() -> Self {
        AudioOut
    }

    pub fn play(&self, tone: Tone) {
        log::trace!("dropping tone {tone:?}");
    }
}
