//! Software mixer and WAV clip loader
//!
//! Platform side of the audio pool:
//! - Voices live in a shared table read by the cpal output callback
//! - `MixerClip` is a handle to one voice, so several clips of the same sound
//!   can overlap
//! - `WavLoader` decodes through hound once per path and shares the samples
//!
//! Without an output device voices only advance through `Mixer::render`, so
//! a started clip stays busy and the game keeps running silently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::clip::{Clip, ClipLoader};
use crate::error::Result;

/// Output sample rate
pub const SAMPLE_RATE: u32 = 44100;

/// Output is always interleaved stereo
pub const CHANNELS: usize = 2;

/// One playable instance of a sample buffer
#[derive(Debug, Clone)]
pub struct Voice {
    /// Interleaved stereo samples
    samples: Arc<[f32]>,
    /// Next sample index to read
    cursor: usize,
    playing: bool,
}

impl Voice {
    /// Idle voice positioned at the first sample
    pub fn new(samples: Arc<[f32]>) -> Self {
        Self { samples, cursor: 0, playing: false }
    }

    /// Whether the mixer is still reading from this voice
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Index of the next interleaved sample to mix
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// State shared with the audio thread
pub struct MixerState {
    voices: Vec<Voice>,
    pub master_volume: f32,
}

impl MixerState {
    fn new() -> Self {
        Self { voices: Vec::new(), master_volume: 1.0 }
    }

    /// Every voice registered so far, in registration order
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Fill `out` with the sum of all playing voices
    pub fn render(&mut self, out: &mut [f32]) {
        mix_voices(&mut self.voices, out, self.master_volume);
    }
}

/// Sum every playing voice into `out` (interleaved stereo), advancing cursors.
/// A voice that runs out of samples stops itself.
pub fn mix_voices(voices: &mut [Voice], out: &mut [f32], gain: f32) {
    out.fill(0.0);

    for voice in voices.iter_mut().filter(|v| v.playing) {
        let remaining = voice.samples.len().saturating_sub(voice.cursor);
        let n = remaining.min(out.len());
        let src = &voice.samples[voice.cursor..voice.cursor + n];
        for (o, s) in out.iter_mut().zip(src) {
            *o += s;
        }
        voice.cursor += n;
        if voice.cursor >= voice.samples.len() {
            voice.playing = false;
        }
    }

    for o in out.iter_mut() {
        *o = (*o * gain).clamp(-1.0, 1.0);
    }
}

fn lock(state: &Mutex<MixerState>) -> MutexGuard<'_, MixerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Native audio output using cpal
// =============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::*;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{SampleRate, Stream, StreamConfig};

    /// Open the default output device as interleaved stereo f32.
    /// Returns None when there is no device or the stream fails to start.
    pub fn init_audio_stream(state: Arc<Mutex<MixerState>>) -> Option<Stream> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;

        let config = StreamConfig {
            channels: CHANNELS as u16,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    lock(&state).render(data);
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .ok()?;

        stream.play().ok()?;
        Some(stream)
    }
}

/// Owns the voice table and (on native targets) the output stream
pub struct Mixer {
    state: Arc<Mutex<MixerState>>,
    #[cfg(not(target_arch = "wasm32"))]
    _stream: Option<cpal::Stream>,
}

impl Mixer {
    /// Open the default output device. Missing hardware is logged, not fatal.
    pub fn new() -> Self {
        let state = Arc::new(Mutex::new(MixerState::new()));

        #[cfg(not(target_arch = "wasm32"))]
        {
            let stream = native::init_audio_stream(Arc::clone(&state));
            if stream.is_none() {
                log::warn!("No audio output device available, sound is disabled");
            }
            Self { state, _stream: stream }
        }

        #[cfg(target_arch = "wasm32")]
        {
            Self { state }
        }
    }

    /// A mixer with no output stream. Voices only advance through `render`.
    pub fn silent() -> Self {
        Self {
            state: Arc::new(Mutex::new(MixerState::new())),
            #[cfg(not(target_arch = "wasm32"))]
            _stream: None,
        }
    }

    /// Add a voice for an already decoded buffer
    pub fn register(&self, samples: Arc<[f32]>) -> MixerClip {
        let mut state = lock(&self.state);
        state.voices.push(Voice::new(samples));
        MixerClip {
            state: Arc::clone(&self.state),
            voice: state.voices.len() - 1,
        }
    }

    /// Pull `out.len()` samples by hand (used when there is no device)
    pub fn render(&self, out: &mut [f32]) {
        lock(&self.state).render(out);
    }

    /// Output gain, clamped to 0..=1
    pub fn set_master_volume(&self, volume: f32) {
        lock(&self.state).master_volume = volume.clamp(0.0, 1.0);
    }

    /// Number of voices (one per loaded clip)
    pub fn voice_count(&self) -> usize {
        lock(&self.state).voices.len()
    }

    /// Clip loader that decodes WAV files into this mixer
    pub fn wav_loader(&self) -> WavLoader {
        WavLoader {
            mixer: Mixer {
                state: Arc::clone(&self.state),
                #[cfg(not(target_arch = "wasm32"))]
                _stream: None,
            },
            cache: HashMap::new(),
        }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one voice in the mixer
pub struct MixerClip {
    state: Arc<Mutex<MixerState>>,
    voice: usize,
}

impl MixerClip {
    fn with_voice<R>(&self, f: impl FnOnce(&mut Voice) -> R) -> R {
        let mut state = lock(&self.state);
        f(&mut state.voices[self.voice])
    }

    /// Playback position of this clip's voice
    pub fn cursor(&self) -> usize {
        self.with_voice(|v| v.cursor)
    }
}

impl Clip for MixerClip {
    fn is_playing(&self) -> bool {
        self.with_voice(|v| v.playing)
    }

    fn rewind(&mut self) {
        self.with_voice(|v| v.cursor = 0);
    }

    fn start(&mut self) {
        self.with_voice(|v| v.playing = true);
    }

    fn stop(&mut self) {
        self.with_voice(|v| v.playing = false);
    }
}

/// Decodes WAV files with hound. Each `load` gets a new voice, but the
/// decoded samples for a path are shared between all of its voices.
pub struct WavLoader {
    mixer: Mixer,
    cache: HashMap<String, Arc<[f32]>>,
}

impl WavLoader {
    fn decode(path: &str) -> Result<Arc<[f32]>> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let raw: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 * scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let stereo = to_stereo(&raw, spec.channels as usize);
        let samples = resample_stereo(&stereo, spec.sample_rate, SAMPLE_RATE);
        log::debug!(
            "Decoded '{}' ({} ch, {} Hz, {} frames)",
            path,
            spec.channels,
            spec.sample_rate,
            samples.len() / CHANNELS
        );
        Ok(samples.into())
    }

    /// Number of distinct files decoded so far
    pub fn cached_paths(&self) -> usize {
        self.cache.len()
    }
}

impl ClipLoader for WavLoader {
    type Clip = MixerClip;

    fn load(&mut self, path: &str) -> Result<MixerClip> {
        let samples = match self.cache.get(path) {
            Some(samples) => Arc::clone(samples),
            None => {
                let samples = Self::decode(path)?;
                self.cache.insert(path.to_string(), Arc::clone(&samples));
                samples
            }
        };
        Ok(self.mixer.register(samples))
    }
}

/// Interleave as stereo: mono is duplicated, extra channels are dropped.
pub fn to_stereo(samples: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().flat_map(|&s| [s, s]).collect(),
        2 => samples.to_vec(),
        n => samples.chunks_exact(n).flat_map(|frame| [frame[0], frame[1]]).collect(),
    }
}

/// Linear resampling of interleaved stereo
pub fn resample_stereo(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || samples.len() < CHANNELS {
        return samples.to_vec();
    }

    let in_frames = samples.len() / CHANNELS;
    let out_frames = (in_frames as u64 * to_rate as u64 / from_rate as u64) as usize;
    let step = from_rate as f64 / to_rate as f64;
    let mut out = Vec::with_capacity(out_frames * CHANNELS);

    for i in 0..out_frames {
        let pos = i as f64 * step;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;
        let next = (idx + 1).min(in_frames - 1);
        for ch in 0..CHANNELS {
            let a = samples[idx * CHANNELS + ch];
            let b = samples[next * CHANNELS + ch];
            out.push(a + (b - a) * frac);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioController;

    fn tone(frames: usize) -> Arc<[f32]> {
        vec![0.25; frames * CHANNELS].into()
    }

    #[test]
    fn test_mix_stops_voice_at_end() {
        let mut voices = vec![Voice::new(tone(4))];
        voices[0].playing = true;

        let mut out = [0.0f32; 6];
        mix_voices(&mut voices, &mut out, 1.0);
        assert!(voices[0].is_playing());
        assert_eq!(voices[0].cursor(), 6);

        mix_voices(&mut voices, &mut out, 1.0);
        assert!(!voices[0].is_playing());
        assert_eq!(out, [0.25, 0.25, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mix_sums_and_clamps() {
        let mut voices = vec![Voice::new(vec![0.75; 4].into()), Voice::new(vec![0.75; 4].into())];
        voices.iter_mut().for_each(|v| v.playing = true);

        let mut out = [0.0f32; 4];
        mix_voices(&mut voices, &mut out, 1.0);
        assert_eq!(out, [1.0; 4]);
    }

    #[test]
    fn test_idle_voices_are_silent() {
        let mut voices = vec![Voice::new(tone(8))];
        let mut out = [1.0f32; 4];
        mix_voices(&mut voices, &mut out, 1.0);
        assert_eq!(out, [0.0; 4]);
        assert_eq!(voices[0].cursor(), 0);
    }

    #[test]
    fn test_clip_becomes_idle_after_playback() {
        let mixer = Mixer::silent();
        let mut clip = mixer.register(tone(2));
        clip.start();
        assert!(clip.is_playing());

        let mut out = [0.0f32; 8];
        mixer.render(&mut out);
        assert!(!clip.is_playing());

        clip.rewind();
        assert_eq!(clip.cursor(), 0);
    }

    #[test]
    fn test_pool_over_mixer_overlaps_same_sound() {
        let mixer = Mixer::silent();
        let mut pool = AudioController::new(4, mixer.wav_loader()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laser.wav");
        write_wav(&path, 1, 22050, &[1000i16; 64]);
        let path = path.to_str().unwrap();

        pool.load(path).unwrap();
        pool.load(path).unwrap();
        assert_eq!(pool.loader().cached_paths(), 1);
        assert_eq!(mixer.voice_count(), 2);

        assert!(pool.play(path).unwrap());
        assert!(pool.play(path).unwrap());
        assert!(!pool.play(path).unwrap());

        // Drain both voices; the pool can trigger again
        let mut out = vec![0.0f32; 1024];
        mixer.render(&mut out);
        assert!(pool.play(path).unwrap());
    }

    #[test]
    fn test_decode_mono_22k_to_stereo_44k() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blip.wav");
        write_wav(&path, 1, 22050, &[i16::MAX / 2; 10]);

        let samples = WavLoader::decode(path.to_str().unwrap()).unwrap();
        assert_eq!(samples.len(), 20 * CHANNELS);
        assert!((samples[0] - 0.5).abs() < 1e-3);
        assert_eq!(samples[0], samples[1]);
    }

    #[test]
    fn test_missing_file_is_audio_error() {
        let mut loader = Mixer::silent().wav_loader();
        assert!(matches!(
            loader.load("does/not/exist.wav"),
            Err(crate::StandardsError::Audio(_))
        ));
        assert_eq!(loader.cached_paths(), 0);
    }

    #[test]
    fn test_to_stereo_drops_extra_channels() {
        let quad = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(to_stereo(&quad, 4), vec![1.0, 2.0, 5.0, 6.0]);
    }

    fn write_wav(path: &std::path::Path, channels: u16, rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
}
