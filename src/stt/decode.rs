//! Decode uploaded audio/video files into Whisper-ready PCM.
//!
//! Container and codec detection is done by symphonia (WAV/PCM, MP3, and
//! MP4/AAC are enabled); the first decodable track is used.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::stt::engine::SttError;
use crate::stt::resample::to_whisper_pcm;

/// Interleaved samples as stored in the file.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (self.sample_rate as f32 * self.channels as f32)
    }

    /// 16 kHz mono copy of the samples.
    pub fn into_whisper_pcm(self) -> Vec<f32> {
        to_whisper_pcm(&self.samples, self.sample_rate, self.channels)
    }
}

/// Decode every packet of the first audio track in `path`.
///
/// Corrupt packets are skipped with a warning; a file that cannot be probed
/// or has no audio track is an error.
pub fn decode_file(path: &Path) -> Result<DecodedAudio, SttError> {
    let file = File::open(path).map_err(|e| SttError::Decode(format!("{}: {e}", path.display())))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| SttError::Decode(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| SttError::Decode("no audio track".into()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| SttError::Decode(e.to_string()))?;

    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(0);
    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(SttError::Decode(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count();

                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("Skipping corrupt audio packet: {msg}");
            }
            Err(e) => return Err(SttError::Decode(e.to_string())),
        }
    }

    if samples.is_empty() {
        return Err(SttError::EmptyAudio);
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// 16-bit PCM WAV bytes for test fixtures.
#[cfg(test)]
pub(crate) fn wav_bytes(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let byte_rate = sample_rate * channels as u32 * 2;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&(channels * 2).to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
        let mut file = File::create(path).unwrap();
        file.write_all(&wav_bytes(sample_rate, channels, samples)).unwrap();
    }

    #[test]
    fn decodes_stereo_wav_and_converts_to_16k_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("call.wav");
        // 0.1 s of 32 kHz stereo
        write_wav(&path, 32_000, 2, &vec![8_192i16; 6_400]);

        let decoded = decode_file(&path).unwrap();
        assert_eq!(decoded.sample_rate, 32_000);
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.samples.len(), 6_400);
        assert!((decoded.duration_secs() - 0.1).abs() < 1e-3);

        let pcm = decoded.into_whisper_pcm();
        assert_eq!(pcm.len(), 1_600);
        assert!((pcm[0] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        assert!(matches!(
            decode_file(&path),
            Err(SttError::Decode(_) | SttError::EmptyAudio)
        ));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = decode_file(Path::new("/nonexistent/audio.wav")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/audio.wav"));
    }
}
