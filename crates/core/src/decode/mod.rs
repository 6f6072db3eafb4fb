use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

/// Decoded mono PCM audio: a sample rate and the raw signed 16-bit samples.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Waveform {
    pub sample_rate_hz: u32,
    pub samples: Vec<i16>,
}

impl Waveform {
    pub fn duration_ms(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate_hz) * 1000.0
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("malformed wav: {0}")]
    Malformed(#[from] hound::Error),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("wav declares zero channels")]
    ZeroChannels,
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Decode an in-memory WAV (e.g. a TTS response body) to a `Waveform`.
pub fn waveform_from_wav_bytes(bytes: &[u8]) -> Result<Waveform> {
    read_waveform(hound::WavReader::new(Cursor::new(bytes))?)
}

/// Decode a WAV file on disk to a `Waveform`.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<Waveform> {
    read_waveform(hound::WavReader::open(path)?)
}

fn read_waveform<R: std::io::Read>(mut reader: hound::WavReader<R>) -> Result<Waveform> {
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(DecodeError::UnsupportedFormat(format!(
            "{}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    if spec.channels == 0 {
        return Err(DecodeError::ZeroChannels);
    }

    let samples = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<i16>, _>>()?;
    let samples = if spec.channels == 1 {
        samples
    } else {
        downmix(&samples, spec.channels)
    };

    Ok(Waveform {
        sample_rate_hz: spec.sample_rate,
        samples,
    })
}

fn downmix(interleaved: &[i16], channels: u16) -> Vec<i16> {
    let channels = usize::from(channels);
    interleaved
        .chunks(channels)
        .map(|group| {
            let sum: i32 = group.iter().map(|&s| i32::from(s)).sum();
            (sum / group.len() as i32) as i16
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("writer");
        for &sample in samples {
            writer.write_sample(sample).expect("sample");
        }
        writer.finalize().expect("finalize");
        cursor.into_inner()
    }

    #[test]
    fn mono_wav_roundtrips() {
        let samples = vec![0i16, 1000, -1000, i16::MAX, i16::MIN];
        let bytes = wav_bytes(1, 16_000, &samples);
        let waveform = waveform_from_wav_bytes(&bytes).expect("decode");
        assert_eq!(waveform.sample_rate_hz, 16_000);
        assert_eq!(waveform.samples, samples);
    }

    #[test]
    fn stereo_wav_downmixes_by_averaging() {
        let interleaved = vec![100i16, 300, -100, -300, 0, 1000];
        let bytes = wav_bytes(2, 22_050, &interleaved);
        let waveform = waveform_from_wav_bytes(&bytes).expect("decode");
        assert_eq!(waveform.samples, vec![200, -200, 500]);
    }

    #[test]
    fn float_wav_is_rejected() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("writer");
        writer.write_sample(0.5f32).expect("sample");
        writer.finalize().expect("finalize");

        let err = waveform_from_wav_bytes(&cursor.into_inner()).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(_)));
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        let err = waveform_from_wav_bytes(b"definitely not a wav").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn duration_is_derived_from_rate_and_length() {
        let waveform = Waveform {
            sample_rate_hz: 16_000,
            samples: vec![0; 16_000],
        };
        assert_eq!(waveform.duration_ms(), 1000.0);

        let half = Waveform {
            sample_rate_hz: 44_100,
            samples: vec![0; 22_050],
        };
        assert_eq!(half.duration_ms(), 500.0);
    }
}
