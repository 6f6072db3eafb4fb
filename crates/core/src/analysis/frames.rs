use crate::decode::Waveform;

/// Per-frame envelope measurements over one fixed-duration slice of samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub timestamp_ms: i64,
    pub rms: f64,
    pub peak: i32,
}

/// Iterate non-overlapping frames of `frame_ms` covering the whole waveform.
/// The final frame may be shorter than the rest; a zero-sample remainder is
/// not emitted. Restartable: each call yields a fresh, identical sequence.
///
/// The caller guarantees `sample_rate_hz > 0`. The frame size is clamped to
/// at least one sample so the scan terminates for any rate.
pub fn frames(waveform: &Waveform, frame_ms: u32) -> impl Iterator<Item = Frame> + '_ {
    let rate = f64::from(waveform.sample_rate_hz);
    let samples_per_frame = ((rate * f64::from(frame_ms) / 1000.0) as usize).max(1);

    waveform
        .samples
        .chunks(samples_per_frame)
        .enumerate()
        .map(move |(index, chunk)| {
            let start_sample = index * samples_per_frame;
            Frame {
                timestamp_ms: (start_sample as f64 / rate * 1000.0) as i64,
                rms: rms(chunk),
                peak: peak(chunk),
            }
        })
}

fn rms(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples
        .iter()
        .map(|&s| {
            let v = f64::from(s);
            v * v
        })
        .sum();
    (sum_sq / samples.len() as f64).sqrt()
}

// i32 so that |i16::MIN| does not wrap.
fn peak(samples: &[i16]) -> i32 {
    samples.iter().map(|&s| i32::from(s).abs()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waveform(sample_rate_hz: u32, samples: Vec<i16>) -> Waveform {
        Waveform {
            sample_rate_hz,
            samples,
        }
    }

    #[test]
    fn one_second_at_16khz_yields_34_frames() {
        // 16000 samples / 480 per frame = 33 full frames + one 160-sample tail.
        let wf = waveform(16_000, vec![0; 16_000]);
        let all: Vec<Frame> = frames(&wf, 30).collect();
        assert_eq!(all.len(), 34);
        assert_eq!(all[0].timestamp_ms, 0);
        assert_eq!(all[1].timestamp_ms, 30);
        assert_eq!(all[33].timestamp_ms, 990);
    }

    #[test]
    fn timestamps_are_non_decreasing() {
        let wf = waveform(44_100, vec![100; 44_100]);
        let stamps: Vec<i64> = frames(&wf, 30).map(|f| f.timestamp_ms).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn empty_waveform_has_no_frames() {
        let wf = waveform(16_000, vec![]);
        assert_eq!(frames(&wf, 30).count(), 0);
    }

    #[test]
    fn rms_of_constant_block_equals_amplitude() {
        let wf = waveform(16_000, vec![5_000; 480]);
        let frame = frames(&wf, 30).next().expect("one frame");
        assert!((frame.rms - 5_000.0).abs() < 1e-9);
        assert_eq!(frame.peak, 5_000);
    }

    #[test]
    fn rms_of_square_wave_equals_amplitude() {
        let samples: Vec<i16> = (0..480).map(|i| if i % 2 == 0 { 700 } else { -700 }).collect();
        let wf = waveform(16_000, samples);
        let frame = frames(&wf, 30).next().expect("one frame");
        assert!((frame.rms - 700.0).abs() < 1e-9);
        assert_eq!(frame.peak, 700);
    }

    #[test]
    fn peak_handles_i16_min() {
        let wf = waveform(16_000, vec![i16::MIN; 480]);
        let frame = frames(&wf, 30).next().expect("one frame");
        assert_eq!(frame.peak, 32_768);
    }

    #[test]
    fn short_final_frame_is_measured() {
        // 480 + 100 samples: the tail frame covers the last 100.
        let mut samples = vec![0i16; 480];
        samples.extend(vec![9_000i16; 100]);
        let wf = waveform(16_000, samples);
        let all: Vec<Frame> = frames(&wf, 30).collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].timestamp_ms, 30);
        assert!((all[1].rms - 9_000.0).abs() < 1e-9);
        assert_eq!(all[1].peak, 9_000);
    }

    #[test]
    fn iteration_is_restartable() {
        let wf = waveform(8_000, (0..4_000).map(|i| (i % 311) as i16).collect());
        let first: Vec<Frame> = frames(&wf, 30).collect();
        let second: Vec<Frame> = frames(&wf, 30).collect();
        assert_eq!(first, second);
    }
}
