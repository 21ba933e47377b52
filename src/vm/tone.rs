use std::f32::consts::PI;

pub const SAMPLE_RATE: u32 = 44_100;
pub const FREQUENCY_HZ: f32 = 440.0;
pub const DURATION_SECS: f32 = 0.25;
pub const AMPLITUDE: f32 = 0.5;

const WAV_HEADER_LEN: usize = 44;

/// 16-bit mono PCM samples of the beep.
pub fn beep_samples() -> Vec<i16> {
    let sample_count = (SAMPLE_RATE as f32 * DURATION_SECS) as usize;

    (0..sample_count)
        .map(|n| {
            let t = n as f32 / SAMPLE_RATE as f32;
            let value = AMPLITUDE * (2.0 * PI * FREQUENCY_HZ * t).sin();
            (value * i16::MAX as f32) as i16
        })
        .collect()
}

/// The beep as a complete RIFF/WAVE file, ready for an audio backend to decode.
pub fn beep_wav() -> Vec<u8> {
    let samples = beep_samples();
    let data_len = (samples.len() * 2) as u32;
    let block_align: u16 = 2;
    let byte_rate = SAMPLE_RATE * u32::from(block_align);

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        wav.extend_from_slice(&sample.to_le_bytes());
    }

    wav
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beep_lasts_a_quarter_second() {
        let samples = beep_samples();
        assert_eq!(samples.len(), 11_025);
        assert_eq!(samples[0], 0);
        let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak > 16_000 && peak <= 16_384, "peak {peak}");
    }

    #[test]
    fn wav_header_describes_the_samples() {
        let wav = beep_wav();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), SAMPLE_RATE);
        assert_eq!(&wav[36..40], b"data");

        let data_len = u32::from_le_bytes(wav[40..44].try_into().unwrap()) as usize;
        assert_eq!(data_len, 11_025 * 2);
        assert_eq!(wav.len(), WAV_HEADER_LEN + data_len);
        assert_eq!(
            u32::from_le_bytes(wav[4..8].try_into().unwrap()) as usize,
            wav.len() - 8
        );
    }
}
