//! PCM → WAV packaging for speech output.
//!
//! The speech model returns raw little-endian 16-bit mono PCM at 24 kHz.
//! Browsers need a container, so the samples are wrapped in a canonical
//! 44-byte RIFF/WAVE header and encoded as a data URI.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const SAMPLE_RATE: u32 = 24_000;
pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;
const HEADER_LEN: usize = 44;

pub fn pcm_to_wav(pcm: &[u8]) -> Result<Vec<u8>, String> {
    if pcm.is_empty() {
        return Err("speech payload is empty".to_string());
    }
    if pcm.len() % 2 != 0 {
        return Err("speech payload is not 16-bit PCM".to_string());
    }
    let data_len = u32::try_from(pcm.len()).map_err(|_| "speech payload too large".to_string())?;

    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = SAMPLE_RATE * u32::from(block_align);

    let mut wav = Vec::with_capacity(HEADER_LEN + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&CHANNELS.to_le_bytes());
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);
    Ok(wav)
}

pub fn wav_data_uri(wav: &[u8]) -> String {
    format!("data:audio/wav;base64,{}", STANDARD.encode(wav))
}

/// Decodes the provider's base64 PCM and returns a WAV data URI.
pub fn speech_data_uri(pcm_base64: &str) -> Result<String, String> {
    let pcm = STANDARD
        .decode(pcm_base64)
        .map_err(|e| format!("speech payload is not base64: {e}"))?;
    Ok(wav_data_uri(&pcm_to_wav(&pcm)?))
}
