//! Least-mean-squares predictor state
//!
//! One LMS state per stream. The encoder carries it across consecutive
//! blocks so prediction stays continuous over block boundaries; each frame
//! snapshots the state so the decoder can resynchronize anywhere.

use crate::clamp_i16;

/// LMS predictor: 4-tap history and adaptive weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lms {
    pub history: [i32; 4],
    pub weights: [i32; 4],
}

impl Default for Lms {
    fn default() -> Self {
        Self::new()
    }
}

impl Lms {
    /// Fresh predictor state (standard QOA initial weights).
    pub fn new() -> Self {
        Self {
            history: [0; 4],
            weights: [0, 0, -(1 << 13), 1 << 14],
        }
    }

    /// Predict the next sample from weighted history.
    #[inline]
    pub fn predict(&self) -> i32 {
        let mut p = 0i64;
        for i in 0..4 {
            p += self.history[i] as i64 * self.weights[i] as i64;
        }
        (p >> 13) as i32
    }

    /// Update weights toward the reconstructed sample and shift history.
    #[inline]
    pub fn update(&mut self, reconstructed: i32, residual: i32) {
        let delta = residual >> 4;
        for i in 0..4 {
            self.weights[i] += if self.history[i] < 0 { -delta } else { delta };
        }
        self.history.rotate_left(1);
        self.history[3] = clamp_i16(reconstructed);
    }

    /// Serialize history + weights as i16 big-endian (16 bytes).
    pub fn write_state(&self, out: &mut Vec<u8>) {
        for h in self.history {
            out.extend_from_slice(&(h as i16).to_be_bytes());
        }
        for w in self.weights {
            out.extend_from_slice(&(w as i16).to_be_bytes());
        }
    }

    /// Restore state from 16 serialized bytes.
    pub fn read_state(bytes: &[u8; 16]) -> Self {
        let mut lms = Self {
            history: [0; 4],
            weights: [0; 4],
        };
        for i in 0..4 {
            lms.history[i] = i16::from_be_bytes([bytes[i * 2], bytes[i * 2 + 1]]) as i32;
        }
        for i in 0..4 {
            lms.weights[i] = i16::from_be_bytes([bytes[8 + i * 2], bytes[8 + i * 2 + 1]]) as i32;
        }
        lms
    }
}
