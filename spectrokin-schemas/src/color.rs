use serde::{Deserialize, Serialize};
use std::fmt;

/// Colour channel of an RGB triple.
///
/// `Channel::ALL` is also the tie-break priority order used when two channels
/// fit equally well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    R,
    G,
    B,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::R, Channel::G, Channel::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::R => "r",
            Channel::G => "g",
            Channel::B => "b",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-channel triple. Carries mean ROI intensities (nominally 0-255) as
/// well as the unitless absorbance derived from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RgbSample {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl RgbSample {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::R => self.r,
            Channel::G => self.g,
            Channel::B => self.b,
        }
    }

    /// Applies `f` to every channel, passing the channel alongside its value.
    pub fn map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(Channel, f64) -> f64,
    {
        Self {
            r: f(Channel::R, self.r),
            g: f(Channel::G, self.g),
            b: f(Channel::B, self.b),
        }
    }
}
