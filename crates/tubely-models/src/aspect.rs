//! Aspect classification of uploaded video.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse orientation bucket assigned from stream geometry.
///
/// The bucket doubles as the object key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AspectClass {
    /// 16:9
    Landscape,
    /// 9:16
    Portrait,
    /// Anything else
    Other,
}

impl AspectClass {
    /// Classify a frame size.
    ///
    /// Exact integer-ratio test against 16:9: `width == 16 * height / 9` is
    /// landscape, `height == 16 * width / 9` is portrait. Sizes that do not
    /// divide evenly land in `Other`; there is no tolerance band.
    pub fn classify(width: u32, height: u32) -> Self {
        let (w, h) = (u64::from(width), u64::from(height));
        if w == 16 * h / 9 {
            AspectClass::Landscape
        } else if h == 16 * w / 9 {
            AspectClass::Portrait
        } else {
            AspectClass::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl fmt::Display for AspectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
