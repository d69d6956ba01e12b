use std::fmt;

use serde::{Deserialize, Serialize};

/// An Android API level (`Build.VERSION.SDK_INT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiLevel(pub u32);

impl ApiLevel {
    /// Android 4.4W.
    pub const KITKAT_WATCH: Self = Self(20);
    /// Android 6.0.
    pub const M: Self = Self(23);
    /// Android 8.0.
    pub const O: Self = Self(26);
    /// Android 10.
    pub const Q: Self = Self(29);
    /// Android 11.
    pub const R: Self = Self(30);
    /// Android 12.
    pub const S: Self = Self(31);
    /// Android 13.
    pub const TIRAMISU: Self = Self(33);
    /// Android 14.
    pub const UPSIDE_DOWN_CAKE: Self = Self(34);

    /// Whether this level is at least `other`.
    #[must_use]
    pub fn at_least(self, other: Self) -> bool {
        self >= other
    }
}

impl fmt::Display for ApiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API {}", self.0)
    }
}
