/// Easing functions used to map normalized move progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Half-period cosine ease-in/out, script token `mcos`.
    Cosine,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
    /// Jump to the end value as soon as the move starts.
    Step,
}

impl Ease {
    /// Every supported easing, in token table order.
    pub const ALL: [Ease; 9] = [
        Ease::Linear,
        Ease::Cosine,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::Step,
    ];

    /// Resolve a script token (`linear`, `mcos`, `inquad`, ...).
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.token() == token)
    }

    /// Script token for this easing.
    pub fn token(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Cosine => "mcos",
            Self::InQuad => "inquad",
            Self::OutQuad => "outquad",
            Self::InOutQuad => "inoutquad",
            Self::InCubic => "incubic",
            Self::OutCubic => "outcubic",
            Self::InOutCubic => "inoutcubic",
            Self::Step => "step",
        }
    }

    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Cosine => (1.0 - (t * std::f64::consts::PI).cos()) / 2.0,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::Step => {
                if t > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// `clamp((t - t0) / (t1 - t0), 0, 1)`; a zero-length window is complete once reached.
pub fn normalize(t: f64, t0: f64, t1: f64) -> f64 {
    let span = t1 - t0;
    if span <= 0.0 {
        return if t >= t1 { 1.0 } else { 0.0 };
    }
    ((t - t0) / span).clamp(0.0, 1.0)
}

/// Eased interpolation between `a` and `b` that returns the endpoints exactly.
pub fn interpolate(a: f64, b: f64, u: f64, ease: Ease) -> f64 {
    if u <= 0.0 {
        return a;
    }
    if u >= 1.0 {
        return b;
    }
    a + (b - a) * ease.apply(u)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
