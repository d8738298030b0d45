//! Easing curves for timeline events.
//!
//! Every curve maps normalized progress in `[0, 1]` onto `[0, 1]` and
//! satisfies `ease(0) = 0` and `ease(1) = 1`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Look up an easing by name. Accepts kebab, snake and camel spellings.
    pub fn from_name(name: &str) -> Option<Easing> {
        let folded: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "linear" => Some(Easing::Linear),
            "easein" => Some(Easing::EaseIn),
            "easeout" => Some(Easing::EaseOut),
            "easeinout" => Some(Easing::EaseInOut),
            _ => None,
        }
    }

    /// Remap progress `t` along this curve. `t` is clamped to `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

impl From<String> for Easing {
    fn from(name: String) -> Self {
        Easing::from_name(&name).unwrap_or_else(|| {
            log::warn!("Unknown easing '{name}', falling back to linear");
            Easing::Linear
        })
    }
}

/// Apply the easing named `name` to `t`; unknown names ease linearly.
pub fn ease(name: &str, t: f32) -> f32 {
    Easing::from_name(name).unwrap_or_default().apply(t)
}
