use serde::Deserialize;

/// Detail tier controls optional visual effects.
/// Tiers add polish only; simulation is identical at every tier.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailTier {
    /// Low-end devices: particle emitters are not constructed.
    Low,
    #[default]
    Full,
}

impl DetailTier {
    pub const ALL: &'static [DetailTier] = &[DetailTier::Low, DetailTier::Full];

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low detail",
            Self::Full => "Full detail",
        }
    }

    pub fn particle_effects(self) -> bool {
        matches!(self, Self::Full)
    }

    /// Cycle to the next tier (wraps around).
    pub fn next(self) -> Self {
        match self {
            Self::Low => Self::Full,
            Self::Full => Self::Low,
        }
    }
}

impl std::fmt::Display for DetailTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
