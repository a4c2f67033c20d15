use serde::{Deserialize, Serialize};

pub type Score = f64;

pub const DEFAULT_WEIGHTS_VERSION: &str = "v1";

/// Versioned weight set for the composite score. Weights must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightSet {
    pub version: String,
    pub entropy: Score,
    pub velocity: Score,
    pub collaboration: Score,
    pub anti_patterns: Score,
}

impl Default for WeightSet {
    fn default() -> Self {
        Self {
            version: DEFAULT_WEIGHTS_VERSION.to_string(),
            entropy: 0.30,
            velocity: 0.30,
            collaboration: 0.25,
            anti_patterns: 0.15,
        }
    }
}

impl WeightSet {
    pub fn as_array(&self) -> [Score; 4] {
        [
            self.entropy,
            self.velocity,
            self.collaboration,
            self.anti_patterns,
        ]
    }

    pub fn sum(&self) -> Score {
        self.as_array().iter().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCard {
    pub entropy: Score,
    pub velocity: Score,
    pub collaboration: Score,
    pub anti_patterns: Score,
}

impl ScoreCard {
    pub fn new(entropy: Score, velocity: Score, collaboration: Score, anti_patterns: Score) -> Self {
        Self {
            entropy,
            velocity,
            collaboration,
            anti_patterns,
        }
    }

    /// M = wH*H + wV*V + wC*C + wA*(1 - A)
    pub fn composite(&self, weights: &WeightSet) -> Score {
        let m = weights.entropy * self.entropy
            + weights.velocity * self.velocity
            + weights.collaboration * self.collaboration
            + weights.anti_patterns * (1.0 - self.anti_patterns);
        m.clamp(0.0, 1.0)
    }
}
