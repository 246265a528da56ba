//! Bonus trigger engine: Cyber Hack and Shadow Dash

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::BonusConfig;

/// The bonus foregrounded for a spin
///
/// Only one bonus can be visually foregrounded at a time; Cyber Hack takes
/// priority over Shadow Dash when both fire on the same spin. The raw
/// trigger pair is preserved in [`BonusCheck`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusEvent {
    /// No bonus this spin
    #[default]
    None,
    /// Scatter-triggered pick bonus; the reward is resolved externally
    CyberHack,
    /// Randomly triggered free spins with an escalating multiplier
    ShadowDash,
}

/// Raw trigger results for one spin
///
/// Both triggers are independent and may co-occur; the session applies the
/// Shadow Dash award even when Cyber Hack is the foregrounded event.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BonusCheck {
    /// Scatter count reached the Cyber Hack threshold
    pub cyber_hack: bool,
    /// The per-spin Bernoulli draw fired
    pub shadow_dash: bool,
}

impl BonusCheck {
    /// The single foregrounded event (Cyber Hack priority)
    pub fn event(&self) -> BonusEvent {
        if self.cyber_hack {
            BonusEvent::CyberHack
        } else if self.shadow_dash {
            BonusEvent::ShadowDash
        } else {
            BonusEvent::None
        }
    }

    pub fn any(&self) -> bool {
        self.cyber_hack || self.shadow_dash
    }
}

/// Decides which bonus features fire for a spin
#[derive(Debug, Clone)]
pub struct BonusEngine {
    scatter_trigger_count: u8,
    shadow_dash_probability: f64,
}

impl BonusEngine {
    pub fn new(config: &BonusConfig) -> Self {
        Self {
            scatter_trigger_count: config.scatter_trigger_count,
            shadow_dash_probability: config.shadow_dash_probability.clamp(0.0, 1.0),
        }
    }

    /// Check both triggers for one spin
    ///
    /// Cyber Hack depends only on the grid's scatter count, independent of
    /// payline payout. Shadow Dash is one Bernoulli draw per spin,
    /// independent of grid contents; the draw comes from the session-scoped
    /// RNG so seeded sessions replay identically.
    pub fn check(&self, scatter_count: u8, rng: &mut impl Rng) -> BonusCheck {
        BonusCheck {
            cyber_hack: scatter_count >= self.scatter_trigger_count,
            shadow_dash: rng.random_bool(self.shadow_dash_probability),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn engine(p: f64) -> BonusEngine {
        BonusEngine::new(&BonusConfig {
            shadow_dash_probability: p,
            ..BonusConfig::default()
        })
    }

    #[test]
    fn test_three_scatters_trigger_cyber_hack() {
        let mut rng = StdRng::seed_from_u64(0);
        let engine = engine(0.0);
        assert!(engine.check(3, &mut rng).cyber_hack);
        assert!(engine.check(5, &mut rng).cyber_hack);
        assert!(!engine.check(2, &mut rng).cyber_hack);
    }

    #[test]
    fn test_cyber_hack_foregrounded_over_shadow_dash() {
        let mut rng = StdRng::seed_from_u64(0);
        // probability 1.0 forces the Shadow Dash draw
        let check = engine(1.0).check(3, &mut rng);
        assert!(check.cyber_hack && check.shadow_dash);
        assert_eq!(check.event(), BonusEvent::CyberHack);
    }

    #[test]
    fn test_shadow_dash_alone_is_foregrounded() {
        let mut rng = StdRng::seed_from_u64(0);
        let check = engine(1.0).check(0, &mut rng);
        assert!(!check.cyber_hack && check.shadow_dash);
        assert_eq!(check.event(), BonusEvent::ShadowDash);
    }

    #[test]
    fn test_no_trigger_yields_none() {
        let mut rng = StdRng::seed_from_u64(0);
        let check = engine(0.0).check(0, &mut rng);
        assert!(!check.any());
        assert_eq!(check.event(), BonusEvent::None);
    }

    #[test]
    fn test_shadow_dash_rate_tracks_probability() {
        let mut rng = StdRng::seed_from_u64(77);
        let engine = engine(0.05);
        let fires = (0..10_000)
            .filter(|_| engine.check(0, &mut rng).shadow_dash)
            .count();
        // 5% ± generous slack
        assert!((250..=750).contains(&fires), "fired {fires} of 10000");
    }
}
