// Signal Bundle - All heuristic signals evaluated with the window's SignalConfig

use serde::{Deserialize, Serialize};

use crate::window::SlidingWindow;

use super::{AbsorptionSignal, BreakoutStrength, EquilibriumZone, MomentumSignal};

/// Each field is `None` when its own data requirements are not met
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    pub momentum: Option<MomentumSignal>,
    pub equilibrium: Option<EquilibriumZone>,
    pub breakout: Option<BreakoutStrength>,
    pub absorption: Option<AbsorptionSignal>,
}

impl SignalSet {
    pub fn is_empty(&self) -> bool {
        self.momentum.is_none()
            && self.equilibrium.is_none()
            && self.breakout.is_none()
            && self.absorption.is_none()
    }
}

impl SlidingWindow {
    pub fn signals(&self) -> SignalSet {
        let cfg = self.signal_config();
        SignalSet {
            momentum: self.classify_momentum(cfg.momentum_weak, cfg.momentum_strong),
            equilibrium: self.equilibrium_zone(cfg.equilibrium_alpha, cfg.equilibrium_beta),
            breakout: self.breakout_strength(),
            absorption: self.absorption_distribution(
                cfg.absorption_min_volume_factor,
                cfg.absorption_max_abs_return,
                cfg.absorption_score_weak,
                cfg.absorption_score_strong,
            ),
        }
    }
}
