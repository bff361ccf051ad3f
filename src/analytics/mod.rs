// Analytics - Read-side statistics over a window capture
// Computation happens after the window lock is released

pub mod absorption;
pub mod breakout;
pub mod equilibrium;
pub mod momentum;
pub mod price;
pub mod score;
pub mod signals;
pub mod snapshot;
pub mod volatility;

pub use absorption::AbsorptionSignal;
pub use breakout::BreakoutStrength;
pub use equilibrium::EquilibriumZone;
pub use momentum::MomentumSignal;
pub use score::ScoreError;
pub use signals::SignalSet;
pub use snapshot::Snapshot;
