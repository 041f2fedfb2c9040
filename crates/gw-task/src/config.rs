//! Timing configuration for the task controller.

use gw_core::Millis;

/// Controller timing and input policy.
///
/// Typically deserialised from the experiment shell's settings (with the
/// `serde` feature) or built with [`TaskControllerBuilder`][crate::TaskControllerBuilder].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TaskConfig {
    /// Duration of one avatar movement animation, in ms.  Renderers may
    /// override it per move.  Default: 200.
    pub animation_ms: u64,

    /// How long a floating reward label stays up, in ms.  Default: 800.
    pub reward_anim_ms: u64,

    /// Disable input while a move is animating.  Default: `true`.
    pub disable_during_movement: bool,

    /// Additionally require the key that caused the move to be released
    /// before input comes back.  Only meaningful with
    /// `disable_during_movement`.  Default: `true`.
    pub disable_hold_key: bool,

    /// Fraction of the animation that must elapse before input can be
    /// re-enabled.  Default: 0.8.
    pub reactivate_delay_frac: f64,

    /// End-of-round delay in units of the animation duration: the avatar is
    /// hidden after `multiplier − 1` units and the end callback fires after
    /// `multiplier` units.  Default: 4.
    pub end_delay_multiplier: f64,

    /// Base seed for transition-rule sampling.  `None` draws one from OS
    /// entropy when the controller is built.
    pub seed: Option<u64>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            animation_ms:            200,
            reward_anim_ms:          800,
            disable_during_movement: true,
            disable_hold_key:        true,
            reactivate_delay_frac:   0.8,
            end_delay_multiplier:    4.0,
            seed:                    None,
        }
    }
}

impl TaskConfig {
    /// Delay before input may be re-enabled after a move of `anim_ms`.
    #[inline]
    pub fn reactivate_delay_ms(&self, anim_ms: u64) -> u64 {
        Millis::scale(anim_ms, self.reactivate_delay_frac)
    }

    /// Delay before the avatar disappears at the end of a round.
    #[inline]
    pub fn hide_delay_ms(&self, anim_ms: u64) -> u64 {
        Millis::scale(anim_ms, self.end_delay_multiplier - 1.0)
    }

    /// Delay before the end callback fires at the end of a round.
    #[inline]
    pub fn end_delay_ms(&self, anim_ms: u64) -> u64 {
        Millis::scale(anim_ms, self.end_delay_multiplier)
    }

    /// Check invariants the controller relies on.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.reactivate_delay_frac.is_finite() && self.reactivate_delay_frac >= 0.0) {
            return Err(format!(
                "reactivate_delay_frac must be a non-negative number, got {}",
                self.reactivate_delay_frac
            ));
        }
        if !(self.end_delay_multiplier.is_finite() && self.end_delay_multiplier >= 1.0) {
            return Err(format!(
                "end_delay_multiplier must be at least 1, got {}",
                self.end_delay_multiplier
            ));
        }
        Ok(())
    }
}
