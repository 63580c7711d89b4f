//! Animations attached to nodes.
//!
//! Arbor does not run animations. It only carries the [`AnimationSet`] from the
//! [`InflationModel`](crate::InflationModel) onto the node so the host can apply it when
//! the node mounts, updates or unmounts.

use core::time::Duration;

/// Timing curve of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Curve {
    /// Constant speed.
    Linear,
    /// Starts slow.
    EaseIn,
    /// Ends slow.
    EaseOut,
    /// Starts and ends slow.
    #[default]
    EaseInOut,
    /// Damped spring.
    Spring {
        /// Damping ratio; `1.0` is critically damped.
        damping: f32,
        /// Initial velocity in units per second.
        initial_velocity: f32,
    },
}

/// A single animation description.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Animation {
    duration: Duration,
    delay: Duration,
    curve: Curve,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

impl Animation {
    /// Creates an animation with the default curve and no delay.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            delay: Duration::ZERO,
            curve: Curve::EaseInOut,
        }
    }

    /// Creates a linear animation.
    #[must_use]
    pub const fn linear(duration: Duration) -> Self {
        Self::new(duration).curve(Curve::Linear)
    }

    /// Sets the timing curve.
    #[must_use]
    pub const fn curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    /// Sets the start delay.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns the start delay.
    #[must_use]
    pub const fn start_delay(&self) -> Duration {
        self.delay
    }

    /// Returns the timing curve.
    #[must_use]
    pub const fn timing_curve(&self) -> Curve {
        self.curve
    }
}

/// Animations for the phases of a node's life.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationSet {
    /// Applied when the node first mounts.
    pub initial_mount: Option<Animation>,
    /// Applied when an existing node is updated.
    pub update: Option<Animation>,
    /// Applied when the node unmounts.
    pub final_unmount: Option<Animation>,
}

impl AnimationSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_mount: None,
            update: None,
            final_unmount: None,
        }
    }

    /// Sets the mount animation.
    #[must_use]
    pub const fn on_mount(mut self, animation: Animation) -> Self {
        self.initial_mount = Some(animation);
        self
    }

    /// Sets the update animation.
    #[must_use]
    pub const fn on_update(mut self, animation: Animation) -> Self {
        self.update = Some(animation);
        self
    }

    /// Sets the unmount animation.
    #[must_use]
    pub const fn on_unmount(mut self, animation: Animation) -> Self {
        self.final_unmount = Some(animation);
        self
    }

    /// Whether the set contains no animation.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.initial_mount.is_none() && self.update.is_none() && self.final_unmount.is_none()
    }
}
