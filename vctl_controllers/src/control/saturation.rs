//! Symmetric velocity saturation.

/// Which side of the bound a command ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clamp {
    /// Within `[-limit, limit]`, passed through.
    None,
    /// Above `limit`.
    Upper,
    /// Below `-limit`.
    Lower,
    /// NaN, replaced by zero.
    Invalid,
}

impl Clamp {
    /// True if the output differs from the command.
    #[inline]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Saturated command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saturated {
    /// Value to write to the actuator.
    pub value: f64,
    /// Clamp applied.
    pub clamp: Clamp,
}

/// Clamp `command` to `[-limit, limit]`.
///
/// Comparisons are strict: a command exactly at `±limit` passes unchanged.
/// `limit` must be `>= 0` (enforced when the limit table is built). NaN
/// never reaches here through the mailbox, but maps to 0.0 regardless.
#[inline]
pub fn saturate(command: f64, limit: f64) -> Saturated {
    if command > limit {
        Saturated {
            value: limit,
            clamp: Clamp::Upper,
        }
    } else if command < -limit {
        Saturated {
            value: -limit,
            clamp: Clamp::Lower,
        }
    } else if command.is_nan() {
        Saturated {
            value: 0.0,
            clamp: Clamp::Invalid,
        }
    } else {
        Saturated {
            value: command,
            clamp: Clamp::None,
        }
    }
}
