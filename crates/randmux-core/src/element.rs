//! Buffer element types accepted by `StatefulRandom::fill`.

use num_complex::Complex;

/// How `fill` populates an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Uniform over `[min, max)`.
    Real,
    /// Magnitude uniform over `[0, max - min)`, phase uniform over `[0, 2π)`.
    Complex,
    /// Rejected with `RandomError::InvalidArgument`.
    Unsupported,
}

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// An element type that may appear in a buffer passed to `fill`.
///
/// Sealed: the set of fillable types is fixed by this crate.
pub trait Element: sealed::Sealed + Copy + 'static {
    /// How buffers of this type are filled.
    const KIND: ElementKind;

    /// Name used in error messages.
    const NAME: &'static str;

    /// Converts a real draw into a value in `[min, max)` in the target
    /// precision. `None` if the type has no value in that range or is not a
    /// real kind.
    fn from_real(_value: f64, _min: f64, _max: f64) -> Option<Self> {
        None
    }

    /// Builds `magnitude * (cos(phase) + i sin(phase))` with the magnitude kept
    /// strictly below `radius`. `None` if no magnitude in `[0, radius)` is
    /// representable or the type is not a complex kind.
    fn from_polar(_magnitude: f64, _phase: f64, _radius: f64) -> Option<Self> {
        None
    }
}

/// Largest `f64` strictly below the finite value `x`.
fn next_below(x: f64) -> f64 {
    if x > 0.0 {
        f64::from_bits(x.to_bits() - 1)
    } else if x < 0.0 {
        f64::from_bits(x.to_bits() + 1)
    } else {
        -f64::from_bits(1)
    }
}

/// Next `f32` below `x`. Maps infinity to `f32::MAX`.
fn next_below_f32(x: f32) -> f32 {
    if x > 0.0 {
        f32::from_bits(x.to_bits() - 1)
    } else if x < 0.0 {
        f32::from_bits(x.to_bits() + 1)
    } else {
        -f32::from_bits(1)
    }
}

/// Next `f32` above `x`. Maps negative infinity to `-f32::MAX`.
fn next_above_f32(x: f32) -> f32 {
    if x > 0.0 {
        f32::from_bits(x.to_bits() + 1)
    } else if x < 0.0 {
        f32::from_bits(x.to_bits() - 1)
    } else {
        f32::from_bits(1)
    }
}

/// Smallest `f32` not below `x`.
#[allow(clippy::cast_possible_truncation)]
fn f32_at_least(x: f64) -> f32 {
    let v = x as f32;
    if f64::from(v) < x { next_above_f32(v) } else { v }
}

/// Largest `f32` strictly below `x`.
#[allow(clippy::cast_possible_truncation)]
fn f32_below(x: f64) -> f32 {
    let v = x as f32;
    if f64::from(v) >= x { next_below_f32(v) } else { v }
}

fn below(value: f64, upper: f64) -> f64 {
    if value < upper { value } else { next_below(upper) }
}

/// Narrows `value` to `f32` inside `[min, max)`, compared in `f64`.
#[allow(clippy::cast_possible_truncation)]
fn within_f32(value: f64, min: f64, max: f64) -> Option<f32> {
    let (lo, hi) = (f32_at_least(min), f32_below(max));
    if f64::from(lo) >= max {
        return None;
    }
    let v = value as f32;
    Some(if f64::from(v) < min {
        lo
    } else if f64::from(v) >= max {
        hi
    } else {
        v
    })
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Real;
    const NAME: &'static str = "f64";

    fn from_real(value: f64, _min: f64, max: f64) -> Option<Self> {
        // `min + u * (max - min)` never rounds below `min` for `u >= 0`.
        Some(below(value, max))
    }
}

impl Element for f32 {
    const KIND: ElementKind = ElementKind::Real;
    const NAME: &'static str = "f32";

    fn from_real(value: f64, min: f64, max: f64) -> Option<Self> {
        within_f32(value, min, max)
    }
}

impl Element for Complex<f64> {
    const KIND: ElementKind = ElementKind::Complex;
    const NAME: &'static str = "complex128";

    fn from_polar(magnitude: f64, phase: f64, radius: f64) -> Option<Self> {
        let r = below(magnitude, radius);
        Some(Complex::new(r * phase.cos(), r * phase.sin()))
    }
}

impl Element for Complex<f32> {
    const KIND: ElementKind = ElementKind::Complex;
    const NAME: &'static str = "complex64";

    #[allow(clippy::cast_possible_truncation)]
    fn from_polar(magnitude: f64, phase: f64, radius: f64) -> Option<Self> {
        let r = within_f32(magnitude, 0.0, radius)?;
        let phase = phase as f32;
        Some(Complex::new(r * phase.cos(), r * phase.sin()))
    }
}

impl sealed::Sealed for f64 {}
impl sealed::Sealed for f32 {}
impl sealed::Sealed for Complex<f64> {}
impl sealed::Sealed for Complex<f32> {}

macro_rules! unsupported {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Element for $ty {
                const KIND: ElementKind = ElementKind::Unsupported;
                const NAME: &'static str = stringify!($ty);
            }
        )*
    };
}

unsupported!(bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);
