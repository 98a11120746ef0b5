//! Sample values and their invalid sentinels
//!
//! The statistics types never return `Result`. An operation that cannot
//! produce a meaningful answer returns the sentinel of its value type
//! instead: NaN for floating point, `MAX` for integers. Feeding a sentinel
//! into the next stage yields another sentinel, so invalidity propagates
//! through whole `CdfForward -> CdfInverse -> Remapper` chains.

/// Sentinel for an invalid bin index
pub const NULL_INDEX: usize = usize::MAX;

/// Check whether a bin index is a real index
pub fn is_valid_index(ndx: usize) -> bool {
    ndx != NULL_INDEX
}

/// A value type that can be fed through the distribution machinery
///
/// Conversions go through `f64`. Converting back to an integer type
/// truncates toward zero (plain `as` semantics), never rounds.
pub trait Sample: Copy + PartialOrd + Send + Sync + 'static {
    /// Widen to `f64`
    fn to_f64(self) -> f64;

    /// Narrow from `f64`, mapping NaN onto the sentinel
    fn from_f64(value: f64) -> Self;

    /// The invalid sentinel for this type
    fn null() -> Self;

    /// Whether this value is a real value rather than the sentinel
    fn is_valid(&self) -> bool;
}

macro_rules! impl_float_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $t
                }

                #[inline]
                fn null() -> Self {
                    <$t>::NAN
                }

                #[inline]
                fn is_valid(&self) -> bool {
                    !self.is_nan()
                }
            }
        )*
    };
}

macro_rules! impl_int_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    if self == <$t>::MAX {
                        f64::NAN
                    } else {
                        self as f64
                    }
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    if value.is_nan() {
                        <$t>::MAX
                    } else {
                        value as $t
                    }
                }

                #[inline]
                fn null() -> Self {
                    <$t>::MAX
                }

                #[inline]
                fn is_valid(&self) -> bool {
                    *self != <$t>::MAX
                }
            }
        )*
    };
}

impl_float_sample!(f32, f64);
impl_int_sample!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
