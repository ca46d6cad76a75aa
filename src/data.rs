use num_traits::Float;
use std::fmt::{Debug, Display};

/// Feature type of a tree.
///
/// Missing values are encoded as NaN, so the type has to be a float. Trees
/// are read from several threads at once during inference.
pub trait RealNumber: Float + Debug + Display + Send + Sync + 'static {}
impl<T> RealNumber for T where T: Float + Debug + Display + Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_missing<T: RealNumber>(value: T) -> bool {
        value.is_nan()
    }

    #[test]
    fn test_float_types_are_real_numbers() {
        assert!(is_missing(f64::NAN));
        assert!(is_missing(f32::NAN));
        assert!(!is_missing(0.5f64));
    }
}
