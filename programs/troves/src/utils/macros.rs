#[macro_export]
/// This macro logs during test mode and returns early
/// useful for debugging.
macro_rules! fail {
    ($e:expr) => {
        #[cfg(test)]
        anchor_lang::prelude::msg!("Error {:?}", $e);
        return Err($e.into());
    };
}

/// Asserts two integer amounts are within `epsilon` of each other.
#[macro_export]
macro_rules! assert_fuzzy_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as i128, $right as i128, $epsilon as i128);
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ~= right)`\n  left: `{}`,\n right: `{}`,\n  diff: `{}` > epsilon `{}`",
                left, right, diff, epsilon
            );
        }
    }};
    ($left:expr, $right:expr) => {
        $crate::assert_fuzzy_eq!($left, $right, 1)
    };
}
