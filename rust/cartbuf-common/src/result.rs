pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Returns an invalid-argument error from the enclosing function unless `expr`
/// holds. The error names `name` and quotes the failed condition.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::Error::invalid_arg(name, condition))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked_half(n: usize) -> Result<usize> {
        verify_arg!(n, n % 2 == 0);
        Ok(n / 2)
    }

    #[test]
    fn test_verify_arg_macro() {
        assert_eq!(checked_half(8).unwrap(), 4);
        let e = checked_half(7).unwrap_err();
        assert_eq!(e.to_string(), "invalid argument n: n % 2 == 0");
    }
}
