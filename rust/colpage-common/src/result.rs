pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Checks a caller-supplied argument, returning `InvalidArgument` from the enclosing
/// function when the condition does not hold.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

/// Checks a property of the encoded page, returning `InvalidFormat` from the enclosing
/// function when the condition does not hold.
#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_data(result, stringify!($name), stringify!($expr))?;
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

#[inline]
pub fn verify_data(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_format(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cold]
pub fn invalid_format(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidFormat {
        element: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn check_len(len: usize) -> crate::Result<()> {
        verify_arg!(len, len <= 8);
        Ok(())
    }

    fn check_width(bit_width: u8) -> crate::Result<()> {
        verify_data!(bit_width, bit_width <= 32);
        Ok(())
    }

    #[test]
    fn test_verify_macros() {
        assert!(check_len(8).is_ok());
        let err = check_len(9).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidArgument { name, message } => {
                assert_eq!(name, "len");
                assert_eq!(message, "len <= 8");
            }
            other => panic!("unexpected error {other:?}"),
        }

        assert!(check_width(32).is_ok());
        assert!(matches!(
            check_width(33).unwrap_err().kind(),
            ErrorKind::InvalidFormat { .. }
        ));
    }
}
