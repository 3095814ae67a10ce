//! JavaScript numeric lexemes in Java spelling.

use js2j_ir::TypeTag;

/// A numeric literal as Java can write it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JavaNumber {
    Int(String),
    /// Spelled with an `L` suffix.
    Long(String),
    Double(String),
    /// Too large for a double: JS reads it as `Infinity`.
    Infinite,
}

impl JavaNumber {
    /// Declared type of a binding initialised with this literal. Longs are
    /// held in a `double`, which keeps the value.
    pub(crate) fn type_tag(&self) -> TypeTag {
        match self {
            JavaNumber::Int(_) => TypeTag::Integer,
            JavaNumber::Long(_) | JavaNumber::Double(_) | JavaNumber::Infinite => TypeTag::Real,
        }
    }
}

pub(crate) fn java_number(raw: &str) -> JavaNumber {
    let clean = raw.replace('_', "");
    let lower = clean.to_ascii_lowercase();

    if let Some(digits) = lower.strip_suffix('n') {
        let (radix, digits) = radix_digits(digits);
        return match i64::from_str_radix(digits, radix) {
            Ok(value) => JavaNumber::Long(format!("{value}L")),
            Err(_) => wide_integer(digits, radix),
        };
    }

    let (radix, digits) = radix_digits(&lower);
    if radix == 10 && lower.contains(['.', 'e']) {
        return decimal(&clean);
    }
    match i64::from_str_radix(digits, radix) {
        // octal has no `0o` spelling in Java
        Ok(value) if radix == 8 => fitted(value, value.to_string()),
        Ok(value) => fitted(value, clean),
        Err(_) => wide_integer(digits, radix),
    }
}

fn radix_digits(lower: &str) -> (u32, &str) {
    [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| lower.strip_prefix(prefix).map(|digits| (radix, digits)))
        .unwrap_or((10, lower))
}

fn fitted(value: i64, spelling: String) -> JavaNumber {
    if value > i64::from(i32::MAX) {
        JavaNumber::Long(format!("{spelling}L"))
    } else {
        JavaNumber::Int(spelling)
    }
}

/// An integer past `long` range, as the nearest double.
fn wide_integer(digits: &str, radix: u32) -> JavaNumber {
    let value = digits.chars().try_fold(0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    match value {
        Some(value) if value.is_finite() => JavaNumber::Double(format!("{value:?}")),
        Some(_) => JavaNumber::Infinite,
        None => JavaNumber::Double(digits.to_string()),
    }
}

fn decimal(clean: &str) -> JavaNumber {
    let Ok(value) = clean.parse::<f64>() else {
        return JavaNumber::Double(clean.to_string());
    };
    if !value.is_finite() {
        return JavaNumber::Infinite;
    }
    // 1e3 is an integer in JS terms
    if !clean.contains('.') && value.fract() == 0.0 && value.abs() <= f64::from(i32::MAX) {
        return JavaNumber::Int(format!("{}", value as i64));
    }
    if clean.starts_with('.') {
        JavaNumber::Double(format!("0{clean}"))
    } else {
        JavaNumber::Double(clean.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(raw: &str) -> JavaNumber {
        JavaNumber::Int(raw.to_string())
    }

    fn long(raw: &str) -> JavaNumber {
        JavaNumber::Long(raw.to_string())
    }

    #[test]
    fn test_ints_keep_their_spelling() {
        assert_eq!(java_number("42"), int("42"));
        assert_eq!(java_number("0x1F"), int("0x1F"));
        assert_eq!(java_number("0b101"), int("0b101"));
        assert_eq!(java_number("0o17"), int("15"));
        assert_eq!(java_number("1_000"), int("1000"));
        assert_eq!(java_number("1e3"), int("1000"));
    }

    #[test]
    fn test_out_of_int_range_becomes_long() {
        assert_eq!(java_number("5000000000"), long("5000000000L"));
        assert_eq!(java_number("0xFFFFFFFFFF"), long("0xFFFFFFFFFFL"));
        assert_eq!(java_number("10n"), long("10L"));
        assert_eq!(java_number("5000000000").type_tag(), TypeTag::Real);
    }

    #[test]
    fn test_past_long_range_becomes_double() {
        assert_eq!(
            java_number("99999999999999999999"),
            JavaNumber::Double("1e20".to_string())
        );
        assert_eq!(java_number("1e400"), JavaNumber::Infinite);
        assert_eq!(java_number("1e30"), JavaNumber::Double("1e30".to_string()));
    }

    #[test]
    fn test_decimals() {
        assert_eq!(java_number(".5"), JavaNumber::Double("0.5".to_string()));
        assert_eq!(java_number("2.50"), JavaNumber::Double("2.50".to_string()));
        assert_eq!(java_number("1e-5"), JavaNumber::Double("1e-5".to_string()));
        assert_eq!(java_number("0.5").type_tag(), TypeTag::Real);
        assert_eq!(java_number("7").type_tag(), TypeTag::Integer);
    }
}
