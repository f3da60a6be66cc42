use core_layout::Digit;

/// Shape of a numeric prefix argument while it is being typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrefixArg {
    /// No digits and no sign typed yet.
    #[default]
    Unset,
    /// A lone minus sign with no digits after it.
    BareMinus,
    Value(i64),
}

impl PrefixArg {
    pub fn is_unset(self) -> bool {
        matches!(self, PrefixArg::Unset)
    }

    pub fn is_zero(self) -> bool {
        matches!(self, PrefixArg::Value(0))
    }

    pub fn is_negative(self) -> bool {
        match self {
            PrefixArg::BareMinus => true,
            PrefixArg::Value(n) => n < 0,
            PrefixArg::Unset => false,
        }
    }

    /// Numeric reading of the argument: unset counts as 1, a bare minus as -1.
    pub fn numeric_value(self) -> i64 {
        match self {
            PrefixArg::Unset => 1,
            PrefixArg::BareMinus => -1,
            PrefixArg::Value(n) => n,
        }
    }

    /// Append `digit`, keeping the sign. Returns `None` on overflow.
    ///
    /// A zero after a bare minus keeps the bare minus so `-05` reads as -5.
    /// `i64::MIN` is treated as overflow so negation never fails.
    pub fn with_digit(self, digit: Digit) -> Option<PrefixArg> {
        let d = i64::from(digit.value());
        let next = match self {
            PrefixArg::Unset => PrefixArg::Value(d),
            PrefixArg::BareMinus if digit.is_zero() => PrefixArg::BareMinus,
            PrefixArg::BareMinus => PrefixArg::Value(-d),
            PrefixArg::Value(v) if v >= 0 => PrefixArg::Value(v.checked_mul(10)?.checked_add(d)?),
            PrefixArg::Value(v) => PrefixArg::Value(v.checked_mul(10)?.checked_sub(d)?),
        };
        match next {
            PrefixArg::Value(i64::MIN) => None,
            other => Some(other),
        }
    }

    /// Minus key semantics: flips a value, toggles the bare minus on and off.
    pub fn negated(self) -> PrefixArg {
        match self {
            PrefixArg::Unset => PrefixArg::BareMinus,
            PrefixArg::BareMinus => PrefixArg::Unset,
            PrefixArg::Value(n) => PrefixArg::Value(-n),
        }
    }
}
