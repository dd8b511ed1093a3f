use derive_more::derive::From;
use std::fmt::Display;

/// A propositional variable, numbered from 1 as in the DIMACS and NNF
/// text formats.
#[derive(PartialEq, Eq, Clone, PartialOrd, Ord, Debug, Copy, Hash, From)]
pub struct Variable(pub u32);

impl Variable {
    /// Zero-based slot of this variable in dense per-variable tables.
    pub(crate) fn slot(self) -> usize {
        debug_assert!(self.0 >= 1);
        (self.0 - 1) as usize
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Either true or false.
#[derive(Hash, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Copy)]
pub enum Polarity {
    Positive,
    Negative,
}

impl From<bool> for Polarity {
    fn from(item: bool) -> Self {
        if item {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }
}

impl std::ops::Not for Polarity {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

/// A variable together with a polarity. Converts to and from the signed
/// nonzero integers of the text formats: `3` is variable 3 positive,
/// `-3` is variable 3 negative.
#[derive(Hash, Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord)]
pub struct Literal {
    variable: Variable,
    polarity: Polarity,
}

impl Literal {
    #[must_use]
    pub fn new(polarity: Polarity, variable: Variable) -> Literal {
        Literal { variable, polarity }
    }

    /// Decode a signed nonzero integer.
    ///
    /// # Panics
    ///
    /// Panics if `lit` is zero, which no caller should let through:
    /// `0` terminates literal lists in the text formats.
    #[must_use]
    pub fn from_dimacs(lit: i32) -> Literal {
        assert!(lit != 0, "literal 0 is a list terminator, not a literal");
        Literal {
            variable: Variable(lit.unsigned_abs()),
            polarity: Polarity::from(lit > 0),
        }
    }

    #[must_use]
    pub fn to_dimacs(self) -> i32 {
        let var = i32::try_from(self.variable.0).unwrap_or(i32::MAX);
        match self.polarity {
            Polarity::Positive => var,
            Polarity::Negative => -var,
        }
    }

    #[must_use]
    pub fn variable(self) -> Variable {
        self.variable
    }

    #[must_use]
    pub fn polarity(self) -> Polarity {
        self.polarity
    }

    #[must_use]
    pub fn negate(self) -> Literal {
        Literal {
            variable: self.variable,
            polarity: !self.polarity,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

#[cfg(test)]
mod test {
    use super::{Literal, Polarity, Variable};
    use pretty_assertions::assert_eq;

    #[test]
    fn dimacs_conversions() {
        let lit = Literal::from_dimacs(-4);
        assert_eq!(lit.variable(), Variable(4));
        assert_eq!(lit.polarity(), Polarity::Negative);
        assert_eq!(lit.to_dimacs(), -4);
        assert_eq!(lit.negate().to_dimacs(), 4);
        assert_eq!(lit.negate().negate(), lit);
    }

    #[test]
    fn display() {
        assert_eq!(Literal::from_dimacs(7).to_string(), "7");
        assert_eq!(Literal::from_dimacs(-7).to_string(), "-7");
    }
}
