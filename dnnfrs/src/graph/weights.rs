use crate::literal::{Literal, Polarity, Variable};
use crate::model::{Binding, Model};
use anyhow::{bail, Context, Result};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

/// A dense table associating a rational weight with every literal of a
/// circuit. Defaults to `1` for each literal (uniform counting); setting
/// a literal's weight to `0` forbids it.
#[derive(Debug, Clone)]
pub struct WeightVector {
    // Weight of literal v at slot 2*(v-1), of -v at slot 2*(v-1) + 1,
    // i.e. weights of 1, -1, 2, -2, ...
    weights: Vec<BigRational>,
}

impl WeightVector {
    #[must_use]
    pub fn new(nb_vars: u32) -> WeightVector {
        WeightVector {
            weights: vec![BigRational::one(); nb_vars as usize * 2],
        }
    }

    #[must_use]
    pub fn nb_vars(&self) -> u32 {
        u32::try_from(self.weights.len() / 2).unwrap_or(u32::MAX)
    }

    fn slot(lit: Literal) -> usize {
        lit.variable().slot() * 2 + usize::from(lit.polarity() == Polarity::Negative)
    }

    /// The weight of a literal. The literal's variable must be within
    /// the vector's range.
    #[must_use]
    pub fn weight_for(&self, lit: Literal) -> &BigRational {
        &self.weights[WeightVector::slot(lit)]
    }

    /// `w(v) + w(-v)`: the weight of leaving `var` unconstrained.
    #[must_use]
    pub fn weight_for_var(&self, var: Variable) -> BigRational {
        self.weight_for(Literal::new(Polarity::Positive, var))
            + self.weight_for(Literal::new(Polarity::Negative, var))
    }

    pub fn set_weight_for(&mut self, lit: Literal, weight: BigRational) {
        self.weights[WeightVector::slot(lit)] = weight;
    }
}

/// Zero out every literal falsified by the partial model, reducing a
/// partial-model query to a plain weighted query: `True` forbids the
/// negative literal, `False` the positive one, `Unsat` both.
pub fn update_weights(weights: &mut WeightVector, partial_model: &Model) {
    debug_assert_eq!(weights.nb_vars(), partial_model.nb_vars());
    for var in partial_model.variables() {
        let (positive, negative) = (
            Literal::new(Polarity::Positive, var),
            Literal::new(Polarity::Negative, var),
        );
        match partial_model.binding_for(var) {
            Binding::True => weights.set_weight_for(negative, BigRational::zero()),
            Binding::False => weights.set_weight_for(positive, BigRational::zero()),
            Binding::Unsat => {
                weights.set_weight_for(positive, BigRational::zero());
                weights.set_weight_for(negative, BigRational::zero());
            }
            Binding::Free => {}
        }
    }
}

/// Parse a decimal literal (`-0.25`, `3`, `1.2e-3`) into an exact
/// rational, so that weighted counts carry no floating-point error.
pub(crate) fn parse_decimal(text: &str) -> Result<BigRational> {
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (
            mantissa,
            exponent
                .parse::<i32>()
                .with_context(|| format!("invalid exponent in weight {text:?}"))?,
        ),
        None => (text, 0),
    };

    let (negative, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        bail!("weight {text:?} has no digits");
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        bail!("weight {text:?} is not a decimal number");
    }

    let mut numer = format!("{int_part}{frac_part}")
        .parse::<BigInt>()
        .with_context(|| format!("invalid weight {text:?}"))?;
    if negative {
        numer = -numer;
    }

    let scale = exponent - i32::try_from(frac_part.len()).unwrap_or(i32::MAX);
    let power = num_traits::pow(BigInt::from(10), scale.unsigned_abs() as usize);
    Ok(if scale >= 0 {
        BigRational::from_integer(numer * power)
    } else {
        BigRational::new(numer, power)
    })
}
