use crate::literal::{Literal, Polarity, Variable};
use bitvec::prelude::*;
use std::fmt::Display;
use tabled::{builder::Builder, grid::config::HorizontalLine, settings::Theme};

/// A Boolean variable binding.
///
/// `Unsat` records a local contradiction: the variable has been asserted
/// both true and false on the same model. It is carried as a first-class
/// value rather than rejected; queries over a model holding an `Unsat`
/// binding simply find no satisfying extension.
#[derive(Hash, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Binding {
    False,
    True,
    Free,
    Unsat,
}

impl From<Polarity> for Binding {
    fn from(polarity: Polarity) -> Self {
        match polarity {
            Polarity::Positive => Binding::True,
            Polarity::Negative => Binding::False,
        }
    }
}

impl Binding {
    /// Whether a variable bound this way falsifies a literal of the given
    /// polarity. `Unsat` falsifies both polarities, `Free` neither.
    #[must_use]
    pub fn falsifies(self, polarity: Polarity) -> bool {
        self == Binding::Unsat || self == Binding::from(!polarity)
    }
}

/// A total mapping from variables to [`Binding`]s. "Partial" models are
/// models binding some variables to [`Binding::Free`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    bindings: Vec<Binding>,
}

impl Model {
    /// A model of `nb_vars` variables, all free.
    #[must_use]
    pub fn new(nb_vars: u32) -> Model {
        Model {
            bindings: vec![Binding::Free; nb_vars as usize],
        }
    }

    #[must_use]
    pub fn nb_vars(&self) -> u32 {
        u32::try_from(self.bindings.len()).unwrap_or(u32::MAX)
    }

    /// All variables of the model, bound or not, in numeric order.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        (1..=self.nb_vars()).map(Variable)
    }

    #[must_use]
    pub fn binding_for(&self, var: Variable) -> Binding {
        self.bindings[var.slot()]
    }

    /// Bind `var`. Asserting `True` over `False` (or the converse) does
    /// not overwrite: the binding saturates to `Unsat`.
    pub fn set_binding_for(&mut self, var: Variable, binding: Binding) {
        let old = self.bindings[var.slot()];
        self.bindings[var.slot()] = match (old, binding) {
            (Binding::True, Binding::False) | (Binding::False, Binding::True) => Binding::Unsat,
            _ => binding,
        };
    }

    /// Bind the literal's variable to its polarity. Returns `false` when
    /// the current binding already falsifies the literal, leaving the
    /// model untouched.
    pub fn assert_literal(&mut self, lit: Literal) -> bool {
        if self.binding_for(lit.variable()).falsifies(lit.polarity()) {
            return false;
        }
        self.set_binding_for(lit.variable(), Binding::from(lit.polarity()));
        true
    }

    #[must_use]
    pub fn has_free_vars(&self) -> bool {
        self.bindings.contains(&Binding::Free)
    }

    /// The smallest-numbered free variable, if any.
    #[must_use]
    pub fn first_free_var(&self) -> Option<Variable> {
        self.bindings
            .iter()
            .position(|binding| *binding == Binding::Free)
            .map(|slot| Variable(u32::try_from(slot).unwrap() + 1))
    }

    /// Pointwise combination of two models over the same variables:
    /// `Free` yields to the other side, agreeing bindings stay. Returns
    /// `None` when the models disagree on some variable.
    #[must_use]
    pub fn mix(m1: &Model, m2: &Model) -> Option<Model> {
        debug_assert_eq!(m1.nb_vars(), m2.nb_vars());
        let mut out = Vec::with_capacity(m1.bindings.len());
        for (b1, b2) in m1.bindings.iter().zip(m2.bindings.iter()) {
            if *b1 == Binding::Free {
                out.push(*b2);
            } else if *b2 == Binding::Free || b1 == b2 {
                out.push(*b1);
            } else {
                return None;
            }
        }
        Some(Model { bindings: out })
    }

    /// All total `{True, False}` extensions of this model.
    ///
    /// Produces `2^n` models where `n` is the number of free variables;
    /// only call this on models whose free set is known to be tiny.
    #[must_use]
    pub fn expanded(&self) -> Vec<CompactModel> {
        let mut res = Vec::new();
        let mut models = vec![self.clone()];
        let mut i = 0;
        while i < models.len() {
            match models[i].first_free_var() {
                None => {
                    res.push(CompactModel::from(&models[i]));
                    i += 1;
                }
                Some(var) => {
                    let mut to_false = models[i].clone();
                    // Replace the current entry instead of advancing: the
                    // true half still has to be expanded.
                    models[i].set_binding_for(var, Binding::True);
                    to_false.set_binding_for(var, Binding::False);
                    models.push(to_false);
                }
            }
        }
        res
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Model{{")?;
        let mut first = true;
        for var in self.variables() {
            let binding = self.binding_for(var);
            if binding == Binding::Free || binding == Binding::Unsat {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            if binding == Binding::False {
                write!(f, "-")?;
            }
            write!(f, "{var}")?;
        }
        write!(f, "}}")
    }
}

/// A total model without `Free` or `Unsat` bindings, packed into a bit
/// vector. Used for I/O.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompactModel {
    assignment: BitVec,
}

impl CompactModel {
    #[must_use]
    pub fn binding_for(&self, var: Variable) -> Binding {
        if self.assignment[var.slot()] {
            Binding::True
        } else {
            Binding::False
        }
    }

    pub(crate) fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.assignment.iter().by_vals()
    }
}

impl From<&Model> for CompactModel {
    /// Free and unsat variables collapse to false.
    fn from(model: &Model) -> Self {
        let mut assignment = bitvec![0; model.nb_vars() as usize];
        for var in model.variables() {
            assignment.set(var.slot(), model.binding_for(var) == Binding::True);
        }
        CompactModel { assignment }
    }
}

impl Display for CompactModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (slot, bit) in self.bits().enumerate() {
            let var = i64::try_from(slot).unwrap() + 1;
            write!(f, "{} ", if bit { var } else { -var })?;
        }
        write!(f, "0")
    }
}

/// A displayable collection of compact models.
#[derive(Debug, PartialEq, Eq)]
pub struct Models {
    models: Vec<CompactModel>,
    nb_vars: u32,
}

impl Models {
    #[must_use]
    pub fn new(models: &[CompactModel], nb_vars: u32) -> Self {
        let mut models = models.to_owned();
        models.sort();
        Models { models, nb_vars }
    }

    #[must_use]
    pub fn all_models(&self) -> &[CompactModel] {
        &self.models
    }
}

impl Display for Models {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = Builder::default();
        builder.push_record((1..=self.nb_vars).map(|var| var.to_string()));

        for model in &self.models {
            builder.push_record(model.bits().map(|bit| if bit { "1" } else { "0" }));
        }

        let mut style = Theme::default();
        style.insert_horizontal_line(1, HorizontalLine::full('-', '-', ' ', ' '));
        let output = builder.build().with(style).to_string();
        write!(f, "{output}")
    }
}

#[cfg(test)]
mod test {
    use super::{Binding, CompactModel, Model, Models};
    use crate::literal::{Literal, Variable};
    use pretty_assertions::assert_eq;

    #[test]
    fn contradicting_assignments_saturate_to_unsat() {
        let mut m = Model::new(3);
        m.set_binding_for(Variable(2), Binding::True);
        assert_eq!(m.binding_for(Variable(2)), Binding::True);

        m.set_binding_for(Variable(2), Binding::True);
        assert_eq!(m.binding_for(Variable(2)), Binding::True);

        m.set_binding_for(Variable(2), Binding::False);
        assert_eq!(m.binding_for(Variable(2)), Binding::Unsat);

        // Only the True/False clash saturates; an Unsat binding can be
        // overwritten outright.
        m.set_binding_for(Variable(2), Binding::True);
        assert_eq!(m.binding_for(Variable(2)), Binding::True);
    }

    #[test]
    fn assert_literal_honors_existing_bindings() {
        let mut m = Model::new(2);
        assert!(m.assert_literal(Literal::from_dimacs(1)));
        assert!(m.assert_literal(Literal::from_dimacs(1)));
        assert!(!m.assert_literal(Literal::from_dimacs(-1)));
        assert_eq!(m.binding_for(Variable(1)), Binding::True);

        m.set_binding_for(Variable(2), Binding::Unsat);
        assert!(!m.assert_literal(Literal::from_dimacs(2)));
        assert!(!m.assert_literal(Literal::from_dimacs(-2)));
    }

    #[test]
    fn first_free_var() {
        let mut m = Model::new(3);
        assert_eq!(m.first_free_var(), Some(Variable(1)));

        m.set_binding_for(Variable(1), Binding::False);
        assert_eq!(m.first_free_var(), Some(Variable(2)));

        m.set_binding_for(Variable(2), Binding::True);
        m.set_binding_for(Variable(3), Binding::True);
        assert_eq!(m.first_free_var(), None);
        assert!(!m.has_free_vars());
    }

    #[test]
    fn mix_compatible_models() {
        let mut m1 = Model::new(3);
        m1.set_binding_for(Variable(1), Binding::True);
        let mut m2 = Model::new(3);
        m2.set_binding_for(Variable(3), Binding::False);

        let mixed = Model::mix(&m1, &m2).unwrap();
        assert_eq!(mixed.binding_for(Variable(1)), Binding::True);
        assert_eq!(mixed.binding_for(Variable(2)), Binding::Free);
        assert_eq!(mixed.binding_for(Variable(3)), Binding::False);
    }

    #[test]
    fn mix_incompatible_models() {
        let mut m1 = Model::new(2);
        m1.set_binding_for(Variable(2), Binding::True);
        let mut m2 = Model::new(2);
        m2.set_binding_for(Variable(2), Binding::False);

        assert_eq!(Model::mix(&m1, &m2), None);
    }

    #[test]
    fn expanded_enumerates_all_extensions() {
        let mut m = Model::new(3);
        m.set_binding_for(Variable(2), Binding::True);

        let expanded = m.expanded();
        assert_eq!(expanded.len(), 4);
        for compact in &expanded {
            assert_eq!(compact.binding_for(Variable(2)), Binding::True);
        }

        let mut total = Model::new(1);
        total.set_binding_for(Variable(1), Binding::False);
        assert_eq!(total.expanded().len(), 1);
    }

    #[test]
    fn compact_model_display() {
        let mut m = Model::new(3);
        m.set_binding_for(Variable(1), Binding::True);
        m.set_binding_for(Variable(3), Binding::True);
        assert_eq!(CompactModel::from(&m).to_string(), "1 -2 3 0");
    }

    #[test]
    fn model_display() {
        let mut m = Model::new(3);
        m.set_binding_for(Variable(1), Binding::True);
        m.set_binding_for(Variable(3), Binding::False);
        assert_eq!(m.to_string(), "Model{1, -3}");
    }

    #[test]
    fn models_table_lists_sorted_assignments() {
        let m = Model::new(2);
        let models = Models::new(&m.expanded(), 2);
        assert_eq!(models.all_models().len(), 4);

        let table = models.to_string();
        assert!(table.contains('1'));
        assert!(table.contains('0'));
    }
}
