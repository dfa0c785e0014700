//! Module dedicated to search term rewriting.
//!
//! Remote servers do not support every term kind. Before translating
//! a tree, unsupported kinds are removed using [`SearchTerm::filter`],
//! which replaces them by boolean literals. [`SearchTerm::simplify`]
//! then folds those literals away.

use std::collections::HashSet;

use tracing::debug;

use crate::term::{SearchTerm, TermKind};

impl SearchTerm {
    /// Rewrites the tree without the given term kinds.
    ///
    /// - An excluded leaf becomes `false`.
    /// - An excluded operand of a conjunction becomes `true`, unless
    ///   the left operand has already been excluded, in which case
    ///   the right one becomes `false`.
    /// - An excluded operand of a disjunction becomes `false`.
    /// - An excluded composite term becomes `false`.
    ///
    /// Boolean literals are never excluded. The original tree is left
    /// untouched.
    pub fn filter(&self, excluded: &HashSet<TermKind>) -> SearchTerm {
        let kind = self.kind();

        match self {
            Self::Boolean(_) => self.clone(),
            _ if excluded.contains(&kind) => {
                debug!("excluding {kind} term from search term");
                Self::Boolean(false)
            }
            Self::And(left, right) => {
                let (left, right) = filter_operands(left, right, excluded, true);
                Self::and(left, right)
            }
            Self::Or(left, right) => {
                let (left, right) = filter_operands(left, right, excluded, false);
                Self::or(left, right)
            }
            Self::Not(term) => Self::not(term.filter(excluded)),
            leaf => leaf.clone(),
        }
    }

    /// Folds boolean literals and double negations away.
    pub fn simplify(&self) -> SearchTerm {
        match self {
            Self::And(left, right) => match (left.simplify(), right.simplify()) {
                (Self::Boolean(false), _) | (_, Self::Boolean(false)) => Self::Boolean(false),
                (Self::Boolean(true), term) | (term, Self::Boolean(true)) => term,
                (left, right) => Self::and(left, right),
            },
            Self::Or(left, right) => match (left.simplify(), right.simplify()) {
                (Self::Boolean(true), _) | (_, Self::Boolean(true)) => Self::Boolean(true),
                (Self::Boolean(false), term) | (term, Self::Boolean(false)) => term,
                (left, right) => Self::or(left, right),
            },
            Self::Not(term) => match term.simplify() {
                Self::Boolean(value) => Self::Boolean(!value),
                Self::Not(term) => *term,
                term => Self::not(term),
            },
            term => term.clone(),
        }
    }
}

/// Filters both operands of a binary term.
///
/// The neutral element (`true` for a conjunction, `false` for a
/// disjunction) replaces an excluded operand. When both operands are
/// excluded, the right one is replaced by `false` so that the whole
/// term cannot match everything.
fn filter_operands(
    left: &SearchTerm,
    right: &SearchTerm,
    excluded: &HashSet<TermKind>,
    neutral: bool,
) -> (SearchTerm, SearchTerm) {
    let left_excluded = is_excluded(left, excluded);

    let left = if left_excluded {
        SearchTerm::Boolean(neutral)
    } else {
        left.filter(excluded)
    };

    let right = if !is_excluded(right, excluded) {
        right.filter(excluded)
    } else if left_excluded {
        SearchTerm::Boolean(false)
    } else {
        SearchTerm::Boolean(neutral)
    };

    (left, right)
}

fn is_excluded(term: &SearchTerm, excluded: &HashSet<TermKind>) -> bool {
    !matches!(term, SearchTerm::Boolean(_)) && excluded.contains(&term.kind())
}
