//! The extracted type-signature record.
//!
//! A [`FunctionType`] is a pure projection of one documented declaration:
//! its qualified name, one [`TypeSet`] per `@param` tag in order, and a
//! single [`TypeSet`] for the `@return` tag.  Union types are flattened
//! into the set by [`flatten`], which both positions share.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::docblock::{ParamTag, ReturnTag, TypeExpr};
use crate::error::DocblockError;

/// The alternative type names of one parameter or return position.
///
/// Ordered so that rendering and serialization never depend on the order
/// the alternatives were written in.
pub type TypeSet = BTreeSet<String>;

/// Normalize a declared type into the set of its alternatives.
pub fn flatten(type_expr: &TypeExpr) -> TypeSet {
    match type_expr {
        TypeExpr::Single(name) => TypeSet::from([name.clone()]),
        TypeExpr::Union(members) => members.iter().cloned().collect(),
    }
}

/// Declared signature types of one function or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionType {
    pub name: String,
    /// One entry per `@param` tag, in tag order.
    pub params: Vec<TypeSet>,
    /// Empty when the docblock has no `@return` tag.
    pub returns: TypeSet,
}

impl FunctionType {
    pub fn new(
        name: impl Into<String>,
        params: &[ParamTag],
        returns: &[ReturnTag],
    ) -> Result<Self, DocblockError> {
        let returns = match returns {
            [] => TypeSet::new(),
            [only] => flatten(&only.type_expr),
            many => {
                return Err(DocblockError::MultipleReturnTags { count: many.len() });
            }
        };

        Ok(Self {
            name: name.into(),
            params: params.iter().map(|p| flatten(&p.type_expr)).collect(),
            returns,
        })
    }

    /// Rewrite every type name in place with `f`.
    ///
    /// Names that map to the same result collapse into one set member.
    pub fn qualify_types(&mut self, mut f: impl FnMut(&str) -> String) {
        let mut apply = |set: &TypeSet| set.iter().map(|name| f(name)).collect::<TypeSet>();
        self.returns = apply(&self.returns);
        self.params = self.params.iter().map(&mut apply).collect();
    }
}

fn join(set: &TypeSet) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

/// `name; r1,r2; p1a,p1b; p2; `
impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; {}; ", self.name, join(&self.returns))?;
        for param in &self.params {
            write!(f, "{}; ", join(param))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> TypeSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn param(name: &str, type_expr: TypeExpr) -> ParamTag {
        ParamTag {
            name: name.to_string(),
            type_expr,
        }
    }

    fn ret(type_expr: TypeExpr) -> ReturnTag {
        ReturnTag { type_expr }
    }

    #[test]
    fn union_return_is_one_set() {
        let f = FunctionType::new(
            "my_func",
            &[],
            &[ret(TypeExpr::Union(vec!["ClassA".into(), "ClassB".into()]))],
        )
        .unwrap();

        assert_eq!(f.name, "my_func");
        assert!(f.params.is_empty());
        assert_eq!(f.returns, set(&["ClassA", "ClassB"]));
    }

    #[test]
    fn params_keep_order_and_duplicates() {
        let f = FunctionType::new(
            "ClassA->foo",
            &[
                param("$b", TypeExpr::Single("ClassX".into())),
                param("$a", TypeExpr::Union(vec!["int".into(), "null".into()])),
                param("$c", TypeExpr::Single("ClassX".into())),
            ],
            &[ret(TypeExpr::Single("ClassY".into()))],
        )
        .unwrap();

        assert_eq!(
            f.params,
            vec![set(&["ClassX"]), set(&["int", "null"]), set(&["ClassX"])]
        );
        assert_eq!(f.returns, set(&["ClassY"]));
    }

    #[test]
    fn missing_return_is_empty_set() {
        let f = FunctionType::new("f", &[param("$a", TypeExpr::Single("int".into()))], &[])
            .unwrap();
        assert!(f.returns.is_empty());
        assert_eq!(f.params.len(), 1);
    }

    #[test]
    fn multiple_returns_are_rejected() {
        let returns = [
            ret(TypeExpr::Single("A".into())),
            ret(TypeExpr::Single("B".into())),
        ];
        assert_eq!(
            FunctionType::new("f", &[], &returns),
            Err(DocblockError::MultipleReturnTags { count: 2 })
        );
    }

    #[test]
    fn flatten_deduplicates_union_members() {
        let t = TypeExpr::Union(vec!["A".into(), "B".into(), "A".into()]);
        assert_eq!(flatten(&t), set(&["A", "B"]));
    }

    #[test]
    fn display_uses_line_format() {
        let f = FunctionType::new(
            "App\\C::make",
            &[
                param("$a", TypeExpr::Union(vec!["B".into(), "A".into()])),
                param("$b", TypeExpr::Single("int".into())),
            ],
            &[ret(TypeExpr::Union(vec!["Z".into(), "Y".into()]))],
        )
        .unwrap();
        assert_eq!(f.to_string(), "App\\C::make; Y,Z; A,B; int; ");

        let bare = FunctionType::new("g", &[], &[]).unwrap();
        assert_eq!(bare.to_string(), "g; ; ");
    }

    #[test]
    fn qualify_types_rewrites_all_positions() {
        let mut f = FunctionType::new(
            "f",
            &[param("$a", TypeExpr::Single("Foo".into()))],
            &[ret(TypeExpr::Union(vec!["Foo".into(), "null".into()]))],
        )
        .unwrap();
        f.qualify_types(|n| {
            if n == "null" {
                n.to_string()
            } else {
                format!("App\\{}", n)
            }
        });
        assert_eq!(f.params, vec![set(&["App\\Foo"])]);
        assert_eq!(f.returns, set(&["App\\Foo", "null"]));
    }
}
