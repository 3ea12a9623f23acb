//! Hint expression parser and evaluator.
//!
//! This module implements the mini-language stringified type hints are
//! written in. It is deliberately not a general-purpose expression parser:
//! it covers exactly the shapes annotations use.
//!
//! ## Grammar
//!
//! ```text
//! <hint>    := <postfix> ("|" <postfix>)*
//! <postfix> := <atom> ("." ident | "[" <args> "]")*
//! <args>    := <hint> ("," <hint>)* [","]
//! <atom>    := ident | string | integer | "..." | "(" <hint> ")" | "[" <args> "]"
//! ```
//!
//! ## Examples
//!
//! ```text
//! Node                        # Bare name
//! list[int]                   # Subscription
//! int | None                  # Union (3.10+)
//! collections.abc.Sequence    # Dotted attribute access
//! Callable[[int, str], bool]  # Bracketed argument list
//! Optional["Node"]            # Nested string (stays a string)
//! Literal[-1]                 # Integer literal
//! ```

use thiserror::Error;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, opt, preceded, repeat, separated};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};
use winnow::ModalResult;

use hintscope_core::object::{ObjectError, Value};
use hintscope_core::scope::ForwardScope;
use hintscope_core::version::PythonVersion;

// ============================================================================
// Error Types
// ============================================================================

/// Errors during hint parsing or evaluation.
///
/// Messages mirror the exceptions eager evaluation would have raised, so
/// the resolver can embed them verbatim as the rendered underlying cause.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The hint string is not valid hint syntax.
    #[error("invalid type hint syntax in \"{hint}\": {message}")]
    Syntax { hint: String, message: String },

    /// A name in the hint is bound nowhere in the composite scope.
    #[error("name '{name}' is not defined")]
    NameNotDefined { name: String },

    /// An object operation (attribute, subscript, union) failed.
    #[error(transparent)]
    Object(#[from] ObjectError),
}

// ============================================================================
// AST
// ============================================================================

/// A parsed hint expression.
#[derive(Debug, Clone, PartialEq)]
pub enum HintExpr {
    /// A bare identifier.
    Name(String),
    /// Attribute access (`base.name`).
    Attr { base: Box<HintExpr>, name: String },
    /// Subscription (`base[args]`).
    Subscript {
        base: Box<HintExpr>,
        args: Vec<HintExpr>,
    },
    /// Union (`a | b | ...`), at least two members.
    Union(Vec<HintExpr>),
    /// A string literal (a nested forward reference, kept as a string).
    Str(String),
    /// An integer literal.
    Int(i64),
    /// The `...` literal.
    EllipsisLit,
    /// A bracketed list (`[int, str]`).
    List(Vec<HintExpr>),
}

/// Parse a hint string into an expression.
pub fn parse_hint(input: &str) -> Result<HintExpr, EvalError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EvalError::Syntax {
            hint: input.to_string(),
            message: "empty hint".to_string(),
        });
    }

    parse_hint_expr
        .parse(trimmed)
        .map_err(|e| EvalError::Syntax {
            hint: input.to_string(),
            message: format!("{:?}", e),
        })
}

// ============================================================================
// Parser implementation using winnow
// ============================================================================

/// Parse the top-level expression (handles `|` at lowest precedence).
fn parse_hint_expr(input: &mut &str) -> ModalResult<HintExpr> {
    let first = parse_postfix(input)?;

    let rest: Vec<HintExpr> = repeat(
        0..,
        preceded((multispace0, '|', multispace0), parse_postfix),
    )
    .parse_next(input)?;

    if rest.is_empty() {
        Ok(first)
    } else {
        let mut all = vec![first];
        all.extend(rest);
        Ok(HintExpr::Union(all))
    }
}

/// Parse an atom followed by any chain of `.name` and `[args]` suffixes.
fn parse_postfix(input: &mut &str) -> ModalResult<HintExpr> {
    let _ = multispace0.parse_next(input)?;
    let mut expr = parse_atom(input)?;

    loop {
        let _ = multispace0.parse_next(input)?;
        if opt('.').parse_next(input)?.is_some() {
            let _ = multispace0.parse_next(input)?;
            let name = parse_ident(input)?;
            expr = HintExpr::Attr {
                base: Box::new(expr),
                name,
            };
        } else if let Some(args) = opt(parse_subscript_args).parse_next(input)? {
            expr = HintExpr::Subscript {
                base: Box::new(expr),
                args,
            };
        } else {
            break;
        }
    }

    Ok(expr)
}

/// Parse an atom (name, literal, bracketed list, or parenthesized hint).
fn parse_atom(input: &mut &str) -> ModalResult<HintExpr> {
    alt((
        "...".map(|_: &str| HintExpr::EllipsisLit),
        parse_double_quoted,
        parse_single_quoted,
        parse_int,
        parse_list_atom,
        parse_paren,
        parse_ident.map(HintExpr::Name),
    ))
    .parse_next(input)
}

/// Parse a subscript argument list: `[args]` with at least one argument.
fn parse_subscript_args(input: &mut &str) -> ModalResult<Vec<HintExpr>> {
    let _ = ('[', multispace0).parse_next(input)?;
    let args: Vec<HintExpr> =
        separated(1.., parse_hint_expr, (multispace0, ',', multispace0)).parse_next(input)?;
    let _ = (multispace0, opt(','), multispace0, ']').parse_next(input)?;
    Ok(args)
}

/// Parse a bracketed list atom: `[args]`, possibly empty.
fn parse_list_atom(input: &mut &str) -> ModalResult<HintExpr> {
    let _ = ('[', multispace0).parse_next(input)?;
    let items: Vec<HintExpr> =
        separated(0.., parse_hint_expr, (multispace0, ',', multispace0)).parse_next(input)?;
    let _ = (multispace0, opt(','), multispace0, ']').parse_next(input)?;
    Ok(HintExpr::List(items))
}

/// Parse a parenthesized hint.
fn parse_paren(input: &mut &str) -> ModalResult<HintExpr> {
    delimited(('(', multispace0), parse_hint_expr, (multispace0, ')')).parse_next(input)
}

/// Parse an identifier.
fn parse_ident(input: &mut &str) -> ModalResult<String> {
    (
        take_while(1, |c: char| c.is_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_alphanumeric() || c == '_'),
    )
        .map(|(head, tail): (&str, &str)| format!("{head}{tail}"))
        .parse_next(input)
}

/// Parse an integer literal, optionally negative.
fn parse_int(input: &mut &str) -> ModalResult<HintExpr> {
    (opt('-'), take_while(1.., |c: char| c.is_ascii_digit()))
        .try_map(|(sign, digits): (Option<char>, &str)| {
            digits
                .parse::<i64>()
                .map(|n| HintExpr::Int(if sign.is_some() { -n } else { n }))
        })
        .parse_next(input)
}

/// Parse a double-quoted string.
fn parse_double_quoted(input: &mut &str) -> ModalResult<HintExpr> {
    delimited('"', take_till(0.., |c| c == '"'), '"')
        .map(|s: &str| HintExpr::Str(s.to_string()))
        .parse_next(input)
}

/// Parse a single-quoted string.
fn parse_single_quoted(input: &mut &str) -> ModalResult<HintExpr> {
    delimited('\'', take_till(0.., |c| c == '\''), '\'')
        .map(|s: &str| HintExpr::Str(s.to_string()))
        .parse_next(input)
}

// ============================================================================
// Evaluation
// ============================================================================

/// Parse and evaluate a hint string against a composite scope.
///
/// Read-only: evaluation never mutates the scope. Operand evaluation is
/// left to right, so the first failing name is the one reported.
pub fn evaluate_hint(
    hint: &str,
    scope: &ForwardScope,
    version: PythonVersion,
) -> Result<Value, EvalError> {
    let expr = parse_hint(hint)?;
    eval_expr(&expr, scope, version)
}

fn eval_expr(
    expr: &HintExpr,
    scope: &ForwardScope,
    version: PythonVersion,
) -> Result<Value, EvalError> {
    match expr {
        HintExpr::Name(name) => scope
            .lookup(name)
            .cloned()
            .ok_or_else(|| EvalError::NameNotDefined { name: name.clone() }),
        HintExpr::Attr { base, name } => {
            let value = eval_expr(base, scope, version)?;
            Ok(value.attr(name)?)
        }
        HintExpr::Subscript { base, args } => {
            let origin = eval_expr(base, scope, version)?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(arg, scope, version)?);
            }
            Ok(origin.subscript(values)?)
        }
        HintExpr::Union(members) => {
            let mut acc: Option<Value> = None;
            for member in members {
                let value = eval_expr(member, scope, version)?;
                acc = Some(match acc {
                    None => value,
                    Some(prev) => prev.union_with(&value, version)?,
                });
            }
            acc.ok_or_else(|| EvalError::Syntax {
                hint: String::new(),
                message: "union with no members".to_string(),
            })
        }
        HintExpr::Str(s) => Ok(Value::Str(s.clone())),
        HintExpr::Int(n) => Ok(Value::Int(*n)),
        HintExpr::EllipsisLit => Ok(Value::Ellipsis),
        HintExpr::List(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval_expr(item, scope, version)?);
            }
            Ok(Value::Sequence(values))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hintscope_core::object::{ClassObject, ModuleObject};

    // =========================================================================
    // Parse Tests
    // =========================================================================

    #[test]
    fn test_parse_bare_name() {
        assert_eq!(parse_hint("Node").unwrap(), HintExpr::Name("Node".into()));
        assert_eq!(
            parse_hint("  _private  ").unwrap(),
            HintExpr::Name("_private".into())
        );
    }

    #[test]
    fn test_parse_subscript() {
        let expr = parse_hint("list[int]").unwrap();
        assert_eq!(
            expr,
            HintExpr::Subscript {
                base: Box::new(HintExpr::Name("list".into())),
                args: vec![HintExpr::Name("int".into())],
            }
        );
    }

    #[test]
    fn test_parse_nested_subscript_with_trailing_comma() {
        let expr = parse_hint("dict[str, list[int],]").unwrap();
        match expr {
            HintExpr::Subscript { args, .. } => assert_eq!(args.len(), 2),
            other => panic!("expected Subscript, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_union() {
        let expr = parse_hint("int | str | None").unwrap();
        match expr {
            HintExpr::Union(members) => {
                assert_eq!(members.len(), 3);
                assert_eq!(members[2], HintExpr::Name("None".into()));
            }
            other => panic!("expected Union, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_dotted_name() {
        let expr = parse_hint("collections.abc.Sequence").unwrap();
        assert_eq!(
            expr,
            HintExpr::Attr {
                base: Box::new(HintExpr::Attr {
                    base: Box::new(HintExpr::Name("collections".into())),
                    name: "abc".into(),
                }),
                name: "Sequence".into(),
            }
        );
    }

    #[test]
    fn test_parse_callable_shape() {
        let expr = parse_hint("Callable[[int, str], bool]").unwrap();
        match expr {
            HintExpr::Subscript { args, .. } => {
                assert_eq!(args.len(), 2);
                assert_eq!(
                    args[0],
                    HintExpr::List(vec![
                        HintExpr::Name("int".into()),
                        HintExpr::Name("str".into()),
                    ])
                );
            }
            other => panic!("expected Subscript, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse_hint("'Node'").unwrap(), HintExpr::Str("Node".into()));
        assert_eq!(
            parse_hint("\"Node\"").unwrap(),
            HintExpr::Str("Node".into())
        );
        assert_eq!(parse_hint("-3").unwrap(), HintExpr::Int(-3));
        assert_eq!(parse_hint("...").unwrap(), HintExpr::EllipsisLit);
    }

    #[test]
    fn test_parse_parenthesized() {
        let expr = parse_hint("(int | str)").unwrap();
        assert!(matches!(expr, HintExpr::Union(_)));
    }

    #[test]
    fn test_parse_invalid_syntax() {
        for bad in ["", "  ", "list[", "|int", "3abc", "a b"] {
            let err = parse_hint(bad).unwrap_err();
            assert!(
                matches!(err, EvalError::Syntax { .. }),
                "expected syntax error for {bad:?}"
            );
        }
    }

    // =========================================================================
    // Evaluate Tests
    // =========================================================================

    fn scope_with_node() -> (ForwardScope, Value) {
        let node = Value::Class(ClassObject::new("Node").with_module("m").shared());
        let mut scope = ForwardScope::primed();
        scope.bind("Node", node.clone());
        (scope, node)
    }

    #[test]
    fn test_evaluate_name_and_builtin_fallback() {
        let (scope, node) = scope_with_node();
        assert_eq!(
            evaluate_hint("Node", &scope, PythonVersion::default()).unwrap(),
            node
        );
        // Builtins resolve without explicit binding.
        let int = evaluate_hint("int", &scope, PythonVersion::default()).unwrap();
        assert_eq!(int.kind_name(), "class");
    }

    #[test]
    fn test_evaluate_unknown_name() {
        let (scope, _) = scope_with_node();
        let err = evaluate_hint("Missing", &scope, PythonVersion::default()).unwrap_err();
        assert_eq!(err.to_string(), "name 'Missing' is not defined");
    }

    #[test]
    fn test_evaluate_subscript() {
        let (scope, node) = scope_with_node();
        let alias = evaluate_hint("list[Node]", &scope, PythonVersion::default()).unwrap();
        match alias {
            Value::Generic { args, .. } => assert_eq!(args, [node]),
            other => panic!("expected Generic, got {other:?}"),
        }
    }

    #[test]
    fn test_evaluate_union_version_gate() {
        let (scope, _) = scope_with_node();
        let union = evaluate_hint("int | None", &scope, PythonVersion::V3_10).unwrap();
        assert!(matches!(union, Value::Union(_)));

        let err = evaluate_hint("int | None", &scope, PythonVersion::V3_9).unwrap_err();
        assert!(matches!(
            err,
            EvalError::Object(ObjectError::UnsupportedUnionOperands { .. })
        ));
    }

    #[test]
    fn test_evaluate_union_reports_first_unknown_name() {
        let (scope, _) = scope_with_node();
        let err = evaluate_hint("Ghost | int", &scope, PythonVersion::V3_9).unwrap_err();
        // Left-to-right: the unknown name fires before the union operand
        // failure, matching eager evaluation order.
        assert_eq!(err.to_string(), "name 'Ghost' is not defined");
    }

    #[test]
    fn test_evaluate_dotted_attribute() {
        let seq = Value::Class(ClassObject::new("Sequence").shared());
        let abc = ModuleObject::new("collections.abc")
            .with_attr("Sequence", seq.clone())
            .shared();
        let collections = ModuleObject::new("collections")
            .with_attr("abc", Value::Module(abc))
            .shared();
        let mut scope = ForwardScope::primed();
        scope.bind("collections", Value::Module(collections));

        let value =
            evaluate_hint("collections.abc.Sequence", &scope, PythonVersion::default()).unwrap();
        assert_eq!(value, seq);
    }

    #[test]
    fn test_evaluate_nested_string_stays_a_string() {
        let typing = hintscope_core::builtins::typing_scope();
        let mut scope = ForwardScope::primed();
        scope.merge(typing);

        let value = evaluate_hint("Optional['Node']", &scope, PythonVersion::default()).unwrap();
        match value {
            Value::Generic { args, .. } => assert_eq!(args, [Value::Str("Node".into())]),
            other => panic!("expected Generic, got {other:?}"),
        }
    }

    #[test]
    fn test_evaluate_callable_with_list() {
        let typing = hintscope_core::builtins::typing_scope();
        let mut scope = ForwardScope::primed();
        scope.merge(typing);

        let value =
            evaluate_hint("Callable[[int, str], bool]", &scope, PythonVersion::default()).unwrap();
        match value {
            Value::Generic { args, .. } => {
                assert_eq!(args.len(), 2);
                assert!(matches!(args[0], Value::Sequence(_)));
            }
            other => panic!("expected Generic, got {other:?}"),
        }
    }
}
