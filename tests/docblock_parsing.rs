//! Tests for the public docblock API: tag parsing and type grammar.

use phpdoc_extract::docblock::{
    DocblockParser, ParamTag, PhpDocParser, ReturnTag, TypeExpr, TypeNode, parse_type,
};
use phpdoc_extract::DocblockError;

fn parse(doc: &str) -> phpdoc_extract::PhpDoc {
    PhpDocParser.parse(doc).expect("docblock should parse")
}

// ─── Tags ───────────────────────────────────────────────────────────────────

#[test]
fn multi_line_docblock_with_descriptions() {
    let doc = concat!(
        "/**\n",
        " * Create a user.\n",
        " *\n",
        " * @param  string      $name   The display name.\n",
        " * @param  Role|null   $role   Optional role,\n",
        " *                             spanning two lines.\n",
        " * @throws \\InvalidArgumentException\n",
        " * @return User\n",
        " */",
    );
    let doc = parse(doc);
    assert_eq!(
        doc.params,
        vec![
            ParamTag {
                name: "$name".into(),
                type_expr: TypeExpr::Single("string".into()),
            },
            ParamTag {
                name: "$role".into(),
                type_expr: TypeExpr::Union(vec!["Role".into(), "null".into()]),
            },
        ]
    );
    assert_eq!(
        doc.returns,
        vec![ReturnTag {
            type_expr: TypeExpr::Single("User".into()),
        }]
    );
}

#[test]
fn generic_spanning_lines_is_one_type() {
    let doc = parse("/**\n * @return array<\n *   string,\n *   User|Admin\n * >\n */");
    assert_eq!(
        doc.returns[0].type_expr,
        TypeExpr::Single("array<string, User|Admin>".into())
    );
}

#[test]
fn union_inside_generic_is_not_split() {
    let doc = parse("/** @param Collection<int, A|B>|null $c */");
    assert_eq!(
        doc.params[0].type_expr,
        TypeExpr::Union(vec!["Collection<int, A|B>".into(), "null".into()])
    );
}

#[test]
fn not_a_docblock() {
    assert_eq!(
        PhpDocParser.parse("/* @return int */"),
        Err(DocblockError::Unterminated)
    );
    assert_eq!(
        PhpDocParser.parse("/** @return int"),
        Err(DocblockError::Unterminated)
    );
}

#[test]
fn errors_name_the_tag() {
    let err = PhpDocParser.parse("/** @return Foo<Bar */").unwrap_err();
    assert!(err.to_string().contains("@return"), "{err}");

    let err = PhpDocParser.parse("/** @param */").unwrap_err();
    assert_eq!(
        err,
        DocblockError::MissingType {
            tag: "@param".into()
        }
    );
}

// ─── Type grammar ───────────────────────────────────────────────────────────

#[test]
fn type_parser_stops_at_the_variable() {
    let (node, rest) = parse_type("?\\App\\User $user the owner").unwrap();
    assert_eq!(
        node,
        TypeNode::Nullable(Box::new(TypeNode::Identifier("\\App\\User".into())))
    );
    assert_eq!(rest.trim_start(), "$user the owner");
}

#[test]
fn shapes_and_callables_render_canonically() {
    let render = |src: &str| parse_type(src).unwrap().0.to_string();
    assert_eq!(render("array{ a:int, b?: string }"), "array{a: int, b?: string}");
    assert_eq!(render("callable(int):bool"), "callable(int): bool");
    assert_eq!(render("list<Foo>"), "list<Foo>");
}
