//! Tests for the tree shaping pass and the formatting helpers.

use bumpalo::Bump;
use parser::{format_errors, format_steps, format_tree, shape, Grammar, Rule, TreeNode};

fn arithmetic() -> Grammar {
    Grammar::builder()
        .rule("expr", Rule::reference("sum"))
        .rule(
            "sum",
            Rule::alts([
                vec![
                    Rule::reference("number"),
                    Rule::reference("op"),
                    Rule::reference("sum"),
                ],
                vec![Rule::reference("number")],
            ]),
        )
        .rule("op", Rule::pattern(r"\+|-"))
        .rule("number", Rule::pattern(r"\d+"))
        .build()
        .expect("grammar builds")
}

fn leaf_texts<'a>(node: &'a TreeNode<'a>, out: &mut Vec<&'a str>) {
    if node.is_leaf() {
        out.push(node.text);
    } else {
        for child in node.children {
            leaf_texts(child, out);
        }
    }
}

#[test]
fn test_shape_arithmetic() {
    let grammar = arithmetic();
    let state = grammar.parse("expr", "40+2-7").unwrap();
    assert!(state.errors().is_empty());

    let arena = Bump::new();
    let tree = shape(&arena, &state).expect("successful parse shapes");
    assert_eq!(tree.name, "expr");
    assert_eq!((tree.start, tree.end), (0, 6));
    assert_eq!(tree.text, "40+2-7");

    // expr wraps a single sum; the sum's children are named subtrees.
    assert_eq!(tree.children.len(), 1);
    let sum = tree.children[0];
    assert_eq!(sum.name, "sum");
    let names: Vec<&str> = sum.children.iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["number", "op", "sum"]);

    let mut leaves = Vec::new();
    leaf_texts(tree, &mut leaves);
    assert_eq!(leaves, vec!["40", "+", "2", "-", "7"]);
}

#[test]
fn test_shape_requires_a_finished_root() {
    let grammar = arithmetic();
    let state = grammar.parse("expr", "40+").unwrap();
    assert!(!state.errors().is_empty());

    let arena = Bump::new();
    assert!(shape(&arena, &state).is_none());
}

#[test]
fn test_format_steps_mentions_rules_and_values() {
    let grammar = Grammar::builder()
        .rule(
            "greet",
            Rule::alts([vec![Rule::literal("hello")], vec![Rule::literal("hi")]]),
        )
        .build()
        .unwrap();
    let state = grammar.parse("greet", "hi").unwrap();
    let rendered = format_steps(&grammar, state.steps());
    assert!(rendered.contains("greet"), "missing rule name:\n{}", rendered);
    assert!(rendered.contains("= \"hi\""), "missing value:\n{}", rendered);
}

#[test]
fn test_format_errors_with_source_context() {
    let grammar = Grammar::builder()
        .rule(
            "greet",
            Rule::alts([vec![Rule::literal("hello")], vec![Rule::literal("hi")]]),
        )
        .build()
        .unwrap();
    let mut state = grammar.parse("greet", "he").unwrap();
    assert_eq!(
        format_errors(&mut state),
        "1:1: Expected string 'hello'\n1:1: Expected string 'hi'\n  he\n  ^\n"
    );
}

#[test]
fn test_format_errors_empty_on_success() {
    let grammar = arithmetic();
    let mut state = grammar.parse("expr", "40").unwrap();
    assert_eq!(format_errors(&mut state), "");
}

#[test]
fn test_format_tree_renders_nesting() {
    let grammar = arithmetic();
    let state = grammar.parse("expr", "40+2").unwrap();
    let arena = Bump::new();
    let tree = shape(&arena, &state).unwrap();
    let rendered = format_tree(tree, 0);
    assert!(rendered.starts_with("expr @0-4\n"), "got:\n{}", rendered);
    assert!(rendered.contains("_match \"40\" @0-2"), "got:\n{}", rendered);
}
