//! End-to-end resolution behavior
//!
//! Drives config text through parse -> expand -> resolve -> assemble and
//! checks the observable tree, covering override and reference semantics,
//! every expansion class, and diagnostic placement.

use conf_engine::{ResolvedTree, compile};
use conf_model::Node;
use conf_test_utils::parse_source;
use pretty_assertions::assert_eq;

fn compile_text(source: &str) -> ResolvedTree {
    compile(vec![parse_source(source, 0, "input.conf")])
}

fn leaf_text(tree: &ResolvedTree, path: &str) -> Option<String> {
    let name = conf_model::QualifiedName::from_dotted(path);
    tree.find(&name).iter().find_map(|node| match node {
        Node::Leaf { text, .. } => Some(text.clone()),
        _ => None,
    })
}

fn collect_errors(nodes: &[Node], out: &mut Vec<(String, String)>) {
    for node in nodes {
        match node {
            Node::Error {
                segment, message, ..
            } => out.push((segment.clone(), message.clone())),
            Node::Branch { children, .. } => collect_errors(children, out),
            Node::Leaf { .. } => {}
        }
    }
}

fn errors(tree: &ResolvedTree) -> Vec<(String, String)> {
    let mut out = Vec::new();
    collect_errors(&tree.roots, &mut out);
    out
}

#[test]
fn test_concrete_input_resolves_as_written() {
    let tree = compile_text("a=1\nb.c=2\nb.d=3\n");
    assert_eq!(leaf_text(&tree, "a").as_deref(), Some("1"));
    assert_eq!(leaf_text(&tree, "b.c").as_deref(), Some("2"));
    assert_eq!(leaf_text(&tree, "b.d").as_deref(), Some("3"));
    assert!(errors(&tree).is_empty());
}

#[test]
fn test_identical_input_yields_identical_trees() {
    let source = "a.*=${b.*}\nb.x=1\nb.y=2\nbad=${gone}\n";
    let first = compile_text(source);
    let second = compile_text(source);
    assert_eq!(first, second);
    assert_eq!(errors(&first), errors(&second));
}

#[test]
fn test_later_line_overrides_earlier() {
    let tree = compile_text("a=1\na=2\n");
    assert_eq!(leaf_text(&tree, "a").as_deref(), Some("2"));
    assert_eq!(tree.roots.len(), 1);
}

#[test]
fn test_reference_chain_inlines_fully() {
    let tree = compile_text("a.x=2+${a.y}+${a.z}\na.y=${a.z}/5\na.z=${a.w}\na.w=x\n");
    assert_eq!(leaf_text(&tree, "a.x").as_deref(), Some("2+x/5+x"));
}

#[test]
fn test_cycle_becomes_error_nodes_naming_the_chain() {
    let tree = compile_text("x=${y}\ny=${x}\n");
    let errors = errors(&tree);
    assert_eq!(errors.len(), 2);
    for (_, message) in &errors {
        assert!(message.starts_with("cyclic reference:"), "{message}");
        assert!(message.contains("x (input.conf:1)"), "{message}");
        assert!(message.contains("y (input.conf:2)"), "{message}");
    }
}

#[test]
fn test_missing_reference_is_an_error_node() {
    let tree = compile_text("x=${y}\n");
    assert_eq!(
        errors(&tree),
        vec![("x".to_string(), "reference y not found".to_string())]
    );
}

#[test]
fn test_wildcard_pattern_overrides_matching_key() {
    let tree = compile_text("a.x=1\na.*=2\n");
    assert_eq!(leaf_text(&tree, "a.x").as_deref(), Some("2"));
}

#[test]
fn test_lone_star_value_is_a_literal() {
    let tree = compile_text("x.a=*\n");
    assert_eq!(leaf_text(&tree, "x.a").as_deref(), Some("*"));
}

#[test]
fn test_unmatched_pattern_is_pruned() {
    let tree = compile_text("x.*.a=1\ny.y=2\n");
    assert_eq!(tree.roots.len(), 1);
    assert_eq!(leaf_text(&tree, "y.y").as_deref(), Some("2"));
    assert!(errors(&tree).is_empty());
}

#[test]
fn test_collapsed_wildcards_bind_consistently() {
    let tree = compile_text("a.x-x=1\na.*-*=2\n");
    assert_eq!(leaf_text(&tree, "a.x-x").as_deref(), Some("2"));
}

#[test]
fn test_inconsistent_collapsed_captures_error_out() {
    let tree = compile_text("a.x-y=1\na.*-*=2\n");
    assert_eq!(leaf_text(&tree, "a.x-y").as_deref(), Some("1"));
    let errors = errors(&tree);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1.starts_with("unsupported substitute"));
}

#[test]
fn test_root_order_follows_line_numbers() {
    let tree = compile_text("b=2\n\n\n\na=1\n");
    let segments: Vec<&str> = tree.roots.iter().map(Node::segment).collect();
    assert_eq!(segments, vec!["b", "a"]);
}

#[test]
fn test_generated_entries_resolve_through_references() {
    let tree = compile_text(
        "service.db.addr=10.0.0.1\nservice.web.addr=10.0.0.2\nalias.*=${service.*.addr}\n",
    );
    assert_eq!(leaf_text(&tree, "alias.db").as_deref(), Some("10.0.0.1"));
    assert_eq!(leaf_text(&tree, "alias.web").as_deref(), Some("10.0.0.2"));
}

#[test]
fn test_one_bad_entry_spares_the_rest() {
    let tree = compile_text("good.a=1\nbad.b=${nope}\ngood.c=${good.a}\n");
    assert_eq!(leaf_text(&tree, "good.a").as_deref(), Some("1"));
    assert_eq!(leaf_text(&tree, "good.c").as_deref(), Some("1"));
    assert_eq!(errors(&tree).len(), 1);
}
