//! Full pipeline tests: sources -> engine -> scheme -> formatters

use conf_engine::{
    compile, compile_entries, compile_scheme, filter_entries, fold_comments, merge_sources,
};
use conf_model::{Entry, Node, QualifiedName};
use conf_render::render_outputs;
use conf_test_utils::{parse_overrides, parse_source};
use pretty_assertions::assert_eq;

const PROFILE: &str = "\
# primary web server
server.web.host=localhost
server.web.port=80
server.db.host=db.internal
server.db.port=5432
server.*.url=${server.*.host}:${server.*.port}
";

const SCHEME: &str = "\
site.output=server.*
site.format=json
site.prefix=server
dump.format=flat
dump.prefix=server.web
";

#[test]
fn test_profile_and_scheme_produce_outputs() {
    let tree = compile(vec![parse_source(PROFILE, 0, "profile.conf")]);
    assert_eq!(
        tree.find(&QualifiedName::from_dotted("server.web.url"))
            .first()
            .and_then(|node| match node {
                Node::Leaf { text, .. } => Some(text.as_str()),
                _ => None,
            }),
        Some("localhost:80")
    );

    let scheme = compile_scheme(fold_comments(parse_source(SCHEME, 1, "scheme.conf")), &[]);
    let outputs = render_outputs(&tree, &scheme);
    assert_eq!(outputs.len(), 2);

    let json: serde_json::Value =
        serde_json::from_str(outputs[0].result.as_deref().unwrap()).unwrap();
    assert_eq!(json["server"]["db"]["url"], "db.internal:5432");

    assert_eq!(
        outputs[1].result.as_deref().unwrap(),
        "web.host=localhost\nweb.port=80\nweb.url=localhost:80\n"
    );
}

#[test]
fn test_command_line_overrides_win() {
    let merged = merge_sources(vec![
        parse_source("a=1\nb=2\n", 0, "base.conf"),
        parse_source("a=3\n", 1, "site.conf"),
        parse_overrides("b=9\n"),
    ]);
    let tree = compile_entries(merged);
    let texts: Vec<&str> = tree
        .roots
        .iter()
        .filter_map(|node| match node {
            Node::Leaf { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["3", "9"]);
}

#[test]
fn test_comments_attach_to_the_following_leaf() {
    let tree = compile(vec![parse_source(PROFILE, 0, "profile.conf")]);
    let host = tree.find(&QualifiedName::from_dotted("server.web.host"));
    let Some(Node::Leaf { comments, .. }) = host.first() else {
        panic!("server.web.host missing");
    };
    assert_eq!(comments, &vec!["primary web server".to_string()]);
}

#[test]
fn test_filter_keeps_outputs_and_their_references() {
    let profile = "\
server.web.host=localhost
server.web.url=${net.proto}://${server.web.host}
net.proto=https
unrelated.x=1
";
    let entries = fold_comments(parse_source(profile, 0, "profile.conf"));
    let outputs = [QualifiedName::from_dotted("server.*")];
    let filtered = filter_entries(entries.clone(), &outputs);

    let names: Vec<String> = filtered
        .iter()
        .filter_map(Entry::as_definition)
        .map(|def| def.name.to_string())
        .collect();
    assert_eq!(names, vec!["server.web.host", "server.web.url", "net.proto"]);

    // filtering never changes what the kept subtree resolves to
    let full = compile_entries(entries);
    let reduced = compile_entries(filtered);
    let prefix = QualifiedName::from_dotted("server");
    assert_eq!(full.find(&prefix), reduced.find(&prefix));
}

#[test]
fn test_scheme_error_node_fails_only_its_output() {
    let scheme_text = "\
site.format=json
site.prefix=server
site.bogus=1
dump.format=flat
dump.prefix=server
";
    let tree = compile(vec![parse_source("server.x=1\n", 0, "profile.conf")]);
    let scheme = compile_scheme(fold_comments(parse_source(scheme_text, 1, "scheme.conf")), &[]);
    let outputs = render_outputs(&tree, &scheme);
    assert_eq!(outputs.len(), 2);
    let error = outputs[0].result.as_ref().unwrap_err();
    assert!(
        error
            .to_string()
            .contains("unrecognized scheme entry kind `bogus`")
    );
    assert_eq!(outputs[1].result.as_deref().unwrap(), "server.x=1\n");
}
