//! End-to-end scenarios for the tree engine.
//!
//! Each test follows one user-visible flow: parse, materialize, select, and
//! inspect.

use astlens::{
    Document, Inspected, Language, NodeId, Projector, PropertyValue, TextPosition, TreeViews,
    ViewMode, ERROR_KIND,
};

mod common;
use common::{child_kinds, find_kind};

// ============================================================================
// Lua declaration, both views
// ============================================================================

#[test]
fn lua_declaration_materializes_in_both_views() {
    let doc = Document::new(Language::Lua, "local x = 1");
    let views = TreeViews::new(&doc);

    let extended = views.view(ViewMode::Extended);
    let collapsed = views.view(ViewMode::Collapsed);

    // The root is finished last, so it carries the largest id.
    assert_eq!(extended.root_id(), NodeId(u32::try_from(extended.len()).expect("small tree")));
    let root = collapsed.root();
    assert_eq!(root.children.len(), 1);

    let statement = collapsed.get(root.children[0]).expect("statement wrapper");
    assert!(statement.kind.contains("variable"), "got {}", statement.kind);
    assert!(statement.children.is_empty());

    let bridge = doc.bridge();
    assert!(bridge.text_for(statement.native).starts_with("local"));
    assert_eq!(bridge.text_for(root.native), "local x = 1");
}

// ============================================================================
// Lua syntax error
// ============================================================================

#[test]
fn lua_syntax_error_becomes_a_single_error_node() {
    let doc = Document::new(Language::Lua, "x = ");
    let views = TreeViews::new(&doc);

    for mode in [ViewMode::Extended, ViewMode::Collapsed] {
        let view = views.view(mode);
        assert_eq!(view.len(), 1, "{mode} view");
        let root = view.root();
        assert_eq!(root.kind, ERROR_KIND);
        assert!(root.children.is_empty());
    }

    let failure = doc.parsed().failure().expect("strict adapter rejects input");
    assert!(failure.message.contains("<eof>"), "message: {}", failure.message);
    assert_eq!(failure.range.start_pos.line, 1);
    assert!((3..=5).contains(&failure.range.start_pos.column));
    assert_eq!(failure.range.start_pos.column, 4);
}

#[test]
fn error_node_properties_are_kind_message_and_range() {
    let doc = Document::new(Language::Lua, "x = ");
    let root = doc.parsed().root();

    let entries = Projector::default().project(&Inspected::new(doc.adapter(), root));
    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();

    assert_eq!(keys, vec!["type", "message", "range"]);
    assert_eq!(entries[0].kind, Some(format!("'{ERROR_KIND}'")));
}

// ============================================================================
// TypeScript if statement
// ============================================================================

#[test]
fn typescript_condition_is_extended_only() {
    let doc = Document::new(Language::TypeScript, "if (a) { b(); }");
    let views = TreeViews::new(&doc);

    let extended = views.view(ViewMode::Extended);
    let collapsed = views.view(ViewMode::Collapsed);

    let if_extended = find_kind(extended, "if_statement").expect("if in extended view");
    let if_collapsed = find_kind(collapsed, "if_statement").expect("if in collapsed view");

    assert!(child_kinds(extended, if_extended).contains(&"parenthesized_expression"));
    assert_eq!(child_kinds(collapsed, if_collapsed), vec!["statement_block"]);
    assert!(find_kind(collapsed, "parenthesized_expression").is_none());
}

#[test]
fn selections_agree_across_views() {
    let doc = Document::new(Language::TypeScript, "if (a) { b(); }");
    let views = TreeViews::new(&doc);
    let extended = views.view(ViewMode::Extended);
    let collapsed = views.view(ViewMode::Collapsed);

    let block_ext = find_kind(extended, "statement_block").expect("block");
    let block_col = find_kind(collapsed, "statement_block").expect("block");

    assert_eq!(block_ext.native.identity(), block_col.native.identity());
    assert_eq!(
        views.hover(ViewMode::Extended, block_ext.id).expect("id"),
        views.hover(ViewMode::Collapsed, block_col.id).expect("id"),
    );
    assert_eq!(
        views.hover(ViewMode::Collapsed, block_col.id).expect("id").start_pos,
        TextPosition::new(1, 7)
    );
}

// ============================================================================
// Property projection
// ============================================================================

#[test]
fn projection_skips_parent_and_labels_kinds() {
    let doc = Document::new(Language::TypeScript, "let n = 42;");
    let views = TreeViews::new(&doc);
    let declarator = find_kind(views.view(ViewMode::Extended), "variable_declarator")
        .expect("declarator");

    let root = Projector::default().project_root(&Inspected::new(doc.adapter(), declarator.native));

    assert_eq!(root.key, "variable_declarator");
    assert!(root.children.iter().all(|e| e.key != "parent"));
    let kind = root.children.iter().find(|e| e.key == "kind").expect("kind entry");
    assert_eq!(kind.kind.as_deref(), Some("'variable_declarator'"));
    assert_eq!(kind.value.as_deref(), Some("'variable_declarator'"));
    let value = root.children.iter().find(|e| e.key == "value").expect("value field");
    assert!(value.children.iter().any(|e| e.key == "text" && e.value.as_deref() == Some("'42'")));
    // `isMissing` and `hasError` are false and therefore omitted.
    assert!(root.children.iter().all(|e| e.key != "isMissing" && e.key != "hasError"));
}

#[test]
fn projection_of_a_cyclic_structure_terminates() {
    let doc = Document::new(Language::Lua, "local t = { a = 1 }");
    let views = TreeViews::new(&doc);
    let field = find_kind(views.view(ViewMode::Extended), "field").expect("field");

    // `parent` points back up the tree; skipping it keeps the projection finite.
    let props = doc.adapter().properties(field.native);
    assert!(props.iter().any(|(k, v)| k == "parent" && matches!(v, PropertyValue::Node(_))));

    let entries = Projector::default().project(&Inspected::new(doc.adapter(), field.native));
    assert!(!entries.is_empty());
    assert!(entries.iter().all(|e| e.key != "parent"));
}
