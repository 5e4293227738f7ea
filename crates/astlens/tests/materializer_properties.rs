//! Structural properties of materialized trees.
//!
//! These hold for every language and every input: identifier layout, view
//! containment, determinism and range/text agreement.

use std::collections::HashSet;

use proptest::prelude::*;
use rstest::rstest;

use astlens::{
    materialize, Document, Language, LanguageAdapter, Materialized, NativeNode, TextSurface,
    TreeViews, ViewMode,
};

const LUA_SOURCES: &[&str] = &[
    "local x = 1",
    "local tab = {\n  variable = \"string\",\n  method = function (self) print(self.variable) end\n}\n\ntab:method()\n",
    "for i = 1, 10 do\n  if i % 2 == 0 then print(i) elseif i > 5 then break else x = i end\nend",
    "-- comment\nwhile true do\n  repeat y = y + 1 until y > 3\nend",
    "function f(a)\n  do local b = a end\n  return a\nend",
];

const TS_SOURCES: &[&str] = &[
    "if (a) { b(); }",
    "let x = ;\nfunction f() {}",
    "class A { m(x: number): string { return `v${x}`; } }",
    "switch (k) { case 1: go(); break; default: stop(); }",
    "try { risky(); } catch (e) { log(e); } finally { done(); }",
];

fn documents() -> Vec<Document> {
    LUA_SOURCES
        .iter()
        .map(|src| Document::new(Language::Lua, *src))
        .chain(TS_SOURCES.iter().map(|src| Document::new(Language::TypeScript, *src)))
        .collect()
}

fn identities(view: &Materialized<'_>) -> Vec<Option<usize>> {
    view.iter().map(|w| w.native.identity()).collect()
}

/// Every node reachable through `extended_children`, counted independently.
fn count_extended(adapter: &dyn LanguageAdapter, node: NativeNode<'_>) -> usize {
    1 + adapter
        .extended_children(node)
        .into_iter()
        .map(|child| count_extended(adapter, child))
        .sum::<usize>()
}

#[rstest]
#[case::extended(ViewMode::Extended)]
#[case::collapsed(ViewMode::Collapsed)]
fn ids_are_dense_and_children_finish_first(#[case] mode: ViewMode) {
    for doc in documents() {
        let views = TreeViews::new(&doc);
        let view = views.view(mode);

        for (index, wrapper) in view.iter().enumerate() {
            assert_eq!(wrapper.id.index(), Some(index));
            for child in &wrapper.children {
                assert!(*child < wrapper.id);
            }
        }
        assert_eq!(view.root_id().index(), Some(view.len() - 1));
    }
}

#[test]
fn extended_view_wraps_every_native_node_once() {
    for doc in documents() {
        let views = TreeViews::new(&doc);
        let extended = views.view(ViewMode::Extended);

        assert_eq!(extended.len(), count_extended(doc.adapter(), doc.parsed().root()));
        let unique: HashSet<_> = identities(extended).into_iter().collect();
        assert_eq!(unique.len(), extended.len(), "{:?}", doc.buffer().text());
    }
}

#[test]
fn collapsed_nodes_are_a_subset_of_extended_nodes() {
    for doc in documents() {
        let views = TreeViews::new(&doc);
        let extended: HashSet<_> = identities(views.view(ViewMode::Extended)).into_iter().collect();
        let collapsed = views.view(ViewMode::Collapsed);

        assert!(collapsed.len() <= extended.len());
        for identity in identities(collapsed) {
            assert!(extended.contains(&identity));
        }
    }
}

#[test]
fn collapsed_children_keep_source_order() {
    for doc in documents() {
        let views = TreeViews::new(&doc);
        let collapsed = views.view(ViewMode::Collapsed);
        let bridge = doc.bridge();

        for wrapper in collapsed.iter() {
            let starts: Vec<_> = collapsed
                .children(wrapper)
                .map(|child| bridge.selection_for(child.native).start_pos)
                .collect();
            assert!(starts.windows(2).all(|pair| pair[0] <= pair[1]), "{starts:?}");
        }
    }
}

#[rstest]
#[case::lua(Language::Lua, LUA_SOURCES)]
#[case::typescript(Language::TypeScript, TS_SOURCES)]
fn collapsed_children_are_a_subsequence_of_extended_children(
    #[case] language: Language,
    #[case] sources: &[&str],
) {
    let adapter = language.adapter();
    for src in sources {
        let parsed = adapter.parse(src);
        let view = materialize(adapter, parsed.root(), ViewMode::Extended);

        for wrapper in view.iter() {
            let extended: Vec<_> = adapter
                .extended_children(wrapper.native)
                .iter()
                .map(NativeNode::identity)
                .collect();
            let mut rest = extended.iter();
            for child in adapter.children(wrapper.native) {
                assert!(
                    rest.any(|id| *id == child.identity()),
                    "{} breaks the order under {}",
                    child.kind(),
                    wrapper.kind
                );
            }
        }
    }
}

#[test]
fn materialization_is_idempotent() {
    for doc in documents() {
        for mode in [ViewMode::Extended, ViewMode::Collapsed] {
            let first = materialize(doc.adapter(), doc.parsed().root(), mode);
            let second = materialize(doc.adapter(), doc.parsed().root(), mode);

            assert_eq!(first.to_render_tree(), second.to_render_tree());
            assert_eq!(identities(&first), identities(&second));
        }
    }
}

#[test]
fn full_text_matches_the_resolved_range() {
    for doc in documents() {
        let views = TreeViews::new(&doc);
        let adapter = doc.adapter();
        let surface = doc.buffer();

        for wrapper in views.view(ViewMode::Extended).iter() {
            let range = adapter.source_range(wrapper.native, surface);
            assert_eq!(
                surface.value_in_range(&range),
                adapter.full_text(wrapper.native, surface),
                "{} at {range}",
                wrapper.kind
            );
        }
    }
}

proptest! {
    #[test]
    fn typescript_materialization_is_deterministic(src in "[a-z(){};=+ \\n0-9'\"]{0,80}") {
        let doc = Document::new(Language::TypeScript, src);
        for mode in [ViewMode::Extended, ViewMode::Collapsed] {
            let first = materialize(doc.adapter(), doc.parsed().root(), mode);
            let second = materialize(doc.adapter(), doc.parsed().root(), mode);
            prop_assert_eq!(first.to_render_tree(), second.to_render_tree());
        }
    }

    #[test]
    fn lua_parse_never_panics_and_has_one_root(src in "[a-z(){}=+ \\n0-9\"]{0,80}") {
        let doc = Document::new(Language::Lua, src);
        let views = TreeViews::new(&doc);
        let view = views.view(ViewMode::Extended);
        prop_assert_eq!(view.root().id, view.root_id());
        if doc.parsed().failure().is_some() {
            prop_assert_eq!(view.len(), 1);
        }
    }
}
