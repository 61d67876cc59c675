//! Reactive behaviour: mutations arriving after the initial pass

use std::sync::Arc;

use nsreveal_engine::reveal::dom::{
    create_element, create_element_with, create_text, text_content, DocumentHost,
};
use nsreveal_engine::reveal::ids::derive;
use nsreveal_engine::reveal::policy::ExclusionPolicy;
use nsreveal_engine::reveal::testing::{body, body_text, host_from_html};
use nsreveal_engine::reveal::watcher::WatcherState;
use nsreveal_engine::{Engine, Mode, Settings, SettingsUpdate};

fn engine_for(names: &[&str], mode: Mode) -> (Engine, Arc<Settings>) {
    let settings = Arc::new(Settings::new(names.iter().copied(), mode));
    let engine = Engine::new(Arc::clone(&settings), ExclusionPolicy::default());
    (engine, settings)
}

#[test]
fn added_subtree_rewrites_only_its_own_text() {
    let prod = derive("teams-prod");
    let host = host_from_html(&format!(
        "<p>old {prod}</p><p>unrelated text</p><p>more unrelated text</p>"
    ));
    let (mut engine, _) = engine_for(&["teams-prod"], Mode::Translate);
    engine.run(&host);
    assert_eq!(engine.watcher_state(), Some(WatcherState::Idle));

    let target = create_text(&format!("new {prod}"));
    let subtree = create_element_with(
        "section",
        vec![],
        vec![
            create_element_with("h2", vec![], vec![create_text("heading")]),
            create_element_with("div", vec![], vec![target.clone()]),
        ],
    );
    host.append_child(&body(&host), subtree);

    let report = engine.flush(&host);
    // Round one scans the two leaves of the new section, round two the fragments "new ".
    assert_eq!(report.walk.rewritten, 1);
    assert_eq!(report.walk.scanned, 3);
    assert_eq!(report.rounds, 2);
    assert_eq!(
        body_text(&host),
        "old teams-produnrelated textmore unrelated textheadingnew teams-prod"
    );
}

#[test]
fn text_change_is_rescanned() {
    let host = host_from_html("<p>waiting</p>");
    let (mut engine, _) = engine_for(&["billing"], Mode::Annotate);
    engine.run(&host);

    let paragraph = body(&host).children.borrow()[0].clone();
    let leaf = paragraph.children.borrow()[0].clone();
    host.set_text(&leaf, &format!("now {}", derive("billing")));

    let report = engine.flush(&host);
    assert_eq!(report.walk.rewritten, 1);
    assert_eq!(
        text_content(&paragraph),
        format!("now {}  (namespace: billing)", derive("billing"))
    );
}

#[test]
fn mode_switch_applies_to_new_content_only() {
    let ops = derive("ops");
    let host = host_from_html(&format!("<p>{ops}</p>"));
    let (mut engine, settings) = engine_for(&["ops"], Mode::Translate);
    engine.run(&host);

    settings.apply(SettingsUpdate {
        mode: Some(Mode::Annotate),
        ..Default::default()
    });
    host.append_child(&body(&host), create_text(&format!(" {ops}")));
    engine.flush(&host);

    assert_eq!(body_text(&host), format!("ops {ops}  (namespace: ops)"));
}

#[test]
fn names_update_resolves_later_insertions() {
    let later = derive("later");
    let host = host_from_html(&format!("<p>{later}</p>"));
    let (mut engine, settings) = engine_for(&[], Mode::Translate);
    engine.run(&host);
    assert_eq!(body_text(&host), later);

    settings.set_namespaces(["Later"]);
    let leaf = create_text(&later);
    host.append_child(&body(&host), leaf);
    engine.flush(&host);

    assert_eq!(body_text(&host), format!("{later}Later"));
}

#[test]
fn unresolved_insertions_settle_without_churn() {
    let host = host_from_html("<div></div>");
    let (mut engine, _) = engine_for(&["known"], Mode::Translate);
    engine.run(&host);

    let unknown = derive("unknown");
    host.append_child(&body(&host), create_text(&unknown));
    let report = engine.flush(&host);

    assert_eq!(report.rounds, 1);
    assert_eq!(report.walk.rewritten, 0);
    assert!(!host.has_pending());
}

#[test]
fn mixed_resolved_and_unresolved_settle() {
    let known = derive("known");
    let unknown = derive("unknown");
    let root = create_element("div", vec![]);
    let host = DocumentHost::new(root.clone());
    let (mut engine, _) = engine_for(&["known"], Mode::Translate);
    engine.start(&host);

    host.append_child(&root, create_text(&format!("{unknown} {known} {unknown}")));
    let report = engine.flush(&host);

    assert!(!report.truncated);
    assert_eq!(report.walk.rewritten, 1);
    assert_eq!(text_content(&root), format!("{unknown} known {unknown}"));
}

#[test]
fn additions_inside_engine_output_are_ignored() {
    let ops = derive("ops");
    let host = host_from_html(&format!("<p>{ops}</p>"));
    let (mut engine, _) = engine_for(&["ops"], Mode::Translate);
    engine.run(&host);

    let paragraph = body(&host).children.borrow()[0].clone();
    let span = paragraph.children.borrow()[0].clone();
    host.append_child(&span, create_text(&ops));
    let report = engine.flush(&host);

    assert_eq!(report.skipped, 1);
    assert_eq!(report.walk.rewritten, 0);
}
