//! Page layer tests for arbor-vdom
//!
//! Route composition, refresh, the safe-load queue, refs and event
//! delivery through the app.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use arbor_vdom::dom::{MutationKind, ReadyState, SVG_NAMESPACE};
use arbor_vdom::events::Event;
use arbor_vdom::{
    App, AttrValue, Attrs, Component, Config, Params, Props, RefMap, RefTarget, create_node, diff,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn app() -> App {
    init_tracing();
    App::new(Config::default().with_mutation_journal(true))
}

fn layout() -> Component {
    Component::new(|app, props| {
        let header = app.build("header", Attrs::new(), vec!["App".into()]);
        let mut children = vec![header];
        children.extend(props.children.iter().cloned());
        app.build("div", Attrs::new().class("layout"), children)
    })
}

fn detail() -> Component {
    Component::new(|app, props| {
        app.set_title("Detail");
        let id = props.get_text("id").unwrap_or_default();
        app.build("main", Attrs::new(), vec![id.into()])
    })
}

fn params(id: &str) -> Params {
    let mut params = Params::new();
    params.insert("id".to_string(), id.to_string());
    params
}

// ============================================================================
// PAGES
// ============================================================================

#[test]
fn test_route_components_nest_outermost_first() {
    let mut app = app();
    app.load_page(vec![layout(), detail()], &params("7"));

    assert_eq!(
        app.html(),
        "<div class=\"layout\"><header>App</header><main>7</main></div>"
    );
    assert_eq!(app.document().title(), "Detail");
}

#[test]
fn test_navigation_patches_mounted_tree() {
    let mut app = app();
    app.load_page(vec![layout(), detail()], &params("1"));
    let root = app.app_node();
    app.dom_mut().take_mutations();

    app.load_page(vec![layout(), detail()], &params("2"));
    let records = app.dom_mut().take_mutations();

    assert_eq!(app.app_node(), root);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, MutationKind::TextChanged);
    assert!(app.html().contains("<main>2</main>"));
}

#[test]
fn test_refresh_reuses_last_arguments() {
    let mut app = app();
    let builds = Rc::new(Cell::new(0));
    let page = {
        let builds = Rc::clone(&builds);
        Component::new(move |app, props| {
            builds.set(builds.get() + 1);
            let id = props.get_text("id").unwrap_or_default();
            app.build("p", Attrs::new(), vec![id.into()])
        })
    };
    app.load_page(vec![page], &params("9"));
    app.refresh();

    assert_eq!(builds.get(), 2);
    assert_eq!(app.stats().page_loads, 2);
    assert_eq!(app.html(), "<p>9</p>");
}

#[test]
fn test_title_placeholder() {
    let mut app = app();
    app.set_title("Previous");
    let page = Component::new(|app, _| app.build("p", Attrs::new(), vec![]));
    app.load_page(vec![page], &Params::new());
    assert_eq!(app.document().title(), "Loading");
}

#[test]
fn test_fragment_component_wraps_children() {
    let mut app = app();
    let page = Component::new(|app, _| {
        let a = app.build("i", Attrs::new(), vec!["a".into()]);
        let b = app.build("b", Attrs::new(), vec!["b".into()]);
        let fragment = app.build(&Component::fragment(), Attrs::new(), vec![a, b]);
        app.build("div", Attrs::new(), vec![fragment])
    });
    app.load_page(vec![page], &Params::new());
    assert_eq!(app.html(), "<div><i>a</i><b>b</b></div>");
}

#[test]
fn test_svg_elements_namespaced() {
    let mut app = app();
    let page = Component::new(|app, _| {
        let path = app.build("path", Attrs::new().with("d", "M0 0"), vec![]);
        app.build("svg", Attrs::new().with("width", 24), vec![path])
    });
    app.load_page(vec![page], &Params::new());

    let svg = app.app_node().unwrap();
    let path = app.dom().child_nodes(svg)[0];
    assert_eq!(app.dom().namespace(svg), Some(SVG_NAMESPACE));
    assert_eq!(app.dom().namespace(path), Some(SVG_NAMESPACE));
    assert_eq!(app.dom().get_attribute(svg, "width"), Some("24"));
}

// ============================================================================
// SAFE LOAD
// ============================================================================

#[test]
fn test_safe_load_waits_for_document() {
    let mut app = app();
    let order = Rc::new(RefCell::new(Vec::new()));

    for i in 0..3 {
        let order = Rc::clone(&order);
        app.safe_load(move |_| order.borrow_mut().push(i));
    }
    assert!(order.borrow().is_empty());
    assert_eq!(app.document().ready_state(), ReadyState::Loading);

    app.on_page_loaded();
    assert_eq!(*order.borrow(), vec![0, 1, 2]);

    let order_after = Rc::clone(&order);
    app.safe_load(move |_| order_after.borrow_mut().push(3));
    assert_eq!(*order.borrow(), vec![0, 1, 2, 3]);
}

// ============================================================================
// REFS
// ============================================================================

#[test]
fn test_refs_follow_the_element() {
    let mut app = app();
    let input_ref = app.use_ref();
    let slots: RefMap = Rc::new(RefCell::new(HashMap::new()));
    let show = Rc::new(Cell::new(true));

    let page = {
        let input_ref = Rc::clone(&input_ref);
        let slots = Rc::clone(&slots);
        let show = Rc::clone(&show);
        Component::new(move |app, _| {
            let mut children = Vec::new();
            if show.get() {
                let keyed = RefTarget::Keyed(Rc::clone(&slots), "label".to_string());
                children.push(app.build("input", Attrs::new().node_ref(&input_ref), vec![]));
                let label = Attrs::new().with("ref", AttrValue::Ref(keyed));
                children.push(app.build("label", label, vec![]));
            }
            app.build("form", Attrs::new(), children)
        })
    };
    app.load_page(vec![page], &Params::new());

    let form = app.app_node().unwrap();
    let children = app.dom().child_nodes(form);
    assert_eq!(input_ref.get(), Some(children[0]));
    assert_eq!(slots.borrow().get("label"), Some(&Some(children[1])));

    show.set(false);
    app.refresh();
    assert_eq!(input_ref.get(), None);
    assert_eq!(slots.borrow().get("label"), Some(&None));
}

// ============================================================================
// EVENTS
// ============================================================================

#[test]
fn test_submit_default_prevented() {
    let mut app = app();
    let seen = Rc::new(Cell::new(false));
    let page = {
        let seen = Rc::clone(&seen);
        Component::new(move |app, _| {
            let seen = Rc::clone(&seen);
            let button = app.build("button", Attrs::new(), vec!["go".into()]);
            app.build(
                "form",
                Attrs::new().on("submit", move |_, event| seen.set(event.is_default_prevented())),
                vec![button],
            )
        })
    };
    app.load_page(vec![page], &Params::new());

    let form = app.app_node().unwrap();
    let button = app.dom().child_nodes(form)[0];
    let event = app.dispatch_event(Event::submit(button));

    assert!(seen.get());
    assert!(event.is_default_prevented());
}

#[test]
fn test_delegated_to_descendants_only() {
    let mut app = app();
    let clicks = Rc::new(Cell::new(0));
    let page = {
        let clicks = Rc::clone(&clicks);
        Component::new(move |app, _| {
            let clicks = Rc::clone(&clicks);
            let inner = app.build("span", Attrs::new(), vec!["in".into()]);
            let target = app.build(
                "div",
                Attrs::new().on("click", move |_, _| clicks.set(clicks.get() + 1)),
                vec![inner],
            );
            let outside = app.build("p", Attrs::new(), vec!["out".into()]);
            app.build("section", Attrs::new(), vec![target, outside])
        })
    };
    app.load_page(vec![page], &Params::new());

    let section = app.app_node().unwrap();
    let children = app.dom().child_nodes(section);
    let span = app.dom().child_nodes(children[0])[0];

    app.dispatch_event(Event::click(span));
    app.dispatch_event(Event::click(children[1]));
    assert_eq!(clicks.get(), 1);
}

#[test]
fn test_listeners_removed_with_page_content() {
    let mut app = app();
    let show = Rc::new(Cell::new(true));
    let page = {
        let show = Rc::clone(&show);
        Component::new(move |app, _| {
            let children = if show.get() {
                vec![app.build("button", Attrs::new().on("click", |_, _| {}), vec![])]
            } else {
                Vec::new()
            };
            app.build("div", Attrs::new(), children)
        })
    };
    app.load_page(vec![page], &Params::new());
    assert!(app.events().is_listening("click"));

    show.set(false);
    app.refresh();
    assert!(!app.events().is_listening("click"));
    assert!(app.events().is_empty());
}

// ============================================================================
// RECOVERY
// ============================================================================

#[test]
fn test_render_subtree_remounts_unlinked_node() {
    let mut app = app();
    let mount = app.mount_point();
    let stray = app.dom_mut().create_element("p");
    app.dom_mut().append_child(mount, stray).unwrap();

    let page = Component::new(|app, _| app.build("section", Attrs::new(), vec!["fresh".into()]));
    app.render_subtree(stray, &page, Props::default());

    assert!(!app.dom().exists(stray));
    assert_eq!(app.dom().child_nodes(mount).len(), 1);
    assert_eq!(app.html(), "<section>fresh</section>");
}

#[test]
fn test_unlinked_patch_leaves_node_untouched() {
    let mut app = app();
    let mount = app.mount_point();
    let stray = app.dom_mut().create_element("div");
    app.dom_mut().set_attribute(stray, "id", "plain").unwrap();
    app.dom_mut().append_child(mount, stray).unwrap();

    let old = create_node("div", Attrs::new().with("id", "plain"), vec![]);
    let new = create_node(
        "div",
        Attrs::new().with("id", "other").on("click", |_, _| {}),
        vec!["x".into()],
    );
    let patch = diff(&old, Some(&new));

    assert_eq!(app.apply_patch(&patch, stray), Some(stray));
    assert_eq!(app.dom().get_attribute(stray, "id"), Some("plain"));
    assert!(app.dom().child_nodes(stray).is_empty());
    assert!(!app.events().is_listening("click"));
    assert!(app.vnode_of(stray).is_none());
}

#[test]
fn test_fragment_patch_does_not_claim_moved_text() {
    let mut app = app();
    let with_handler = Rc::new(Cell::new(false));
    let page = {
        let with_handler = Rc::clone(&with_handler);
        Component::new(move |app, _| {
            let attrs = if with_handler.get() {
                Attrs::new().on("click", |_, _| {})
            } else {
                Attrs::new()
            };
            let tag = app.config().fragment_tag.clone();
            let fragment = create_node(&tag, attrs, vec!["x".into()]);
            app.build("div", Attrs::new(), vec![fragment, "t".into()])
        })
    };
    app.load_page(vec![page], &Params::new());
    let div = app.app_node().unwrap();
    let text = app.dom().child_nodes(div)[0];

    with_handler.set(true);
    app.refresh();

    assert_eq!(app.html(), "<div>xt</div>");
    assert!(app.vnode_of(text).is_none());
    assert!(!app.events().is_listening("click"));
}
