//! Arbor Demo - headless todo page
//!
//! Loads a two-level page, drives it with synthetic events and prints the
//! resulting markup.

use anyhow::{Context, Result};
use arbor_vdom::events::Event;
use arbor_vdom::style::StyleMap;
use arbor_vdom::{App, Attrs, Component, Config, Params, Setter, VNode};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq)]
struct Todo {
    title: String,
    done: bool,
}

fn layout() -> Component {
    Component::new(|app, props| {
        let name = props.get_text("list").unwrap_or_else(|| "todo".to_string());
        let heading = app.build("h1", Attrs::new(), vec![name.into()]);
        let header = app.build(
            "header",
            Attrs::new().style(StyleMap::new().with("paddingBottom", 8).with("zIndex", 1)),
            vec![heading],
        );
        let mut children = vec![header];
        children.extend(props.children.iter().cloned());
        app.build("div", Attrs::new().class("layout"), children)
    })
}

fn item(app: &mut App, index: usize, todos: &[Todo], set_todos: Setter<Vec<Todo>>) -> VNode {
    let todo = &todos[index];
    let toggled = todos.to_vec();
    let remaining = todos.to_vec();

    let toggle = app.build(
        "button",
        Attrs::new().with("id", format!("toggle-{index}")).on("click", move |app, _| {
            let mut next = toggled.clone();
            next[index].done = !next[index].done;
            set_todos.set(app, next);
        }),
        vec!["toggle".into()],
    );
    let remove = app.build(
        "button",
        Attrs::new().with("id", format!("remove-{index}")).on("click", move |app, _| {
            let mut next = remaining.clone();
            next.remove(index);
            set_todos.set(app, next);
        }),
        vec!["remove".into()],
    );
    let mut classes = vec!["todo".to_string()];
    if todo.done {
        classes.push("done".to_string());
    }
    app.build("li", Attrs::new().class(classes), vec![todo.title.clone().into(), toggle, remove])
}

fn todo_page() -> Component {
    Component::new(|app, props| {
        let list = props.get_text("list").unwrap_or_default();
        let (todos, set_todos) = app.use_state(Vec::<Todo>::new());

        let open = todos.iter().filter(|t| !t.done).count();
        app.use_effect_with(
            move |app| {
                app.set_title(&format!("{open} open"));
                None
            },
            &open,
        );

        let items = (0..todos.len()).map(|i| item(app, i, &todos, set_todos)).collect();
        let add = app.build("button", Attrs::new().with("id", "add"), vec!["add".into()]);
        let current = todos.clone();
        let form = app.build(
            "form",
            Attrs::new().on("submit", move |app, _| {
                let mut next = current.clone();
                next.push(Todo {
                    title: format!("{list} #{}", next.len() + 1),
                    done: false,
                });
                set_todos.set(app, next);
            }),
            vec![add],
        );
        let list = app.build("ul", Attrs::new(), items);
        app.build("main", Attrs::new(), vec![form, list])
    })
}

fn click(app: &mut App, id: &str) -> Result<()> {
    let node = app.document().get_element_by_id(id).with_context(|| format!("no element #{id}"))?;
    app.dispatch_event(Event::click(node));
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Arbor v{}", arbor_vdom::VERSION);

    let mut app = App::new(Config::default());
    app.safe_load(|app| tracing::info!(title = app.document().title(), "document ready"));

    let mut params = Params::new();
    params.insert("list".to_string(), "groceries".to_string());
    app.load_page(vec![layout(), todo_page()], &params);
    app.on_page_loaded();

    for _ in 0..3 {
        let add = app.document().get_element_by_id("add").context("no add button")?;
        let submitted = app.dispatch_event(Event::submit(add));
        tracing::debug!(prevented = submitted.is_default_prevented(), "submitted");
    }
    click(&mut app, "toggle-0")?;
    click(&mut app, "remove-1")?;

    println!("{}", app.document().title());
    println!("{}", app.html());

    let stats = app.stats();
    tracing::info!(
        renders = stats.renders,
        patches = stats.patches,
        rebuilds = stats.rebuilds,
        effects = stats.effects_run,
        "done"
    );
    Ok(())
}
