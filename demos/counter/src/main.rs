//! Renders a counter page, then drives the reactive core through three
//! clicks entirely server-side to show recomposition settling on each
//! write — the same mechanism a `ServerRpc` callback uses to produce a
//! fresh fragment when a click comes back over the wire.

use std::cell::Cell;
use std::rc::Rc;

use summon_core::{composer, recomposer, scope::Scope, state};
use summon_html::{ActionDescriptor, Modifier, RenderError};
use summon_macros::composable;

/// The counter's label text. Marked `#[composable]` so a panic while
/// formatting it (unreachable today, but this is the label every future
/// formatting rule funnels through) is contained the same way any other
/// composable body is, rather than unwinding straight out of the render.
#[composable]
fn count_label(count: i32) -> String {
    format!("Count: {count}")
}

fn render_count(count: i32) -> Result<String, RenderError> {
    summon_html::render_to_string(move |r| {
        r.push_head("<title>Counter</title>");
        let label = count_label(count)?;
        r.element("p", &Modifier::new(), |r| {
            r.text(&label);
            Ok(())
        })?;
        r.element(
            "button",
            &Modifier::new().on(
                "click",
                ActionDescriptor::ServerRpc {
                    endpoint: "/counter/increment".into(),
                    payload: serde_json::json!({}),
                    optimistic: None,
                },
            ),
            |r| {
                r.text("Increment");
                Ok(())
            },
        )
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let count = state(0i32);
    let scope = Scope::new();
    let html = Rc::new(Cell::new(String::new()));

    let rerun = {
        let count = count.clone();
        let html = html.clone();
        let scope = scope.clone();
        move || {
            let snapshot = composer::compose(&scope, || count.read()).expect("composable panicked");
            html.set(render_count(snapshot).expect("render"));
        }
    };
    rerun();
    recomposer::register_rerun(scope.id(), Rc::new(rerun));

    println!("--- initial render ---\n{}\n", html.take());

    for _ in 0..3 {
        count.update(|c| c + 1);
        recomposer::run_recomposition_tick(4);
        println!("--- after click ---\n{}\n", html.take());
    }

    recomposer::forget_scope(scope.id());
    Ok(())
}
