//! # Late subscribers and the last-value cache
//!
//! A property keeps its most recently published value; whoever subscribes
//! afterwards is brought up to date immediately with exactly one delivery,
//! routed through the queue like any other. The cache tracks presence, not
//! truthiness: a published `false` is still a value.
//!
//! ## Run
//! ```bash
//! cargo run --example late_subscriber
//! ```

use prophub::{Callback, Context, Hub};

fn main() -> anyhow::Result<()> {
    let hub: Hub<&str, bool> = Hub::new();

    // Nobody is listening yet; the value is cached anyway.
    hub.publish("armed", false);

    // The late subscriber catches up right here.
    println!("late subscribe:");
    hub.subscribe_fn("armed", |armed: &bool| {
        println!(" ├─► panel sees armed={armed}");
    });

    // Presence, not truthiness.
    println!(" ├─► cached:          {:?}", hub.get_last(&"armed"));
    println!(" └─► never published: {:?}", hub.get_last(&"door_open"));

    // Re-registering the same (callback, context) identity is a no-op:
    // no duplicate entry, no second replay.
    let ctx = Context::new("panel-2");
    let watcher: Callback<bool> = Callback::infallible(|armed: &bool| {
        println!(" ├─► second panel sees armed={armed}");
    });
    hub.subscribe("armed", watcher.clone(), Some(ctx.clone()));
    hub.subscribe("armed", watcher, Some(ctx));
    println!(
        "subscribers on \"armed\": {}",
        hub.subscribers_for(&"armed").len()
    );

    println!("arming:");
    hub.publish("armed", true);
    Ok(())
}
