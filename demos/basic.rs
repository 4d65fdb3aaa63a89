//! # Basic publish/subscribe
//!
//! A tiny sensor dashboard: subscribers watch properties, publishes fan
//! out in subscription order, a batch commits every value before the
//! first callback runs, and the last-value cache answers synchronous
//! reads.
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use prophub::Hub;

fn main() -> anyhow::Result<()> {
    let hub: Rc<Hub<&str, f64>> = Rc::new(Hub::new());

    // Two independent views over the same property.
    let display = hub.subscribe_fn("temperature", |celsius: &f64| {
        println!(" ├─► display: {celsius:.1} °C");
    });
    let history: Rc<RefCell<Vec<f64>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&history);
    hub.subscribe_fn("temperature", move |celsius: &f64| {
        sink.borrow_mut().push(*celsius);
    });

    println!("three readings:");
    hub.publish("temperature", 21.5)
        .publish("temperature", 22.0)
        .publish("temperature", 21.8);
    println!(" └─► history: {:?}", history.borrow());

    // A humidity view that reads the temperature cache; the batch below
    // commits both values before either callback runs.
    let h = Rc::clone(&hub);
    hub.subscribe_fn("humidity", move |rh: &f64| {
        println!(
            " ├─► humidity {:.0}% at {:?} °C",
            rh * 100.0,
            h.get_last(&"temperature")
        );
    });
    println!("batched publish:");
    hub.publish_multiple([("temperature", 19.5), ("humidity", 0.61)]);

    // The cache answers without touching the queue.
    println!("last reading:      {:?}", hub.get_last(&"temperature"));
    println!("never published:   {:?}", hub.get_last(&"pressure"));
    println!("with default:      {:?}", hub.get_last_or(&"pressure", 1013.0));

    // Unsubscribing by handle stops future deliveries.
    hub.unsubscribe(&"temperature", &display, None);
    println!("after unsubscribing the display:");
    hub.publish("temperature", 23.1);
    println!(" └─► history: {:?}", history.borrow());

    println!("{hub:?}");
    Ok(())
}
