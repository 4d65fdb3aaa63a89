//! # Cascading publishes stay FIFO
//!
//! Subscribers that publish derived properties from inside their own
//! callbacks: each nested publish only enqueues, the active drain pass
//! picks it up after the current batch, and the whole cascade settles
//! before the outer `publish` returns.
//!
//! ## Run
//! Watch the queue with debug logs:
//! ```bash
//! RUST_LOG=prophub=debug cargo run --example cascade
//! ```

use std::rc::Rc;

use prophub::Hub;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Channel {
    Celsius,
    Fahrenheit,
    Overheated,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("prophub=debug".parse()?),
        )
        .init();

    let hub: Rc<Hub<Channel, f64>> = Rc::new(Hub::new());

    // Derive Fahrenheit from every Celsius reading.
    let h = Rc::clone(&hub);
    hub.subscribe_fn(Channel::Celsius, move |c: &f64| {
        h.publish(Channel::Fahrenheit, c * 9.0 / 5.0 + 32.0);
    });

    // Trip a flag when it gets hot. Both derivations are enqueued while
    // the Celsius batch drains; they run afterwards, in submission order.
    let h = Rc::clone(&hub);
    hub.subscribe_fn(Channel::Celsius, move |c: &f64| {
        if *c > 30.0 {
            h.publish(Channel::Overheated, *c);
        }
    });

    hub.subscribe_fn(Channel::Fahrenheit, |f: &f64| {
        println!(" ├─► fahrenheit: {f:.1}");
    });
    hub.subscribe_fn(Channel::Overheated, |c: &f64| {
        println!(" ├─► overheated at {c:.1} °C");
    });

    println!("publish 21.0 °C:");
    hub.publish(Channel::Celsius, 21.0);

    println!("publish 33.5 °C:");
    hub.publish(Channel::Celsius, 33.5);

    // The cascade settled synchronously inside each publish call.
    println!(" └─► dispatcher: {:?}", hub.dispatcher());
    println!(
        "cached fahrenheit: {:?}",
        hub.get_last(&Channel::Fahrenheit)
    );
    Ok(())
}
