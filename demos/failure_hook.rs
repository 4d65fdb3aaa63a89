//! # Failure isolation and the failure hook
//!
//! One subscriber rejects some inputs with an error, another panics on a
//! bad input: both failures are caught, handed to the hook, and the rest
//! of the batch still runs. The dispatcher ends every pass idle and empty.
//!
//! ## Run
//! ```bash
//! cargo run --example failure_hook --features logging
//! ```

use prophub::{Callback, Context, Hub, LogWriter, TaskError};

fn main() -> anyhow::Result<()> {
    let hub: Hub<&str, i32> = Hub::new();
    hub.dispatcher().set_failure_hook(LogWriter::failure_hook());

    // A strict validator: rejects odd readings.
    hub.subscribe(
        "readings",
        Callback::new(|n: &i32| {
            if n % 2 != 0 {
                return Err(TaskError::Fail {
                    error: format!("odd reading: {n}"),
                });
            }
            println!(" ├─► validator accepted {n}");
            Ok(())
        }),
        Some(Context::new("validator")),
    );

    // A buggy subscriber that panics on zero; the batch survives it.
    hub.subscribe(
        "readings",
        Callback::new(|n: &i32| {
            let inverse = 100 / n;
            println!(" ├─► inverse: {inverse}");
            Ok(())
        }),
        Some(Context::new("inverter")),
    );

    // LogWriter prints every value that reaches the property.
    LogWriter::watch(&hub, "readings");

    for n in [4, 7, 0, 10] {
        println!("publish {n}:");
        hub.publish("readings", n);
    }

    println!(" └─► dispatcher after all passes: {:?}", hub.dispatcher());
    Ok(())
}
