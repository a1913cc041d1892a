use std::mem;

use tracing::info;
use tracing_subscriber::EnvFilter;
use unionx::{variant_schema, Error, UnionStore};

variant_schema! {
    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Value {
        A(u8),
        B(u8),
        C(u32),
        D([u64; 4]),
    }
}

/// Values to store when comparing footprints
const FILL: u32 = 100_000;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut store = UnionStore::<Value>::new()?;
    let table = store.table();
    println!(
        "{} alternatives in {} buckets, slot sizes {:?}, {} tag bits",
        table.discriminant_count(),
        table.bucket_count(),
        table.slot_sizes(),
        table.codec().tag_bits()
    );

    // Append, look up, and relocate by swap-remove
    let a = store.append(&Value::A(0xff))?;
    let b = store.append(&Value::B(0xfa))?;
    let c = store.append(&Value::C(0x22310))?;
    for (name, handle) in [("a", a), ("b", b), ("c", c)] {
        let (discriminant, position) = table.codec().decode(handle);
        println!(
            "{name}: handle {:#x} discriminant {discriminant} position {position} -> {:?}",
            handle.into_raw(),
            store.get(handle)?
        );
    }

    let removed = store.swap_remove(a)?;
    println!("removed {:?} via a", removed);
    println!("a now reads {:?}", store.get(a)?);
    match store.get(b) {
        Ok(value) => println!("b still reads {:?}", value),
        Err(err) => println!("b is stale: {err}"),
    }

    // Footprint against a plain Vec of enums
    store.clear();
    for n in 0..FILL {
        let value = match n % 10 {
            0 => Value::D([u64::from(n); 4]),
            1..=4 => Value::C(n),
            _ => Value::A(n as u8),
        };
        store.append(&value)?;
    }
    let (used, _allocated) = store.heap_size();
    let padded = FILL as usize * mem::size_of::<Value>();
    info!(values = store.len(), used, padded, "filled store");
    println!(
        "{} values: {} bytes bucketed, {} bytes as Vec<Value> ({:.1}x)",
        store.len(),
        used,
        padded,
        padded as f64 / used as f64
    );

    Ok(())
}
