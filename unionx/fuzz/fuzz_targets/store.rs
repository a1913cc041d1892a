//! Fuzzer for `UnionStore`.
//!
//! Runs arbitrary operation sequences, including forged handles, against a
//! simulated store made of one `Vec` per bucket.

#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use unionx::{variant_schema, Error, Handle, UnionStore, Variant};

variant_schema! {
    #[derive(Clone, Copy, Debug, PartialEq, Arbitrary)]
    enum Val {
        A(u8),
        B(u8),
        C(u32),
        D(u16),
        E([u8; 4]),
        F(u64),
    }
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Append(Val),
    Get(u16),
    Remove(u16),
    Raw(usize, bool),
    Clear,
}

/// One simulated bucket: (discriminant, payload bytes) per slot
type SimBucket = Vec<(usize, Vec<u8>)>;

struct Sim {
    store: UnionStore<'static, Val>,
    buckets: Vec<SimBucket>,
}

impl Sim {
    fn new() -> Self {
        let store = UnionStore::new().unwrap();
        let buckets = vec![Vec::new(); store.table().bucket_count()];
        Self { store, buckets }
    }

    fn slot_bytes(val: &Val, slot_size: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; slot_size];
        val.write_payload(&mut bytes);
        bytes
    }

    /// The n-th live slot, wrapping, as (bucket, position).
    fn pick(&self, n: u16) -> Option<(usize, usize)> {
        let total: usize = self.buckets.iter().map(Vec::len).sum();
        if total == 0 {
            return None;
        }
        let mut n = n as usize % total;
        for (bucket, slots) in self.buckets.iter().enumerate() {
            if n < slots.len() {
                return Some((bucket, n));
            }
            n -= slots.len();
        }
        None
    }

    fn handle(&self, bucket: usize, position: usize) -> Handle {
        let discriminant = self.buckets[bucket][position].0;
        self.store
            .table()
            .codec()
            .encode(discriminant, position, bucket)
            .unwrap()
    }

    /// What a lookup of a raw handle should produce.
    fn expect(&self, handle: Handle) -> Result<Val, Error> {
        let table = self.store.table();
        let (discriminant, position) = table.codec().decode(handle);
        let bucket = table.bucket_of(discriminant)?;
        let slots = &self.buckets[bucket];
        match slots.get(position) {
            Some((_, bytes)) => Ok(Val::read_payload(discriminant, bytes).unwrap()),
            None => Err(Error::OutOfBounds {
                position,
                slots: slots.len(),
            }),
        }
    }

    fn apply(&mut self, op: Op) {
        match op {
            Op::Append(val) => {
                let (bucket, slot_size) = self.store.table().slot_of(val.discriminant()).unwrap();
                let handle = self.store.append(&val).unwrap();
                self.buckets[bucket].push((val.discriminant(), Self::slot_bytes(&val, slot_size)));
                assert_eq!(handle, self.handle(bucket, self.buckets[bucket].len() - 1));
            }
            Op::Get(n) => {
                if let Some((bucket, position)) = self.pick(n) {
                    let handle = self.handle(bucket, position);
                    assert_eq!(self.store.get(handle), self.expect(handle));
                }
            }
            Op::Remove(n) => {
                if let Some((bucket, position)) = self.pick(n) {
                    let handle = self.handle(bucket, position);
                    let expected = self.expect(handle);
                    self.buckets[bucket].swap_remove(position);
                    assert_eq!(self.store.swap_remove(handle), expected);
                }
            }
            Op::Raw(raw, remove) => {
                // Forged handles may name any alternative's bytes, or
                // nothing at all.
                let handle = Handle::from_raw(raw);
                let expected = self.expect(handle);
                if remove {
                    let result = self.store.swap_remove(handle);
                    assert_eq!(result, expected);
                    if result.is_ok() {
                        let table = self.store.table();
                        let (d, position) = table.codec().decode(handle);
                        let bucket = table.bucket_of(d).unwrap();
                        self.buckets[bucket].swap_remove(position);
                    }
                } else {
                    assert_eq!(self.store.get(handle), expected);
                }
            }
            Op::Clear => {
                self.store.clear();
                self.buckets.iter_mut().for_each(Vec::clear);
            }
        }

        for (bucket, slots) in self.buckets.iter().enumerate() {
            let bytes: Vec<u8> = slots.iter().flat_map(|(_, b)| b.iter().copied()).collect();
            assert_eq!(self.store.bucket_bytes(bucket), &bytes[..]);
        }
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut sim = Sim::new();
    for op in ops {
        sim.apply(op);
    }
});
