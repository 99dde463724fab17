//! Property-based tests for layout computation and delivery ordering.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use proptest::prelude::*;

use jak2_ap::log::LogSink;
use jak2_ap::repl::ItemDispatcher;
use jak2_ap::{
    BlockLayout, Error, MemoryPoller, MemoryRegion, MemorySource, NetworkItem, OffsetTable,
    PollerSettings, ProcessProvider, Result,
};

// ---------------------------------------------------------------------------
// Test doubles built on the public traits
// ---------------------------------------------------------------------------

const BASE: usize = 0x40_0000;
const BLOCK: usize = BASE + 0x200;

struct Buffer {
    data: RwLock<Vec<u8>>,
    regions: Vec<MemoryRegion>,
}

impl Buffer {
    fn game() -> Arc<Self> {
        let mut data = vec![0u8; 0x400];
        let marker = b"ArChIpElAgO_JaK2\0";
        data[0x10..0x10 + marker.len()].copy_from_slice(marker);
        let ptr_at = 0x10 + marker.len();
        data[ptr_at..ptr_at + 8].copy_from_slice(&(BLOCK as u64).to_le_bytes());
        data[0x200..0x204].copy_from_slice(&2u32.to_le_bytes());

        Arc::new(Self {
            data: RwLock::new(data),
            regions: vec![MemoryRegion {
                start: BASE,
                end: BASE + 0x400,
                perms: "rw-p".to_string(),
                offset: 0,
                path: Some("gk.exe".to_string()),
            }],
        })
    }

    fn set_main(&self, raw: &[u32]) {
        let layout = BlockLayout::current();
        let mut data = self.data.write().unwrap();
        for (i, id) in raw.iter().enumerate() {
            let at = BLOCK - BASE + layout.main_mission_offset(i);
            data[at..at + 4].copy_from_slice(&id.to_le_bytes());
        }
        let at = BLOCK - BASE + layout.next_main_index;
        data[at..at + 8].copy_from_slice(&(raw.len() as u64).to_le_bytes());
    }
}

struct Shared(Arc<Buffer>);

impl MemorySource for Shared {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>> {
        let data = self.0.data.read().unwrap();
        address
            .checked_sub(BASE)
            .and_then(|start| data.get(start..start.checked_add(size)?))
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::MemoryRead {
                address,
                size,
                reason: "unmapped".to_string(),
            })
    }

    fn regions(&self) -> &[MemoryRegion] {
        &self.0.regions
    }

    fn pid(&self) -> u32 {
        1
    }
}

struct Provider(Arc<Buffer>);

impl ProcessProvider for Provider {
    fn find_process(&self, _name: &str) -> Option<u32> {
        Some(1)
    }

    fn attach(&self, _name: &str) -> Result<Box<dyn MemorySource>> {
        Ok(Box::new(Shared(Arc::clone(&self.0))))
    }
}

struct Quiet;

impl LogSink for Quiet {
    fn error(&self, _: &str) {}
    fn warn(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn info(&self, _: &str) {}
}

// ---------------------------------------------------------------------------
// Property: declared offsets are aligned and never go backwards
// ---------------------------------------------------------------------------

fn arb_declaration() -> impl Strategy<Value = (usize, usize)> {
    (prop_oneof![Just(1usize), Just(2), Just(4), Just(8)], 0usize..100)
}

proptest! {
    #[test]
    fn offsets_are_aligned_and_monotonic(decls in prop::collection::vec(arb_declaration(), 1..40)) {
        let mut table = OffsetTable::new();
        let mut previous_end = 0;

        for (size, count) in decls {
            let offset = table.declare(size, count);
            prop_assert_eq!(offset % size, 0);
            prop_assert!(offset >= previous_end);
            prop_assert!(offset - previous_end < size);
            previous_end = offset + size * count;
        }

        prop_assert_eq!(table.total_size(), previous_end);
    }
}

#[test]
fn block_declaration_sequence_total_size() {
    let mut table = OffsetTable::new();
    for (size, count) in [(4, 1), (8, 1), (8, 1), (4, 70), (4, 24), (1, 4)] {
        table.declare(size, count);
    }
    assert_eq!(table.total_size(), 404);
    assert_eq!(BlockLayout::for_version(1).total_size, 404);
}

// ---------------------------------------------------------------------------
// Property: the outbox never holds duplicates, whatever the game reports
// ---------------------------------------------------------------------------

fn arb_snapshot() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..80, 0..70)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn outbox_is_duplicate_free(snapshots in prop::collection::vec(arb_snapshot(), 1..6)) {
        let buffer = Buffer::game();
        let mut poller = MemoryPoller::new(
            PollerSettings::default(),
            Arc::new(Provider(Arc::clone(&buffer))),
            Arc::new(Quiet),
        );
        poller.request_connect();

        let mut reported = Vec::new();
        for snapshot in &snapshots {
            buffer.set_main(snapshot);
            poller.tick();
            poller.tick();
            reported.extend(poller.take_pending());
        }

        let unique: HashSet<_> = poller.outbox().iter().collect();
        prop_assert_eq!(unique.len(), poller.outbox().len());
        prop_assert_eq!(&reported[..], poller.outbox());
        prop_assert!(poller.outbox().iter().all(|id| (1..=65).contains(&id.0)));

        let saw_final_boss = snapshots.iter().any(|s| s.contains(&70));
        prop_assert_eq!(poller.game_finished(), saw_final_boss);
    }
}

// ---------------------------------------------------------------------------
// Property: items reach the game in index order, whatever the arrival order
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn items_delivered_in_index_order(
        order in Just((0u64..30).collect::<Vec<_>>()).prop_shuffle(),
        drain_every in 1usize..8,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let mut dispatcher = ItemDispatcher::new();
        let mut delivered = Vec::new();

        for (n, index) in order.iter().enumerate() {
            dispatcher.enqueue(*index, NetworkItem { item: 1, location: 0, player: 1 });

            if n % drain_every == 0 {
                runtime.block_on(dispatcher.drain(|i, _| {
                    delivered.push(i);
                    async { Ok(true) }
                })).unwrap();
            }
        }
        runtime.block_on(dispatcher.drain(|i, _| {
            delivered.push(i);
            async { Ok(true) }
        })).unwrap();

        prop_assert_eq!(delivered, (0u64..30).collect::<Vec<_>>());
        prop_assert_eq!(dispatcher.pending(), 0);
    }
}
