//! Item catalog
//!
//! Every item carries the GOAL symbol the mod's `ap-item-received!` expects.

use super::ItemRecord;

pub const ITEMS: &[ItemRecord] = &[
    ItemRecord {
        id: 1,
        name: "Scatter Gun",
        symbol: "gun-red",
    },
    ItemRecord {
        id: 2,
        name: "Blaster",
        symbol: "gun-yellow",
    },
    ItemRecord {
        id: 3,
        name: "Vulcan Fury",
        symbol: "gun-blue",
    },
    ItemRecord {
        id: 4,
        name: "Peacemaker",
        symbol: "gun-dark",
    },
    ItemRecord {
        id: 5,
        name: "Morph Gun Ammo Upgrade",
        symbol: "gun-upgrade-ammo",
    },
    ItemRecord {
        id: 6,
        name: "Morph Gun Fire Rate Upgrade",
        symbol: "gun-upgrade-speed",
    },
    ItemRecord {
        id: 7,
        name: "Morph Gun Damage Upgrade",
        symbol: "gun-upgrade-damage",
    },
    ItemRecord {
        id: 8,
        name: "JET-Board",
        symbol: "board",
    },
    ItemRecord {
        id: 9,
        name: "Dark Jak",
        symbol: "darkjak",
    },
    ItemRecord {
        id: 10,
        name: "Dark Bomb",
        symbol: "darkjak-bomb0",
    },
    ItemRecord {
        id: 11,
        name: "Dark Blast",
        symbol: "darkjak-bomb1",
    },
    ItemRecord {
        id: 12,
        name: "Dark Giant",
        symbol: "darkjak-giant",
    },
    ItemRecord {
        id: 13,
        name: "Dark Invincibility",
        symbol: "darkjak-invinc",
    },
    ItemRecord {
        id: 14,
        name: "Red Security Pass",
        symbol: "pass-red",
    },
    ItemRecord {
        id: 15,
        name: "Yellow Security Pass",
        symbol: "pass-yellow",
    },
    ItemRecord {
        id: 16,
        name: "Green Security Pass",
        symbol: "pass-green",
    },
    ItemRecord {
        id: 17,
        name: "Purple Security Pass",
        symbol: "pass-purple",
    },
    ItemRecord {
        id: 18,
        name: "Black Security Pass",
        symbol: "pass-black",
    },
    ItemRecord {
        id: 19,
        name: "Air Train Pass",
        symbol: "pass-air-train",
    },
    ItemRecord {
        id: 20,
        name: "Lens",
        symbol: "lens",
    },
    ItemRecord {
        id: 21,
        name: "Gear",
        symbol: "gear",
    },
    ItemRecord {
        id: 22,
        name: "Shard",
        symbol: "shard",
    },
    ItemRecord {
        id: 23,
        name: "Ruby Key",
        symbol: "ruby-key",
    },
    ItemRecord {
        id: 24,
        name: "Heart of Mar",
        symbol: "heart-of-mar",
    },
    ItemRecord {
        id: 25,
        name: "Time Map",
        symbol: "time-map",
    },
    ItemRecord {
        id: 26,
        name: "Precursor Stone",
        symbol: "precursor-stone",
    },
    ItemRecord {
        id: 27,
        name: "Life Seed",
        symbol: "life-seed",
    },
    ItemRecord {
        id: 28,
        name: "Titan Suit",
        symbol: "titan-suit",
    },
    ItemRecord {
        id: 29,
        name: "Gunpod",
        symbol: "gun-turret",
    },
    ItemRecord {
        id: 30,
        name: "Seal Piece #1",
        symbol: "seal-piece-1",
    },
    ItemRecord {
        id: 31,
        name: "Seal Piece #2",
        symbol: "seal-piece-2",
    },
    ItemRecord {
        id: 32,
        name: "Seal Piece #3",
        symbol: "seal-piece-3",
    },
    ItemRecord {
        id: 33,
        name: "Rift Rider",
        symbol: "rift-rider",
    },
];
