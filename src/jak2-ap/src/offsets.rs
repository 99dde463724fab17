//! Memory structure layout
//!
//! The mod exposes an `ap-info-jak2` structure in game memory. Its field
//! offsets are not shipped with the mod, so they are recomputed here by
//! replaying the structure's declarations through [`OffsetTable`], which
//! applies the same natural-alignment rule the GOAL compiler does.
//!
//! The declarations below must match `ap-struct-h.gc` in order, size and
//! length. A mismatch does not fail loudly: every offset after the first
//! differing field is silently wrong. Bump [`EXPECTED_MEMORY_VERSION`]
//! together with the mod whenever the structure changes.

use serde::Serialize;

pub const SIZEOF_U8: usize = 1;
pub const SIZEOF_U32: usize = 4;
pub const SIZEOF_U64: usize = 8;

/// 65 main missions plus headroom.
pub const MAIN_MISSION_SLOTS: usize = 70;
/// Side mission completion slots reserved by the mod.
pub const SIDE_MISSION_SLOTS: usize = 24;
pub const END_MARKER_LEN: usize = 4;

/// Must match `(-> *ap-info-jak2* version)` in ap-struct.gc.
pub const EXPECTED_MEMORY_VERSION: u32 = 2;

/// First structure version carrying the `connection-status` field.
pub const CONNECTION_STATUS_SINCE: u32 = 2;

/// Running cursor over a sequence of field declarations.
#[derive(Debug, Default, Clone)]
pub struct OffsetTable {
    cursor: usize,
}

impl OffsetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `count` consecutive values of `size` bytes and return the
    /// offset of the first one.
    ///
    /// The cursor is first padded up to a multiple of `size`.
    pub fn declare(&mut self, size: usize, count: usize) -> usize {
        assert!(size > 0, "primitive size must be non-zero");

        let misalignment = self.cursor % size;
        if misalignment != 0 {
            self.cursor += size - misalignment;
        }

        let offset = self.cursor;
        self.cursor += size * count;
        offset
    }

    /// Bytes consumed so far, including padding.
    pub fn total_size(&self) -> usize {
        self.cursor
    }
}

/// One named field of the block, for layout reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutField {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
    pub count: usize,
}

/// Offsets of every field in the `ap-info-jak2` structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockLayout {
    pub version: u32,
    pub version_offset: usize,
    pub next_main_index: usize,
    pub next_side_index: usize,
    pub main_missions: usize,
    pub side_missions: usize,
    pub connection_status: Option<usize>,
    pub end_marker: usize,
    pub total_size: usize,
}

impl BlockLayout {
    /// Layout declared by structure version `version`.
    pub fn for_version(version: u32) -> Self {
        let mut table = OffsetTable::new();

        let version_offset = table.declare(SIZEOF_U32, 1);

        let next_main_index = table.declare(SIZEOF_U64, 1);
        let next_side_index = table.declare(SIZEOF_U64, 1);
        let main_missions = table.declare(SIZEOF_U32, MAIN_MISSION_SLOTS);
        let side_missions = table.declare(SIZEOF_U32, SIDE_MISSION_SLOTS);

        let connection_status = if version >= CONNECTION_STATUS_SINCE {
            Some(table.declare(SIZEOF_U32, 1))
        } else {
            None
        };

        let end_marker = table.declare(SIZEOF_U8, END_MARKER_LEN);

        Self {
            version,
            version_offset,
            next_main_index,
            next_side_index,
            main_missions,
            side_missions,
            connection_status,
            end_marker,
            total_size: table.total_size(),
        }
    }

    /// Layout this client was built against.
    pub fn current() -> Self {
        Self::for_version(EXPECTED_MEMORY_VERSION)
    }

    pub fn main_mission_offset(&self, index: usize) -> usize {
        self.main_missions + index * SIZEOF_U32
    }

    pub fn side_mission_offset(&self, index: usize) -> usize {
        self.side_missions + index * SIZEOF_U32
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> Vec<LayoutField> {
        let mut fields = vec![
            LayoutField {
                name: "version",
                offset: self.version_offset,
                size: SIZEOF_U32,
                count: 1,
            },
            LayoutField {
                name: "next-mission-index",
                offset: self.next_main_index,
                size: SIZEOF_U64,
                count: 1,
            },
            LayoutField {
                name: "next-side-mission-index",
                offset: self.next_side_index,
                size: SIZEOF_U64,
                count: 1,
            },
            LayoutField {
                name: "missions-checked",
                offset: self.main_missions,
                size: SIZEOF_U32,
                count: MAIN_MISSION_SLOTS,
            },
            LayoutField {
                name: "side-missions-checked",
                offset: self.side_missions,
                size: SIZEOF_U32,
                count: SIDE_MISSION_SLOTS,
            },
        ];

        if let Some(offset) = self.connection_status {
            fields.push(LayoutField {
                name: "connection-status",
                offset,
                size: SIZEOF_U32,
                count: 1,
            });
        }

        fields.push(LayoutField {
            name: "end-marker",
            offset: self.end_marker,
            size: SIZEOF_U8,
            count: END_MARKER_LEN,
        });

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_pads_to_primitive_size() {
        let mut table = OffsetTable::new();
        assert_eq!(table.declare(1, 3), 0);
        assert_eq!(table.declare(4, 1), 4);
        assert_eq!(table.declare(8, 1), 8);
        assert_eq!(table.declare(2, 1), 16);
        assert_eq!(table.total_size(), 18);
    }

    #[test]
    fn test_declare_without_padding() {
        let mut table = OffsetTable::new();
        assert_eq!(table.declare(8, 2), 0);
        assert_eq!(table.declare(4, 1), 16);
        assert_eq!(table.declare(4, 1), 20);
    }

    #[test]
    fn test_version_one_layout() {
        let layout = BlockLayout::for_version(1);
        assert_eq!(layout.version_offset, 0);
        assert_eq!(layout.next_main_index, 8);
        assert_eq!(layout.next_side_index, 16);
        assert_eq!(layout.main_missions, 24);
        assert_eq!(layout.side_missions, 304);
        assert_eq!(layout.connection_status, None);
        assert_eq!(layout.end_marker, 400);
        assert_eq!(layout.total_size, 404);
    }

    #[test]
    fn test_version_two_layout_adds_connection_status() {
        let layout = BlockLayout::for_version(2);
        assert_eq!(layout.connection_status, Some(400));
        assert_eq!(layout.end_marker, 404);
        assert_eq!(layout.total_size, 408);
    }

    #[test]
    fn test_current_layout_matches_expected_version() {
        assert_eq!(BlockLayout::current().version, EXPECTED_MEMORY_VERSION);
    }

    #[test]
    fn test_mission_offsets() {
        let layout = BlockLayout::current();
        assert_eq!(layout.main_mission_offset(0), 24);
        assert_eq!(layout.main_mission_offset(2), 32);
        assert_eq!(layout.side_mission_offset(1), 308);
    }

    #[test]
    fn test_fields_in_declaration_order() {
        let fields = BlockLayout::for_version(2).fields();
        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "version",
                "next-mission-index",
                "next-side-mission-index",
                "missions-checked",
                "side-missions-checked",
                "connection-status",
                "end-marker",
            ]
        );
        assert!(fields.windows(2).all(|w| w[0].offset <= w[1].offset));
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn test_zero_size_rejected() {
        OffsetTable::new().declare(0, 1);
    }
}
