// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════
mod table_tests {
    use crate::builder::Builder;
    use crate::error::TableError;
    use crate::table::{Table, Vector};

    /// Root table with: 0 = u16 40, 1 = absent, 2 = [i32; 5], 3 = "spawn",
    /// 4 = nested table { 0 = i8 -3 }.
    fn make_buffer() -> Vec<u8> {
        let mut b = Builder::new();
        let values = b.create_vector(&[10i32, 20, 30, 40, 50]).unwrap();
        let name = b.create_string("spawn").unwrap();
        b.start_object(1).unwrap();
        b.push_slot_always(0, -3i8).unwrap();
        let child = b.end_object().unwrap();

        b.start_object(5).unwrap();
        b.push_offset(4, child).unwrap();
        b.push_offset(3, name).unwrap();
        b.push_offset(2, values).unwrap();
        b.push_slot(0, 40u16, 0).unwrap();
        let root = b.end_object().unwrap();
        b.finish(root).unwrap();
        b.into_bytes().unwrap()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Field access
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_present_and_absent_fields() {
        let buf = make_buffer();
        let table = Table::root(&buf).unwrap();

        assert_eq!(table.get::<u16>(0).unwrap(), Some(40));
        assert!(table.has_field(0));
        assert!(!table.has_field(1));
        assert_eq!(table.get::<u16>(1).unwrap(), None);
        assert_eq!(table.get_or::<u16>(1, 7).unwrap(), 7);
        assert_eq!(table.get_vector::<i32>(1).unwrap().map(|v| v.len()), None);
        assert_eq!(table.get_str(3).unwrap(), Some("spawn"));
    }

    #[test]
    fn test_fields_beyond_the_writer_schema_are_absent() {
        let buf = make_buffer();
        let table = Table::root(&buf).unwrap();
        assert_eq!(table.vtable().num_fields(), 5);
        assert_eq!(table.field_offset(12), 0);
        assert_eq!(table.get::<u64>(12).unwrap(), None);
        assert!(table.get_table::<Table>(40).unwrap().is_none());
    }

    #[test]
    fn test_nested_table() {
        let buf = make_buffer();
        let table = Table::root(&buf).unwrap();
        let child: Table = table.get_table(4).unwrap().unwrap();
        assert!(child.loc() > table.loc());
        assert_eq!(child.get::<i8>(0).unwrap(), Some(-3));
        assert_eq!(child.vtable().num_fields(), 1);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Vectors
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_vector_random_access() {
        let buf = make_buffer();
        let table = Table::root(&buf).unwrap();
        let values: Vector<i32> = table.get_vector(2).unwrap().unwrap();

        assert_eq!(values.len(), 5);
        assert!(!values.is_empty());
        assert_eq!(values.get(0).unwrap(), 10);
        assert_eq!(values.get(4).unwrap(), 50);
        assert_eq!(
            values.get(5).unwrap_err(),
            TableError::IndexOutOfRange { index: 5, len: 5 }
        );
        assert_eq!(values.bytes().len(), 20);
        assert_eq!(&values.bytes()[0..4], &10i32.to_le_bytes());
    }

    #[test]
    fn test_vector_iter() {
        let buf = make_buffer();
        let table = Table::root(&buf).unwrap();
        let values: Vector<i32> = table.get_vector(2).unwrap().unwrap();

        let iter = values.iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.sum::<i32>(), 150);
        assert_eq!(values.into_iter().collect::<Vec<_>>(), vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_empty_vector() {
        let mut b = Builder::new();
        let empty = b.create_vector::<i8>(&[]).unwrap();
        b.start_object(1).unwrap();
        b.push_offset(0, empty).unwrap();
        let root = b.end_object().unwrap();
        b.finish(root).unwrap();

        let buf = b.finished_data().unwrap();
        let v: Vector<i8> = Table::root(buf).unwrap().get_vector(0).unwrap().unwrap();
        assert!(v.is_empty());
        assert_eq!(v.iter().count(), 0);
        assert!(matches!(v.get(0), Err(TableError::IndexOutOfRange { index: 0, len: 0 })));
    }

    #[test]
    fn test_vector_length_past_buffer_end() {
        // count = 1000 but only 8 bytes follow.
        let mut buf = vec![0u8; 12];
        buf[0..4].copy_from_slice(&1000u32.to_le_bytes());
        assert!(matches!(
            Vector::<i32>::new(&buf, 0),
            Err(TableError::TruncatedBuffer { .. })
        ));
        assert_eq!(Vector::<u8>::new(&buf[..8], 4).unwrap().len(), 0);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Corrupt / truncated input
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_root_of_short_buffer() {
        for len in 0..4 {
            let buf = vec![0u8; len];
            assert!(matches!(Table::root(&buf), Err(TableError::TruncatedBuffer { .. })));
        }
    }

    #[test]
    fn test_root_offset_out_of_bounds() {
        let mut buf = make_buffer();
        let len = buf.len() as u32;
        buf[0..4].copy_from_slice(&len.to_le_bytes());
        assert!(matches!(Table::root(&buf), Err(TableError::TruncatedBuffer { .. })));
    }

    #[test]
    fn test_vtable_delta_out_of_bounds() {
        let mut buf = make_buffer();
        let loc = Table::root(&buf).unwrap().loc();
        buf[loc..loc + 4].copy_from_slice(&i32::MIN.to_le_bytes());
        assert!(matches!(Table::root(&buf), Err(TableError::TruncatedBuffer { .. })));
        buf[loc..loc + 4].copy_from_slice(&i32::MAX.to_le_bytes());
        assert!(matches!(Table::root(&buf), Err(TableError::TruncatedBuffer { .. })));
    }

    #[test]
    fn test_malformed_vtable_header() {
        let mut buf = make_buffer();
        let vt = Table::root(&buf).unwrap().vtable().loc();
        buf[vt..vt + 2].copy_from_slice(&3u16.to_le_bytes());
        assert_eq!(Table::root(&buf).unwrap_err(), TableError::InvalidVTable { offset: vt });
    }

    #[test]
    fn test_invalid_utf8_string() {
        let mut buf = make_buffer();
        let table = Table::root(&buf).unwrap();
        let loc = table.indirect(3).unwrap().unwrap();
        buf[loc + 4] = 0xFF;
        let table = Table::root(&buf).unwrap();
        assert_eq!(table.get_str(3).unwrap_err(), TableError::InvalidUtf8 { offset: loc });
    }

    #[test]
    fn test_truncation_never_reads_out_of_bounds() {
        let buf = make_buffer();
        for cut in 0..buf.len() {
            let short = &buf[..cut];
            let Ok(table) = Table::root(short) else {
                continue;
            };
            // Every field either decodes or reports truncation.
            for slot in 0..6 {
                match table.get_vector::<i32>(slot) {
                    Ok(_) | Err(TableError::TruncatedBuffer { .. }) => {}
                    Err(e) => panic!("unexpected error at cut {cut}: {e}"),
                }
                match table.get::<u16>(slot) {
                    Ok(_) | Err(TableError::TruncatedBuffer { .. }) => {}
                    Err(e) => panic!("unexpected error at cut {cut}: {e}"),
                }
            }
        }
    }

    #[test]
    fn test_views_are_shared_across_threads() {
        let buf = make_buffer();
        let table = Table::root(&buf).unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let v: Vector<i32> = table.get_vector(2).unwrap().unwrap();
                    assert_eq!(v.get(3).unwrap(), 40);
                });
            }
        });
    }
}
