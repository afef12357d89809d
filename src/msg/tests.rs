#[cfg(test)]
mod units {
    use crate::error::SimError;
    use crate::msg::{MsgBody, MsgEndian, MsgKind, MsgPrio, MsgSpec, read_kind, write_kind};
    use std::io::Cursor;

    const PRIOS: [MsgPrio; 2] = [MsgPrio::Low, MsgPrio::High];
    const ENDIANS: [MsgEndian; 2] = [MsgEndian::Little, MsgEndian::Big];

    fn roundtrip(spec: &MsgSpec) -> MsgSpec {
        let mut buf = Vec::new();
        spec.write(&mut buf).unwrap();
        assert!(buf.len() <= 9, "header too long: {} octets", buf.len());

        MsgSpec::read(&mut Cursor::new(buf)).unwrap()
    }

    #[test]
    fn size_prefixed_roundtrip_small_sizes() {
        for prio in PRIOS {
            for endian in ENDIANS {
                for size in 0..1000 {
                    let spec = MsgSpec {
                        prio,
                        endian,
                        body: MsgBody::SizePrefixed(size),
                    };

                    assert_eq!(roundtrip(&spec), spec);
                }
            }
        }
    }

    #[test]
    fn size_prefixed_roundtrip_wide_sizes() {
        for endian in ENDIANS {
            for size in [
                7,
                8,
                255,
                256,
                65_535,
                65_536,
                u64::from(u32::MAX),
                u64::from(u32::MAX) + 1,
                u64::MAX,
            ] {
                let spec = MsgSpec {
                    prio: MsgPrio::Low,
                    endian,
                    body: MsgBody::SizePrefixed(size),
                };

                assert_eq!(roundtrip(&spec), spec);
            }
        }
    }

    #[test]
    fn small_sizes_fit_in_one_octet() {
        for size in 0..8 {
            let spec = MsgSpec {
                prio: MsgPrio::Low,
                endian: MsgEndian::Little,
                body: MsgBody::SizePrefixed(size),
            };

            let mut buf = Vec::new();
            spec.write(&mut buf).unwrap();
            assert_eq!(buf.len(), 1);
        }
    }

    #[test]
    fn literal_terminated_roundtrip() {
        for prio in PRIOS {
            for endian in ENDIANS {
                for e in 0..4u32 {
                    let n = 2usize.pow(e);
                    let pattern: Vec<u8> = (0..n).map(|i| (i * 37 + 1) as u8).collect();

                    let spec = MsgSpec {
                        prio,
                        endian,
                        body: MsgBody::LiteralTerminated(pattern),
                    };

                    assert_eq!(roundtrip(&spec), spec);
                }
            }
        }
    }

    #[test]
    fn literal_terminated_rejects_bad_pattern_length() {
        for n in [0usize, 3, 5, 9] {
            let spec = MsgSpec {
                prio: MsgPrio::Low,
                endian: MsgEndian::Little,
                body: MsgBody::LiteralTerminated(vec![0; n]),
            };

            let mut buf = Vec::new();
            assert!(matches!(
                spec.write(&mut buf),
                Err(SimError::BadParameter(_))
            ));
        }
    }

    #[test]
    fn reserved_endian_bits_are_rejected() {
        let mut source = Cursor::new(vec![0b0010_0000]);
        assert!(matches!(
            MsgSpec::read(&mut source),
            Err(SimError::MalformedHeader)
        ));
    }

    #[test]
    fn kind_roundtrip() {
        for kind in [
            MsgKind::Nop,
            MsgKind::Istep,
            MsgKind::Npart,
            MsgKind::Parts,
            MsgKind::Neigh,
        ] {
            let mut buf = Vec::new();
            write_kind(kind, &mut buf).unwrap();
            assert_eq!(buf.len(), 1);

            assert_eq!(read_kind(&mut Cursor::new(buf)).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_unsupported() {
        let mut source = Cursor::new(vec![61u8]);
        assert!(matches!(
            read_kind(&mut source),
            Err(SimError::UnsupportedMessage(61))
        ));
    }
}
