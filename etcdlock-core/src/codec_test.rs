#[cfg(test)]
mod tests {
    use crate::codec::{
        OPEN_RANGE_END, is_open_ended, namespace, owner_prefix, prefix_range_end,
    };
    use crate::error::LockError;

    #[test]
    fn test_namespace_concatenates_prefix_and_name() {
        let key = namespace(b"etcdlock/", b"jobs").unwrap();
        assert_eq!(key, b"etcdlock/jobs".to_vec());
    }

    #[test]
    fn test_namespace_allows_empty_prefix() {
        assert_eq!(namespace(b"", b"jobs").unwrap(), b"jobs".to_vec());
    }

    #[test]
    fn test_namespace_rejects_empty_name() {
        let err = namespace(b"etcdlock/", b"").unwrap_err();
        assert!(matches!(err, LockError::InvalidArgument(_)));
    }

    #[test]
    fn test_distinct_names_give_distinct_keys() {
        let a = namespace(b"p/", b"alpha").unwrap();
        let b = namespace(b"p/", b"alphb").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_range_end_increments_last_byte() {
        assert_eq!(prefix_range_end(&[0x61, 0x62]), vec![0x61, 0x63]);
    }

    #[test]
    fn test_range_end_all_max_is_open_ended() {
        assert_eq!(prefix_range_end(&[0xFF]), vec![0x00]);
        assert_eq!(prefix_range_end(&[0xFF, 0xFF, 0xFF]), OPEN_RANGE_END.to_vec());
        assert!(is_open_ended(&prefix_range_end(&[0xFF, 0xFF])));
    }

    #[test]
    fn test_range_end_truncates_trailing_max_bytes() {
        assert_eq!(prefix_range_end(&[0x61, 0xFF]), vec![0x62]);
        assert_eq!(prefix_range_end(&[0x00, 0x10, 0xFF, 0xFF]), vec![0x00, 0x11]);
    }

    #[test]
    fn test_range_end_bounds_every_prefixed_key() {
        let key = namespace(b"etcdlock/", b"jobs").unwrap();
        let end = prefix_range_end(&key);

        let mut child = key.clone();
        child.extend_from_slice(b"/694d7a1c2e3f");
        let mut max_child = key.clone();
        max_child.extend_from_slice(&[0xFF; 8]);

        assert!(key.as_slice() < end.as_slice());
        assert!(child.as_slice() < end.as_slice());
        assert!(max_child.as_slice() < end.as_slice());
        // sibling prefix just past the range
        assert!(b"etcdlock/jobt".as_slice() >= end.as_slice());
    }

    #[test]
    fn test_owner_prefix_excludes_sibling_names() {
        let start = owner_prefix(b"etcdlock/orders");
        let end = prefix_range_end(&start);
        assert_eq!(start, b"etcdlock/orders/".to_vec());
        assert_eq!(end, b"etcdlock/orders0".to_vec());

        let own = b"etcdlock/orders/694d0000".as_slice();
        assert!(own >= start.as_slice() && own < end.as_slice());
        for sibling in [b"etcdlock/orders-archive/1".as_slice(), b"etcdlock/ordersx/1"] {
            assert!(!(sibling >= start.as_slice() && sibling < end.as_slice()));
        }
    }

    #[test]
    fn test_owner_prefix_of_max_bytes_is_bounded() {
        let start = owner_prefix(&[0xFF]);
        assert_eq!(start, vec![0xFF, b'/']);
        assert_eq!(prefix_range_end(&start), vec![0xFF, b'0']);
        assert!(!is_open_ended(&prefix_range_end(&start)));
    }
}
