#[cfg(test)]
mod tests {
    use std::time::Duration;
    use trove_core::{
        ConnectionDescriptor, DEFAULT_BUSY_TIMEOUT, DEFAULT_POOL_MAX_IDLE, ErrorKind, error_kind,
        paginate, paginated_count,
    };

    #[test]
    fn descriptor_parse() {
        let descriptor = ConnectionDescriptor::parse(
            "SQLite://data/shop.sqlite?mode=rwc&pool_max_idle=9&busy_timeout_ms=250",
        )
        .expect("Failed to parse the url");
        assert_eq!(descriptor.scheme(), "sqlite");
        assert_eq!(descriptor.location(), "data/shop.sqlite");
        assert_eq!(descriptor.option("mode"), Some("rwc"));
        assert_eq!(descriptor.option("pool_max_idle"), None);
        assert_eq!(descriptor.pool_max_idle, 9);
        assert_eq!(descriptor.busy_timeout, Duration::from_millis(250));
        assert_eq!(descriptor.identity(), "sqlite://data/shop.sqlite?mode=rwc");
        assert!(descriptor.expect_scheme("sqlite").is_ok());
        assert!(descriptor.expect_scheme("memory").is_err());

        let defaults = ConnectionDescriptor::parse("memory://store").expect("Failed to parse");
        assert_eq!(defaults.pool_max_idle, DEFAULT_POOL_MAX_IDLE);
        assert_eq!(defaults.busy_timeout, DEFAULT_BUSY_TIMEOUT);
        assert_eq!(defaults.identity(), "memory://store");
        assert!(defaults.options().is_empty());
    }

    #[test]
    fn descriptor_invalid() {
        for url in [
            "data.sqlite",
            "://data.sqlite",
            "sq lite://data.sqlite",
            "sqlite://",
            "sqlite://?mode=rwc",
            "sqlite://data.sqlite?pool_max_idle=-1",
            "sqlite://data.sqlite?busy_timeout_ms=soon",
        ] {
            let error = ConnectionDescriptor::parse(url).expect_err(url);
            assert_eq!(error_kind(&error), Some(ErrorKind::Configuration), "{}", url);
        }
    }

    #[test]
    fn pagination() {
        let rows: Vec<_> = (0..10).collect();
        assert_eq!(paginate(rows.clone(), None, None), rows);
        assert_eq!(paginate(rows.clone(), Some(8), None), [8, 9]);
        assert_eq!(paginate(rows.clone(), Some(2), Some(3)), [2, 3, 4]);
        assert!(paginate(rows.clone(), Some(20), Some(3)).is_empty());
        assert!(paginate(rows, None, Some(0)).is_empty());

        assert_eq!(paginated_count(10, None, None), 10);
        assert_eq!(paginated_count(10, Some(8), None), 2);
        assert_eq!(paginated_count(10, Some(2), Some(3)), 3);
        assert_eq!(paginated_count(10, Some(20), Some(3)), 0);
        assert_eq!(paginated_count(10, None, Some(0)), 0);
    }
}
