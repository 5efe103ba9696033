//! Subscriber installation from configuration.
//!
//! Kept to a single test so nothing else in this binary installs a
//! subscriber first.

use cmdb_session::init_tracing;
use cmdb_tests::prelude::*;

#[test]
fn test_open_installs_configured_filter() {
    // GIVEN a configuration with its own log filter
    let config = CmdbConfig {
        log_filter: "cmdb=debug".to_string(),
        ..CmdbConfig::default()
    };

    // WHEN the instance is opened
    let cmdb = Cmdb::open(config).unwrap();

    // THEN a global subscriber is already in place
    assert!(!init_tracing("off"));
    assert_eq!(cmdb.config().log_filter, "cmdb=debug");
}
