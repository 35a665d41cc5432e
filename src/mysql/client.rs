//! MySQL client utilities
//!
//! This module provides utilities for creating and managing MySQL connection pools.

use crate::config::MySqlSettings;
use mysql_async::{OptsBuilder, Pool};

/// Session setup run on every new connection
const SESSION_INIT: &str = "SET NAMES utf8mb4";

/// Build connection options from explicit settings
pub fn mysql_opts(settings: &MySqlSettings) -> OptsBuilder {
    OptsBuilder::default()
        .ip_or_hostname(settings.host.clone())
        .tcp_port(settings.port)
        .db_name(Some(settings.database.clone()))
        .user(Some(settings.user.clone()))
        .pass(Some(settings.password.clone()))
        .init(vec![SESSION_INIT])
}

/// Create a new MySQL connection pool
///
/// No connection is opened until the first `get_conn`.
pub fn new_mysql_pool(settings: &MySqlSettings) -> Pool {
    Pool::new(mysql_opts(settings))
}
