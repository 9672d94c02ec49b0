//! Shared test harness modules for the geocluster CLI.

use super::*;

mod helpers;
