//! Shared test harness modules for the haulroute CLI.

use super::*;

mod helpers;
mod plan_unit;
