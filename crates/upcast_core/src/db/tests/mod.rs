//! Database integration tests.

use super::*;
use crate::error::AppError;
use crate::models::{category::*, comment::*, project::*, user::*};
use crate::notify::InlineNotifier;
use crate::test_support::{
    assert_counters_match_memberships, seed_creator, seed_project, seed_user, setup_temp_db,
    RecordingHook,
};
use std::sync::{Arc, Barrier};
use std::thread;

mod basic_ops;
