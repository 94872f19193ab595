// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The `promptdrop` command-line tool and HTTP API server.

pub mod commands;
pub mod logging;
pub mod options;
pub mod server;
