// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod advisor;
pub mod doctor;
pub mod exporter;
pub mod fx;
pub mod reports;
pub mod stocks;
pub mod transactions;
pub mod users;
