// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod admin;
pub mod balance;
pub mod doctor;
pub mod exporter;
pub mod importer;
pub mod items;
pub mod purchases;
pub mod reports;
pub mod restock;
pub mod sales;
pub mod students;
pub mod transactions;
