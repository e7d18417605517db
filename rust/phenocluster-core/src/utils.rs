// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

pub mod env;
