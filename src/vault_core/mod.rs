// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core domain kernel.
//!
//! Data model, capability set, collaborator traits and the session
//! lifecycle. Independent of any concrete storage or transport.

pub mod audit;
pub mod capabilities;
pub mod constants;
pub mod crypto;
pub mod errors;
pub mod models;
pub mod session;
pub mod traits;
