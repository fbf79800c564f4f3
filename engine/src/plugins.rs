//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Built-in option modules
//!
//! One plugin per supported Telnet extension. All of them are
//! dependency-free: each can be negotiated before or after any of the
//! others.

pub mod charset;
pub mod echo;
pub mod gmcp;
pub mod mccp;
pub mod msdp;
pub mod mssp;
pub mod naws;

pub use self::charset::CharsetPlugin;
pub use self::echo::EchoPlugin;
pub use self::gmcp::GmcpPlugin;
pub use self::mccp::{CompressVersion, MccpPlugin};
pub use self::msdp::MsdpPlugin;
pub use self::mssp::{MsspPlugin, MsspProvider};
pub use self::naws::NawsPlugin;
