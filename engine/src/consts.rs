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

//! Telnet wire constants
//!
//! The command and option bytes of RFC 854 plus the MUD extension options
//! handled by this crate - the complete trigger alphabet the framing
//! machine matches on. Negotiation commands occupy the top of the byte
//! range so they can follow an IAC unambiguously; everything below
//! [`SE`] is plain data unless an option's subnegotiation grammar says
//! otherwise. The nested modules hold the structural bytes the MSDP,
//! MSSP and CHARSET payload grammars use inside `IAC SB … IAC SE`.
//!
//! Related RFCs: 854 (protocol), 855 (option conventions), 857 (ECHO),
//! 1073 (NAWS), 1143 (Q-method), 2066 (CHARSET).

/// `NUL` - No Operation / padding byte
pub const NUL: u8 = 0;
/// `LF` - Line Feed, terminates a line of input
pub const LF: u8 = 10;
/// `CR` - Carriage Return, first half of the CR LF line terminator
pub const CR: u8 = 13;
/// `SE` - End of subnegotiation parameters
pub const SE: u8 = 240;
/// `NOP` - No operation
pub const NOP: u8 = 241;
/// `DM` - Data Mark, the data stream portion of a Synch
pub const DM: u8 = 242;
/// `BRK` - NVT character Break
pub const BRK: u8 = 243;
/// `IP` - Interrupt Process
pub const IP: u8 = 244;
/// `AO` - Abort Output
pub const AO: u8 = 245;
/// `AYT` - Are You There
pub const AYT: u8 = 246;
/// `EC` - Erase Character
pub const EC: u8 = 247;
/// `EL` - Erase Line
pub const EL: u8 = 248;
/// `GA` - Go Ahead
pub const GA: u8 = 249;
/// `SB` - Begin subnegotiation of the indicated option
pub const SB: u8 = 250;
/// `WILL` - Desire to begin performing the indicated option
pub const WILL: u8 = 251;
/// `WONT` - Refusal to perform the indicated option
pub const WONT: u8 = 252;
/// `DO` - Request that the peer perform the indicated option
pub const DO: u8 = 253;
/// `DONT` - Demand that the peer stop performing the indicated option
pub const DONT: u8 = 254;
/// `IAC` - Interpret As Command, the Telnet escape byte
pub const IAC: u8 = 255;

/// Telnet option codes
///
/// [IANA Telnet Options](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
pub mod option {
    /// `ECHO` - Echo Option [RFC857](https://tools.ietf.org/html/rfc857)
    pub const ECHO: u8 = 1;
    /// `NAWS` - Negotiate About Window Size [RFC1073](https://tools.ietf.org/html/rfc1073)
    pub const NAWS: u8 = 31;
    /// `CHARSET` - Charset [RFC2066](https://tools.ietf.org/html/rfc2066)
    pub const CHARSET: u8 = 42;
    /// `MSDP` - Mud Server Data Protocol [MSDP](https://tintin.mudhalla.net/protocols/msdp/)
    pub const MSDP: u8 = 69;
    /// `MSSP` - Mud Server Status Protocol [MSSP](https://tintin.mudhalla.net/protocols/mssp/)
    pub const MSSP: u8 = 70;
    /// `COMPRESS2` - Mud Client Compression Protocol version 2 [MCCP](https://tintin.mudhalla.net/protocols/mccp/)
    pub const COMPRESS2: u8 = 86;
    /// `COMPRESS3` - Mud Client Compression Protocol version 3 [MCCP](https://tintin.mudhalla.net/protocols/mccp/)
    pub const COMPRESS3: u8 = 87;
    /// `GMCP` - Generic Mud Communication Protocol [GMCP](https://www.gammon.com.au/gmcp)
    pub const GMCP: u8 = 201;

    /// MSDP structural bytes
    pub mod msdp {
        /// Introduces a variable name
        pub const VAR: u8 = 1;
        /// Introduces a value
        pub const VAL: u8 = 2;
        /// Opens a nested table of variable/value pairs
        pub const TABLE_OPEN: u8 = 3;
        /// Closes a nested table
        pub const TABLE_CLOSE: u8 = 4;
        /// Opens an array of values
        pub const ARRAY_OPEN: u8 = 5;
        /// Closes an array
        pub const ARRAY_CLOSE: u8 = 6;
    }

    /// MSSP structural bytes
    pub mod mssp {
        /// Introduces a variable name
        pub const VAR: u8 = 1;
        /// Introduces a value
        pub const VAL: u8 = 2;
    }

    /// CHARSET subnegotiation commands
    pub mod charset {
        /// Sender offers a separator-joined list of charsets
        pub const REQUEST: u8 = 1;
        /// Receiver accepts the named charset
        pub const ACCEPTED: u8 = 2;
        /// Receiver can use none of the offered charsets
        pub const REJECTED: u8 = 3;
        /// Sender transmits a translation table
        pub const TTABLE_IS: u8 = 4;
        /// Receiver cannot handle the translation table
        pub const TTABLE_REJECTED: u8 = 5;
    }
}
