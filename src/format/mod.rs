//! Formatting utilities for raw walk values.
//!
//! ## Hex Encoding
//!
//! The [`hex`] module provides hexadecimal encoding and decoding utilities,
//! used for the walk cache file format, stored walks, and logging.
//!
//! ```
//! use snmp_table::format::hex;
//!
//! // Encode bytes to hex string
//! assert_eq!(hex::encode(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
//!
//! // Lazy formatting for logging
//! let data = [0x00, 0xff];
//! println!("{}", hex::Bytes(&data)); // prints: 00ff
//! ```

pub mod hex;
