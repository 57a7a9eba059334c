// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decoder for compiled terminfo entries
//!
//! ```no_run
//! use terminfo_reader::{Listing, load};
//!
//! let terminfo = load("xterm-256color")?;
//! if let Some(cup) = terminfo.string("cup") {
//!     println!("cursor address: {}", terminfo_reader::escape(cup));
//! }
//! print!("{}", Listing::default().render(&terminfo));
//! # Ok::<(), terminfo_reader::locate::LoadError>(())
//! ```

pub mod cache;
pub mod caps;
pub mod cursor;
pub mod decode;
pub mod escape;
pub mod header;
pub mod listing;
pub mod locate;
pub mod section;

pub use cache::Cache;
pub use caps::{CapKind, Capability};
pub use decode::{Error, Extended, Terminfo, decode};
pub use escape::escape;
pub use listing::Listing;
pub use locate::{load, load_from_env, locate, open, search_directories};
pub use section::Section;
