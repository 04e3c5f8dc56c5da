//! Stylesheet hot-reload.
//!
//! This module is only available with the `hot-reload` feature. A
//! [`StylesheetWatcher`] reports changed `.mss` files; applying the changes
//! reparses them and swaps them into a [`StyleResolver`](crate::resolve::StyleResolver).

mod watcher;

pub use watcher::{ChangeKind, StylesheetChangeEvent, StylesheetWatcher};
