//! An ordered bidirectional map backed by a pair of treaps that share their nodes.
//!
//! See [`Bimap`](bimap/struct.Bimap.html).

#[macro_use]
extern crate log;
extern crate rand;

pub mod arena;
pub mod bimap;
pub mod compare;

pub use crate::bimap::{Bimap, Error, Handle, Left, LeftHandle, Result, Right, RightHandle};
