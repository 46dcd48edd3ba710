//! Bidirectional map whose two orderings are treaps sharing one node per pair.

mod cursor;
mod map;
mod node;
mod tree;

pub use self::cursor::{Cursor, Iter};
pub use self::map::Bimap;
pub use self::node::{Handle, Left, LeftHandle, Right, RightHandle, Role, Side};

use std::error;
use std::fmt;
use std::result;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The requested key is not present on its side of the map.
    NotFound,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "key not found"),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
