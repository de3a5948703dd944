pub mod gis;
pub mod home;
pub mod reports;

use crate::route::Route;

/// What a page asks the app to do after handling a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Navigate(Route),
    Back,
}

/// Moves `index` by `delta` within `len` items, wrapping at both ends.
pub fn wrap(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + delta).rem_euclid(len as isize) as usize
}
