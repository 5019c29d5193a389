//! Set combinators over lazy item streams
//!
//! Both combinators compare items by allocation, never by value.

use std::collections::HashSet;
use std::sync::Arc;

use crate::index::Items;

/// Left items, then right items not already produced. Each item appears once.
pub struct Union<'a, T> {
    left: Items<'a, T>,
    right: Items<'a, T>,
    seen: HashSet<*const T>,
    left_done: bool,
}

impl<'a, T> Union<'a, T> {
    pub fn new(left: Items<'a, T>, right: Items<'a, T>) -> Self {
        Self {
            left,
            right,
            seen: HashSet::new(),
            left_done: false,
        }
    }
}

impl<'a, T> Iterator for Union<'a, T> {
    type Item = &'a Arc<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.left_done {
            match self.left.next() {
                Some(item) => {
                    self.seen.insert(Arc::as_ptr(item));
                    return Some(item);
                }
                None => self.left_done = true,
            }
        }
        loop {
            let item = self.right.next()?;
            if self.seen.insert(Arc::as_ptr(item)) {
                return Some(item);
            }
        }
    }
}

/// Left items that also occur on the right, in left order.
///
/// The right side is drained into an identity set on the first call to `next`.
pub struct Intersect<'a, T> {
    left: Items<'a, T>,
    right: Option<Items<'a, T>>,
    members: HashSet<*const T>,
}

impl<'a, T> Intersect<'a, T> {
    pub fn new(left: Items<'a, T>, right: Items<'a, T>) -> Self {
        Self {
            left,
            right: Some(right),
            members: HashSet::new(),
        }
    }
}

impl<'a, T> Iterator for Intersect<'a, T> {
    type Item = &'a Arc<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(right) = self.right.take() {
            self.members = right.map(Arc::as_ptr).collect();
        }
        if self.members.is_empty() {
            return None;
        }
        let members = &self.members;
        self.left.by_ref().find(|item| members.contains(&Arc::as_ptr(*item)))
    }
}
