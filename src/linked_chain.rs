//! LinkedChain: a minimal singly-linked sequence.
//!
//! Each node is owned by its predecessor (the head by the chain itself),
//! so the chain is acyclic by construction: nodes are only created by
//! `prepend` and only removed by splicing their successor into their
//! place. Used standalone and as per-bucket storage in `ChainedMap`.

use core::fmt;

struct Node<T> {
    item: T,
    next: Link<T>,
}

type Link<T> = Option<Box<Node<T>>>;

pub struct LinkedChain<T> {
    head: Link<T>,
}

impl<T> LinkedChain<T> {
    pub const fn new() -> Self {
        Self { head: None }
    }

    /// Link `item` in front of the current head. O(1).
    pub fn prepend(&mut self, item: T) {
        let next = self.head.take();
        self.head = Some(Box::new(Node { item, next }));
    }

    /// Number of items, counted by walking the chain. O(n).
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn head(&self) -> Option<&T> {
        self.head.as_deref().map(|n| &n.item)
    }

    /// Unlink the first item (head first) matching `pred` and return it.
    pub fn remove_where<P>(&mut self, mut pred: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        let mut cursor = &mut self.head;
        loop {
            match cursor.as_ref() {
                None => return None,
                Some(node) if pred(&node.item) => break,
                Some(_) => {}
            }
            cursor = &mut cursor.as_mut()?.next;
        }
        // The removed node gives up its successor before it is dropped.
        let mut removed = cursor.take()?;
        *cursor = removed.next.take();
        Some(removed.item)
    }

    /// Iterate items from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            next: self.head.as_deref_mut(),
        }
    }

    /// Items rendered with `Display`, head to tail. Lazy; call again to
    /// restart.
    pub fn labels(&self) -> impl Iterator<Item = String> + '_
    where
        T: fmt::Display,
    {
        self.iter().map(|item| item.to_string())
    }

    pub fn clear(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

impl<T: PartialEq> LinkedChain<T> {
    /// Remove the first item equal to `item`. Returns 1 if removed, 0 if
    /// absent.
    pub fn remove(&mut self, item: &T) -> usize {
        match self.remove_where(|candidate| candidate == item) {
            Some(_) => 1,
            None => 0,
        }
    }

    /// Linear scan for an equal item.
    pub fn contains(&self, item: &T) -> bool {
        self.iter().any(|candidate| candidate == item)
    }
}

impl<T> Default for LinkedChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Unlink iteratively so long chains do not recurse through Box drops.
impl<T> Drop for LinkedChain<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Builds a chain by prepending each item in turn, so the last item
/// yielded becomes the head.
impl<T> FromIterator<T> for LinkedChain<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut chain = LinkedChain::new();
        for item in iter {
            chain.prepend(item);
        }
        chain
    }
}

impl<T: fmt::Display> fmt::Display for LinkedChain<T> {
    /// `List:5->4` for a chain whose head is 5.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("List:")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("->")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over shared items of a `LinkedChain`.
pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &node.item
        })
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter { next: self.next }
    }
}

/// Iterator over mutable items of a `LinkedChain`.
pub struct IterMut<'a, T> {
    next: Option<&'a mut Node<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next.take().map(|node| {
            self.next = node.next.as_deref_mut();
            &mut node.item
        })
    }
}

impl<'a, T> IntoIterator for &'a LinkedChain<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator, head to tail.
pub struct IntoIter<T>(LinkedChain<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;
    fn next(&mut self) -> Option<T> {
        let node = self.0.head.take()?;
        let Node { item, next } = *node;
        self.0.head = next;
        Some(item)
    }
}

impl<T> IntoIterator for LinkedChain<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: `prepend` makes the new item the head; iteration runs
    /// head to tail.
    #[test]
    fn prepend_puts_item_at_head() {
        let mut l = LinkedChain::new();
        l.prepend(4);
        l.prepend(5);
        assert_eq!(l.head(), Some(&5));
        assert_eq!(l.iter().copied().collect::<Vec<_>>(), vec![5, 4]);
        assert_eq!(l.to_string(), "List:5->4");
    }

    /// Invariant: `len` reflects prepends and removals; removal reports a
    /// count of 1 or 0.
    #[test]
    fn len_and_remove_counts() {
        let mut l = LinkedChain::new();
        assert_eq!(l.len(), 0);
        assert!(l.is_empty());
        l.prepend(4);
        assert_eq!(l.len(), 1);
        assert_eq!(l.remove(&4), 1);
        assert_eq!(l.len(), 0);
        assert_eq!(l.remove(&10), 0);
    }

    /// Invariant: removal splices out the first equal item only, whether it
    /// is the head, in the middle, or the tail.
    #[test]
    fn remove_splices_first_match_anywhere() {
        let mut l: LinkedChain<i32> = [1, 2, 3, 2, 4].into_iter().collect();
        // head-to-tail: 4 2 3 2 1
        assert_eq!(l.remove(&2), 1);
        assert_eq!(l.iter().copied().collect::<Vec<_>>(), vec![4, 3, 2, 1]);
        assert_eq!(l.remove(&4), 1);
        assert_eq!(l.remove(&1), 1);
        assert_eq!(l.iter().copied().collect::<Vec<_>>(), vec![3, 2]);
        assert_eq!(l.remove(&9), 0);
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn contains_by_value() {
        let mut l = LinkedChain::new();
        l.prepend("four".to_string());
        assert!(l.contains(&"four".to_string()));
        assert!(!l.contains(&"ten".to_string()));
    }

    /// Invariant: `remove_where` hands back the owned item.
    #[test]
    fn remove_where_returns_owned_item() {
        let mut l = LinkedChain::new();
        l.prepend((5, "five".to_string()));
        l.prepend((6, "six".to_string()));
        let got = l.remove_where(|(k, _)| *k == 5);
        assert_eq!(got, Some((5, "five".to_string())));
        assert_eq!(l.len(), 1);
        assert!(l.remove_where(|(k, _)| *k == 5).is_none());
    }

    /// Invariant: `labels` is restartable and stringifies each item.
    #[test]
    fn labels_are_restartable() {
        let l: LinkedChain<i32> = [1, 2].into_iter().collect();
        let first: Vec<String> = l.labels().collect();
        let second: Vec<String> = l.labels().collect();
        assert_eq!(first, vec!["2", "1"]);
        assert_eq!(first, second);
    }

    #[test]
    fn iter_mut_updates_in_place() {
        let mut l: LinkedChain<i32> = [1, 2, 3].into_iter().collect();
        for v in l.iter_mut() {
            *v *= 10;
        }
        assert_eq!(l.into_iter().collect::<Vec<_>>(), vec![30, 20, 10]);
    }

    #[test]
    fn empty_chain_display() {
        let l: LinkedChain<i32> = LinkedChain::new();
        assert_eq!(l.to_string(), "List:");
        assert_eq!(format!("{l:?}"), "[]");
    }

    /// Dropping a very long chain must not overflow the stack.
    #[test]
    fn long_chain_drops_iteratively() {
        let l: LinkedChain<u32> = (0..200_000).collect();
        assert_eq!(l.len(), 200_000);
        drop(l);
    }
}
