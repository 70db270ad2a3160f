//! Queue: singly-linked FIFO with in-place reversal and merge sort.
//!
//! Links are arena keys rather than boxes, so append is O(1) through a
//! tail link and dropping a long queue never recurses.

use core::cmp::Ordering;
use core::fmt;
use slotmap::{DefaultKey, SlotMap};

type Link = Option<DefaultKey>;

#[derive(Clone)]
struct Node<T> {
    elem: T,
    next: Link,
    // Position before the current sort; breaks ties between equal elements.
    rank: usize,
}

/// Singly-linked FIFO queue.
///
/// Dropping the queue releases every element; draining it through
/// `into_iter` hands them back to the caller instead.
#[derive(Clone)]
pub struct Queue<T> {
    nodes: SlotMap<DefaultKey, Node<T>>,
    head: Link,
    tail: Link,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn front(&self) -> Option<&T> {
        self.head.map(|k| &self.nodes[k].elem)
    }

    /// Adds `elem` at the back.
    pub fn append(&mut self, elem: T) {
        let k = self.nodes.insert(Node {
            elem,
            next: None,
            rank: 0,
        });
        match self.tail {
            Some(t) => self.nodes[t].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    /// Takes the element at the front.
    pub fn remove_front(&mut self) -> Option<T> {
        let k = self.head?;
        let node = self.nodes.remove(k)?;
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        Some(node.elem)
    }

    /// Calls `visitor` on each element front to back until it returns
    /// `false`.
    ///
    /// Returns `false` if the queue is empty and nothing was visited.
    pub fn apply<F>(&self, mut visitor: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        if self.is_empty() {
            return false;
        }
        for elem in self.iter() {
            if !visitor(elem) {
                break;
            }
        }
        true
    }

    /// Reverses the queue in place by flipping every link.
    pub fn reverse(&mut self) {
        let mut prev: Link = None;
        let mut cur = self.head;
        while let Some(k) = cur {
            let node = &mut self.nodes[k];
            cur = node.next;
            node.next = prev;
            prev = Some(k);
        }
        self.tail = self.head;
        self.head = prev;
    }

    /// Stable merge sort by `compare`.
    ///
    /// Each run is split by alternating position, so no midpoint search is
    /// needed; equal elements keep their relative order. If `compare`
    /// panics, the queue still holds every element, in unspecified order.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut cur = self.head;
        let mut rank = 0;
        while let Some(k) = cur {
            let node = &mut self.nodes[k];
            node.rank = rank;
            rank += 1;
            cur = node.next;
        }

        let mut guard = SortGuard {
            queue: self,
            done: false,
        };
        let q = &mut *guard.queue;
        q.head = q.merge_sort(q.head, &mut compare);

        let mut tail = q.head;
        while let Some(next) = tail.and_then(|k| q.nodes[k].next) {
            tail = Some(next);
        }
        q.tail = tail;
        guard.done = true;
    }

    /// Chains every node in arena order, discarding the current links.
    fn relink_all(&mut self) {
        let keys: Vec<DefaultKey> = self.nodes.keys().collect();
        for pair in keys.windows(2) {
            self.nodes[pair[0]].next = Some(pair[1]);
        }
        self.head = keys.first().copied();
        self.tail = keys.last().copied();
        if let Some(t) = self.tail {
            self.nodes[t].next = None;
        }
    }

    fn merge_sort<F>(&mut self, list: Link, compare: &mut F) -> Link
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let first = list?;
        let Some(second) = self.nodes[first].next else {
            return list;
        };

        let (mut evens, mut odds) = (first, second);
        let mut cur = self.nodes[second].next;
        let mut to_evens = true;
        while let Some(k) = cur {
            cur = self.nodes[k].next;
            if to_evens {
                self.nodes[evens].next = Some(k);
                evens = k;
            } else {
                self.nodes[odds].next = Some(k);
                odds = k;
            }
            to_evens = !to_evens;
        }
        self.nodes[evens].next = None;
        self.nodes[odds].next = None;

        let evens = self.merge_sort(Some(first), compare);
        let odds = self.merge_sort(Some(second), compare);
        self.merge(evens, odds, compare)
    }

    fn merge<F>(&mut self, mut a: Link, mut b: Link, compare: &mut F) -> Link
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut head: Link = None;
        let mut tail: Link = None;
        while let (Some(x), Some(y)) = (a, b) {
            let (nx, ny) = (&self.nodes[x], &self.nodes[y]);
            let x_first = match compare(&nx.elem, &ny.elem) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => nx.rank < ny.rank,
            };
            let taken = if x_first {
                a = nx.next;
                x
            } else {
                b = ny.next;
                y
            };
            match tail {
                Some(t) => self.nodes[t].next = Some(taken),
                None => head = Some(taken),
            }
            tail = Some(taken);
        }

        let rest = a.or(b);
        match tail {
            Some(t) => self.nodes[t].next = rest,
            None => head = rest,
        }
        head
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            cur: self.head,
            remaining: self.nodes.len(),
        }
    }
}

/// Restores a well-formed chain when a sort unwinds half-way.
struct SortGuard<'a, T> {
    queue: &'a mut Queue<T>,
    done: bool,
}

impl<T> Drop for SortGuard<'_, T> {
    fn drop(&mut self) {
        if !self.done {
            self.queue.relink_all();
        }
    }
}

impl<T: Ord> Queue<T> {
    pub fn sort(&mut self) {
        self.sort_by(Ord::cmp);
    }
}

/// Front-to-back iterator over a `Queue`.
pub struct Iter<'a, T> {
    nodes: &'a SlotMap<DefaultKey, Node<T>>,
    cur: Link,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = &nodes[self.cur?];
        self.cur = node.next;
        self.remaining -= 1;
        Some(&node.elem)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Owning iterator; drains the queue from the front.
pub struct IntoIter<T>(Queue<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.remove_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for Queue<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.append(elem);
        }
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut q = Self::new();
        q.extend(iter);
        q
    }
}

impl<T: PartialEq> PartialEq for Queue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Queue<T> {}

impl<T: fmt::Debug> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
