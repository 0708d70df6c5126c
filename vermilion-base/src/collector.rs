use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

const MAX_SEGMENTS: usize = 32;

struct Segment<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

impl<T> Segment<T> {
    fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(UnsafeCell::new(MaybeUninit::uninit()));
        }

        Segment {
            slots: slots.into_boxed_slice(),
        }
    }
}

// Writers only ever touch distinct slots, claimed through the shared atomic count
unsafe impl<T: Send> Sync for Segment<T> {}

/// A collector that allows concurrent adding of items, with non-thread-safe closing,
/// clearing and accessing of the underlying collection.
///
/// Appends claim a slot with an atomic increment and write into a pre-allocated
/// segment; a lock is only taken (inside `OnceLock`) when a new segment must be
/// allocated. Segment capacities double, so the segment count stays small.
///
/// `close()` consolidates all segments into one contiguous array. It must
/// happen-after all producers have finished; it is not safe to call concurrently
/// with `add`/`add_range`.
pub struct ConcurrentCollector<T> {
    segments: [OnceLock<Segment<T>>; MAX_SEGMENTS],
    initial_capacity: usize,
    count: AtomicUsize,
    closed: bool,
    consolidated: Vec<T>,
}

impl<T> Default for ConcurrentCollector<T> {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}

impl<T> ConcurrentCollector<T> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_capacity(initial_capacity: usize) -> Self {
        ConcurrentCollector {
            segments: std::array::from_fn(|_| OnceLock::new()),
            initial_capacity: initial_capacity.max(1),
            count: AtomicUsize::new(0),
            closed: false,
            consolidated: Vec::new(),
        }
    }

    // Segment k holds global indices [c0 * (2^k - 1), c0 * (2^(k+1) - 1))
    fn locate(
        initial_capacity: usize,
        index: usize,
    ) -> (usize, usize) {
        let q = index / initial_capacity + 1;
        let segment = (usize::BITS - 1 - q.leading_zeros()) as usize;
        let offset = index - initial_capacity * ((1 << segment) - 1);
        (segment, offset)
    }

    /// Adds an item to the collection and returns its index.
    pub fn add(
        &self,
        item: T,
    ) -> usize {
        debug_assert!(!self.closed, "cannot add to a closed collector");

        let index = self.count.fetch_add(1, Ordering::Relaxed);
        let (segment_index, offset) = Self::locate(self.initial_capacity, index);
        assert!(segment_index < MAX_SEGMENTS);

        let segment = self.segments[segment_index]
            .get_or_init(|| Segment::with_capacity(self.initial_capacity << segment_index));

        unsafe {
            (*segment.slots[offset].get()).write(item);
        }

        index
    }

    /// Adds a range of items to the collection.
    pub fn add_range(
        &self,
        items: impl IntoIterator<Item = T>,
    ) {
        for item in items {
            self.add(item);
        }
    }

    /// Consolidates all items into a single contiguous array. Must be called before
    /// accessing the collection. Calling `close` on an already-closed collector is
    /// a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }

        let count = *self.count.get_mut();
        let mut items = Vec::with_capacity(count);
        for index in 0..count {
            let (segment_index, offset) = Self::locate(self.initial_capacity, index);
            let segment = self.segments[segment_index]
                .get()
                .expect("claimed slot without a segment");
            unsafe {
                items.push((*segment.slots[offset].get()).as_ptr().read());
            }
        }

        // The values moved out above; the segments only hold uninitialized slots now
        for segment in &mut self.segments {
            segment.take();
        }

        self.consolidated = items;
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Contiguous view over the items. Only valid after the collection is closed.
    pub fn items(&self) -> &[T] {
        assert!(self.closed, "the collection is not yet closed");
        &self.consolidated
    }

    /// Mutable contiguous view over the items. Only valid after the collection is closed.
    pub fn items_mut(&mut self) -> &mut [T] {
        assert!(self.closed, "the collection is not yet closed");
        &mut self.consolidated
    }

    pub fn len(&self) -> usize {
        if self.closed {
            self.consolidated.len()
        } else {
            self.count.load(Ordering::Acquire)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the collection and reopens it for appends.
    pub fn clear(&mut self) {
        if !self.closed {
            let count = *self.count.get_mut();
            for index in 0..count {
                let (segment_index, offset) = Self::locate(self.initial_capacity, index);
                if let Some(segment) = self.segments[segment_index].get() {
                    unsafe {
                        std::ptr::drop_in_place((*segment.slots[offset].get()).as_mut_ptr());
                    }
                }
            }
        }

        for segment in &mut self.segments {
            segment.take();
        }

        self.consolidated = Vec::new();
        self.count = AtomicUsize::new(0);
        self.closed = false;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items().iter()
    }
}

impl<T> std::ops::Index<usize> for ConcurrentCollector<T> {
    type Output = T;

    fn index(
        &self,
        index: usize,
    ) -> &T {
        &self.items()[index]
    }
}

impl<T> Drop for ConcurrentCollector<T> {
    fn drop(&mut self) {
        if !self.closed {
            let count = *self.count.get_mut();
            for index in 0..count {
                let (segment_index, offset) = Self::locate(self.initial_capacity, index);
                if let Some(segment) = self.segments[segment_index].get() {
                    unsafe {
                        std::ptr::drop_in_place((*segment.slots[offset].get()).as_mut_ptr());
                    }
                }
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a ConcurrentCollector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items().iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_close() {
        let mut collector = ConcurrentCollector::with_capacity(4);
        for i in 0..100u32 {
            collector.add(i);
        }

        assert_eq!(collector.len(), 100);
        collector.close();

        let items = collector.items();
        assert_eq!(items.len(), 100);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(*item, i as u32);
        }
    }

    #[test]
    fn double_close_is_a_noop() {
        let mut collector = ConcurrentCollector::new();
        collector.add(1u32);
        collector.close();
        collector.close();
        assert_eq!(collector.items(), &[1]);
    }

    #[test]
    fn close_empty() {
        let mut collector = ConcurrentCollector::<u32>::new();
        collector.close();
        assert!(collector.is_empty());
        assert_eq!(collector.items().len(), 0);
    }

    #[test]
    fn clear_reopens() {
        let mut collector = ConcurrentCollector::with_capacity(2);
        collector.add_range([1u32, 2, 3]);
        collector.close();
        collector.clear();
        assert!(collector.is_empty());

        collector.add(7);
        collector.close();
        assert_eq!(collector.items(), &[7]);
    }

    #[test]
    fn concurrent_adds_are_all_collected() {
        let collector = ConcurrentCollector::with_capacity(8);

        std::thread::scope(|scope| {
            for worker in 0..4usize {
                let collector = &collector;
                scope.spawn(move || {
                    for i in 0..1000usize {
                        collector.add(worker * 1000 + i);
                    }
                });
            }
        });

        let mut collector = collector;
        collector.close();

        let mut items = collector.items().to_vec();
        items.sort_unstable();
        let expected: Vec<usize> = (0..4000).collect();
        assert_eq!(items, expected);
    }

    #[test]
    #[should_panic(expected = "the collection is not yet closed")]
    fn items_before_close_panics() {
        let collector = ConcurrentCollector::<u32>::new();
        let _ = collector.items();
    }
}
