//! Strided one-dimensional views over a shared buffer.
//!
//! A [`DataBlock`] is `{start, len, inc}` over a borrowed slice: element `i`
//! lives at `data[start + i * inc]`. The increment may be any non-zero value,
//! including negative ones (reversed traversal), so a matrix row, a matrix
//! column and a matrix diagonal are all `DataBlock`s over the same storage.
//!
//! [`DataBlockMut`] is the exclusive counterpart. Every write goes to the
//! backing buffer and is visible through any view created afterwards.

mod norm;
mod ops;
mod vector;

pub(crate) use norm::accumulate_scaled;
pub use vector::DynVector;

use core::ops::{Index, IndexMut};

/// Validates `{start, len, inc}` against a buffer of length `buf_len`.
///
/// Panics if the increment is zero or if the first or last element falls
/// outside the buffer. The elements in between are then in range too.
#[inline]
pub(crate) fn check_line(buf_len: usize, start: usize, len: usize, inc: isize) {
    assert!(inc != 0, "increment must be non-zero");
    if len == 0 {
        return;
    }
    let last = start as isize + (len as isize - 1) * inc;
    assert!(
        start < buf_len && last >= 0 && (last as usize) < buf_len,
        "strided view [start {}, len {}, inc {}] out of bounds for buffer of {}",
        start, len, inc, buf_len,
    );
}

/// Number of elements in `start, start + inc, ...` strictly before `end`.
#[inline]
fn line_len(start: usize, end: usize, inc: isize) -> usize {
    assert!(inc != 0, "increment must be non-zero");
    let span = end as isize - start as isize;
    assert!(
        span == 0 || (span > 0) == (inc > 0),
        "range {}..{} cannot be walked with increment {}",
        start, end, inc,
    );
    (span / inc) as usize
}

// ── DataBlock ───────────────────────────────────────────────────────

/// Read-only strided vector view.
///
/// # Example
///
/// ```
/// use densela::DataBlock;
///
/// let buf = [1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0];
/// // every other element, starting at 1: [2, 4, 6]
/// let x = DataBlock::new(&buf, 1, 7, 2);
/// assert_eq!(x.len(), 3);
/// assert_eq!(x[2], 6.0);
///
/// // reversed traversal
/// let r = DataBlock::new(&buf, 5, 0, -1);
/// assert_eq!(r.to_vec(), vec![6.0, 5.0, 4.0, 3.0, 2.0]);
/// ```
#[derive(Debug)]
pub struct DataBlock<'a, T> {
    data: &'a [T],
    start: usize,
    len: usize,
    inc: isize,
}

impl<T> Clone for DataBlock<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DataBlock<'_, T> {}

impl<'a, T> DataBlock<'a, T> {
    /// Creates the view `start, start + inc, ...` up to (not including) `end`.
    pub fn new(data: &'a [T], start: usize, end: usize, inc: isize) -> Self {
        let len = line_len(start, end, inc);
        Self::with_len(data, start, len, inc)
    }

    /// Creates a view of `len` elements starting at `start`.
    pub fn with_len(data: &'a [T], start: usize, len: usize, inc: isize) -> Self {
        check_line(data.len(), start, len, inc);
        Self { data, start, len, inc }
    }

    /// Contiguous view over a whole slice.
    pub fn from_slice(data: &'a [T]) -> Self {
        Self {
            data,
            start: 0,
            len: data.len(),
            inc: 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distance in the buffer between two consecutive elements.
    #[inline]
    pub fn increment(&self) -> isize {
        self.inc
    }

    /// Buffer position of the first element.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    fn pos(&self, i: usize) -> usize {
        (self.start as isize + i as isize * self.inc) as usize
    }

    /// Narrower view without the first `head` and the last `tail` elements.
    ///
    /// ```
    /// use densela::DataBlock;
    /// let buf = [1.0, 2.0, 3.0, 4.0, 5.0];
    /// let x = DataBlock::from_slice(&buf).drop(1, 2);
    /// assert_eq!(x.to_vec(), vec![2.0, 3.0]);
    /// ```
    pub fn drop(&self, head: usize, tail: usize) -> DataBlock<'a, T> {
        assert!(head + tail <= self.len, "cannot drop {}+{} of {}", head, tail, self.len);
        DataBlock {
            data: self.data,
            start: if head < self.len { self.pos(head) } else { self.start },
            len: self.len - head - tail,
            inc: self.inc,
        }
    }

    /// Sub-view of `len` elements, starting at element `start`, taking every
    /// `inc`-th element of this view.
    pub fn extract(&self, start: usize, len: usize, inc: isize) -> DataBlock<'a, T> {
        let begin = if len == 0 { self.start } else { self.pos(start) };
        DataBlock::with_len(self.data, begin, len, inc * self.inc)
    }

    /// Same elements in reverse order.
    pub fn reverse(&self) -> DataBlock<'a, T> {
        if self.len == 0 {
            return *self;
        }
        DataBlock {
            data: self.data,
            start: self.pos(self.len - 1),
            len: self.len,
            inc: -self.inc,
        }
    }
}

impl<'a, T: Copy> DataBlock<'a, T> {
    /// Element `i`.
    #[inline]
    pub fn get(&self, i: usize) -> T {
        assert!(i < self.len, "index {} out of bounds for length {}", i, self.len);
        self.data[self.pos(i)]
    }

    /// Iterates over the elements by value.
    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        let b = *self;
        (0..b.len).map(move |i| b.data[b.pos(i)])
    }

    /// Copies the elements into a new `Vec`.
    pub fn to_vec(&self) -> alloc::vec::Vec<T> {
        self.iter().collect()
    }
}

impl<T> Index<usize> for DataBlock<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        assert!(i < self.len, "index {} out of bounds for length {}", i, self.len);
        &self.data[self.pos(i)]
    }
}

// ── DataBlockMut ────────────────────────────────────────────────────

/// Exclusive strided vector view. Writes go to the backing buffer.
///
/// ```
/// use densela::DataBlockMut;
///
/// let mut buf = [0.0_f64; 6];
/// {
///     let mut x = DataBlockMut::new(&mut buf, 0, 6, 3);
///     x.set_all(1.0);
/// }
/// assert_eq!(buf, [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
/// ```
#[derive(Debug)]
pub struct DataBlockMut<'a, T> {
    data: &'a mut [T],
    start: usize,
    len: usize,
    inc: isize,
}

impl<'a, T> DataBlockMut<'a, T> {
    /// Creates the view `start, start + inc, ...` up to (not including) `end`.
    pub fn new(data: &'a mut [T], start: usize, end: usize, inc: isize) -> Self {
        let len = line_len(start, end, inc);
        Self::with_len(data, start, len, inc)
    }

    /// Creates a view of `len` elements starting at `start`.
    pub fn with_len(data: &'a mut [T], start: usize, len: usize, inc: isize) -> Self {
        check_line(data.len(), start, len, inc);
        Self { data, start, len, inc }
    }

    /// Contiguous view over a whole slice.
    pub fn from_slice(data: &'a mut [T]) -> Self {
        let len = data.len();
        Self {
            data,
            start: 0,
            len,
            inc: 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn increment(&self) -> isize {
        self.inc
    }

    #[inline]
    fn pos(&self, i: usize) -> usize {
        (self.start as isize + i as isize * self.inc) as usize
    }

    /// Shared view of the same elements.
    #[inline]
    pub fn as_view(&self) -> DataBlock<'_, T> {
        DataBlock {
            data: &*self.data,
            start: self.start,
            len: self.len,
            inc: self.inc,
        }
    }

    /// Converts into a shared view with the full lifetime.
    #[inline]
    pub fn into_view(self) -> DataBlock<'a, T> {
        DataBlock {
            data: self.data,
            start: self.start,
            len: self.len,
            inc: self.inc,
        }
    }

    /// Shorter-lived exclusive view of the same elements.
    #[inline]
    pub fn reborrow(&mut self) -> DataBlockMut<'_, T> {
        DataBlockMut {
            data: &mut *self.data,
            start: self.start,
            len: self.len,
            inc: self.inc,
        }
    }

    /// Mutable reference to element `i`.
    #[inline]
    pub fn get_mut(&mut self, i: usize) -> &mut T {
        assert!(i < self.len, "index {} out of bounds for length {}", i, self.len);
        let p = self.pos(i);
        &mut self.data[p]
    }

    /// Narrower exclusive view without `head` leading and `tail` trailing elements.
    pub fn drop_mut(&mut self, head: usize, tail: usize) -> DataBlockMut<'_, T> {
        assert!(head + tail <= self.len, "cannot drop {}+{} of {}", head, tail, self.len);
        let start = if head < self.len { self.pos(head) } else { self.start };
        DataBlockMut {
            data: &mut *self.data,
            start,
            len: self.len - head - tail,
            inc: self.inc,
        }
    }

    /// Exclusive sub-view; see [`DataBlock::extract`].
    pub fn extract_mut(&mut self, start: usize, len: usize, inc: isize) -> DataBlockMut<'_, T> {
        let begin = if len == 0 { self.start } else { self.pos(start) };
        DataBlockMut::with_len(&mut *self.data, begin, len, inc * self.inc)
    }
}

impl<T: Copy> DataBlockMut<'_, T> {
    #[inline]
    pub fn get(&self, i: usize) -> T {
        assert!(i < self.len, "index {} out of bounds for length {}", i, self.len);
        self.data[self.pos(i)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, value: T) {
        *self.get_mut(i) = value;
    }

    /// Exchanges elements `i` and `j`.
    #[inline]
    pub fn swap(&mut self, i: usize, j: usize) {
        assert!(i < self.len && j < self.len, "swap index out of bounds");
        let (pi, pj) = (self.pos(i), self.pos(j));
        self.data.swap(pi, pj);
    }

    /// Replaces each element `x` by `f(x)`.
    pub fn apply(&mut self, f: impl Fn(T) -> T) {
        for i in 0..self.len {
            let p = self.pos(i);
            self.data[p] = f(self.data[p]);
        }
    }

    /// Replaces each element by `f(index, x)`.
    pub fn apply_indexed(&mut self, f: impl Fn(usize, T) -> T) {
        for i in 0..self.len {
            let p = self.pos(i);
            self.data[p] = f(i, self.data[p]);
        }
    }

    pub fn to_vec(&self) -> alloc::vec::Vec<T> {
        self.as_view().to_vec()
    }
}

impl<T> Index<usize> for DataBlockMut<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        assert!(i < self.len, "index {} out of bounds for length {}", i, self.len);
        &self.data[self.pos(i)]
    }
}

impl<T> IndexMut<usize> for DataBlockMut<'_, T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        self.get_mut(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_counts_elements_before_end() {
        let buf = [0.0_f64; 10];
        assert_eq!(DataBlock::new(&buf, 0, 10, 1).len(), 10);
        assert_eq!(DataBlock::new(&buf, 2, 10, 4).len(), 2);
        assert_eq!(DataBlock::new(&buf, 9, 0, -3).len(), 3);
        assert_eq!(DataBlock::new(&buf, 4, 4, 1).len(), 0);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn zero_increment_rejected() {
        let buf = [0.0_f64; 3];
        let _ = DataBlock::with_len(&buf, 0, 2, 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn past_the_end_rejected() {
        let buf = [0.0_f64; 5];
        let _ = DataBlock::with_len(&buf, 1, 3, 2);
    }

    #[test]
    fn negative_increment_walks_backwards() {
        let buf = [1.0, 2.0, 3.0, 4.0, 5.0];
        let x = DataBlock::with_len(&buf, 4, 3, -2);
        assert_eq!(x.to_vec(), vec![5.0, 3.0, 1.0]);
        assert_eq!(x.reverse().to_vec(), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn drop_and_extract() {
        let buf = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let x = DataBlock::from_slice(&buf);
        assert_eq!(x.drop(2, 3).to_vec(), vec![2.0, 3.0, 4.0]);
        assert_eq!(x.drop(4, 4).len(), 0);
        assert_eq!(x.extract(1, 3, 3).to_vec(), vec![1.0, 4.0, 7.0]);
        let odd = x.extract(1, 4, 2);
        assert_eq!(odd.extract(3, 2, -1).to_vec(), vec![7.0, 5.0]);
    }

    #[test]
    fn writes_are_visible_in_buffer() {
        let mut buf = [1.0_f64, 2.0, 3.0, 4.0];
        {
            let mut x = DataBlockMut::with_len(&mut buf, 3, 2, -2);
            x[0] = 40.0;
            x.set(1, 20.0);
            let mut inner = x.drop_mut(1, 0);
            inner[0] += 1.0;
        }
        assert_eq!(buf, [1.0, 21.0, 3.0, 40.0]);
    }

    #[test]
    fn swap_and_apply() {
        let mut buf = [1.0_f64, 2.0, 3.0];
        let mut x = DataBlockMut::from_slice(&mut buf);
        x.swap(0, 2);
        x.apply(|v| v * 10.0);
        x.apply_indexed(|i, v| v + i as f64);
        assert_eq!(x.to_vec(), vec![30.0, 21.0, 12.0]);
    }
}
