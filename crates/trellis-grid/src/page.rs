use crate::error::GridError;
use crate::source::Row;

/// Row range for one page: `[begin, end)` with `end = begin + limit`.
///
/// A limit of 0 means unbounded: `end` is absent and no slicing applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub begin: u64,
    pub end: Option<u64>,
}

impl PageRange {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            begin: offset,
            end: if limit == 0 { None } else { Some(offset + limit) },
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.end.is_none()
    }

    /// Width of the range; 0 when unbounded.
    pub fn limit(&self) -> u64 {
        self.end.map_or(0, |end| end - self.begin)
    }

    /// Whether the 0-based row index falls inside the range.
    pub fn contains(&self, index: u64) -> bool {
        index >= self.begin && self.end.is_none_or(|end| index < end)
    }
}

/// Dynamic-strategy range adapter over an already-filtered row stream.
///
/// Rows before `begin` are consumed and discarded; once the range upper
/// bound is reached the underlying source is no longer polled. Stopping
/// early is a correctness requirement, not an optimization: upstream
/// sources may be unbounded.
pub struct RangeIter<I> {
    source: I,
    range: PageRange,
    index: u64,
}

impl<I> RangeIter<I> {
    pub fn new(source: I, range: PageRange) -> Self {
        Self {
            source,
            range,
            index: 0,
        }
    }
}

impl<I> Iterator for RangeIter<I>
where
    I: Iterator<Item = Result<Row, GridError>>,
{
    type Item = Result<Row, GridError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(end) = self.range.end
                && self.index >= end
            {
                return None;
            }
            match self.source.next()? {
                Err(e) => return Some(Err(e)),
                Ok(row) => {
                    let position = self.index;
                    self.index += 1;
                    if position < self.range.begin {
                        continue;
                    }
                    return Some(Ok(row));
                }
            }
        }
    }
}

/// Static-strategy slice: the caller has already materialized, filtered
/// and sorted the full candidate set and recorded its length as the
/// total.
pub fn slice_page(rows: Vec<Row>, range: &PageRange) -> Vec<Row> {
    let begin = range.begin as usize;
    if begin >= rows.len() {
        return Vec::new();
    }
    match range.end {
        None => rows.into_iter().skip(begin).collect(),
        Some(_) => rows
            .into_iter()
            .skip(begin)
            .take(range.limit() as usize)
            .collect(),
    }
}
