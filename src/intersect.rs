//! Set algebra over posting lists.
//!
//! An [`Intersect`] accumulates any number of uid arrays and then evaluates a
//! union, intersection or difference into its result. The result is a plain
//! uid vector the sort subsystem reorders in place, so it may hold the same uid
//! more than once when a caller builds it that way.

use crate::posting::EntityUid;

#[derive(Debug, Clone, Default)]
pub struct Intersect {
    buffers: Vec<Vec<EntityUid>>,
    result: Vec<EntityUid>,
}

impl Intersect {
    pub fn new() -> Self {
        Intersect::default()
    }

    /// Start from an existing result list, for example a query hit list.
    pub fn from_result(result: Vec<EntityUid>) -> Self {
        Intersect {
            buffers: Vec::new(),
            result,
        }
    }

    /// Add a copy of `uids` as an operand. Unsorted input is normalized.
    pub fn put_array(&mut self, uids: &[EntityUid]) {
        let mut buffer = uids.to_vec();
        buffer.sort_unstable();
        buffer.dedup();
        self.buffers.push(buffer);
    }

    pub fn operand_count(&self) -> usize {
        self.buffers.len()
    }

    /// Union of every operand, sorted and deduplicated.
    pub fn exec_or(&mut self) -> &[EntityUid] {
        let total: usize = self.buffers.iter().map(Vec::len).sum();
        let mut result = Vec::with_capacity(total);
        for buffer in &self.buffers {
            result.extend_from_slice(buffer);
        }
        result.sort_unstable();
        result.dedup();

        self.result = result;
        &self.result
    }

    /// Values present in every operand.
    pub fn exec_and(&mut self) -> &[EntityUid] {
        let mut result = Vec::new();

        if let Some((smallest, _)) = self
            .buffers
            .iter()
            .enumerate()
            .min_by_key(|(_, buffer)| buffer.len())
        {
            for &uid in &self.buffers[smallest] {
                let everywhere = self
                    .buffers
                    .iter()
                    .enumerate()
                    .all(|(id, buffer)| id == smallest || buffer.binary_search(&uid).is_ok());
                if everywhere {
                    result.push(uid);
                }
            }
        }

        self.result = result;
        &self.result
    }

    /// Values of the first operand absent from all other operands.
    pub fn exec_not(&mut self) -> &[EntityUid] {
        let mut result = Vec::new();

        if let Some((first, rest)) = self.buffers.split_first() {
            for &uid in first {
                if rest.iter().all(|buffer| buffer.binary_search(&uid).is_err()) {
                    result.push(uid);
                }
            }
        }

        self.result = result;
        &self.result
    }

    pub fn result(&self) -> &[EntityUid] {
        &self.result
    }

    pub fn result_mut(&mut self) -> &mut [EntityUid] {
        &mut self.result
    }

    pub fn set_result(&mut self, result: Vec<EntityUid>) {
        self.result = result;
    }

    pub fn into_result(self) -> Vec<EntityUid> {
        self.result
    }

    pub fn len(&self) -> usize {
        self.result.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_merges_and_deduplicates() {
        let mut intersect = Intersect::new();
        intersect.put_array(&[1, 3, 5]);
        intersect.put_array(&[3, 4]);
        intersect.put_array(&[]);
        intersect.put_array(&[9, 1]);

        assert_eq!(intersect.exec_or(), &[1, 3, 4, 5, 9]);
    }

    #[test]
    fn test_or_over_many_operands() {
        let mut intersect = Intersect::new();
        for start in 0..500u64 {
            intersect.put_array(&[start, start + 1, start + 2]);
        }

        let expected: Vec<EntityUid> = (0..502).collect();
        assert_eq!(intersect.exec_or(), expected.as_slice());
    }

    #[test]
    fn test_and() {
        let mut intersect = Intersect::new();
        intersect.put_array(&[1, 2, 3, 4, 5]);
        intersect.put_array(&[2, 4, 6]);
        intersect.put_array(&[4, 2]);

        assert_eq!(intersect.exec_and(), &[2, 4]);

        intersect.put_array(&[]);
        assert!(intersect.exec_and().is_empty());
    }

    #[test]
    fn test_not() {
        let mut intersect = Intersect::new();
        intersect.put_array(&[1, 2, 3, 4]);
        intersect.put_array(&[2]);
        intersect.put_array(&[4, 7]);

        assert_eq!(intersect.exec_not(), &[1, 3]);
    }

    #[test]
    fn test_empty_accumulator() {
        let mut intersect = Intersect::new();
        assert!(intersect.exec_or().is_empty());
        assert!(intersect.exec_and().is_empty());
        assert!(intersect.exec_not().is_empty());
    }

    #[test]
    fn test_reuse_as_output_accumulator() {
        let mut intersect = Intersect::new();
        intersect.put_array(&[5, 6]);
        intersect.exec_or();
        intersect.put_array(&[1]);

        assert_eq!(intersect.exec_or(), &[1, 5, 6]);
        assert_eq!(intersect.len(), 3);
    }
}
