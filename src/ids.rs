//! Id generation for mindmap nodes and edges.
//!
//! Ids only need to be unique inside one document.

use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

pub trait IdGenerator {
	/// A fresh id starting with `prefix`.
	fn next_id(&mut self, prefix: char) -> String;
}

/// `prefix` + six random base-36 characters.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
	fn next_id(&mut self, prefix: char) -> String {
		let mut rng = rand::thread_rng();
		let mut id = String::with_capacity(SUFFIX_LEN + 1);
		id.push(prefix);
		for _ in 0..SUFFIX_LEN {
			id.push(ALPHABET[rng.gen_range(0..ALPHABET.len())] as char);
		}
		id
	}
}

/// Deterministic ids (`n1`, `n2`, `e3`, ...) for replaying input in tests.
#[derive(Debug, Default)]
pub struct SequentialIds {
	next: u64,
}

impl IdGenerator for SequentialIds {
	fn next_id(&mut self, prefix: char) -> String {
		self.next += 1;
		format!("{prefix}{}", self.next)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_random_id_shape() {
		let id = RandomIds.next_id('n');
		assert_eq!(id.len(), 7);
		assert!(id.starts_with('n'));
		assert!(id[1..].bytes().all(|b| ALPHABET.contains(&b)));
	}

	#[test]
	fn test_sequential_ids_are_distinct() {
		let mut ids = SequentialIds::default();
		assert_eq!(ids.next_id('n'), "n1");
		assert_eq!(ids.next_id('e'), "e2");
	}
}
