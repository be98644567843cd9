//! Parser for the backend's path result table.
//!
//! Format: header row followed by one step per row, comma or tab separated.
//! Columns are looked up by name (`From_Sequence`, `To_Sequence`,
//! `Transition_Cost`, case-insensitive); when any of them is missing the
//! first three columns are used in that order. Values may be wrapped in
//! double quotes. Doubled quotes are not treated as escapes.

use super::types::PathStep;

const FROM_COLUMN: &str = "from_sequence";
const TO_COLUMN: &str = "to_sequence";
const COST_COLUMN: &str = "transition_cost";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Columns {
	from: usize,
	to: usize,
	cost: usize,
}

impl Columns {
	const POSITIONAL: Columns = Columns {
		from: 0,
		to: 1,
		cost: 2,
	};

	fn resolve(header: &[String]) -> Self {
		let names: Vec<String> = header
			.iter()
			.map(|h| h.replace('"', "").trim().to_lowercase())
			.collect();
		let find = |name: &str| names.iter().position(|n| n == name);

		match (find(FROM_COLUMN), find(TO_COLUMN), find(COST_COLUMN)) {
			(Some(from), Some(to), Some(cost)) => Columns { from, to, cost },
			_ => Self::POSITIONAL,
		}
	}
}

/// Tab if the header contains one, comma otherwise.
pub fn detect_delimiter(header: &str) -> char {
	if header.contains('\t') { '\t' } else { ',' }
}

/// Split one row on `delimiter`, ignoring delimiters inside double quotes.
/// Quote characters are dropped and every field is trimmed.
pub fn split_row(line: &str, delimiter: char) -> Vec<String> {
	let mut fields = Vec::new();
	let mut current = String::new();
	let mut in_quotes = false;

	for c in line.chars() {
		match c {
			'"' => in_quotes = !in_quotes,
			c if c == delimiter && !in_quotes => {
				fields.push(current.trim().to_string());
				current.clear();
			}
			c => current.push(c),
		}
	}
	fields.push(current.trim().to_string());
	fields
}

/// Parse a downloaded result into path steps, in row order.
///
/// Never fails: short input gives an empty list, rows without both
/// sequences are skipped and unparsable costs become 0.
pub fn parse_path_table(content: &str) -> Vec<PathStep> {
	let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
	if lines.len() < 2 {
		return Vec::new();
	}

	let delimiter = detect_delimiter(lines[0]);
	let columns = Columns::resolve(&split_row(lines[0], delimiter));

	lines[1..]
		.iter()
		.filter_map(|line| {
			let fields = split_row(line, delimiter);
			let field = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");

			let (from, to) = (field(columns.from), field(columns.to));
			if from.is_empty() || to.is_empty() {
				return None;
			}
			let cost = field(columns.cost).parse::<i64>().unwrap_or(0);
			Some(PathStep::new(from, to, cost))
		})
		.collect()
}
