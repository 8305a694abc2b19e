use crate::Query;

/// Values to copy from a uniquely identified user into the form.
///
/// A `None` field means "leave the target alone", never "clear it".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateInstruction {
	pub role: Option<String>,
	pub team: Option<String>,
}

/// Receiver of populate instructions, typically the form store.
pub trait PopulateSink {
	fn populate(&mut self, instruction: &PopulateInstruction);
}

/// Stateless projection from a [`Query`] to a [`PopulateInstruction`].
///
/// Fires when the query resolved to exactly one record whose email equals the
/// typed text, ignoring case. The rule keeps no memory, so a later ambiguous
/// query simply yields nothing and previously populated values stay put.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoPopulationRule;

impl AutoPopulationRule {
	pub fn derive(&self, query: &Query) -> Option<PopulateInstruction> {
		let record = query.exact_unique_match()?;
		let instruction = PopulateInstruction {
			role: present(record.role.as_deref()),
			team: present(record.team.as_deref()),
		};
		tracing::debug!(
			email = %record.email,
			role = ?instruction.role,
			team = ?instruction.team,
			"query.populate"
		);
		Some(instruction)
	}

	/// Derives and applies in one step. Returns whether an instruction was emitted.
	pub fn apply(&self, query: &Query, sink: &mut impl PopulateSink) -> bool {
		match self.derive(query) {
			Some(instruction) => {
				sink.populate(&instruction);
				true
			}
			None => false,
		}
	}
}

fn present(value: Option<&str>) -> Option<String> {
	value.filter(|v| !v.is_empty()).map(str::to_string)
}
