/// A form value plus its editability.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldState<T> {
	value: T,
	enabled: bool,
}

impl<T> FieldState<T> {
	pub fn new(value: T, enabled: bool) -> Self {
		Self { value, enabled }
	}

	pub fn enabled(value: T) -> Self {
		Self::new(value, true)
	}

	pub fn disabled(value: T) -> Self {
		Self::new(value, false)
	}

	pub fn value(&self) -> &T {
		&self.value
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Programmatic update; applies whether or not the field is enabled.
	pub fn set(&mut self, value: T) {
		self.value = value;
	}

	/// User edit; refused while the field is disabled.
	pub fn edit(&mut self, value: T) -> bool {
		if !self.enabled {
			return false;
		}
		self.value = value;
		true
	}

	/// Changes editability only. Returns whether the flag actually changed.
	pub fn set_enabled(&mut self, enabled: bool) -> bool {
		let changed = self.enabled != enabled;
		self.enabled = enabled;
		changed
	}

	/// Flips editability and returns the new state.
	pub fn toggle(&mut self) -> bool {
		self.enabled = !self.enabled;
		self.enabled
	}

	/// The value as it would be submitted: `None` while disabled.
	pub fn submitted(&self) -> Option<&T> {
		self.enabled.then_some(&self.value)
	}
}
