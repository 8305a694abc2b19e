use std::fmt;

/// Editability of a governed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Enablement {
	Enabled,
	#[default]
	Disabled,
}

impl Enablement {
	pub fn is_enabled(self) -> bool {
		self == Self::Enabled
	}
}

impl From<bool> for Enablement {
	fn from(enabled: bool) -> Self {
		if enabled { Self::Enabled } else { Self::Disabled }
	}
}

/// Store that can change a field's editability without emitting a value change.
pub trait EnablementSink {
	type Field: Copy + fmt::Debug;

	fn set_enabled_silently(&mut self, field: Self::Field, enabled: bool);
}

/// State machine deciding whether one field is editable from a discriminant value.
///
/// Starts `Disabled`. [`EnablementPolicy::apply`] recomputes the state on every
/// discriminant change and only forwards it to the sink when it differs from
/// the last state applied, so repeated identical values cause no traffic.
pub struct EnablementPolicy<F> {
	field: F,
	predicate: Box<dyn Fn(Option<&str>) -> bool + Send + Sync>,
	applied: Enablement,
}

impl<F> fmt::Debug for EnablementPolicy<F>
where
	F: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EnablementPolicy")
			.field("field", &self.field)
			.field("applied", &self.applied)
			.finish_non_exhaustive()
	}
}

impl<F> EnablementPolicy<F>
where
	F: Copy + fmt::Debug,
{
	pub fn new(field: F, predicate: impl Fn(Option<&str>) -> bool + Send + Sync + 'static) -> Self {
		Self {
			field,
			predicate: Box::new(predicate),
			applied: Enablement::Disabled,
		}
	}

	/// Enables `field` exactly when the discriminant equals `sentinel`.
	pub fn equals(field: F, sentinel: impl Into<String>) -> Self {
		let sentinel = sentinel.into();
		Self::new(field, move |value| value == Some(sentinel.as_str()))
	}

	/// State the predicate selects for `discriminant`.
	pub fn evaluate(&self, discriminant: Option<&str>) -> Enablement {
		Enablement::from((self.predicate)(discriminant))
	}

	/// Last state pushed to a sink.
	pub fn state(&self) -> Enablement {
		self.applied
	}

	/// Recomputes from `discriminant` and forwards a change to `sink`.
	///
	/// Returns the new state when it was forwarded, `None` when unchanged.
	pub fn apply<S>(&mut self, discriminant: Option<&str>, sink: &mut S) -> Option<Enablement>
	where
		S: EnablementSink<Field = F>,
	{
		let next = self.evaluate(discriminant);
		if next == self.applied {
			return None;
		}
		tracing::debug!(field = ?self.field, from = ?self.applied, to = ?next, "form.enablement");
		self.applied = next;
		sink.set_enabled_silently(self.field, next.is_enabled());
		Some(next)
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[derive(Default)]
	struct Recorder {
		calls: Vec<(u8, bool)>,
	}

	impl EnablementSink for Recorder {
		type Field = u8;

		fn set_enabled_silently(&mut self, field: u8, enabled: bool) {
			self.calls.push((field, enabled));
		}
	}

	#[test]
	fn starts_disabled_and_follows_sentinel() {
		let mut policy = EnablementPolicy::equals(7u8, "dm");
		let mut sink = Recorder::default();
		assert_eq!(policy.state(), Enablement::Disabled);

		assert_eq!(policy.apply(Some("player"), &mut sink), None);
		assert_eq!(policy.apply(Some("dm"), &mut sink), Some(Enablement::Enabled));
		assert_eq!(policy.apply(None, &mut sink), Some(Enablement::Disabled));
		assert_eq!(sink.calls, vec![(7, true), (7, false)]);
	}

	#[test]
	fn sentinel_comparison_is_exact() {
		let policy = EnablementPolicy::equals(0u8, "dm");
		assert_eq!(policy.evaluate(Some("DM")), Enablement::Disabled);
		assert_eq!(policy.evaluate(Some("dm ")), Enablement::Disabled);
		assert_eq!(policy.evaluate(Some("dm")), Enablement::Enabled);
	}

	#[test]
	fn custom_predicate() {
		let policy = EnablementPolicy::new(0u8, |v: Option<&str>| v.is_some_and(|v| v.starts_with("admin")));
		assert_eq!(policy.evaluate(Some("admin-eu")), Enablement::Enabled);
		assert_eq!(policy.evaluate(None), Enablement::Disabled);
	}

	proptest! {
		#[test]
		fn repeating_a_value_never_emits_twice(values in prop::collection::vec(prop::option::of("dm|player|coach"), 1..20)) {
			let mut policy = EnablementPolicy::equals(1u8, "dm");
			let mut sink = Recorder::default();
			for value in &values {
				let first = policy.apply(value.as_deref(), &mut sink);
				let state = policy.state();
				prop_assert_eq!(policy.apply(value.as_deref(), &mut sink), None);
				prop_assert_eq!(policy.state(), state);
				prop_assert_eq!(state, policy.evaluate(value.as_deref()));
				if let Some(next) = first {
					prop_assert_eq!(next, state);
				}
			}
			// Consecutive sink calls always alternate.
			prop_assert!(sink.calls.windows(2).all(|w| w[0].1 != w[1].1));
		}
	}
}
