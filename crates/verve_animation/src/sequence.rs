//! Sequential composition combinator

use verve_core::{Animatable, Completions, Driver, Millis, Step};

/// Runs children one after another, each starting from the value its
/// predecessor finished on.
///
/// A child's successor starts on the finishing tick but produces its first
/// sample on the following tick, so every tick surfaces exactly one value.
/// Per-child completion callbacks fire in declaration order as each child
/// finishes; the sequence itself finishes with its last child.
pub struct Sequence<T: Animatable> {
    children: Vec<Box<dyn Driver<T>>>,
    cursor: usize,
    origin: Option<T>,
}

impl<T: Animatable> Default for Sequence<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Animatable> Sequence<T> {
    /// Build a sequence from already-boxed drivers.
    pub fn new(children: Vec<Box<dyn Driver<T>>>) -> Self {
        Self {
            children,
            cursor: 0,
            origin: None,
        }
    }

    /// Append a driver. Chains from [`Sequence::default`]:
    ///
    /// ```rust
    /// use verve_animation::{Sequence, Timing, TimingConfig};
    ///
    /// let seq = Sequence::default()
    ///     .then(Timing::new(100.0, TimingConfig::new(200.0)).unwrap())
    ///     .then(Timing::new(0.0, TimingConfig::new(150.0)).unwrap());
    /// assert_eq!(seq.len(), 2);
    /// ```
    pub fn then(mut self, driver: impl Driver<T> + 'static) -> Self {
        self.children.push(Box::new(driver));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<T: Animatable> Driver<T> for Sequence<T> {
    fn start(&mut self, now: Millis, origin: T) {
        self.origin = Some(origin);
        self.cursor = 0;
        if let Some(first) = self.children.first_mut() {
            first.start(now, origin);
        }
    }

    fn step(&mut self, now: Millis, completions: &mut Completions) -> Step<T> {
        let origin = self.origin.expect("sequence stepped before start");
        if self.children.is_empty() {
            return Step::finished(origin);
        }
        debug_assert!(self.cursor < self.children.len(), "sequence cursor out of range");

        let step = self.children[self.cursor].step(now, completions);
        if !step.is_finished() {
            return Step::running(step.value);
        }
        // The finished child has already pushed its own completion.
        if self.cursor + 1 == self.children.len() {
            return Step::finished(step.value);
        }
        self.cursor += 1;
        self.children[self.cursor].start(now, step.value);
        Step::running(step.value)
    }
}

// ============================================================================
// Tests
// ============================================================================
